// Copyright 2019 Dmitry Tantsur <divius.inside@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Handy primitives for working with URLs.

use reqwest::Url;

use crate::{Error, ErrorKind};

/// Parse a URL that can be used as a base for resource paths.
pub fn parse_base(value: &str) -> Result<Url, Error> {
    let url = Url::parse(value)?;
    if url.cannot_be_a_base() || !url.has_host() {
        Err(Error::new(
            ErrorKind::InvalidInput,
            format!("{} cannot be used as a base URL", value),
        ))
    } else {
        Ok(url)
    }
}

/// Append one segment to the URL path.
///
/// The URL must be a valid base, see `parse_base`.
#[inline]
#[allow(unused_results)]
pub fn join(url: Url, other: &str) -> Url {
    extend(url, Some(other))
}

/// Append several segments to the URL path.
///
/// A trailing slash in the original URL does not produce an empty segment.
#[inline]
#[allow(unused_results)]
pub fn extend<I>(mut url: Url, segments: I) -> Url
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}
