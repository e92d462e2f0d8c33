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

//! Utilities to work with requests and responses.

use log::trace;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, ErrorKind};

/// Check the response and convert errors into `RemoteApiError`.
///
/// The error message is the raw response body.
pub async fn check(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        trace!("HTTP request to {} returned {}", response.url(), status);
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        trace!("HTTP request returned {}; body: {:?}", status, body);
        Err(Error::new(ErrorKind::RemoteApiError, body).with_status(status))
    }
}

/// Send the request and check its result.
#[inline]
pub async fn send_checked(builder: RequestBuilder) -> Result<Response, Error> {
    check(builder.send().await?).await
}

/// Convert a successful response into JSON, an empty body becomes `null`.
pub async fn to_value(response: Response) -> Result<Value, Error> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str(&text).map_err(Into::into)
    }
}

/// Send the request and convert the response into a JSON value.
#[inline]
pub async fn fetch_value(builder: RequestBuilder) -> Result<Value, Error> {
    to_value(send_checked(builder).await?).await
}

/// Send the request and convert the response into the given type.
#[inline]
pub async fn fetch_json<T>(builder: RequestBuilder) -> Result<T, Error>
where
    T: DeserializeOwned + Send,
{
    send_checked(builder)
        .await?
        .json::<T>()
        .await
        .map_err(Into::into)
}
