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

//! Server images.

use reqwest::Url;
use serde::Serialize;
use serde_json::Value;

use crate::catalog::ServiceCatalog;
use crate::services::CLOUD_SERVERS;
use crate::{url, Error, Session};

/// Image type filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ImageType {
    /// Images provided by the cloud.
    #[serde(rename = "BASE")]
    Base,
    /// Images created from user servers.
    #[serde(rename = "SERVER")]
    Server,
}

/// Filters for listing images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageQuery {
    /// Server ID or URL the image was created from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// Image name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Image status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Only images changed since this time (ISO 8601).
    #[serde(rename = "changes-since", skip_serializing_if = "Option::is_none")]
    pub changes_since: Option<String>,
    /// ID of the last image of the previous page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Image type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub image_type: Option<ImageType>,
}

/// Images of the next generation compute service.
#[derive(Debug, Clone)]
pub struct Images<'s> {
    session: &'s Session,
    url: Url,
}

impl<'s> Images<'s> {
    /// Create a wrapper using the compute URL from the catalog.
    pub fn new(session: &'s Session, catalog: &ServiceCatalog) -> Result<Images<'s>, Error> {
        Ok(Images {
            session,
            url: session.resource_url(catalog, CLOUD_SERVERS, "images")?,
        })
    }

    /// Root URL of images.
    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// List images, optionally with details.
    pub async fn list(&self, query: &ImageQuery, detail: bool) -> Result<Value, Error> {
        let url = if detail {
            url::join(self.url.clone(), "detail")
        } else {
            self.url.clone()
        };
        self.session.get_query(url, query).await
    }

    /// Get details of an image.
    pub async fn detail(&self, id: &str) -> Result<Value, Error> {
        self.session.get(url::join(self.url.clone(), id)).await
    }

    /// Delete an image.
    pub async fn delete(&self, id: &str) -> Result<Value, Error> {
        self.session.delete(url::join(self.url.clone(), id)).await
    }
}
