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

//! First generation cloud servers and their images.
//!
//! Resources of this service use numeric IDs.

use log::debug;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;

use crate::catalog::ServiceCatalog;
use crate::compute::Personality;
use crate::services::FIRST_GEN_SERVERS;
use crate::{url, Error, Session};

/// A request to create a first generation server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewFirstGenServer {
    /// Server name.
    pub name: String,
    /// ID of the base image.
    #[serde(rename = "imageId")]
    pub image_id: u64,
    /// ID of the flavor.
    #[serde(rename = "flavorId")]
    pub flavor_id: u64,
    /// Files to inject into the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality: Option<Vec<Personality>>,
}

impl NewFirstGenServer {
    /// Start a request with the required fields.
    pub fn new<S: Into<String>>(name: S, image_id: u64, flavor_id: u64) -> NewFirstGenServer {
        NewFirstGenServer {
            name: name.into(),
            image_id,
            flavor_id,
            personality: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ServerRoot<'a> {
    server: &'a NewFirstGenServer,
}

#[derive(Debug, Serialize)]
struct NewImage<'a> {
    #[serde(rename = "serverId")]
    server_id: u64,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct ImageRoot<'a> {
    image: NewImage<'a>,
}

fn with_id(base: &Url, id: u64) -> Url {
    url::join(base.clone(), &id.to_string())
}

/// Servers of the first generation compute service.
#[derive(Debug, Clone)]
pub struct FirstGenServers<'s> {
    session: &'s Session,
    url: Url,
}

impl<'s> FirstGenServers<'s> {
    /// Create a wrapper using the first generation URL from the catalog.
    pub fn new(
        session: &'s Session,
        catalog: &ServiceCatalog,
    ) -> Result<FirstGenServers<'s>, Error> {
        Ok(FirstGenServers {
            session,
            url: session.resource_url(catalog, FIRST_GEN_SERVERS, "servers")?,
        })
    }

    /// Create a server.
    pub async fn create(&self, server: &NewFirstGenServer) -> Result<Value, Error> {
        debug!("Creating first generation server {}", server.name);
        self.session
            .post(self.url.clone(), &ServerRoot { server })
            .await
    }

    /// Delete a server.
    pub async fn delete(&self, id: u64) -> Result<Value, Error> {
        self.session.delete(with_id(&self.url, id)).await
    }

    /// List servers.
    pub async fn list(&self) -> Result<Value, Error> {
        self.session.get(self.url.clone()).await
    }

    /// Get details of a server, or of all servers if `id` is `None`.
    pub async fn detail(&self, id: Option<u64>) -> Result<Value, Error> {
        let url = match id {
            Some(id) => with_id(&self.url, id),
            None => url::join(self.url.clone(), "detail"),
        };
        self.session.get(url).await
    }
}

/// Images of the first generation compute service.
#[derive(Debug, Clone)]
pub struct FirstGenImages<'s> {
    session: &'s Session,
    url: Url,
}

impl<'s> FirstGenImages<'s> {
    /// Create a wrapper using the first generation URL from the catalog.
    pub fn new(
        session: &'s Session,
        catalog: &ServiceCatalog,
    ) -> Result<FirstGenImages<'s>, Error> {
        Ok(FirstGenImages {
            session,
            url: session.resource_url(catalog, FIRST_GEN_SERVERS, "images")?,
        })
    }

    /// List images.
    pub async fn list(&self) -> Result<Value, Error> {
        self.session.get(self.url.clone()).await
    }

    /// Get details of an image.
    pub async fn detail(&self, id: u64) -> Result<Value, Error> {
        self.session.get(with_id(&self.url, id)).await
    }

    /// Create an image of a server.
    pub async fn create(&self, server_id: u64, name: &str) -> Result<Value, Error> {
        let body = ImageRoot {
            image: NewImage { server_id, name },
        };
        self.session.post(self.url.clone(), &body).await
    }

    /// Delete an image.
    pub async fn delete(&self, id: u64) -> Result<Value, Error> {
        self.session.delete(with_id(&self.url, id)).await
    }
}
