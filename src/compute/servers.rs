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

//! Next generation cloud servers.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use log::{debug, trace};
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;

use crate::catalog::ServiceCatalog;
use crate::credentials::hashed;
use crate::services::CLOUD_SERVERS;
use crate::{url, Error, ErrorKind, Session};

/// Default interval between two status checks when waiting for a server.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Statuses of a server that is not ready yet.
const IN_PROGRESS: &[&str] = &["BUILD", "REBUILD", "RESIZE", "WAIT"];

/// A file to inject into a new server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Personality {
    /// Path of the file on the server.
    pub path: String,
    /// Base64-encoded file contents.
    pub contents: String,
}

/// A request to create a server.
///
/// ```rust
/// let server = raxcloud::compute::NewServer::new("web1", "image-uuid", "2")
///     .with_metadata("role", "web");
/// assert_eq!(server.name, "web1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewServer {
    /// Server name.
    pub name: String,
    /// ID of the base image.
    #[serde(rename = "imageRef")]
    pub image_ref: String,
    /// ID of the flavor.
    #[serde(rename = "flavorRef")]
    pub flavor_ref: String,
    /// Key/value metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
    /// Files to inject into the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality: Option<Vec<Personality>>,
}

impl NewServer {
    /// Start a request with the required fields.
    pub fn new<N, I, F>(name: N, image_ref: I, flavor_ref: F) -> NewServer
    where
        N: Into<String>,
        I: Into<String>,
        F: Into<String>,
    {
        NewServer {
            name: name.into(),
            image_ref: image_ref.into(),
            flavor_ref: flavor_ref.into(),
            metadata: None,
            personality: None,
        }
    }

    /// Add a metadata item.
    pub fn with_metadata<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let _ = self
            .metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Add a file to inject.
    pub fn with_personality<P, C>(mut self, path: P, contents: C) -> Self
    where
        P: Into<String>,
        C: Into<String>,
    {
        self.personality
            .get_or_insert_with(Vec::new)
            .push(Personality {
                path: path.into(),
                contents: contents.into(),
            });
        self
    }
}

/// A request to rebuild a server.
///
/// Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RebuildServer {
    /// New server name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// ID of the image to rebuild from.
    #[serde(rename = "imageRef")]
    pub image_ref: String,
    /// New flavor.
    #[serde(rename = "flavorRef", skip_serializing_if = "Option::is_none")]
    pub flavor_ref: Option<String>,
    /// New metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
    /// Files to inject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality: Option<Vec<Personality>>,
}

impl RebuildServer {
    /// Rebuild from the given image.
    pub fn new<I: Into<String>>(image_ref: I) -> RebuildServer {
        RebuildServer {
            image_ref: image_ref.into(),
            ..RebuildServer::default()
        }
    }
}

/// Filters for listing servers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerQuery {
    /// Image ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Flavor ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    /// Server name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Server status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// ID of the last server of the previous page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Only servers changed since this time (ISO 8601).
    #[serde(rename = "changes-since", skip_serializing_if = "Option::is_none")]
    pub changes_since: Option<String>,
}

/// Reboot type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum RebootType {
    /// Graceful reboot.
    #[default]
    #[serde(rename = "SOFT")]
    Soft,
    /// Power cycle.
    #[serde(rename = "HARD")]
    Hard,
}

/// One-time administrator password of a new server.
///
/// The service returns it only in the creation response.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminPassword(String);

impl AdminPassword {
    /// Extract the password from a server creation response.
    pub fn from_response(created: &Value) -> Option<AdminPassword> {
        created
            .get("server")
            .and_then(|server| server.get("adminPass"))
            .and_then(Value::as_str)
            .map(|value| AdminPassword(value.to_string()))
    }

    /// Password value.
    #[inline]
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Attach the password to a server detail response, consuming it.
    ///
    /// Goes into the `server` object when present, otherwise into the top-level object.
    pub fn attach_to(self, mut detail: Value) -> Result<Value, Error> {
        if detail.get("server").map_or(false, Value::is_object) {
            if let Some(server) = detail.get_mut("server").and_then(Value::as_object_mut) {
                let _ = server.insert("adminPass".to_string(), Value::String(self.0));
            }
        } else if let Some(object) = detail.as_object_mut() {
            let _ = object.insert("adminPass".to_string(), Value::String(self.0));
        } else {
            return Err(Error::new(
                ErrorKind::InvalidResponse,
                "Server detail is not an object, cannot attach the admin password",
            ));
        }
        Ok(detail)
    }
}

impl fmt::Debug for AdminPassword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AdminPassword(hash({}))", hashed(&self.0))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Action<'a> {
    ChangePassword {
        #[serde(rename = "adminPass")]
        admin_pass: &'a str,
    },
    Reboot {
        #[serde(rename = "type")]
        reboot_type: RebootType,
    },
    Rebuild(&'a RebuildServer),
    Resize {
        #[serde(rename = "flavorRef")]
        flavor_ref: &'a str,
    },
    ConfirmResize(()),
    RevertResize(()),
    Rescue(&'static str),
    Unrescue(()),
    CreateImage {
        name: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<&'a HashMap<String, String>>,
    },
}

#[derive(Debug, Serialize)]
struct ServerRoot<'a> {
    server: &'a NewServer,
}

fn server_status(detail: &Value) -> Option<&str> {
    detail
        .get("server")
        .and_then(|server| server.get("status"))
        .and_then(Value::as_str)
}

/// Repeatedly fetch a server until it leaves the in-progress states.
///
/// Sleeps `interval` before every fetch. There is no timeout. A response without a status is
/// considered final.
pub async fn poll_until_ready<F, Fut>(interval: Duration, mut fetch: F) -> Result<Value, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Value, Error>>,
{
    loop {
        tokio::time::sleep(interval).await;
        let detail = fetch().await?;
        match server_status(&detail) {
            Some(status) if IN_PROGRESS.contains(&status) => {
                trace!("Server is still in status {}", status);
            }
            status => {
                debug!("Server reached status {:?}", status);
                return Ok(detail);
            }
        }
    }
}

/// Servers of the next generation compute service.
#[derive(Debug, Clone)]
pub struct Servers<'s> {
    session: &'s Session,
    url: Url,
    poll_interval: Duration,
}

impl<'s> Servers<'s> {
    /// Create a wrapper using the compute URL from the catalog.
    pub fn new(session: &'s Session, catalog: &ServiceCatalog) -> Result<Servers<'s>, Error> {
        Ok(Servers {
            session,
            url: session.resource_url(catalog, CLOUD_SERVERS, "servers")?,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Root URL of servers.
    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Change the interval between status checks in `create_and_wait`.
    #[inline]
    pub fn set_poll_interval(&mut self, interval: Duration) {
        self.poll_interval = interval;
    }

    /// Change the interval between status checks in `create_and_wait`.
    #[inline]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.set_poll_interval(interval);
        self
    }

    fn server_url(&self, id: &str) -> Url {
        url::join(self.url.clone(), id)
    }

    fn action_url(&self, id: &str) -> Url {
        url::extend(self.url.clone(), &[id, "action"])
    }

    async fn action(&self, id: &str, action: Action<'_>) -> Result<Value, Error> {
        trace!("Running an action on server {}", id);
        self.session.post(self.action_url(id), &action).await
    }

    /// Create a server.
    ///
    /// Returns immediately, the response includes the one-time `adminPass`.
    pub async fn create(&self, server: &NewServer) -> Result<Value, Error> {
        debug!("Creating server {}", server.name);
        self.session
            .post(self.url.clone(), &ServerRoot { server })
            .await
    }

    /// Create a server and wait for it to leave the building state.
    ///
    /// Returns the final server detail with the `adminPass` from the creation response.
    pub async fn create_and_wait(&self, server: &NewServer) -> Result<Value, Error> {
        let created = self.create(server).await?;
        let admin_pass = AdminPassword::from_response(&created);
        let self_url = self.self_url(&created)?;
        debug!("Waiting for server {} at {}", server.name, self_url);

        let session = self.session;
        let detail = poll_until_ready(self.poll_interval, || session.get(self_url.clone())).await?;
        match admin_pass {
            Some(password) => password.attach_to(detail),
            None => Ok(detail),
        }
    }

    fn self_url(&self, created: &Value) -> Result<Url, Error> {
        let server = created.get("server");
        let link = server
            .and_then(|server| server.get("links"))
            .and_then(Value::as_array)
            .and_then(|links| {
                links
                    .iter()
                    .find(|link| link.get("rel").and_then(Value::as_str) == Some("self"))
            })
            .and_then(|link| link.get("href"))
            .and_then(Value::as_str);
        if let Some(href) = link {
            return url::parse_base(href);
        }

        match server.and_then(|server| server.get("id")).and_then(Value::as_str) {
            Some(id) => Ok(self.server_url(id)),
            None => Err(Error::new(
                ErrorKind::InvalidResponse,
                "Server creation response has neither a self link nor an ID",
            )),
        }
    }

    /// Delete a server.
    pub async fn delete(&self, id: &str) -> Result<Value, Error> {
        self.session.delete(self.server_url(id)).await
    }

    /// List servers, optionally with details.
    pub async fn list(&self, query: &ServerQuery, detail: bool) -> Result<Value, Error> {
        let url = if detail {
            url::join(self.url.clone(), "detail")
        } else {
            self.url.clone()
        };
        self.session.get_query(url, query).await
    }

    /// Get details of a server.
    pub async fn detail(&self, id: &str) -> Result<Value, Error> {
        self.session.get(self.server_url(id)).await
    }

    /// Change the administrator password.
    pub async fn change_password(&self, id: &str, password: &str) -> Result<Value, Error> {
        self.action(
            id,
            Action::ChangePassword {
                admin_pass: password,
            },
        )
        .await
    }

    /// Reboot a server.
    pub async fn reboot(&self, id: &str, reboot_type: RebootType) -> Result<Value, Error> {
        self.action(id, Action::Reboot { reboot_type }).await
    }

    /// Rebuild a server.
    pub async fn rebuild(&self, id: &str, rebuild: &RebuildServer) -> Result<Value, Error> {
        self.action(id, Action::Rebuild(rebuild)).await
    }

    /// Resize a server to the given flavor.
    pub async fn resize(&self, id: &str, flavor_ref: &str) -> Result<Value, Error> {
        self.action(id, Action::Resize { flavor_ref }).await
    }

    /// Confirm a pending resize.
    pub async fn confirm_resize(&self, id: &str) -> Result<Value, Error> {
        self.action(id, Action::ConfirmResize(())).await
    }

    /// Revert a pending resize.
    pub async fn revert_resize(&self, id: &str) -> Result<Value, Error> {
        self.action(id, Action::RevertResize(())).await
    }

    /// Put a server into rescue mode.
    pub async fn rescue(&self, id: &str) -> Result<Value, Error> {
        self.action(id, Action::Rescue("none")).await
    }

    /// Leave rescue mode.
    pub async fn unrescue(&self, id: &str) -> Result<Value, Error> {
        self.action(id, Action::Unrescue(())).await
    }

    /// Create an image of a server.
    pub async fn create_image(
        &self,
        id: &str,
        name: &str,
        metadata: Option<&HashMap<String, String>>,
    ) -> Result<Value, Error> {
        self.action(id, Action::CreateImage { name, metadata }).await
    }
}
