// Copyright 2019 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Credentials and their resolution.

use std::collections::hash_map::DefaultHasher;
use std::env;
use std::fmt;
use std::hash::{Hash, Hasher};

use log::trace;
use reqwest::Url;

use crate::{url, Error};

/// Default public identity endpoint.
pub const DEFAULT_AUTH_URL: &str = "https://identity.api.rackspacecloud.com/v2.0";

const ENV_USERNAME: &str = "OS_USERNAME";
const ENV_PASSWORD: &str = "OS_PASSWORD";
const ENV_API_KEY: &str = "OS_API_KEY";
const ENV_REGION: &str = "OS_REGION_NAME";
const ENV_AUTH_URL: &str = "OS_AUTH_URL";

/// Source of environment variables.
pub(crate) trait Environment: fmt::Debug + Send + Sync {
    /// Get a variable, `None` if it is not set.
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RealEnvironment;

impl Environment for RealEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        env::var(name).ok()
    }
}

/// Hash of a secret value, for `Debug` output.
pub(crate) fn hashed(value: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Secret used to authenticate.
#[derive(Clone, PartialEq, Eq)]
pub(crate) enum Secret {
    Password(String),
    ApiKey(String),
}

impl Secret {
    #[inline]
    pub fn is_password(&self) -> bool {
        matches!(self, Secret::Password(..))
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Secret::Password(value) => write!(f, "Password(hash({}))", hashed(value)),
            Secret::ApiKey(value) => write!(f, "ApiKey(hash({}))", hashed(value)),
        }
    }
}

/// Credentials with every required field resolved.
#[derive(Debug, Clone)]
pub(crate) struct Resolved {
    pub username: String,
    pub secret: Secret,
    pub region: Option<String>,
    pub auth_url: Url,
}

/// Credentials supplied by the caller.
///
/// Every field is optional. Missing fields are looked up, in this order, in the values stored
/// on the session by a previous login and in the process environment:
///
/// | Field    | Environment variable |
/// |----------|----------------------|
/// | username | `OS_USERNAME`        |
/// | password | `OS_PASSWORD`        |
/// | API key  | `OS_API_KEY`         |
/// | region   | `OS_REGION_NAME`     |
/// | auth URL | `OS_AUTH_URL`        |
///
/// The auth URL defaults to [DEFAULT_AUTH_URL](constant.DEFAULT_AUTH_URL.html). If both a
/// password and an API key are available from the same source, the password is used.
///
/// ```rust
/// let creds = raxcloud::Credentials::new()
///     .with_username("user")
///     .with_api_key("0123456789abcdef")
///     .with_region("DFW");
/// assert_eq!(creds.username(), Some("user"));
/// ```
#[derive(Clone, Default)]
pub struct Credentials {
    username: Option<String>,
    password: Option<String>,
    api_key: Option<String>,
    region: Option<String>,
    auth_url: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_deref().map(hashed))
            .field("api_key", &self.api_key.as_deref().map(hashed))
            .field("region", &self.region)
            .field("auth_url", &self.auth_url)
            .finish()
    }
}

impl Credentials {
    /// Create empty credentials (everything comes from the environment).
    #[inline]
    pub fn new() -> Credentials {
        Credentials::default()
    }

    /// User name.
    #[inline]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Region (if explicitly set).
    #[inline]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Identity endpoint override (if explicitly set).
    #[inline]
    pub fn auth_url(&self) -> Option<&str> {
        self.auth_url.as_deref()
    }

    /// Set the user name.
    #[inline]
    pub fn set_username<S: Into<String>>(&mut self, value: S) {
        self.username = Some(value.into());
    }

    /// Set the password.
    #[inline]
    pub fn set_password<S: Into<String>>(&mut self, value: S) {
        self.password = Some(value.into());
    }

    /// Set the API key.
    #[inline]
    pub fn set_api_key<S: Into<String>>(&mut self, value: S) {
        self.api_key = Some(value.into());
    }

    /// Set the region.
    #[inline]
    pub fn set_region<S: Into<String>>(&mut self, value: S) {
        self.region = Some(value.into());
    }

    /// Override the identity endpoint.
    #[inline]
    pub fn set_auth_url<S: Into<String>>(&mut self, value: S) {
        self.auth_url = Some(value.into());
    }

    /// Add a user name.
    #[inline]
    pub fn with_username<S: Into<String>>(mut self, value: S) -> Self {
        self.set_username(value);
        self
    }

    /// Add a password.
    #[inline]
    pub fn with_password<S: Into<String>>(mut self, value: S) -> Self {
        self.set_password(value);
        self
    }

    /// Add an API key.
    #[inline]
    pub fn with_api_key<S: Into<String>>(mut self, value: S) -> Self {
        self.set_api_key(value);
        self
    }

    /// Add a region.
    #[inline]
    pub fn with_region<S: Into<String>>(mut self, value: S) -> Self {
        self.set_region(value);
        self
    }

    /// Add an identity endpoint override.
    #[inline]
    pub fn with_auth_url<S: Into<String>>(mut self, value: S) -> Self {
        self.set_auth_url(value);
        self
    }

    fn explicit_secret(&self) -> Option<Secret> {
        self.password
            .clone()
            .map(Secret::Password)
            .or_else(|| self.api_key.clone().map(Secret::ApiKey))
    }

    /// Resolve all fields: explicit values, then stored ones, then the environment.
    ///
    /// The environment is only consulted for fields that are missing from both other sources.
    pub(crate) fn resolve(
        &self,
        stored: Option<&Resolved>,
        env: &dyn Environment,
    ) -> Result<Resolved, Error> {
        let username = match self
            .username
            .clone()
            .or_else(|| stored.map(|s| s.username.clone()))
        {
            Some(value) => value,
            None => env
                .var(ENV_USERNAME)
                .ok_or_else(|| Error::missing_credential("username"))?,
        };

        let secret = match self
            .explicit_secret()
            .or_else(|| stored.map(|s| s.secret.clone()))
        {
            Some(value) => value,
            None => env
                .var(ENV_PASSWORD)
                .map(Secret::Password)
                .or_else(|| env.var(ENV_API_KEY).map(Secret::ApiKey))
                .ok_or_else(|| Error::missing_credential("api_key or password"))?,
        };

        let region = self
            .region
            .clone()
            .or_else(|| stored.and_then(|s| s.region.clone()))
            .or_else(|| env.var(ENV_REGION));

        let auth_url = match self.auth_url {
            Some(ref value) => url::parse_base(value)?,
            None => match stored {
                Some(s) => s.auth_url.clone(),
                None => {
                    let value = env
                        .var(ENV_AUTH_URL)
                        .unwrap_or_else(|| DEFAULT_AUTH_URL.to_string());
                    url::parse_base(&value)?
                }
            },
        };

        trace!(
            "Resolved credentials for user {} with region {:?} at {}",
            username,
            region,
            auth_url
        );

        Ok(Resolved {
            username,
            secret,
            region,
            auth_url,
        })
    }
}
