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

//! Authentication using Identity API v2.0.
//!
//! Supports password and API key (`RAX-KSKEY`) credentials.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, error, trace, warn};
use reqwest::{Client, StatusCode, Url};

use crate::catalog::ServiceCatalog;
use crate::credentials::{hashed, Resolved, Secret};
use crate::{url, Error, ErrorKind};

pub(crate) mod protocol;

/// Authentication token with its expiration time.
#[derive(Clone)]
pub(crate) struct Token {
    value: String,
    expires: DateTime<Utc>,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Token {{ value: hash({}), expires: {:?} }}",
            hashed(&self.value),
            self.expires
        )
    }
}

impl Token {
    pub fn new<S: Into<String>>(value: S, expires: DateTime<Utc>) -> Token {
        Token {
            value: value.into(),
            expires,
        }
    }

    /// Token value to pass in `X-Auth-Token`.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Expiration time in UTC.
    #[inline]
    pub fn expires(&self) -> DateTime<Utc> {
        self.expires
    }

    /// Whether the token is expired at the given moment.
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires
    }

    /// Whether the token is expired now.
    #[inline]
    pub fn is_expired(&self) -> bool {
        let expired = self.is_expired_at(Utc::now());
        trace!("Token expires at {}, expired: {}", self.expires, expired);
        expired
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub(crate) struct AuthState {
    pub token: Token,
    /// `None` if no region could be determined for a password login.
    pub catalog: Option<Arc<ServiceCatalog>>,
    /// Region the catalog was built for.
    pub region: Option<String>,
}

/// Build the token endpoint from the auth URL.
pub(crate) fn token_endpoint(auth_url: &Url) -> Url {
    url::join(auth_url.clone(), "tokens")
}

fn auth_body(creds: &Resolved) -> protocol::AuthRoot {
    let auth = match creds.secret {
        Secret::Password(ref password) => {
            protocol::Auth::Password(protocol::PasswordCredentials {
                username: creds.username.clone(),
                password: password.clone(),
            })
        }
        Secret::ApiKey(ref api_key) => protocol::Auth::ApiKey(protocol::ApiKeyCredentials {
            username: creds.username.clone(),
            api_key: api_key.clone(),
        }),
    };
    protocol::AuthRoot { auth }
}

/// Request a token from the identity service.
async fn authenticate(client: &Client, creds: &Resolved) -> Result<protocol::Access, Error> {
    let endpoint = token_endpoint(&creds.auth_url);
    debug!(
        "Authenticating user {} at {} using {}",
        creds.username,
        endpoint,
        if creds.secret.is_password() {
            "password"
        } else {
            "API key"
        }
    );

    let resp = client
        .post(endpoint)
        .json(&auth_body(creds))
        .send()
        .await?;

    let status = resp.status();
    if status != StatusCode::OK {
        let body = resp.text().await.unwrap_or_default();
        debug!("Authentication failed with HTTP {}", status);
        return Err(Error::new(ErrorKind::AuthenticationFailed, body).with_status(status));
    }

    let text = resp.text().await?;
    let root: protocol::AccessRoot = serde_json::from_str(&text).map_err(|e| {
        error!("Invalid response received from the identity service: {}", e);
        Error::new(
            ErrorKind::InvalidResponse,
            format!("Cannot parse the identity response: {}", e),
        )
    })?;
    Ok(root.access)
}

/// Convert an identity response into a new authentication state.
pub(crate) fn auth_state(access: protocol::Access, creds: &Resolved) -> AuthState {
    let token = Token::new(
        access.token.id,
        access.token.expires.with_timezone(&Utc),
    );
    debug!("Received a token expiring at {}", token.expires());

    let region = match creds.region {
        Some(ref region) => Some(region.clone()),
        None if creds.secret.is_password() => access.user.default_region,
        None => None,
    };

    let catalog = if region.is_none() && creds.secret.is_password() {
        warn!(
            "User {} has no default region and none was provided, \
             the service catalog will not be available",
            creds.username
        );
        None
    } else {
        Some(Arc::new(ServiceCatalog::new(
            access.service_catalog,
            region.as_deref(),
        )))
    };
    trace!("Received catalog: {:?}", catalog);

    AuthState {
        token,
        catalog,
        region,
    }
}

/// Log in and build the new authentication state.
pub(crate) async fn login(client: &Client, creds: &Resolved) -> Result<AuthState, Error> {
    let access = authenticate(client, creds).await?;
    Ok(auth_state(access, creds))
}
