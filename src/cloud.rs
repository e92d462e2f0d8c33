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

//! Logged in cloud with access to all resources.

use crate::compute::{Flavors, Images, Servers};
use crate::dns::{Domains, Records};
use crate::firstgen::{FirstGenImages, FirstGenServers};
use crate::{Credentials, Error, Session};

/// A logged in session with accessors for all resources.
///
/// Every accessor uses the current service catalog, so wrappers created after a
/// re-authentication see the new endpoints.
///
/// ```rust,no_run
/// # async fn list() -> Result<(), raxcloud::Error> {
/// let creds = raxcloud::Credentials::new()
///     .with_username("user")
///     .with_api_key("0123456789abcdef")
///     .with_region("DFW");
/// let cloud = raxcloud::Cloud::new(creds).await?;
/// let servers = cloud.servers().await?;
/// println!("{}", servers.list(&Default::default(), false).await?);
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct Cloud {
    session: Session,
}

impl Cloud {
    /// Create a session with the given credentials and log in.
    pub async fn new(credentials: Credentials) -> Result<Cloud, Error> {
        Cloud::from_session(Session::new(credentials)).await
    }

    /// Log in using an existing session.
    pub async fn from_session(session: Session) -> Result<Cloud, Error> {
        session.login().await?;
        Ok(Cloud { session })
    }

    /// Session in use, provides the HTTP verbs.
    #[inline]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Convert into the underlying session.
    #[inline]
    pub fn into_session(self) -> Session {
        self.session
    }

    /// Next generation servers.
    pub async fn servers(&self) -> Result<Servers<'_>, Error> {
        Servers::new(&self.session, &*self.session.catalog().await?)
    }

    /// Next generation images.
    pub async fn images(&self) -> Result<Images<'_>, Error> {
        Images::new(&self.session, &*self.session.catalog().await?)
    }

    /// Next generation flavors.
    pub async fn flavors(&self) -> Result<Flavors<'_>, Error> {
        Flavors::new(&self.session, &*self.session.catalog().await?)
    }

    /// First generation servers.
    pub async fn first_gen_servers(&self) -> Result<FirstGenServers<'_>, Error> {
        FirstGenServers::new(&self.session, &*self.session.catalog().await?)
    }

    /// First generation images.
    pub async fn first_gen_images(&self) -> Result<FirstGenImages<'_>, Error> {
        FirstGenImages::new(&self.session, &*self.session.catalog().await?)
    }

    /// DNS domains.
    pub async fn domains(&self) -> Result<Domains<'_>, Error> {
        Domains::new(&self.session, &*self.session.catalog().await?)
    }

    /// DNS records.
    pub async fn records(&self) -> Result<Records<'_>, Error> {
        Records::new(&self.session, &*self.session.catalog().await?)
    }
}
