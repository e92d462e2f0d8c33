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

//! Synchronous wrapper for a session.
//!
//! This module is useful for callers that do not run an async runtime. Do not use it from
//! inside an async context, blocking calls will panic there.

use std::future::Future;
use std::sync::Arc;

use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::{Builder, Runtime};

use crate::catalog::ServiceCatalog;
use crate::services::ServiceType;
use crate::{Error, ErrorKind, Session};

/// A synchronous wrapper for an asynchronous session.
///
/// ```rust,no_run
/// let session = raxcloud::sync::SyncSession::new(raxcloud::Session::new(
///     raxcloud::Credentials::new(),
/// ))
/// .expect("Cannot create a runtime");
/// session.login().expect("Cannot log in");
/// let catalog = session.catalog().expect("No service catalog");
/// let flavors = raxcloud::compute::Flavors::new(session.session(), &catalog)
///     .expect("No compute service");
/// let list = session
///     .block_on(flavors.list(&Default::default(), true))
///     .expect("Cannot list flavors");
/// println!("{}", list);
/// ```
#[derive(Debug)]
pub struct SyncSession {
    inner: Session,
    runtime: Runtime,
}

impl SyncSession {
    /// Create a new synchronous wrapper with a private runtime.
    pub fn new(session: Session) -> Result<SyncSession, Error> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                Error::new(
                    ErrorKind::InvalidConfig,
                    format!("Cannot create an async runtime: {}", e),
                )
            })?;
        Ok(SyncSession {
            inner: session,
            runtime,
        })
    }

    /// Underlying asynchronous session.
    #[inline]
    pub fn session(&self) -> &Session {
        &self.inner
    }

    /// Convert into the underlying asynchronous session.
    #[inline]
    pub fn into_session(self) -> Session {
        self.inner
    }

    /// Run any future of this session (or of a resource wrapper) to completion.
    #[inline]
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Log in, see [Session::login](../struct.Session.html#method.login).
    #[inline]
    pub fn login(&self) -> Result<(), Error> {
        self.block_on(self.inner.login())
    }

    /// Make sure the session has a valid token, logging in again if it has expired.
    #[inline]
    pub fn ensure_authenticated(&self) -> Result<(), Error> {
        self.block_on(self.inner.ensure_authenticated())
    }

    /// Current service catalog.
    #[inline]
    pub fn catalog(&self) -> Result<Arc<ServiceCatalog>, Error> {
        self.block_on(self.inner.catalog())
    }

    /// Construct an endpoint for the given service from the path.
    #[inline]
    pub fn get_endpoint<Srv, I>(&self, service: Srv, path: I) -> Result<Url, Error>
    where
        Srv: ServiceType,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.block_on(self.inner.get_endpoint(service, path))
    }

    /// Issue a GET request.
    #[inline]
    pub fn get(&self, url: Url) -> Result<Value, Error> {
        self.block_on(self.inner.get(url))
    }

    /// Issue a GET request with a query string.
    #[inline]
    pub fn get_query<Q>(&self, url: Url, query: &Q) -> Result<Value, Error>
    where
        Q: Serialize + ?Sized + Sync,
    {
        self.block_on(self.inner.get_query(url, query))
    }

    /// Issue a POST request with a JSON body.
    #[inline]
    pub fn post<B>(&self, url: Url, body: &B) -> Result<Value, Error>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.block_on(self.inner.post(url, body))
    }

    /// Issue a PUT request with a JSON body.
    #[inline]
    pub fn put<B>(&self, url: Url, body: &B) -> Result<Value, Error>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.block_on(self.inner.put(url, body))
    }

    /// Issue a DELETE request.
    #[inline]
    pub fn delete(&self, url: Url) -> Result<Value, Error> {
        self.block_on(self.inner.delete(url))
    }

    /// Issue a DELETE request with a query string.
    #[inline]
    pub fn delete_query<Q>(&self, url: Url, query: &Q) -> Result<Value, Error>
    where
        Q: Serialize + ?Sized + Sync,
    {
        self.block_on(self.inner.delete_query(url, query))
    }

    /// Check the status of an asynchronous job.
    #[inline]
    pub fn check_callback(&self, job: &Value, details: bool) -> Result<Value, Error> {
        self.block_on(self.inner.check_callback(job, details))
    }
}

impl From<SyncSession> for Session {
    fn from(value: SyncSession) -> Session {
        value.inner
    }
}
