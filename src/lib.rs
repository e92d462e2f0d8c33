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

//! Asynchronous Rackspace cloud session, authentication and resources.
//!
//! # Authentication
//!
//! A [Session](struct.Session.html) logs in to the Identity API v2.0 with a user name and
//! either an API key or a password, and keeps the token and the service catalog. Any
//! credential that is not provided explicitly is taken from the environment, see
//! [Credentials](struct.Credentials.html).
//!
//! ```rust,no_run
//! # async fn login() -> Result<(), raxcloud::Error> {
//! let creds = raxcloud::Credentials::new()
//!     .with_username("user")
//!     .with_api_key("0123456789abcdef")
//!     .with_region("DFW");
//! let session = raxcloud::Session::new(creds);
//! session.login().await?;
//! # Ok(()) }
//! ```
//!
//! Sessions can also be loaded from `OS_*` environment variables with
//! [from_env](fn.from_env.html) or from a `clouds.yaml` file with
//! [from_config](fn.from_config.html).
//!
//! # Resources
//!
//! Resource wrappers live in [compute](compute/index.html), [firstgen](firstgen/index.html)
//! and [dns](dns/index.html). Every call returns the decoded JSON response.
//!
//! ```rust,no_run
//! # async fn create() -> Result<(), raxcloud::Error> {
//! let session = raxcloud::from_env()?;
//! session.login().await?;
//! let catalog = session.catalog().await?;
//! let servers = raxcloud::compute::Servers::new(&session, &catalog)?;
//! let request = raxcloud::compute::NewServer::new("web01", "image-id", "2");
//! let created = servers.create(&request).await?;
//! println!("{}", created["server"]["id"]);
//! # Ok(()) }
//! ```
//!
//! For the full picture, use [Cloud](struct.Cloud.html), which provides all wrappers at once.
//!
//! # Raw requests
//!
//! The session exposes HTTP verbs that add the authentication token:
//!
//! ```rust,no_run
//! # async fn raw() -> Result<(), raxcloud::Error> {
//! let session = raxcloud::from_env()?;
//! session.login().await?;
//! let url = session
//!     .get_endpoint(raxcloud::services::CLOUD_SERVERS, &["servers", "detail"])
//!     .await?;
//! let servers = session.get(url).await?;
//! # Ok(()) }
//! ```
//!
//! Blocking calls are available via [sync::SyncSession](sync/struct.SyncSession.html).

#![crate_name = "raxcloud"]
#![crate_type = "lib"]
// NOTE: we do not use generic deny(warnings) to avoid breakages with new
// versions of the compiler. Add more warnings here as you discover them.
// Taken from https://github.com/rust-unofficial/patterns/
#![deny(
    improper_ctypes,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    trivial_casts,
    trivial_numeric_casts,
    unconditional_recursion,
    unsafe_code,
    unused_allocation,
    unused_comparisons,
    unused_doc_comments,
    unused_import_braces,
    unused_parens,
    while_true
)]
#![warn(dead_code, unused, unused_qualifications, unused_results)]
#![allow(
    clippy::new_ret_no_self,
    clippy::should_implement_trait,
    clippy::wrong_self_convention
)]

mod catalog;
mod cloud;
pub mod compute;
mod credentials;
pub mod dns;
mod error;
pub mod firstgen;
mod identity;
mod loading;
pub mod request;
pub mod services;
mod session;
pub mod sync;
mod url;
mod utils;

pub use crate::catalog::{InterfaceType, ServiceCatalog, ServiceEndpoint};
pub use crate::cloud::Cloud;
pub use crate::credentials::{Credentials, DEFAULT_AUTH_URL};
pub use crate::error::{Error, ErrorKind};
pub use crate::loading::{from_config, from_env};
pub use crate::session::Session;
