// Copyright 2017 Dmitry Tantsur <divius.inside@gmail.com>
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

//! Service catalog index.
//!
//! The catalog holds exactly one record per service name. Endpoints of a service are merged
//! field by field in the order they appear in the identity response, so when several endpoints
//! match the region, the last one wins.

use std::collections::hash_map::{HashMap, Iter};
use std::fmt;
use std::str::FromStr;

use log::{debug, error};
use reqwest::Url;
use serde_json::{Map, Value};

use crate::identity::protocol::{CatalogRecord, Endpoint};
use crate::{url, Error, ErrorKind};

/// Interface type: public or internal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InterfaceType {
    /// Public interface (used by default).
    #[default]
    Public,
    /// Internal (service network) interface.
    Internal,
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(match self {
            InterfaceType::Public => "public",
            InterfaceType::Internal => "internal",
        })
    }
}

impl FromStr for InterfaceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" | "publicURL" => Ok(InterfaceType::Public),
            "internal" | "internalURL" => Ok(InterfaceType::Internal),
            other => Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Unknown interface type: {}", other),
            )),
        }
    }
}

/// Merged endpoint record of one service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceEndpoint {
    /// Service type, e.g. `compute`.
    pub service_type: String,
    /// Public URL.
    pub public_url: Option<String>,
    /// Internal (service network) URL.
    pub internal_url: Option<String>,
    /// Region of the last merged endpoint that had one.
    pub region: Option<String>,
    /// Tenant (account) ID.
    pub tenant_id: Option<String>,
    /// Attributes not known to this library, preserved verbatim.
    pub extra: Map<String, Value>,
}

impl ServiceEndpoint {
    fn new(service_type: String) -> ServiceEndpoint {
        ServiceEndpoint {
            service_type,
            ..ServiceEndpoint::default()
        }
    }

    /// Merge an endpoint into the record, present fields overwrite existing ones.
    fn merge(&mut self, endpoint: Endpoint) {
        if endpoint.public_url.is_some() {
            self.public_url = endpoint.public_url;
        }
        if endpoint.internal_url.is_some() {
            self.internal_url = endpoint.internal_url;
        }
        if endpoint.region.is_some() {
            self.region = endpoint.region;
        }
        if endpoint.tenant_id.is_some() {
            self.tenant_id = endpoint.tenant_id;
        }
        self.extra.extend(endpoint.extra);
    }

    /// Raw URL for the given interface.
    pub fn raw_url(&self, interface: InterfaceType) -> Option<&str> {
        match interface {
            InterfaceType::Public => self.public_url.as_deref(),
            InterfaceType::Internal => self.internal_url.as_deref(),
        }
    }

    /// Parsed URL for the given interface.
    pub fn url(&self, interface: InterfaceType) -> Result<Url, Error> {
        let raw = self.raw_url(interface).ok_or_else(|| {
            Error::new(
                ErrorKind::EndpointNotFound,
                format!(
                    "No {} URL for service of type {}",
                    interface, self.service_type
                ),
            )
        })?;
        url::parse_base(raw).map_err(|e| {
            error!(
                "Invalid {} URL {} received from service catalog: {}",
                interface, raw, e
            );
            Error::new(
                ErrorKind::InvalidResponse,
                format!("Invalid URL {} in the service catalog: {}", raw, e),
            )
        })
    }
}

/// Index of services available to the authenticated user.
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    services: HashMap<String, ServiceEndpoint>,
    region: Option<String>,
}

fn matches_region(endpoint: &Endpoint, region: Option<&str>) -> bool {
    match (endpoint.region.as_deref(), region) {
        (None, _) | (_, None) => true,
        (Some(tagged), Some(wanted)) => tagged == wanted,
    }
}

impl ServiceCatalog {
    /// Build the index from the catalog records for the given region.
    ///
    /// An endpoint is merged when it has no region, when its region matches or when no
    /// region is requested.
    pub(crate) fn new(records: Vec<CatalogRecord>, region: Option<&str>) -> ServiceCatalog {
        let mut services = HashMap::with_capacity(records.len());
        for record in records {
            let mut service = ServiceEndpoint::new(record.service_type);
            for endpoint in record.endpoints {
                if matches_region(&endpoint, region) {
                    service.merge(endpoint);
                }
            }
            let _ = services.insert(record.name, service);
        }

        ServiceCatalog {
            services,
            region: region.map(From::from),
        }
    }

    /// Region the catalog was built for.
    #[inline]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Get a service by its name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&ServiceEndpoint> {
        self.services.get(name)
    }

    /// Get a service by its name, failing with `EndpointNotFound` if it is absent.
    pub fn find(&self, name: &str) -> Result<&ServiceEndpoint, Error> {
        self.get(name).ok_or_else(|| {
            debug!("Service {} is not in the catalog", name);
            Error::new(
                ErrorKind::EndpointNotFound,
                format!("Endpoint for service {} was not found", name),
            )
        })
    }

    /// URL of a service for the given interface.
    pub fn endpoint_url(&self, name: &str, interface: InterfaceType) -> Result<Url, Error> {
        let url = self.find(name)?.url(interface)?;
        debug!("Using {} URL {} for service {}", interface, url, name);
        Ok(url)
    }

    /// Number of services.
    #[inline]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether the catalog has no services.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Iterate over services and their names.
    #[inline]
    pub fn iter(&self) -> Iter<'_, String, ServiceEndpoint> {
        self.services.iter()
    }
}

impl<'c> IntoIterator for &'c ServiceCatalog {
    type Item = (&'c String, &'c ServiceEndpoint);
    type IntoIter = Iter<'c, String, ServiceEndpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
