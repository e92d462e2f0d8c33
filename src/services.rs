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

//! Cloud services known to this library.

/// Trait representing a service in the catalog.
pub trait ServiceType {
    /// Service name to look up in the catalog.
    fn catalog_name(&self) -> &'static str;
}

/// A generic service.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GenericService {
    catalog_name: &'static str,
}

impl GenericService {
    /// Create a new generic service.
    pub const fn new(catalog_name: &'static str) -> GenericService {
        GenericService { catalog_name }
    }
}

impl ServiceType for GenericService {
    fn catalog_name(&self) -> &'static str {
        self.catalog_name
    }
}

/// Next generation Cloud Servers: servers, images and flavors.
pub const CLOUD_SERVERS: GenericService = GenericService::new("cloudServersOpenStack");

/// First generation Cloud Servers.
pub const FIRST_GEN_SERVERS: GenericService = GenericService::new("cloudServers");

/// Cloud DNS: domains and records.
pub const CLOUD_DNS: GenericService = GenericService::new("cloudDNS");
