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

//! JSON structures and protocol bits for the Identity V2.0 API.

#![allow(missing_docs)]

use chrono::{DateTime, FixedOffset};
use serde::de::{DeserializeOwned, Error as DeserError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// No Debug, these carry secrets.
#[derive(Clone, Serialize)]
pub struct PasswordCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Serialize)]
pub struct ApiKeyCredentials {
    pub username: String,
    #[serde(rename = "apiKey")]
    pub api_key: String,
}

#[derive(Clone, Serialize)]
pub enum Auth {
    #[serde(rename = "passwordCredentials")]
    Password(PasswordCredentials),
    #[serde(rename = "RAX-KSKEY:apiKeyCredentials")]
    ApiKey(ApiKeyCredentials),
}

#[derive(Clone, Serialize)]
pub struct AuthRoot {
    pub auth: Auth,
}

#[derive(Clone, Deserialize)]
pub struct TokenInfo {
    pub id: String,
    pub expires: DateTime<FixedOffset>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(
        rename = "RAX-AUTH:defaultRegion",
        deserialize_with = "empty_as_default",
        default
    )]
    pub default_region: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Endpoint {
    #[serde(deserialize_with = "empty_as_default", default)]
    pub region: Option<String>,
    #[serde(rename = "publicURL", default)]
    pub public_url: Option<String>,
    #[serde(rename = "internalURL", default)]
    pub internal_url: Option<String>,
    #[serde(rename = "tenantId", default)]
    pub tenant_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CatalogRecord {
    pub name: String,
    #[serde(rename = "type", default)]
    pub service_type: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

#[derive(Clone, Deserialize)]
pub struct Access {
    pub token: TokenInfo,
    #[serde(default)]
    pub user: User,
    #[serde(rename = "serviceCatalog", default)]
    pub service_catalog: Vec<CatalogRecord>,
}

#[derive(Clone, Deserialize)]
pub struct AccessRoot {
    pub access: Access,
}

/// Deserialize a value where empty string is replaced by `Default` value.
pub fn empty_as_default<'de, D, T>(des: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(des)?;
    match value {
        Value::String(ref s) if s.is_empty() => Ok(T::default()),
        _ => serde_json::from_value(value).map_err(D::Error::custom),
    }
}
