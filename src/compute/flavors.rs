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

//! Server flavors.

use reqwest::Url;
use serde::Serialize;
use serde_json::Value;

use crate::catalog::ServiceCatalog;
use crate::services::CLOUD_SERVERS;
use crate::{url, Error, Session};

/// Filters for listing flavors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlavorQuery {
    /// Minimum disk size in GiB.
    #[serde(rename = "minDisk", skip_serializing_if = "Option::is_none")]
    pub min_disk: Option<u32>,
    /// Minimum RAM in MiB.
    #[serde(rename = "minRam", skip_serializing_if = "Option::is_none")]
    pub min_ram: Option<u32>,
    /// ID of the last flavor of the previous page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Flavors of the next generation compute service.
#[derive(Debug, Clone)]
pub struct Flavors<'s> {
    session: &'s Session,
    url: Url,
}

impl<'s> Flavors<'s> {
    /// Create a wrapper using the compute URL from the catalog.
    pub fn new(session: &'s Session, catalog: &ServiceCatalog) -> Result<Flavors<'s>, Error> {
        Ok(Flavors {
            session,
            url: session.resource_url(catalog, CLOUD_SERVERS, "flavors")?,
        })
    }

    /// Root URL of flavors.
    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// List flavors, optionally with details.
    pub async fn list(&self, query: &FlavorQuery, detail: bool) -> Result<Value, Error> {
        let url = if detail {
            url::join(self.url.clone(), "detail")
        } else {
            self.url.clone()
        };
        self.session.get_query(url, query).await
    }

    /// Get details of a flavor.
    pub async fn detail(&self, id: &str) -> Result<Value, Error> {
        self.session.get(url::join(self.url.clone(), id)).await
    }
}

#[cfg(test)]
pub mod test {
    use httpmock::MockServer;
    use serde_json::json;

    use super::{FlavorQuery, Flavors};
    use crate::session::test::logged_in;

    #[test]
    fn test_query() {
        let query = FlavorQuery {
            min_ram: Some(1024),
            ..FlavorQuery::default()
        };
        assert_eq!(serde_json::to_value(&query).unwrap(), json!({"minRam": 1024}));
    }

    #[tokio::test]
    async fn test_list_and_detail() {
        let server = MockServer::start_async().await;
        let session = logged_in(&server).await;
        let list = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/v2/123456/flavors")
                    .query_param("minDisk", "20");
                then.status(200).json_body(json!({"flavors": [{"id": "2"}]}));
            })
            .await;
        let detail = server
            .mock_async(|when, then| {
                when.method("GET").path("/v2/123456/flavors/2");
                then.status(200)
                    .json_body(json!({"flavor": {"id": "2", "ram": 512}}));
            })
            .await;

        let catalog = session.catalog().await.unwrap();
        let flavors = Flavors::new(&session, &catalog).unwrap();
        let query = FlavorQuery {
            min_disk: Some(20),
            ..FlavorQuery::default()
        };
        assert_eq!(
            flavors.list(&query, false).await.unwrap(),
            json!({"flavors": [{"id": "2"}]})
        );
        assert_eq!(
            flavors.detail("2").await.unwrap(),
            json!({"flavor": {"id": "2", "ram": 512}})
        );
        list.assert_async().await;
        detail.assert_async().await;
    }
}
