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

//! Cloud DNS: domains and records.
//!
//! Most modifying calls are asynchronous on the server side and return a job description,
//! use [Session::check_callback](../struct.Session.html#method.check_callback) to follow it.

use log::debug;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;

use crate::catalog::ServiceCatalog;
use crate::services::CLOUD_DNS;
use crate::{url, Error, ErrorKind, Session};

/// Content type of imported zones.
const BIND_9: &str = "BIND_9";

/// A DNS record to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRecord {
    /// Record name (fully qualified).
    pub name: String,
    /// Record type, e.g. `A` or `MX`.
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record data.
    pub data: String,
    /// Priority (`MX` and `SRV` records).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    /// Time to live in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Free form comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl NewRecord {
    /// Start a record with the required fields.
    pub fn new<N, T, D>(name: N, record_type: T, data: D) -> NewRecord
    where
        N: Into<String>,
        T: Into<String>,
        D: Into<String>,
    {
        NewRecord {
            name: name.into(),
            record_type: record_type.into(),
            data: data.into(),
            priority: None,
            ttl: None,
            comment: None,
        }
    }
}

/// Changes to a DNS record, only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordUpdate {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// New priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    /// New time to live.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// New comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Filters for searching records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordQuery {
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Record data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl Default for RecordQuery {
    /// Search for `A` records.
    fn default() -> RecordQuery {
        RecordQuery {
            record_type: "A".to_string(),
            name: None,
            data: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct RecordsList<'a> {
    records: &'a [NewRecord],
}

/// A domain to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDomain {
    /// Domain name.
    pub name: String,
    /// Contact email address.
    #[serde(rename = "emailAddress")]
    pub email_address: String,
    /// Default time to live.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Free form comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Initial records.
    #[serde(
        rename = "recordsList",
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "serialize_records"
    )]
    pub records: Vec<NewRecord>,
}

impl NewDomain {
    /// Start a domain with the required fields.
    pub fn new<N, E>(name: N, email_address: E) -> NewDomain
    where
        N: Into<String>,
        E: Into<String>,
    {
        NewDomain {
            name: name.into(),
            email_address: email_address.into(),
            ttl: None,
            comment: None,
            records: Vec::new(),
        }
    }

    /// Add an initial record.
    pub fn with_record(mut self, record: NewRecord) -> Self {
        self.records.push(record);
        self
    }
}

fn serialize_records<S>(records: &[NewRecord], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    RecordsList { records }.serialize(serializer)
}

/// Changes to a domain, only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DomainUpdate {
    /// New contact email address.
    #[serde(rename = "emailAddress", skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    /// New default time to live.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// New comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
struct DomainsRoot<'a, T> {
    domains: &'a [T],
}

#[derive(Debug, Serialize)]
struct ImportedDomain<'a> {
    #[serde(rename = "contentType")]
    content_type: &'static str,
    contents: &'a str,
}

#[derive(Debug, Serialize)]
struct DetailQuery {
    #[serde(rename = "showRecords")]
    show_records: bool,
    #[serde(rename = "showSubdomains")]
    show_subdomains: bool,
}

fn domain_url(base: &Url, id: u64) -> Url {
    url::join(base.clone(), &id.to_string())
}

/// Domains of the DNS service.
#[derive(Debug, Clone)]
pub struct Domains<'s> {
    session: &'s Session,
    url: Url,
}

impl<'s> Domains<'s> {
    /// Create a wrapper using the DNS URL from the catalog.
    pub fn new(session: &'s Session, catalog: &ServiceCatalog) -> Result<Domains<'s>, Error> {
        Ok(Domains {
            session,
            url: session.resource_url(catalog, CLOUD_DNS, "domains")?,
        })
    }

    /// List domains, optionally only the ones with the given name.
    pub async fn list(&self, name: Option<&str>) -> Result<Value, Error> {
        match name {
            Some(name) => {
                self.session
                    .get_query(self.url.clone(), &[("name", name)])
                    .await
            }
            None => self.session.get(self.url.clone()).await,
        }
    }

    /// List subdomains of a domain.
    pub async fn list_subdomains(&self, id: u64) -> Result<Value, Error> {
        let url = url::join(domain_url(&self.url, id), "subdomains");
        self.session.get(url).await
    }

    /// Get details of a domain, optionally with its records and subdomains.
    pub async fn detail(&self, id: u64, records: bool, subdomains: bool) -> Result<Value, Error> {
        let query = DetailQuery {
            show_records: records,
            show_subdomains: subdomains,
        };
        self.session
            .get_query(domain_url(&self.url, id), &query)
            .await
    }

    /// List changes of a domain, optionally since the given time.
    pub async fn changes(&self, id: u64, since: Option<&str>) -> Result<Value, Error> {
        let url = url::join(domain_url(&self.url, id), "changes");
        match since {
            Some(since) => self.session.get_query(url, &[("since", since)]).await,
            None => self.session.get(url).await,
        }
    }

    /// Export a domain as a BIND 9 zone.
    pub async fn export(&self, id: u64) -> Result<Value, Error> {
        let url = url::join(domain_url(&self.url, id), "export");
        self.session.get(url).await
    }

    /// Create domains.
    pub async fn create(&self, domains: &[NewDomain]) -> Result<Value, Error> {
        debug!("Creating {} domain(s)", domains.len());
        self.session
            .post(self.url.clone(), &DomainsRoot { domains })
            .await
    }

    /// Import domains from BIND 9 zones.
    pub async fn import<S: AsRef<str>>(&self, zones: &[S]) -> Result<Value, Error> {
        let domains = zones
            .iter()
            .map(|zone| ImportedDomain {
                content_type: BIND_9,
                contents: zone.as_ref(),
            })
            .collect::<Vec<_>>();
        let url = url::join(self.url.clone(), "import");
        self.session
            .post(url, &DomainsRoot { domains: &domains })
            .await
    }

    /// Modify a domain.
    pub async fn modify(&self, id: u64, update: &DomainUpdate) -> Result<Value, Error> {
        self.session.put(domain_url(&self.url, id), update).await
    }

    /// Remove one or more domains, optionally with their subdomains.
    pub async fn remove(&self, ids: &[u64], delete_subdomains: bool) -> Result<Value, Error> {
        let mut query = Vec::new();
        let url = match ids {
            [] => {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    "At least one domain ID is required",
                ))
            }
            [id] => domain_url(&self.url, *id),
            many => {
                query.extend(many.iter().map(|id| ("id", id.to_string())));
                self.url.clone()
            }
        };
        if delete_subdomains {
            query.push(("deleteSubdomains", "true".to_string()));
        }
        self.session.delete_query(url, &query).await
    }
}

/// Records of domains of the DNS service.
#[derive(Debug, Clone)]
pub struct Records<'s> {
    session: &'s Session,
    url: Url,
}

impl<'s> Records<'s> {
    /// Create a wrapper using the DNS URL from the catalog.
    pub fn new(session: &'s Session, catalog: &ServiceCatalog) -> Result<Records<'s>, Error> {
        Ok(Records {
            session,
            url: session.resource_url(catalog, CLOUD_DNS, "domains")?,
        })
    }

    fn records_url(&self, domain_id: u64) -> Url {
        url::join(domain_url(&self.url, domain_id), "records")
    }

    fn record_url(&self, domain_id: u64, record_id: &str) -> Url {
        url::join(self.records_url(domain_id), record_id)
    }

    /// List records of a domain.
    pub async fn list(&self, domain_id: u64) -> Result<Value, Error> {
        self.session.get(self.records_url(domain_id)).await
    }

    /// Search records of a domain.
    pub async fn search(&self, domain_id: u64, query: &RecordQuery) -> Result<Value, Error> {
        self.session
            .get_query(self.records_url(domain_id), query)
            .await
    }

    /// Get details of a record.
    pub async fn detail(&self, domain_id: u64, record_id: &str) -> Result<Value, Error> {
        self.session.get(self.record_url(domain_id, record_id)).await
    }

    /// Add a record to a domain.
    pub async fn add(&self, domain_id: u64, record: &NewRecord) -> Result<Value, Error> {
        let body = RecordsList {
            records: std::slice::from_ref(record),
        };
        self.session.post(self.records_url(domain_id), &body).await
    }

    /// Modify a record.
    pub async fn modify(
        &self,
        domain_id: u64,
        record_id: &str,
        update: &RecordUpdate,
    ) -> Result<Value, Error> {
        self.session
            .put(self.record_url(domain_id, record_id), update)
            .await
    }

    /// Remove a record.
    pub async fn remove(&self, domain_id: u64, record_id: &str) -> Result<Value, Error> {
        self.session
            .delete(self.record_url(domain_id, record_id))
            .await
    }
}

#[cfg(test)]
#[allow(missing_docs)]
pub mod test {
    use httpmock::MockServer;
    use serde_json::json;

    use super::{
        DomainUpdate, Domains, DomainsRoot, NewDomain, NewRecord, RecordQuery, RecordUpdate,
        Records,
    };
    use crate::session::test::logged_in;
    use crate::ErrorKind;

    #[test]
    fn test_domain_body() {
        let domains = [NewDomain::new("example.com", "admin@example.com")
            .with_record(NewRecord::new("www.example.com", "A", "192.0.2.1"))];
        assert_eq!(
            serde_json::to_value(DomainsRoot { domains: &domains }).unwrap(),
            json!({"domains": [{
                "name": "example.com",
                "emailAddress": "admin@example.com",
                "recordsList": {"records": [
                    {"name": "www.example.com", "type": "A", "data": "192.0.2.1"}
                ]}
            }]})
        );
    }

    #[test]
    fn test_update_bodies_only_supplied_fields() {
        let update = DomainUpdate {
            ttl: Some(3600),
            ..DomainUpdate::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"ttl": 3600}));
        let update = RecordUpdate {
            data: Some("192.0.2.2".to_string()),
            ..RecordUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"data": "192.0.2.2"})
        );
        let record = NewRecord {
            priority: Some(10),
            ..NewRecord::new("example.com", "MX", "mail.example.com")
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"name": "example.com", "type": "MX", "data": "mail.example.com", "priority": 10})
        );
    }

    #[tokio::test]
    async fn test_list_by_name_and_detail() {
        let server = MockServer::start_async().await;
        let session = logged_in(&server).await;
        let list = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/dns/v1.0/123456/domains")
                    .query_param("name", "example.com");
                then.status(200)
                    .json_body(json!({"domains": [{"id": 1, "name": "example.com"}]}));
            })
            .await;
        let detail = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/dns/v1.0/123456/domains/1")
                    .query_param("showRecords", "true")
                    .query_param("showSubdomains", "false");
                then.status(200).json_body(json!({"id": 1}));
            })
            .await;

        let catalog = session.catalog().await.unwrap();
        let domains = Domains::new(&session, &catalog).unwrap();
        assert_eq!(
            domains.list(Some("example.com")).await.unwrap(),
            json!({"domains": [{"id": 1, "name": "example.com"}]})
        );
        assert_eq!(
            domains.detail(1, true, false).await.unwrap(),
            json!({"id": 1})
        );
        list.assert_async().await;
        detail.assert_async().await;
    }

    #[tokio::test]
    async fn test_import() {
        let server = MockServer::start_async().await;
        let session = logged_in(&server).await;
        let import = server
            .mock_async(|when, then| {
                when.method("POST")
                    .path("/dns/v1.0/123456/domains/import")
                    .json_body(json!({"domains": [
                        {"contentType": "BIND_9", "contents": "example.com. 3600 IN A 192.0.2.1"}
                    ]}));
                then.status(202).json_body(json!({"status": "RUNNING"}));
            })
            .await;

        let catalog = session.catalog().await.unwrap();
        let domains = Domains::new(&session, &catalog).unwrap();
        let _ = domains
            .import(&["example.com. 3600 IN A 192.0.2.1"])
            .await
            .unwrap();
        import.assert_async().await;
    }

    #[tokio::test]
    async fn test_remove() {
        let server = MockServer::start_async().await;
        let session = logged_in(&server).await;
        let one = server
            .mock_async(|when, then| {
                when.method("DELETE")
                    .path("/dns/v1.0/123456/domains/1")
                    .query_param("deleteSubdomains", "true");
                then.status(202).json_body(json!({"status": "RUNNING"}));
            })
            .await;
        let many = server
            .mock_async(|when, then| {
                when.method("DELETE")
                    .path("/dns/v1.0/123456/domains")
                    .query_param("id", "1")
                    .query_param("id", "2");
                then.status(202).json_body(json!({"status": "RUNNING"}));
            })
            .await;

        let catalog = session.catalog().await.unwrap();
        let domains = Domains::new(&session, &catalog).unwrap();
        let _ = domains.remove(&[1], true).await.unwrap();
        let _ = domains.remove(&[1, 2], false).await.unwrap();
        let err = domains.remove(&[], false).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        one.assert_async().await;
        many.assert_async().await;
    }

    #[tokio::test]
    async fn test_records() {
        let server = MockServer::start_async().await;
        let session = logged_in(&server).await;
        let add = server
            .mock_async(|when, then| {
                when.method("POST")
                    .path("/dns/v1.0/123456/domains/1/records")
                    .json_body(json!({"records": [
                        {"name": "www.example.com", "type": "A", "data": "192.0.2.1", "ttl": 300}
                    ]}));
                then.status(202).json_body(json!({"status": "RUNNING"}));
            })
            .await;
        let search = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/dns/v1.0/123456/domains/1/records")
                    .query_param("type", "A")
                    .query_param("name", "www.example.com");
                then.status(200).json_body(json!({"records": []}));
            })
            .await;
        let modify = server
            .mock_async(|when, then| {
                when.method("PUT")
                    .path("/dns/v1.0/123456/domains/1/records/A-42")
                    .json_body(json!({"comment": "web"}));
                then.status(202);
            })
            .await;

        let catalog = session.catalog().await.unwrap();
        let records = Records::new(&session, &catalog).unwrap();
        let record = NewRecord {
            ttl: Some(300),
            ..NewRecord::new("www.example.com", "A", "192.0.2.1")
        };
        let _ = records.add(1, &record).await.unwrap();
        let query = RecordQuery {
            name: Some("www.example.com".to_string()),
            ..RecordQuery::default()
        };
        assert_eq!(
            records.search(1, &query).await.unwrap(),
            json!({"records": []})
        );
        let update = RecordUpdate {
            comment: Some("web".to_string()),
            ..RecordUpdate::default()
        };
        assert!(records.modify(1, "A-42", &update).await.unwrap().is_null());
        add.assert_async().await;
        search.assert_async().await;
        modify.assert_async().await;
    }
}
