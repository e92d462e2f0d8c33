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

//! Session structure definition.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, trace, warn};
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use static_assertions::assert_impl_all;
use tokio::sync::RwLock;

use crate::catalog::{InterfaceType, ServiceCatalog};
use crate::credentials::{Credentials, Environment, RealEnvironment, Resolved};
use crate::identity::{self, AuthState, Token};
use crate::services::ServiceType;
use crate::{request, url, Error, ErrorKind};

const AUTH_TOKEN_HEADER: &str = "x-auth-token";

#[derive(Debug, Default)]
struct State {
    /// Credentials resolved during the last login attempt.
    stored: Option<Resolved>,
    auth: Option<AuthState>,
}

#[derive(Debug)]
struct Inner {
    credentials: Credentials,
    environment: Arc<dyn Environment>,
    state: RwLock<State>,
}

/// An authenticated cloud session.
///
/// The session owns the credentials, the current token and the service catalog. Nothing happens
/// on creation, call [login](#method.login) before issuing any requests.
///
/// After a successful login the token is checked before every request. If it has expired, the
/// session logs in again once with the credentials stored during the previous login.
///
/// # Note
///
/// All clones of one session share the same authentication state.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    inner: Arc<Inner>,
    endpoint_interface: InterfaceType,
}

assert_impl_all!(Session: Send, Sync);

impl Session {
    /// Create a new session with the given credentials.
    ///
    /// Missing credentials are taken from the environment on login.
    pub fn new(credentials: Credentials) -> Session {
        Session::new_with_client(Client::new(), credentials)
    }

    /// Create a new session with the given HTTP client.
    pub fn new_with_client(client: Client, credentials: Credentials) -> Session {
        Session::new_with_environment(client, credentials, Arc::new(RealEnvironment))
    }

    pub(crate) fn new_with_environment(
        client: Client,
        credentials: Credentials,
        environment: Arc<dyn Environment>,
    ) -> Session {
        Session {
            client,
            inner: Arc::new(Inner {
                credentials,
                environment,
                state: RwLock::new(State::default()),
            }),
            endpoint_interface: InterfaceType::default(),
        }
    }

    /// HTTP client in use.
    #[inline]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Credentials this session was created with.
    #[inline]
    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    /// Endpoint interface in use.
    #[inline]
    pub fn endpoint_interface(&self) -> InterfaceType {
        self.endpoint_interface
    }

    /// Set endpoint interface to use.
    ///
    /// This does not affect clones of this `Session`.
    #[inline]
    pub fn set_endpoint_interface(&mut self, endpoint_interface: InterfaceType) {
        self.endpoint_interface = endpoint_interface;
    }

    /// Convert this session into one using the given endpoint interface.
    #[inline]
    pub fn with_endpoint_interface(mut self, endpoint_interface: InterfaceType) -> Session {
        self.set_endpoint_interface(endpoint_interface);
        self
    }

    /// Log in using the credentials the session was created with.
    ///
    /// Can be called repeatedly, every call replaces the token and the catalog.
    #[inline]
    pub async fn login(&self) -> Result<(), Error> {
        self.login_with(&self.inner.credentials).await
    }

    /// Log in using the provided credentials.
    ///
    /// Fields missing in `credentials` are taken from the previous login, then from the
    /// environment. On failure the previous authentication state is kept.
    pub async fn login_with(&self, credentials: &Credentials) -> Result<(), Error> {
        let resolved = {
            let mut state = self.inner.state.write().await;
            let resolved =
                credentials.resolve(state.stored.as_ref(), self.inner.environment.as_ref())?;
            state.stored = Some(resolved.clone());
            resolved
        };

        let auth = identity::login(&self.client, &resolved).await?;
        let mut state = self.inner.state.write().await;
        Session::install(&mut state, auth);
        Ok(())
    }

    fn install(state: &mut State, auth: AuthState) {
        if let (Some(stored), Some(region)) = (state.stored.as_mut(), auth.region.as_ref()) {
            stored.region = Some(region.clone());
        }
        debug!(
            "Logged in, token expires at {}, region {:?}",
            auth.token.expires(),
            auth.region
        );
        state.auth = Some(auth);
    }

    async fn current_token(&self) -> Result<Token, Error> {
        // This is executed for every request, so start with a read lock.
        {
            let state = self.inner.state.read().await;
            match state.auth {
                Some(ref auth) if !auth.token.is_expired() => return Ok(auth.token.clone()),
                Some(..) => (),
                None => return Err(Error::not_authenticated()),
            }
        }

        let mut state = self.inner.state.write().await;
        // Another task may have logged in while we were waiting for the write lock.
        let stored = match state.auth {
            Some(ref auth) if !auth.token.is_expired() => return Ok(auth.token.clone()),
            Some(..) => state.stored.clone().ok_or_else(Error::not_authenticated)?,
            None => return Err(Error::not_authenticated()),
        };

        debug!("Token has expired, logging in again as {}", stored.username);
        let auth = identity::login(&self.client, &stored).await?;
        let token = auth.token.clone();
        Session::install(&mut state, auth);
        Ok(token)
    }

    /// Make sure the session has a valid token.
    ///
    /// Fails with `NotAuthenticated` before the first successful login. If the token has
    /// expired, logs in again, so this call may perform network I/O.
    pub async fn ensure_authenticated(&self) -> Result<(), Error> {
        let _ = self.current_token().await?;
        Ok(())
    }

    /// Whether a login has succeeded.
    ///
    /// The token may be expired.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.state.read().await.auth.is_some()
    }

    /// Region of the current service catalog.
    pub async fn region(&self) -> Option<String> {
        self.inner
            .state
            .read()
            .await
            .auth
            .as_ref()
            .and_then(|auth| auth.region.clone())
    }

    /// Expiration time of the current token.
    pub async fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.inner
            .state
            .read()
            .await
            .auth
            .as_ref()
            .map(|auth| auth.token.expires())
    }

    /// Current service catalog.
    ///
    /// Does not refresh an expired token. Fails with `MissingDefaultRegion` if the login
    /// succeeded without a region.
    pub async fn catalog(&self) -> Result<Arc<ServiceCatalog>, Error> {
        let state = self.inner.state.read().await;
        let auth = state.auth.as_ref().ok_or_else(Error::not_authenticated)?;
        auth.catalog.clone().ok_or_else(|| {
            warn!("Service catalog requested, but no region is known");
            Error::new(
                ErrorKind::MissingDefaultRegion,
                "No region was provided and the user has no default region",
            )
        })
    }

    /// Construct an endpoint for the given service from the path.
    ///
    /// You won't need to use this call most of the time, since resource wrappers build their
    /// URLs themselves.
    pub async fn get_endpoint<Srv, I>(&self, service: Srv, path: I) -> Result<Url, Error>
    where
        Srv: ServiceType,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let endpoint = self
            .catalog()
            .await?
            .endpoint_url(service.catalog_name(), self.endpoint_interface)?;
        Ok(url::extend(endpoint, path))
    }

    /// Root URL of a resource of the given service, e.g. `<compute URL>/servers`.
    pub(crate) fn resource_url<Srv: ServiceType>(
        &self,
        catalog: &ServiceCatalog,
        service: Srv,
        resource: &str,
    ) -> Result<Url, Error> {
        let endpoint = catalog.endpoint_url(service.catalog_name(), self.endpoint_interface)?;
        Ok(url::join(endpoint, resource))
    }

    /// Make an authenticated HTTP request to the given URL.
    ///
    /// The result is a `RequestBuilder` that can be customized further. Error checking and
    /// response parsing can be done using functions from the [request](request/index.html)
    /// module.
    ///
    /// This is the most generic call to make a request. You may prefer to use more specific
    /// `get`, `post`, `put` or `delete` calls instead.
    pub async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, Error> {
        let token = self.current_token().await?;
        trace!("Sending HTTP {} request to {}", method, url);
        Ok(self
            .client
            .request(method, url)
            .header(AUTH_TOKEN_HEADER, token.value())
            .header(ACCEPT, HeaderValue::from_static("application/json")))
    }

    /// Issue a GET request.
    #[inline]
    pub async fn get(&self, url: Url) -> Result<Value, Error> {
        request::fetch_value(self.request(Method::GET, url).await?).await
    }

    /// Issue a GET request with a query string.
    #[inline]
    pub async fn get_query<Q>(&self, url: Url, query: &Q) -> Result<Value, Error>
    where
        Q: Serialize + ?Sized + Sync,
    {
        request::fetch_value(self.request(Method::GET, url).await?.query(query)).await
    }

    /// Fetch a JSON using the GET request.
    ///
    /// ```rust,no_run
    /// use serde::Deserialize;
    ///
    /// #[derive(Debug, Deserialize)]
    /// pub struct Server {
    ///     pub id: String,
    ///     pub name: String,
    /// }
    ///
    /// #[derive(Debug, Deserialize)]
    /// pub struct ServersRoot {
    ///     pub servers: Vec<Server>,
    /// }
    ///
    /// # async fn list() -> Result<(), raxcloud::Error> {
    /// let session = raxcloud::Session::new(raxcloud::Credentials::new());
    /// session.login().await?;
    /// let url = session
    ///     .get_endpoint(raxcloud::services::CLOUD_SERVERS, &["servers"])
    ///     .await?;
    /// let servers: ServersRoot = session.get_json(url).await?;
    /// for srv in servers.servers {
    ///     println!("ID = {}, Name = {}", srv.id, srv.name);
    /// }
    /// # Ok(()) }
    /// ```
    #[inline]
    pub async fn get_json<T>(&self, url: Url) -> Result<T, Error>
    where
        T: DeserializeOwned + Send,
    {
        request::fetch_json(self.request(Method::GET, url).await?).await
    }

    /// Fetch a JSON using the GET request with a query string.
    #[inline]
    pub async fn get_json_query<Q, T>(&self, url: Url, query: &Q) -> Result<T, Error>
    where
        Q: Serialize + ?Sized + Sync,
        T: DeserializeOwned + Send,
    {
        request::fetch_json(self.request(Method::GET, url).await?.query(query)).await
    }

    /// Issue a POST request with a JSON body.
    #[inline]
    pub async fn post<B>(&self, url: Url, body: &B) -> Result<Value, Error>
    where
        B: Serialize + ?Sized + Sync,
    {
        request::fetch_value(self.request(Method::POST, url).await?.json(body)).await
    }

    /// POST a JSON body and parse the JSON result.
    #[inline]
    pub async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned + Send,
    {
        request::fetch_json(self.request(Method::POST, url).await?.json(body)).await
    }

    /// Issue a PUT request with a JSON body.
    #[inline]
    pub async fn put<B>(&self, url: Url, body: &B) -> Result<Value, Error>
    where
        B: Serialize + ?Sized + Sync,
    {
        request::fetch_value(self.request(Method::PUT, url).await?.json(body)).await
    }

    /// PUT a JSON body and parse the JSON result.
    #[inline]
    pub async fn put_json<B, T>(&self, url: Url, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned + Send,
    {
        request::fetch_json(self.request(Method::PUT, url).await?.json(body)).await
    }

    /// Issue a DELETE request.
    #[inline]
    pub async fn delete(&self, url: Url) -> Result<Value, Error> {
        request::fetch_value(self.request(Method::DELETE, url).await?).await
    }

    /// Issue a DELETE request with a query string.
    #[inline]
    pub async fn delete_query<Q>(&self, url: Url, query: &Q) -> Result<Value, Error>
    where
        Q: Serialize + ?Sized + Sync,
    {
        request::fetch_value(self.request(Method::DELETE, url).await?.query(query)).await
    }

    /// Check the status of an asynchronous job.
    ///
    /// `job` is the response of a call that runs asynchronously (e.g. most DNS calls), it must
    /// have a `callbackUrl` field.
    pub async fn check_callback(&self, job: &Value, details: bool) -> Result<Value, Error> {
        let callback = job
            .get("callbackUrl")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidInput,
                    "The job description has no callbackUrl",
                )
            })?;
        let url = url::parse_base(callback)?;
        if details {
            self.get_query(url, &[("showDetails", "true")]).await
        } else {
            self.get(url).await
        }
    }
}

#[cfg(test)]
pub mod test {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, Utc};
    use httpmock::{Mock, MockServer};
    use reqwest::{Client, StatusCode};
    use serde_json::{json, Value};

    use super::Session;
    use crate::catalog::InterfaceType;
    use crate::credentials::test::ForbiddenEnvironment;
    use crate::services::{CLOUD_DNS, CLOUD_SERVERS};
    use crate::{Credentials, ErrorKind};

    pub const TOKEN: &str = "aaaaa-bbbbb-ccccc-dddd";

    /// Identity response with all services pointing at the mock server.
    pub fn access_body(server: &MockServer, expires: DateTime<Utc>) -> Value {
        json!({
            "access": {
                "token": {"id": TOKEN, "expires": expires.to_rfc3339()},
                "user": {"id": "1", "name": "u", "RAX-AUTH:defaultRegion": "ORD"},
                "serviceCatalog": [
                    {
                        "name": "cloudServersOpenStack",
                        "type": "compute",
                        "endpoints": [
                            {
                                "region": "DFW",
                                "publicURL": server.url("/v2/123456"),
                                "tenantId": "123456"
                            },
                            {
                                "region": "ORD",
                                "publicURL": "https://ord.servers.example.com/v2/123456",
                                "tenantId": "123456"
                            }
                        ]
                    },
                    {
                        "name": "cloudServers",
                        "type": "compute",
                        "endpoints": [
                            {"publicURL": server.url("/firstgen/v1.0/123456")}
                        ]
                    },
                    {
                        "name": "cloudDNS",
                        "type": "rax:dns",
                        "endpoints": [
                            {"publicURL": server.url("/dns/v1.0/123456")}
                        ]
                    }
                ]
            }
        })
    }

    pub async fn identity_mock(server: &MockServer, expires: DateTime<Utc>) -> Mock<'_> {
        let body = access_body(server, expires);
        server
            .mock_async(|when, then| {
                when.method("POST").path("/v2.0/tokens").json_body(json!({
                    "auth": {
                        "RAX-KSKEY:apiKeyCredentials": {"username": "u", "apiKey": "k"}
                    }
                }));
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(body);
            })
            .await
    }

    pub fn new_session(server: &MockServer) -> Session {
        let creds = Credentials::new()
            .with_username("u")
            .with_api_key("k")
            .with_region("DFW")
            .with_auth_url(server.url("/v2.0"));
        Session::new_with_environment(Client::new(), creds, Arc::new(ForbiddenEnvironment))
    }

    /// A session logged in against the mock server.
    pub async fn logged_in(server: &MockServer) -> Session {
        let _ = identity_mock(server, Utc::now() + Duration::seconds(3600)).await;
        let session = new_session(server);
        session.login().await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_login_and_list() {
        let server = MockServer::start_async().await;
        let identity = identity_mock(&server, Utc::now() + Duration::seconds(3600)).await;
        let servers = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/v2/123456/servers")
                    .header("x-auth-token", TOKEN)
                    .header("accept", "application/json");
                then.status(200)
                    .json_body(json!({"servers": [{"id": "1", "name": "web"}]}));
            })
            .await;

        let session = new_session(&server);
        assert!(!session.is_authenticated().await);
        session.login().await.unwrap();
        assert!(session.is_authenticated().await);
        assert_eq!(session.region().await.as_deref(), Some("DFW"));

        let url = session
            .get_endpoint(CLOUD_SERVERS, &["servers"])
            .await
            .unwrap();
        let result = session.get(url).await.unwrap();
        assert_eq!(result, json!({"servers": [{"id": "1", "name": "web"}]}));
        identity.assert_async().await;
        servers.assert_async().await;
    }

    #[tokio::test]
    async fn test_expired_token_triggers_one_login() {
        let server = MockServer::start_async().await;
        let identity = identity_mock(&server, Utc::now() - Duration::seconds(1)).await;
        let flavors = server
            .mock_async(|when, then| {
                when.method("GET").path("/v2/123456/flavors");
                then.status(200).json_body(json!({"flavors": []}));
            })
            .await;

        let session = new_session(&server);
        session.login().await.unwrap();
        identity.assert_hits_async(1).await;

        let url = session
            .get_endpoint(CLOUD_SERVERS, &["flavors"])
            .await
            .unwrap();
        let _ = session.get(url).await.unwrap();
        identity.assert_hits_async(2).await;
        flavors.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_not_authenticated() {
        let server = MockServer::start_async().await;
        let session = new_session(&server);
        let url = reqwest::Url::parse(&server.url("/v2/123456/servers")).unwrap();
        let err = session.get(url).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotAuthenticated);
        let err = session.catalog().await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotAuthenticated);
        let err = session.ensure_authenticated().await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotAuthenticated);
    }

    #[tokio::test]
    async fn test_authentication_failed() {
        let server = MockServer::start_async().await;
        let _identity = server
            .mock_async(|when, then| {
                when.method("POST").path("/v2.0/tokens");
                then.status(401).body("Unable to authenticate user");
            })
            .await;

        let session = new_session(&server);
        let err = session.login().await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(err.message(), Some("Unable to authenticate user"));
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_invalid_identity_response() {
        let server = MockServer::start_async().await;
        let _identity = server
            .mock_async(|when, then| {
                when.method("POST").path("/v2.0/tokens");
                then.status(200).body("{\"access\": {}}");
            })
            .await;

        let session = new_session(&server);
        let err = session.login().await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_remote_api_error() {
        let server = MockServer::start_async().await;
        let session = logged_in(&server).await;
        let _servers = server
            .mock_async(|when, then| {
                when.method("DELETE").path("/v2/123456/servers/42");
                then.status(404).body("{\"itemNotFound\": {\"code\": 404}}");
            })
            .await;

        let url = session
            .get_endpoint(CLOUD_SERVERS, &["servers", "42"])
            .await
            .unwrap();
        let err = session.delete(url).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::RemoteApiError);
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.message(), Some("{\"itemNotFound\": {\"code\": 404}}"));
    }

    #[tokio::test]
    async fn test_internal_interface_missing() {
        let server = MockServer::start_async().await;
        let session = logged_in(&server)
            .await
            .with_endpoint_interface(InterfaceType::Internal);
        let err = session
            .get_endpoint(CLOUD_DNS, &["domains"])
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::EndpointNotFound);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let server = MockServer::start_async().await;
        let session = new_session(&server);
        let clone = session.clone();
        let _ = identity_mock(&server, Utc::now() + Duration::seconds(3600)).await;
        session.login().await.unwrap();
        assert!(clone.is_authenticated().await);
        assert!(clone.token_expires_at().await.is_some());
    }

    #[tokio::test]
    async fn test_password_login_without_region() {
        let server = MockServer::start_async().await;
        let mut body = access_body(&server, Utc::now() + Duration::seconds(3600));
        body["access"]["user"] = json!({"id": "1", "name": "u"});
        let _identity = server
            .mock_async(|when, then| {
                when.method("POST").path("/v2.0/tokens");
                then.status(200).json_body(body);
            })
            .await;

        let creds = Credentials::new()
            .with_username("u")
            .with_password("p")
            .with_auth_url(server.url("/v2.0"));
        let session = Session::new_with_environment(
            Client::new(),
            creds,
            Arc::new(maplit::hashmap! {"OS_USERNAME" => "ignored"}),
        );
        session.login().await.unwrap();
        assert!(session.is_authenticated().await);
        let err = session.catalog().await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::MissingDefaultRegion);
    }

    #[tokio::test]
    async fn test_password_login_default_region() {
        let server = MockServer::start_async().await;
        let body = access_body(&server, Utc::now() + Duration::seconds(3600));
        let _identity = server
            .mock_async(|when, then| {
                when.method("POST").path("/v2.0/tokens").json_body(json!({
                    "auth": {"passwordCredentials": {"username": "u", "password": "p"}}
                }));
                then.status(200).json_body(body);
            })
            .await;

        let creds = Credentials::new()
            .with_username("u")
            .with_password("p")
            .with_auth_url(server.url("/v2.0"));
        let session = Session::new_with_environment(
            Client::new(),
            creds,
            Arc::new(maplit::hashmap! {"OS_USERNAME" => "ignored"}),
        );
        session.login().await.unwrap();
        assert_eq!(session.region().await.as_deref(), Some("ORD"));
        let url = session
            .get_endpoint(CLOUD_SERVERS, &["servers"])
            .await
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://ord.servers.example.com/v2/123456/servers"
        );
    }

    #[tokio::test]
    async fn test_check_callback() {
        let server = MockServer::start_async().await;
        let session = logged_in(&server).await;
        let status = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/dns/v1.0/123456/status/abcd")
                    .query_param("showDetails", "true");
                then.status(200).json_body(json!({"status": "COMPLETED"}));
            })
            .await;

        let job = json!({
            "jobId": "abcd",
            "callbackUrl": server.url("/dns/v1.0/123456/status/abcd"),
        });
        let result = session.check_callback(&job, true).await.unwrap();
        assert_eq!(result, json!({"status": "COMPLETED"}));
        status.assert_async().await;

        let err = session
            .check_callback(&json!({"jobId": "abcd"}), false)
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
