// Copyright 2018-2020 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Support for `OS_` environment variables.

use std::str::FromStr;
use std::sync::Arc;

use log::debug;

use crate::credentials::{Environment, RealEnvironment};
use crate::loading;
use crate::{Credentials, Error, InterfaceType, Session};

fn _from_env(env: Arc<dyn Environment>) -> Result<Session, Error> {
    if let Some(cloud_name) = env.var("OS_CLOUD") {
        debug!("OS_CLOUD is set, loading cloud {} from clouds.yaml", cloud_name);
        return loading::from_config(cloud_name);
    }

    let client = loading::get_client(env.var("OS_CACERT").as_deref())?;

    // Fail early instead of on the first login.
    let _ = Credentials::new().resolve(None, env.as_ref())?;

    let interface = env
        .var("OS_INTERFACE")
        .map(|value| InterfaceType::from_str(&value))
        .transpose()?;

    let mut session = Session::new_with_environment(client, Credentials::new(), env);
    if let Some(interface) = interface {
        session.set_endpoint_interface(interface);
    }
    Ok(session)
}

/// Create a `Session` from environment variables.
///
/// Credentials are read from `OS_USERNAME`, `OS_PASSWORD` or `OS_API_KEY`, `OS_REGION_NAME`
/// and `OS_AUTH_URL`. `OS_INTERFACE` selects the endpoint interface and `OS_CACERT` adds a
/// CA certificate to the HTTP client. If `OS_CLOUD` is set, the session is loaded with
/// [from_config](fn.from_config.html) instead.
pub fn from_env() -> Result<Session, Error> {
    _from_env(Arc::new(RealEnvironment))
}

#[cfg(test)]
pub mod test {
    use std::sync::Arc;

    use maplit::hashmap;

    use super::_from_env;
    use crate::{ErrorKind, InterfaceType};

    #[test]
    fn test_api_key() {
        let env = hashmap! {
            "OS_USERNAME" => "admin",
            "OS_API_KEY" => "0123456789abcdef",
            "OS_REGION_NAME" => "DFW",
        };

        let session = _from_env(Arc::new(env)).unwrap();
        assert_eq!(session.endpoint_interface(), InterfaceType::Public);
    }

    #[test]
    fn test_password_with_interface() {
        let env = hashmap! {
            "OS_AUTH_URL" => "http://example.com/v2.0",
            "OS_USERNAME" => "admin",
            "OS_PASSWORD" => "password",
            "OS_INTERFACE" => "internal",
        };

        let session = _from_env(Arc::new(env)).unwrap();
        assert_eq!(session.endpoint_interface(), InterfaceType::Internal);
    }

    #[test]
    fn test_missing_username() {
        let env = hashmap! {
            "OS_API_KEY" => "0123456789abcdef",
        };

        let err = _from_env(Arc::new(env)).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::MissingCredential);
    }

    #[test]
    fn test_missing_secret() {
        let env = hashmap! {
            "OS_USERNAME" => "admin",
        };

        let err = _from_env(Arc::new(env)).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::MissingCredential);
    }

    #[test]
    fn test_invalid_interface() {
        let env = hashmap! {
            "OS_USERNAME" => "admin",
            "OS_API_KEY" => "0123456789abcdef",
            "OS_INTERFACE" => "sideways",
        };

        let err = _from_env(Arc::new(env)).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_invalid_auth_url() {
        let env = hashmap! {
            "OS_USERNAME" => "admin",
            "OS_API_KEY" => "0123456789abcdef",
            "OS_AUTH_URL" => "not a url",
        };

        let err = _from_env(Arc::new(env)).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
