// Copyright 2018-2021 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Support for cloud configuration file.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, warn};
use serde::Deserialize;

use crate::loading;
use crate::utils;
use crate::{Credentials, Error, ErrorKind, InterfaceType, Session};

#[derive(Debug, Deserialize)]
struct Auth {
    #[serde(default)]
    auth_url: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Cloud {
    auth: Auth,
    #[serde(default)]
    cacert: Option<String>,
    #[serde(default)]
    interface: Option<String>,
    #[serde(default)]
    region_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Root {
    clouds: HashMap<String, Cloud>,
}

fn find_config<S: AsRef<str>>(filename: S) -> Option<PathBuf> {
    let filename = filename.as_ref();
    let current = Path::new(filename);
    if current.is_file() {
        match current.canonicalize() {
            Ok(val) => return Some(val),
            Err(e) => warn!("Cannot canonicalize {:?}: {}", current, e),
        }
    }

    if let Some(mut home) = dirs::home_dir() {
        home.push(format!(".config/openstack/{}", filename));
        if home.is_file() {
            return Some(home);
        }
    } else {
        warn!("Cannot find home directory");
    }

    let abs = PathBuf::from(format!("/etc/openstack/{}", filename));
    if abs.is_file() {
        Some(abs)
    } else {
        None
    }
}

/// Read a YAML mapping, an optional file that is not found becomes an empty mapping.
fn read_yaml(filename: &str, optional: bool) -> Result<serde_yaml::Mapping, Error> {
    let path = match find_config(filename) {
        Some(path) => path,
        None if optional => return Ok(serde_yaml::Mapping::new()),
        None => {
            return Err(Error::new(
                ErrorKind::InvalidConfig,
                format!("{} was not found in any location", filename),
            ))
        }
    };
    debug!("Reading cloud configuration from {}", path.display());

    let content = File::open(path).map_err(|e| {
        Error::new(
            ErrorKind::InvalidConfig,
            format!("Cannot read {}: {}", filename, e),
        )
    })?;

    match serde_yaml::from_reader(content).map_err(|e| {
        Error::new(
            ErrorKind::InvalidConfig,
            format!("Cannot parse {}: {}", filename, e),
        )
    })? {
        serde_yaml::Value::Mapping(mapping) => Ok(mapping),
        other => Err(Error::new(
            ErrorKind::InvalidConfig,
            format!("Root of {} is {:?}, not a mapping", filename, other),
        )),
    }
}

fn credentials_from_cloud(
    name: &str,
    auth: Auth,
    region: Option<String>,
) -> Result<Credentials, Error> {
    let username = auth.username.ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidConfig,
            format!("Cloud {} has no username", name),
        )
    })?;

    let mut result = Credentials::new().with_username(username);
    match (auth.password, auth.api_key) {
        (Some(password), _) => result.set_password(password),
        (None, Some(api_key)) => result.set_api_key(api_key),
        (None, None) => {
            return Err(Error::new(
                ErrorKind::InvalidConfig,
                format!("Cloud {} has neither a password nor an API key", name),
            ))
        }
    }

    if let Some(auth_url) = auth.auth_url {
        result.set_auth_url(auth_url);
    }
    if let Some(region) = region {
        result.set_region(region);
    }
    Ok(result)
}

fn from_files(
    name: &str,
    mut clouds: serde_yaml::Mapping,
    secure: serde_yaml::Mapping,
) -> Result<Session, Error> {
    utils::merge_mappings(secure, &mut clouds, true);

    let mut clouds_root: Root = serde_yaml::from_value(serde_yaml::Value::Mapping(clouds))
        .map_err(|e| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Cannot parse the merged cloud configuration: {}", e),
            )
        })?;

    let cloud = clouds_root
        .clouds
        .remove(name)
        .ok_or_else(|| Error::new(ErrorKind::InvalidConfig, format!("No such cloud: {}", name)))?;

    let interface = match cloud.interface {
        Some(ref value) => Some(InterfaceType::from_str(value).map_err(|_| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Invalid interface {} for cloud {}", value, name),
            )
        })?),
        None => None,
    };

    let credentials = credentials_from_cloud(name, cloud.auth, cloud.region_name)?;
    let client = loading::get_client(cloud.cacert.as_deref())?;

    let mut session = Session::new_with_client(client, credentials);
    if let Some(interface) = interface {
        session.set_endpoint_interface(interface);
    }
    Ok(session)
}

/// Create a `Session` from a `clouds.yaml` configuration file.
///
/// The file is looked up in the current directory, then in `~/.config/openstack` and finally
/// in `/etc/openstack`. Secrets can be moved to an optional `secure.yaml` next to it.
///
/// ```yaml
/// clouds:
///   rackspace:
///     auth:
///       username: user
///       api_key: 0123456789abcdef
///     region_name: DFW
/// ```
pub fn from_config<S: AsRef<str>>(cloud_name: S) -> Result<Session, Error> {
    let clouds = read_yaml("clouds.yaml", false)?;
    let secure = read_yaml("secure.yaml", true)?;

    from_files(cloud_name.as_ref(), clouds, secure)
}

#[cfg(test)]
pub mod test {
    #[cfg(any(feature = "native-tls", feature = "rustls"))]
    use std::io::Write;

    use super::{find_config, from_files, read_yaml};
    use crate::utils::test::to_yaml;
    use crate::{ErrorKind, InterfaceType};

    #[test]
    fn test_from_config_api_key() {
        let clouds = to_yaml(
            r#"clouds:
  cloud_name:
    auth:
      auth_url: http://url1/v2.0
      username: user1
      api_key: key1
    region_name: ORD"#,
        );

        let session = from_files("cloud_name", clouds, serde_yaml::Mapping::new()).unwrap();
        let creds = session.credentials();
        assert_eq!(creds.username(), Some("user1"));
        assert_eq!(creds.region(), Some("ORD"));
        assert_eq!(creds.auth_url(), Some("http://url1/v2.0"));
        assert_eq!(session.endpoint_interface(), InterfaceType::Public);
    }

    #[test]
    fn test_from_config_secure() {
        let clouds = to_yaml(
            r#"clouds:
  cloud_name:
    auth:
      username: user1
    interface: internal"#,
        );

        let secure = to_yaml(
            r#"clouds:
  cloud_name:
    auth:
      password: password1"#,
        );

        let session = from_files("cloud_name", clouds, secure).unwrap();
        assert_eq!(session.credentials().username(), Some("user1"));
        assert_eq!(session.credentials().region(), None);
        assert_eq!(session.endpoint_interface(), InterfaceType::Internal);
    }

    #[test]
    fn test_from_config_no_secret() {
        let clouds = to_yaml(
            r#"clouds:
  cloud_name:
    auth:
      username: user1"#,
        );

        let err = from_files("cloud_name", clouds, serde_yaml::Mapping::new())
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert!(err.to_string().contains("neither a password nor an API key"));
    }

    #[test]
    fn test_from_config_no_username() {
        let clouds = to_yaml(
            r#"clouds:
  cloud_name:
    auth:
      api_key: key1"#,
        );

        let err = from_files("cloud_name", clouds, serde_yaml::Mapping::new())
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_from_config_unknown_cloud() {
        let clouds = to_yaml(
            r#"clouds:
  cloud_name:
    auth:
      username: user1
      api_key: key1"#,
        );

        let err = from_files("other", clouds, serde_yaml::Mapping::new())
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert!(err.to_string().contains("No such cloud: other"));
    }

    #[test]
    fn test_from_config_invalid_interface() {
        let clouds = to_yaml(
            r#"clouds:
  cloud_name:
    auth:
      username: user1
      api_key: key1
    interface: admin"#,
        );

        let err = from_files("cloud_name", clouds, serde_yaml::Mapping::new())
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_from_config_no_clouds() {
        let clouds = to_yaml("other: 42");

        let err = from_files("cloud_name", clouds, serde_yaml::Mapping::new())
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    #[cfg(any(feature = "native-tls", feature = "rustls"))]
    fn test_from_config_cacert() {
        let mut cacert = tempfile::NamedTempFile::new().unwrap();
        write!(
            cacert,
            r#"-----BEGIN CERTIFICATE-----
MIIBYzCCAQqgAwIBAgIUJcTlPhsFyWG9S0pAAElKuSFEPBYwCgYIKoZIzj0EAwIw
FDESMBAGA1UEAwwJbG9jYWxob3N0MB4XDTIwMTAwMjExNTU1NloXDTIwMTEwMTEx
NTU1NlowFDESMBAGA1UEAwwJbG9jYWxob3N0MFkwEwYHKoZIzj0CAQYIKoZIzj0D
AQcDQgAEsfpkV9dAThk54U1K+rXUnNbpwuNo5wCRrKpk+cNR/2HBO8VydNj7dkxs
VBUvI7M9hY8dgg1jBVoPcCf0GSOvuqM6MDgwFAYDVR0RBA0wC4IJbG9jYWxob3N0
MAsGA1UdDwQEAwIHgDATBgNVHSUEDDAKBggrBgEFBQcDATAKBggqhkjOPQQDAgNH
ADBEAiAdjF7484kjb3XJoLbgqnZh4V1yHKs57eBVuil9/V0YugIgLwb/vSUAPowb
hK9jLBzNvo8qzKqaGfnGieuLeXCqFDA=
-----END CERTIFICATE-----"#
        )
        .unwrap();
        cacert.flush().unwrap();

        let clouds = to_yaml(format!(
            r#"clouds:
  cloud_name:
    auth:
      username: user1
      api_key: key1
    cacert: "{}""#,
            cacert.path().display()
        ));

        let _ = from_files("cloud_name", clouds, serde_yaml::Mapping::new()).unwrap();
    }

    #[test]
    fn test_from_config_cacert_not_found() {
        let clouds = to_yaml(
            r#"clouds:
  cloud_name:
    auth:
      username: user1
      api_key: key1
    cacert: /I/do/not/exist"#,
        );

        let e = from_files("cloud_name", clouds, serde_yaml::Mapping::new())
            .err()
            .unwrap();
        if cfg!(any(feature = "native-tls", feature = "rustls")) {
            assert!(e.to_string().contains("Cannot open cacert file"));
        } else {
            assert!(e.to_string().contains("TLS support is disabled"));
        }
    }

    #[test]
    fn test_read_config_file_error() {
        let e = read_yaml("doesnt_exist", false).err().unwrap();
        assert_eq!("Configuration file cannot be found or is invalid: doesnt_exist was not found in any location", e.to_string());
    }

    #[test]
    fn test_read_optional_config_file() {
        let mapping = read_yaml("doesnt_exist", true).unwrap();
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_find_config_fail() {
        let config = find_config("shouldnt_exist");
        assert_eq!(config, None);
    }
}
