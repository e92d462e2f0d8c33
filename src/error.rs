// Copyright 2019 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Error and result implementations.

use std::fmt;

use reqwest::StatusCode;

/// Kind of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A required credential could not be found in any source.
    ///
    /// Raised before any network call is made. The message names the field.
    MissingCredential,

    /// Password authentication succeeded, but no region could be resolved.
    ///
    /// The token is usable, but the service catalog is not.
    MissingDefaultRegion,

    /// The identity service rejected the credentials.
    AuthenticationFailed,

    /// A request was attempted before a successful login.
    NotAuthenticated,

    /// A remote API call failed on the transport or HTTP status level.
    ///
    /// The message carries the raw response body (if any).
    RemoteApiError,

    /// The requested service is not present in the service catalog.
    EndpointNotFound,

    /// Invalid value passed to one of the calls.
    InvalidInput,

    /// Invalid or missing configuration.
    InvalidConfig,

    /// Response received from the server is malformed.
    InvalidResponse,
}

/// Error from a cloud call.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    status: Option<StatusCode>,
}

impl Error {
    /// Create a new error of the provided kind.
    #[inline]
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Error {
        Error {
            kind,
            message: Some(message.into()),
            status: None,
        }
    }

    /// Error for a credential that cannot be resolved.
    pub(crate) fn missing_credential(field: &str) -> Error {
        Error::new(
            ErrorKind::MissingCredential,
            format!("Credential {} is not defined", field),
        )
    }

    /// Error for a request issued before logging in.
    pub(crate) fn not_authenticated() -> Error {
        Error::new(ErrorKind::NotAuthenticated, "Not logged in")
    }

    /// Add an HTTP status code to the error.
    #[inline]
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// Add an HTTP status code to the error.
    #[inline]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.set_status(status);
        self
    }

    /// Error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Error message or response body.
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// HTTP status code (if any).
    #[inline]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::MissingCredential => "Missing credential",
            ErrorKind::MissingDefaultRegion => "No region could be determined",
            ErrorKind::AuthenticationFailed => "Failed to authenticate",
            ErrorKind::NotAuthenticated => "Not authenticated",
            ErrorKind::RemoteApiError => "Remote API call failed",
            ErrorKind::EndpointNotFound => "Requested endpoint was not found",
            ErrorKind::InvalidInput => "Input value(s) are invalid or missing",
            ErrorKind::InvalidConfig => "Configuration file cannot be found or is invalid",
            ErrorKind::InvalidResponse => "Received invalid response",
        })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(status) = self.status {
            write!(f, "{} (HTTP {})", self.kind, status.as_u16())?;
        } else {
            write!(f, "{}", self.kind)?;
        }

        if let Some(ref msg) = self.message {
            write!(f, ": {}", msg)
        } else {
            Ok(())
        }
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Error {
        let msg = value.to_string();
        let kind = if value.is_builder() {
            ErrorKind::InvalidInput
        } else if value.is_decode() {
            ErrorKind::InvalidResponse
        } else {
            ErrorKind::RemoteApiError
        };

        let error = Error::new(kind, msg);
        if let Some(status) = value.status() {
            error.with_status(status)
        } else {
            error
        }
    }
}

impl From<::url::ParseError> for Error {
    fn from(value: ::url::ParseError) -> Error {
        Error::new(ErrorKind::InvalidInput, value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Error {
        Error::new(
            ErrorKind::InvalidResponse,
            format!("Cannot parse JSON: {}", value),
        )
    }
}
