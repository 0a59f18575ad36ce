//! Connected-app configuration and session inputs.
//!
//! Everything here is read once at startup and lives for the process:
//! the connected-app credentials from a YAML config file, the login host
//! selected by the sandbox flag, and the persisted token-endpoint payload
//! used to construct a [`rest::Client`](crate::rest::Client).

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Errors that can occur while loading configuration or session files.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read a configuration file from disk.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path to the file that failed to read.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to parse the YAML configuration.
    #[error("Failed to parse configuration YAML: {source}")]
    ParseYaml {
        #[source]
        source: serde_yaml::Error,
    },
    /// Failed to parse the JSON token file.
    #[error("Failed to parse token JSON: {source}")]
    ParseJson {
        #[source]
        source: serde_json::Error,
    },
}

/// OAuth2 connected-app configuration.
///
/// Obtained from a Salesforce Connected App (Consumer Key and Consumer
/// Secret) together with the callback URL registered for it. Immutable for
/// the process lifetime.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Client ID from the Connected App (Consumer Key).
    pub client_id: String,
    /// Client Secret from the Connected App (Consumer Secret).
    pub client_secret: String,
    /// Callback URL registered for the Connected App.
    pub redirect_uri: String,
}

impl Config {
    /// Loads configuration from a YAML file.
    ///
    /// The file should contain a mapping with `client_id`, `client_secret`
    /// and `redirect_uri` keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] if the file cannot be read and
    /// [`Error::ParseYaml`] if its contents are not valid YAML for
    /// [`Config`].
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| Error::ParseYaml { source })
    }
}

/// Which Salesforce login host to authenticate against.
///
/// Exactly one host is active per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginHost {
    /// Production orgs (`login.salesforce.com`).
    #[default]
    Production,
    /// Sandbox orgs (`test.salesforce.com`).
    Sandbox,
}

impl LoginHost {
    /// Selects the sandbox host when the environment flag is set.
    pub fn from_sandbox_flag(sandbox: bool) -> Self {
        if sandbox {
            Self::Sandbox
        } else {
            Self::Production
        }
    }

    /// Returns the login hostname.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "login.salesforce.com",
            Self::Sandbox => "test.salesforce.com",
        }
    }
}

impl fmt::Display for LoginHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fields of the token endpoint's JSON payload this crate consumes.
///
/// The payload itself is opaque; any other fields are ignored. A successful
/// grant flow produces it once, and it is consumed once to construct a
/// [`rest::Client`](crate::rest::Client).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Base URL of the org instance the token is valid for.
    pub instance_url: String,
    /// Bearer access token.
    pub access_token: String,
}

impl TokenResponse {
    /// Loads a persisted token response from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] if the file cannot be read and
    /// [`Error::ParseJson`] if it lacks the `instance_url` or
    /// `access_token` fields.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| Error::ParseJson { source })
    }
}
