use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

/// Backend used when the client runs from a local development origin or
/// without any origin at all.
pub const DEV_FALLBACK_HOST: &str = "http://tenant.internal-pms.stage-codal.net";

const LOCAL_HOSTS: &[&str] = &["localhost", "127.0.0.1", "[::1]", "::1"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("'{value}' is not a valid URL")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Client settings, usually read from a YAML file:
///
/// ```yaml
/// base_url: https://acme.pms.example.com
/// storage_dir: /home/ada/.local/share/pms
/// spec: pms-swagger.json
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL; takes precedence over `origin`.
    pub base_url: Option<String>,
    /// Origin the client is served from, used to derive the backend host.
    pub origin: Option<String>,
    pub storage_dir: Option<PathBuf>,
    /// Path of the API description document.
    pub spec: Option<PathBuf>,
}

fn parse_url(value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        value: value.to_string(),
        source,
    })
}

impl ClientConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(s)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&s).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Backend base URL. An explicit `base_url` wins. Otherwise a local
    /// development origin maps to [DEV_FALLBACK_HOST] and any other origin
    /// (scheme, host and port) is the backend itself. Without an origin the
    /// fallback host is used.
    pub fn resolve_base_url(&self) -> Result<Url, ConfigError> {
        if let Some(base_url) = &self.base_url {
            return parse_url(base_url);
        }
        let Some(origin) = &self.origin else {
            return parse_url(DEV_FALLBACK_HOST);
        };
        let origin_url = parse_url(origin)?;
        let is_local = origin_url
            .host_str()
            .is_some_and(|host| LOCAL_HOSTS.contains(&host));
        if is_local {
            log::debug!("local origin {origin}, using {DEV_FALLBACK_HOST}");
            parse_url(DEV_FALLBACK_HOST)
        } else {
            parse_url(&origin_url.origin().ascii_serialization())
        }
    }
}
