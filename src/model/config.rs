use std::{num::NonZeroUsize, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const REDACTED: &str = "********";

pub const DEFAULT_MAX_QUEUE_SIZE: NonZeroUsize = match NonZeroUsize::new(8) {
    Some(size) => size,
    None => unreachable!(),
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at: {path}, {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed storage url: {url}, {source}")]
    MalformedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("cannot derive an account name from storage url: {0}")]
    MissingAccount(String),

    #[error("container name must not be empty")]
    EmptyContainer,

    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("no access to container: {0}")]
    NoAccess(String),

    #[error("storage unreachable: {0}")]
    Unreachable(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub account_name: String,
    pub account_key: String,
}

/// How the bytes of a blob are split into JSON records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Json,
    #[default]
    Jsonl,
}

/// How decoded records are written back out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputShape {
    Array,
    #[default]
    Lines,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobstoreConfig {
    pub container: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
    pub storage_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_queue_size: Option<NonZeroUsize>,
    #[serde(default)]
    pub resource_type: ResourceType,
    #[serde(default)]
    pub output_shape: OutputShape,
}

/// Where a validated config points: the parsed endpoint and the account owning it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageLocation {
    pub account: String,
    pub url: Url,
}

impl BlobstoreConfig {
    pub fn new(
        container: impl Into<String>,
        storage_url: impl Into<String>,
        credentials: Option<Credentials>,
    ) -> Self {
        Self {
            container: container.into(),
            credentials,
            storage_url: storage_url.into(),
            max_queue_size: None,
            resource_type: ResourceType::default(),
            output_shape: OutputShape::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_json(&json)
    }

    pub fn max_queue_size(&self) -> NonZeroUsize {
        self.max_queue_size.unwrap_or(DEFAULT_MAX_QUEUE_SIZE)
    }

    /// Checks the container name and storage url. The account is taken from the
    /// credentials when present, otherwise from the first label of the url host.
    pub fn validate(&self) -> Result<StorageLocation, ConfigError> {
        if self.container.trim().is_empty() {
            return Err(ConfigError::EmptyContainer);
        }

        let url = Url::parse(&self.storage_url).map_err(|source| ConfigError::MalformedUrl {
            url: self.storage_url.clone(),
            source,
        })?;

        let account = match &self.credentials {
            Some(credentials) => credentials.account_name.clone(),
            None => url
                .host_str()
                .and_then(|host| host.split('.').next())
                .filter(|label| !label.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ConfigError::MissingAccount(self.storage_url.clone()))?,
        };

        Ok(StorageLocation { account, url })
    }

    /// Copy safe to log or echo back: credential fields are replaced by [`REDACTED`].
    pub fn sanitize(&self) -> Self {
        Self {
            credentials: self.credentials.as_ref().map(|_| Credentials {
                account_name: REDACTED.to_string(),
                account_key: REDACTED.to_string(),
            }),
            ..self.clone()
        }
    }
}
