//! User parameters
//!
//! Parameters are opaque key/value configuration handed to the container at
//! construction and read-only afterwards. [`ParametersLoader`] layers an
//! optional file and prefixed environment variables with the `config` crate.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{DIError, DIResult};

/// Read-only user parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters {
    values: serde_json::Map<String, serde_json::Value>,
}

impl Parameters {
    pub fn new(values: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { values }
    }

    /// Build from a JSON object; anything else is rejected.
    pub fn from_json(value: serde_json::Value) -> DIResult<Self> {
        match value {
            serde_json::Value::Object(values) => Ok(Self { values }),
            other => Err(DIError::InvalidArgument {
                message: format!("Parameters must be a JSON object, got {}.", other),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Like [`get`](Self::get) but fails on a missing key.
    pub fn require(&self, key: &str) -> DIResult<&serde_json::Value> {
        self.get(key).ok_or_else(|| DIError::MissingParameter {
            key: key.to_string(),
        })
    }

    /// Deserialize a parameter into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> DIResult<T> {
        let value = self.require(key)?.clone();
        serde_json::from_value(value).map_err(|e| DIError::InvalidArgument {
            message: format!("Parameter '{}' has an unexpected shape: {}", key, e),
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Loads [`Parameters`] from a file and the environment.
pub struct ParametersLoader {
    path: Option<PathBuf>,
    env_prefix: String,
}

impl ParametersLoader {
    pub fn new() -> Self {
        Self {
            path: None,
            env_prefix: "WIREBOX".to_string(),
        }
    }

    /// Read parameters from `path` if it exists (TOML, JSON or YAML by extension).
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Environment variables named `{prefix}_KEY` override file values.
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    pub fn load(&self) -> DIResult<Parameters> {
        let mut builder = Config::builder();
        if let Some(path) = &self.path {
            builder = builder.add_source(File::from(path.clone()).required(false));
        }
        builder = builder.add_source(Environment::with_prefix(&self.env_prefix).separator("__"));

        let parameters: Parameters = builder.build()?.try_deserialize()?;
        debug!(
            "Loaded {} parameters (env prefix {})",
            parameters.len(),
            self.env_prefix
        );
        Ok(parameters)
    }
}

impl Default for ParametersLoader {
    fn default() -> Self {
        Self::new()
    }
}
