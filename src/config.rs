//! Connection settings, loaded from YAML or built from flags

use crate::error::Result;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ADDR: &str = "127.0.0.1:27017";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for a MongoDB deployment.
///
/// Built once at startup (from flags or a YAML file) and handed to
/// [`crate::mongo::connect`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub db_name: String,
    pub addrs: Vec<String>,
    pub username: String,
    pub password: String,
    pub enable_auth: bool,
    pub rs_name: String,
    pub enable_rs: bool,
    pub timeout_secs: u64,
    pub fs_prefix: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            db_name: "mongo".to_string(),
            addrs: Vec::new(),
            username: "mongo".to_string(),
            password: "mongo".to_string(),
            enable_auth: false,
            rs_name: "rs".to_string(),
            enable_rs: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            fs_prefix: "fs".to_string(),
        }
    }
}

impl MongoConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Server addresses, falling back to the local default when none are set.
    pub fn addrs_or_default(&self) -> Vec<String> {
        if self.addrs.is_empty() {
            vec![DEFAULT_ADDR.to_string()]
        } else {
            self.addrs.clone()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Username and password, only when authentication is enabled.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.enable_auth
            .then(|| (self.username.as_str(), self.password.as_str()))
    }

    /// Replica set name, only when replica set mode is enabled.
    pub fn replica_set(&self) -> Option<&str> {
        self.enable_rs.then_some(self.rs_name.as_str())
    }
}
