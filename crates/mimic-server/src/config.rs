//! Server configuration.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    /// Prefix under which every admin resource is rooted, e.g.
    /// `/mimic/variables`. Must start with `/` and not end with one.
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_base_path() -> String {
    "/mimic".to_string()
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: ListenConfig::default(),
            base_path: default_base_path(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.base_path.starts_with('/') {
            anyhow::bail!(
                "base_path must start with '/', got '{}'",
                self.base_path
            );
        }
        if self.base_path.len() > 1 && self.base_path.ends_with('/') {
            anyhow::bail!(
                "base_path must not end with '/', got '{}'",
                self.base_path
            );
        }
        if self.base_path == "/" {
            anyhow::bail!("base_path '/' would shadow all mock traffic");
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, anyhow::Error> {
        format!("{}:{}", self.listen.host, self.listen.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid listen address: {e}"))
    }
}
