//! Server configuration.
//!
//! Hierarchical loading: hardcoded field defaults, then an optional TOML
//! file, then `CASTELLAN_`-prefixed environment variables (highest
//! priority).

mod network;
mod tls;

pub use network::*;
pub use tls::*;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::errors::Result;

#[cfg(test)]
mod config_test;

/// Tunables for one API server instance. Identity material (certificate,
/// key, bind address) is passed explicitly at construction; settings only
/// carry the knobs with sensible defaults.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServerSettings {
    /// Network communication parameters
    #[serde(default)]
    pub network: NetworkSettings,
    /// TLS material locations for deployments that load PEMs from disk
    #[serde(default)]
    pub tls: TlsSettings,
}

impl ServerSettings {
    /// Loads settings from an optional TOML file layered under environment
    /// overrides, e.g. `CASTELLAN_NETWORK__MAX_FRAME_BYTES=1048576`.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(p) = path {
            builder = builder.add_source(File::with_name(p));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix("CASTELLAN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
