use serde::Deserialize;
use tracing::info;
use tracing::warn;

use crate::errors::Result;
use crate::network::generate_self_signed_certificates;

#[derive(Debug, Deserialize, Clone)]
pub struct TlsSettings {
    /// Server certificate chain path in PEM format
    /// Default: "./certs/server.pem"
    #[serde(default = "default_server_cert_path")]
    pub server_certificate_path: String,

    /// Server private key path in PEM format
    /// Default: "./certs/server.key"
    #[serde(default = "default_server_key_path")]
    pub server_private_key_path: String,

    /// Automatically generates self-signed certificates on startup
    /// Default: false (requires pre-configured certificates)
    #[serde(default = "default_generate_self_signed")]
    pub generate_self_signed_certificates: bool,

    /// DNS names baked into generated certificates
    /// Default: ["localhost"]
    #[serde(default = "default_subject_alt_names")]
    pub subject_alt_names: Vec<String>,
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self {
            server_certificate_path: default_server_cert_path(),
            server_private_key_path: default_server_key_path(),
            generate_self_signed_certificates: default_generate_self_signed(),
            subject_alt_names: default_subject_alt_names(),
        }
    }
}

impl TlsSettings {
    /// Reads the configured certificate/key PEM pair from disk, generating
    /// a self-signed pair first when configured to and none exists yet.
    pub fn load_material(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        if self.generate_self_signed_certificates {
            if std::path::Path::new(&self.server_certificate_path).exists() {
                warn!(
                    "certificate already exists at {}, skipping self-signed generation",
                    self.server_certificate_path
                );
            } else {
                info!("generating self-signed certificate at {}", self.server_certificate_path);
                let (cert, key) = generate_self_signed_certificates(self.subject_alt_names.clone())?;
                for path in [&self.server_certificate_path, &self.server_private_key_path] {
                    if let Some(parent) = std::path::Path::new(path).parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                std::fs::write(&self.server_certificate_path, &cert)?;
                std::fs::write(&self.server_private_key_path, &key)?;
            }
        }
        let cert = std::fs::read(&self.server_certificate_path)?;
        let key = std::fs::read(&self.server_private_key_path)?;
        Ok((cert, key))
    }
}

// Default implementations
fn default_server_cert_path() -> String {
    "./certs/server.pem".into()
}
fn default_server_key_path() -> String {
    "./certs/server.key".into()
}
fn default_generate_self_signed() -> bool {
    false
}
fn default_subject_alt_names() -> Vec<String> {
    vec!["localhost".to_string()]
}
