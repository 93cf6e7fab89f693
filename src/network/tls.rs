//! TLS material handling.
//!
//! Server and client rustls configurations are built from PEM blobs
//! supplied by the caller; certificate/key problems surface at construction
//! time, before any socket is served. Self-signed generation exists for
//! tests and development setups.

use std::io::Cursor;
use std::sync::Arc;

use rustls::pki_types::CertificateDer;
use rustls::pki_types::PrivateKeyDer;
use rustls::RootCertStore;

use crate::errors::Error;
use crate::errors::Result;
use crate::errors::TransportError;

fn tls_err(context: &str, detail: impl std::fmt::Display) -> Error {
    Error::Transport(TransportError::Tls(format!("{context}: {detail}")))
}

fn parse_certs(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>> {
    let certs: Vec<_> = rustls_pemfile::certs(&mut Cursor::new(pem))
        .collect::<std::io::Result<_>>()
        .map_err(|e| tls_err("invalid certificate pem", e))?;
    if certs.is_empty() {
        return Err(tls_err("invalid certificate pem", "no certificates found"));
    }
    Ok(certs)
}

fn parse_key(pem: &[u8]) -> Result<PrivateKeyDer<'static>> {
    rustls_pemfile::private_key(&mut Cursor::new(pem))
        .map_err(|e| tls_err("invalid private key pem", e))?
        .ok_or_else(|| tls_err("invalid private key pem", "no private key found"))
}

/// Builds the server-side TLS configuration from a PEM certificate chain
/// and private key. Fails if the pair is unusable.
pub(crate) fn server_config(cert_pem: &[u8], key_pem: &[u8]) -> Result<Arc<rustls::ServerConfig>> {
    let config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(parse_certs(cert_pem)?, parse_key(key_pem)?)
        .map_err(|e| tls_err("certificate/key pair rejected", e))?;
    Ok(Arc::new(config))
}

/// Builds a client-side TLS configuration trusting exactly the given CA (or
/// self-signed server) certificate.
pub(crate) fn client_config(ca_pem: &[u8]) -> Result<Arc<rustls::ClientConfig>> {
    let mut roots = RootCertStore::empty();
    for cert in parse_certs(ca_pem)? {
        roots
            .add(cert)
            .map_err(|e| tls_err("invalid ca certificate", e))?;
    }
    let config = rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(Arc::new(config))
}

/// Generates a self-signed certificate/key pair for the given DNS names,
/// returned as PEM blobs.
pub fn generate_self_signed_certificates(subject_alt_names: Vec<String>) -> Result<(Vec<u8>, Vec<u8>)> {
    let rcgen::CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(subject_alt_names)
            .map_err(|e| tls_err("certificate generation failed", e))?;
    Ok((cert.pem().into_bytes(), key_pair.serialize_pem().into_bytes()))
}
