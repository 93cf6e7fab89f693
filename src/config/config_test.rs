use std::io::Write;

use crate::config::ServerSettings;

#[test]
fn test_defaults() {
    let settings = ServerSettings::default();
    assert_eq!(settings.network.max_frame_bytes, 1024 * 1024);
    assert_eq!(settings.network.outbound_queue, 64);
    assert!(settings.network.tcp_nodelay);
    assert!(!settings.tls.generate_self_signed_certificates);
    assert_eq!(settings.tls.subject_alt_names, vec!["localhost"]);
}

#[test]
fn test_load_from_file_overrides_defaults() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("should create temp file");
    writeln!(
        file,
        "[network]\nmax_frame_bytes = 2048\n\n[tls]\nserver_certificate_path = \"/tmp/api.pem\"\n"
    )
    .expect("should write");

    let settings = ServerSettings::load(file.path().to_str()).expect("should load");
    assert_eq!(settings.network.max_frame_bytes, 2048);
    assert_eq!(settings.network.outbound_queue, 64); // untouched default
    assert_eq!(settings.tls.server_certificate_path, "/tmp/api.pem");
}

#[test]
fn test_load_without_file_uses_defaults() {
    let settings = ServerSettings::load(None).expect("should load");
    assert_eq!(settings.network.max_frame_bytes, ServerSettings::default().network.max_frame_bytes);
}

#[test]
fn test_self_signed_material_roundtrip() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let cert_path = dir.path().join("server.pem");
    let key_path = dir.path().join("server.key");

    let settings = crate::config::TlsSettings {
        server_certificate_path: cert_path.to_string_lossy().into_owned(),
        server_private_key_path: key_path.to_string_lossy().into_owned(),
        generate_self_signed_certificates: true,
        subject_alt_names: vec!["localhost".to_string()],
    };

    let (cert, key) = settings.load_material().expect("should generate and read");
    assert!(String::from_utf8_lossy(&cert).contains("BEGIN CERTIFICATE"));
    assert!(String::from_utf8_lossy(&key).contains("PRIVATE KEY"));

    // Second load reuses the existing material instead of regenerating.
    let (cert_again, _) = settings.load_material().expect("should read existing");
    assert_eq!(cert, cert_again);
}
