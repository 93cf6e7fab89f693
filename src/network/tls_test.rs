use super::tls::client_config;
use super::tls::generate_self_signed_certificates;
use super::tls::server_config;

#[test]
fn generated_material_builds_both_configurations() {
    let (cert, key) =
        generate_self_signed_certificates(vec!["localhost".to_string()]).unwrap();
    server_config(&cert, &key).unwrap();
    client_config(&cert).unwrap();
}

#[test]
fn garbage_pem_is_rejected_before_binding() {
    let (cert, key) =
        generate_self_signed_certificates(vec!["localhost".to_string()]).unwrap();
    assert!(server_config(b"not a certificate", &key).is_err());
    assert!(server_config(&cert, b"not a key").is_err());
    assert!(client_config(b"").is_err());
}
