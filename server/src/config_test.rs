use std::collections::HashMap;

use super::*;

fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
    let env: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    ServerConfig::from_lookup(|key| env.get(key).cloned())
}

#[test]
fn defaults_when_nothing_is_set() {
    let cfg = config(&[]).unwrap();
    assert_eq!(cfg, ServerConfig::default());
    assert_eq!(cfg.port, 3001);
    assert_eq!(cfg.socket_addr().to_string(), "0.0.0.0:3001");
    assert_eq!(cfg.allowed_origins, vec!["http://localhost:3000", "http://127.0.0.1:3000"]);
    assert_eq!(cfg.peer_buffer, 1024);
}

#[test]
fn reads_port_and_bind_addr() {
    let cfg = config(&[("PORT", "8080"), ("BIND_ADDR", "127.0.0.1")]).unwrap();
    assert_eq!(cfg.socket_addr().to_string(), "127.0.0.1:8080");
}

#[test]
fn client_url_comes_first_and_origins_are_deduplicated() {
    let cfg = config(&[
        ("CLIENT_URL", "https://board.example.com/"),
        ("ALLOWED_ORIGINS", " http://localhost:3000, https://staging.example.com ,,"),
    ])
    .unwrap();
    assert_eq!(
        cfg.allowed_origins,
        vec![
            "https://board.example.com",
            "http://localhost:3000",
            "http://127.0.0.1:3000",
            "https://staging.example.com",
        ]
    );
}

#[test]
fn invalid_values_are_errors() {
    assert_eq!(config(&[("PORT", "nope")]), Err(ConfigError::InvalidPort("nope".into())));
    assert_eq!(config(&[("PORT", "70000")]), Err(ConfigError::InvalidPort("70000".into())));
    assert_eq!(
        config(&[("BIND_ADDR", "localhost")]),
        Err(ConfigError::InvalidBindAddr("localhost".into()))
    );
    assert_eq!(config(&[("PEER_BUFFER", "0")]), Err(ConfigError::InvalidPeerBuffer("0".into())));
}

#[test]
fn origin_check_allows_missing_and_listed_origins() {
    let cfg = ServerConfig::default();
    assert!(cfg.origin_allowed(None));
    assert!(cfg.origin_allowed(Some("http://127.0.0.1:3000")));
    assert!(!cfg.origin_allowed(Some("http://evil.example")));
    assert!(!cfg.origin_allowed(Some("")));
}
