use starfall_server::server::{AppConfig, ConfigError};

#[test]
fn partial_yaml_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "listen_port: 8080\nsite:\n  brand: Comet\n").unwrap();

    let cfg = AppConfig::load_from_path(&path).unwrap();
    assert_eq!(cfg.listen_port, Some(8080));
    assert_eq!(cfg.site.brand, "Comet");
    assert!(cfg.db_path.is_none());
}

#[test]
fn load_errors_name_their_source() {
    let dir = tempfile::tempdir().unwrap();

    let missing = AppConfig::load_from_path(dir.path().join("nope.yaml")).unwrap_err();
    assert!(matches!(missing, ConfigError::Io(_)));
    assert!(missing.to_string().starts_with("IO error:"));

    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "listen_port: [not, a, port]\n").unwrap();
    let broken = AppConfig::load_from_path(&path).unwrap_err();
    assert!(matches!(broken, ConfigError::Yaml(_)));
    assert!(std::error::Error::source(&broken).is_some());
}
