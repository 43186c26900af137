//! Configuration files written by one run load back unchanged.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use scout::ScoutConfig;

#[test]
fn default_config_roundtrips_through_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = ScoutConfig::default();
    config.save_to_file(&path).unwrap();
    assert!(path.exists());

    let loaded = ScoutConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn customised_config_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = ScoutConfig::default();
    config.search.budget_ms = 4_000;
    config.search.sufficiency_threshold = 5;
    config.search.user_agent = Some("scout-test/1.0".into());
    config.providers.duckduckgo.enabled = false;
    config.providers.apollo.api_key_env = "MY_APOLLO_KEY".into();
    config.providers.apollo.base_url = Some("http://127.0.0.1:9000".into());
    config.providers.fixtures.path = Some(dir.path().join("people.json"));
    config.tables.keyword_table = Some(dir.path().join("keywords.toml"));
    config.save_to_file(&path).unwrap();

    let loaded = ScoutConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn saved_file_is_readable_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    ScoutConfig::default().save_to_file(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("[search]"));
    assert!(content.contains("budget_ms = 8000"));
    assert!(content.contains("[providers.apollo]"));
    assert!(content.contains("api_key_env = \"APOLLO_API_KEY\""));
}

#[test]
fn overwriting_replaces_previous_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = ScoutConfig::default();
    config.save_to_file(&path).unwrap();
    config.search.max_results = 7;
    config.save_to_file(&path).unwrap();

    assert_eq!(ScoutConfig::from_file(&path).unwrap().search.max_results, 7);
}
