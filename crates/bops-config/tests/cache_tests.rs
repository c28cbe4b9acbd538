//! Config cache behavior against real fragment files.

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use bops_config::{CachePolicy, Factory, LocalDirectory};

struct Fixture {
    _dir: TempDir,
    config_dir: std::path::PathBuf,
    cache_dir: std::path::PathBuf,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let config_dir = dir.path().join("config");
    let cache_dir = dir.path().join("cache");
    fs::create_dir_all(&config_dir).unwrap();

    fs::write(config_dir.join("config.toml"), "a = 1\n[app]\nname = \"demo\"\n").unwrap();
    fs::write(config_dir.join("db.toml"), "host = \"localhost\"\n").unwrap();

    Fixture {
        _dir: dir,
        config_dir,
        cache_dir,
    }
}

fn factory(fx: &Fixture, environment: &str) -> Factory<LocalDirectory> {
    Factory::new(
        "global",
        LocalDirectory::new(&fx.config_dir),
        &fx.cache_dir,
        CachePolicy::for_environment(environment),
    )
    .unwrap()
}

#[test]
fn test_merges_config_and_namespaced_fragments() {
    let fx = fixture();
    let config = factory(&fx, "development").load(&["config", "db"]).unwrap();

    assert_eq!(
        config.to_value(),
        json!({"a": 1, "app": {"name": "demo"}, "db": {"host": "localhost"}})
    );
}

#[test]
fn test_production_serves_cache_after_sources_deleted() {
    let fx = fixture();
    let first = factory(&fx, "production").load(&["config", "db"]).unwrap();

    fs::remove_file(fx.config_dir.join("config.toml")).unwrap();
    fs::remove_file(fx.config_dir.join("db.toml")).unwrap();

    let second = factory(&fx, "production").load(&["config", "db"]).unwrap();
    assert_eq!(first, second);
    assert_eq!(second.get_str("db.host"), Some("localhost"));
}

#[test]
fn test_development_rereads_sources_every_load() {
    let fx = fixture();
    let first = factory(&fx, "development").load(&["config", "db"]).unwrap();
    assert_eq!(first.get_str("db.host"), Some("localhost"));

    fs::write(fx.config_dir.join("db.toml"), "host = \"db.internal\"\n").unwrap();

    let second = factory(&fx, "development").load(&["config", "db"]).unwrap();
    assert_eq!(second.get_str("db.host"), Some("db.internal"));
}

#[test]
fn test_development_refreshes_cache_used_by_production() {
    let fx = fixture();
    factory(&fx, "production").load(&["config", "db"]).unwrap();

    fs::write(fx.config_dir.join("db.toml"), "host = \"db.internal\"\n").unwrap();
    factory(&fx, "development").load(&["config", "db"]).unwrap();

    let served = factory(&fx, "production").load(&["config", "db"]).unwrap();
    assert_eq!(served.get_str("db.host"), Some("db.internal"));
}

#[test]
fn test_artifact_records_sources_and_skips() {
    let fx = fixture();
    fs::write(fx.config_dir.join("broken.toml"), "= nope").unwrap();

    let f = factory(&fx, "development");
    f.load(&["config", "db", "broken", "absent"]).unwrap();

    let artifact = f.cached().unwrap().unwrap();
    let sources: Vec<_> = artifact.sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(sources, vec!["config", "db"]);
    assert!(artifact.sources.iter().all(|s| s.digest.is_some()));

    let skipped: Vec<_> = artifact.skipped.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(skipped, vec!["broken", "absent"]);
}
