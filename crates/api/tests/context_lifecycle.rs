//! AppContext wiring against a real SQLite file
//!
//! Verifies startup with a configured database path, that influencers
//! written through one context are read by the next, and that an
//! unwritable path fails startup instead of silently falling back.

use std::sync::Arc;

use influlink_api::AppContext;
use influlink_domain::{Config, DatabaseConfig};
use tempfile::TempDir;

fn sqlite_config(temp_dir: &TempDir) -> Config {
    Config {
        database: DatabaseConfig {
            path: Some(temp_dir.path().join("influlink.db").to_string_lossy().into_owned()),
            pool_size: 2,
        },
        ..Config::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn context_with_database_is_healthy() {
    let temp_dir = TempDir::new().expect("temporary directory");
    let ctx = AppContext::new(sqlite_config(&temp_dir)).expect("context should start");

    assert!(ctx.db.is_some());
    let health = ctx.health_check().await;
    let database = health.components.iter().find(|c| c.name == "database").expect("database component");
    assert!(database.is_healthy);
    // no providers configured
    assert!(!health.is_healthy);
}

#[tokio::test(flavor = "multi_thread")]
async fn influencers_survive_context_restart() {
    let temp_dir = TempDir::new().expect("temporary directory");

    let id = {
        let ctx = Arc::new(AppContext::new(sqlite_config(&temp_dir)).expect("first start"));
        ctx.links.create_influencer("Persistent").await.expect("create").id
    };

    let ctx = AppContext::new(sqlite_config(&temp_dir)).expect("second start");
    let loaded = ctx.links.load(&id).await.expect("load after restart");
    assert_eq!(loaded.name, "Persistent");
    assert_eq!(loaded.version, 1);
}

#[test]
fn missing_admin_token_authorizes_everyone() {
    let ctx = AppContext::new(Config::default()).expect("in-memory context");
    assert!(ctx.db.is_none());
    assert!(ctx.is_authorized(None));
}

#[test]
fn configured_admin_token_is_enforced() {
    let mut config = Config::default();
    config.security.admin_token = Some("  s3cret ".into());
    let ctx = AppContext::new(config).expect("in-memory context");

    assert!(ctx.is_authorized(Some("s3cret")));
    assert!(!ctx.is_authorized(Some("s3cre")));
    assert!(!ctx.is_authorized(None));
}

#[test]
fn unopenable_database_fails_startup() {
    let temp_dir = TempDir::new().expect("temporary directory");
    let blocker = temp_dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").expect("write blocker");

    let config = Config {
        database: DatabaseConfig {
            path: Some(blocker.join("influlink.db").to_string_lossy().into_owned()),
            pool_size: 1,
        },
        ..Config::default()
    };
    assert!(AppContext::new(config).is_err());
}
