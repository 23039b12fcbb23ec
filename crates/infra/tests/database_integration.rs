//! End-to-end coverage for the SQLite influencer store.
//!
//! Each test operates on an isolated database with migrations applied and
//! drives it through the core linking services rather than raw SQL.

use std::sync::Arc;

use influlink_core::{InfluencerRepository, LinkResolver};
use influlink_domain::{Credentials, Influencer, InfluLinkError, Provider, ProviderProfileFragment};
use influlink_infra::database::{DbManager, SqliteInfluencerRepository};
use tempfile::TempDir;

struct DbHarness {
    temp_dir: TempDir,
    manager: Arc<DbManager>,
}

impl DbHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("temporary directory should be created");
        let manager = Arc::new(
            DbManager::new(temp_dir.path().join("influlink.db"), 4)
                .expect("database manager should initialise"),
        );
        manager.run_migrations().expect("schema migrations should apply");
        Self { temp_dir, manager }
    }

    fn repository(&self) -> Arc<SqliteInfluencerRepository> {
        Arc::new(SqliteInfluencerRepository::new(Arc::clone(&self.manager)))
    }
}

fn fragment(provider: Provider, handle: &str) -> ProviderProfileFragment {
    let credentials = Credentials {
        access_token: format!("{handle}-token"),
        refresh_token: None,
        expires_at: None,
        scope: None,
    };
    ProviderProfileFragment {
        handle: Some(handle.to_string()),
        external_id: Some(format!("{handle}-id")),
        ..ProviderProfileFragment::credentials_only(provider, credentials)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_links_to_different_providers_both_land() {
    let harness = DbHarness::new();
    let repository = harness.repository();
    repository.insert(Influencer::new("inf_race", "Race")).await.expect("seed");

    let resolver = Arc::new(LinkResolver::new(repository.clone()));
    let youtube = {
        let resolver = Arc::clone(&resolver);
        tokio::spawn(async move { resolver.resolve("inf_race", &fragment(Provider::Youtube, "acme")).await })
    };
    let twitch = {
        let resolver = Arc::clone(&resolver);
        tokio::spawn(async move { resolver.resolve("inf_race", &fragment(Provider::Twitch, "acme_live")).await })
    };

    youtube.await.expect("join").expect("youtube link");
    twitch.await.expect("join").expect("twitch link");

    let stored = repository.get("inf_race").await.unwrap().expect("document");
    assert!(stored.social_identity.youtube.verified);
    assert!(stored.social_identity.twitch.verified);
    assert_eq!(stored.social_identity.twitch.link_url, "https://www.twitch.tv/acme_live");
    assert_eq!(stored.version, 3);
    assert!(stored.is_verified);
}

#[tokio::test]
async fn documents_survive_reopening_the_database() {
    let harness = DbHarness::new();
    let path = harness.manager.path().to_path_buf();
    {
        let repository = harness.repository();
        repository.insert(Influencer::new("inf_persist", "Persist")).await.unwrap();
        LinkResolver::new(repository)
            .resolve("inf_persist", &fragment(Provider::Tiktok, "dancer"))
            .await
            .unwrap();
    }

    let reopened = Arc::new(DbManager::new(&path, 1).expect("reopen"));
    reopened.run_migrations().expect("migrations are idempotent");
    let repository = SqliteInfluencerRepository::new(reopened);

    let stored = repository.get("inf_persist").await.unwrap().expect("persisted");
    assert_eq!(stored.social_identity.tiktok.handle, "dancer");
    assert_eq!(
        stored.social_identity.tiktok.credentials.as_ref().map(|c| c.access_token.as_str()),
        Some("dancer-token")
    );
    assert!(harness.temp_dir.path().join("influlink.db").exists());
}

#[tokio::test]
async fn resolving_unknown_influencer_is_not_found() {
    let harness = DbHarness::new();
    let resolver = LinkResolver::new(harness.repository());

    let result = resolver.resolve("inf_ghost", &fragment(Provider::Youtube, "ghost")).await;
    assert!(matches!(result, Err(InfluLinkError::EntityNotFound(_))));
}
