//! SQLite-backed influencer document store.
//!
//! Each influencer is stored as one JSON document. The `version` column is
//! authoritative: writes are conditional on it, and reads overwrite the
//! document's own copy with the column value.

use std::sync::Arc;

use async_trait::async_trait;
use influlink_core::InfluencerRepository as InfluencerRepositoryPort;
use influlink_domain::{Influencer, InfluLinkError, Result as DomainResult};
use rusqlite::{params, OptionalExtension};
use tokio::task;

use super::manager::{map_sql_error, DbManager, SqliteConnection};
use crate::errors::InfraError;

pub struct SqliteInfluencerRepository {
    db: Arc<DbManager>,
}

impl SqliteInfluencerRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InfluencerRepositoryPort for SqliteInfluencerRepository {
    async fn get(&self, id: &str) -> DomainResult<Option<Influencer>> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<Influencer>> {
            let conn = db.get_connection()?;
            load_document(&conn, &id)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn insert(&self, mut influencer: Influencer) -> DomainResult<Influencer> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Influencer> {
            influencer.version = 1;
            let document = encode(&influencer)?;
            let conn = db.get_connection()?;

            let inserted = conn
                .execute(
                    "INSERT OR IGNORE INTO influencers (id, document, version, is_verified, created_at, updated_at)
                     VALUES (?1, ?2, 1, ?3, ?4, ?5)",
                    params![
                        influencer.id,
                        document,
                        influencer.is_verified,
                        influencer.created_at.timestamp(),
                        influencer.updated_at.timestamp(),
                    ],
                )
                .map_err(map_sql_error)?;

            if inserted == 0 {
                return Err(InfluLinkError::Conflict(format!(
                    "influencer {} already exists",
                    influencer.id
                )));
            }
            Ok(influencer)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update(&self, mut influencer: Influencer, expected_version: u64) -> DomainResult<Influencer> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Influencer> {
            influencer.version = expected_version + 1;
            let document = encode(&influencer)?;
            let conn = db.get_connection()?;

            let updated = conn
                .execute(
                    "UPDATE influencers
                     SET document = ?1, version = ?2, is_verified = ?3, updated_at = ?4
                     WHERE id = ?5 AND version = ?6",
                    params![
                        document,
                        to_sql_version(influencer.version)?,
                        influencer.is_verified,
                        influencer.updated_at.timestamp(),
                        influencer.id,
                        to_sql_version(expected_version)?,
                    ],
                )
                .map_err(map_sql_error)?;

            if updated == 1 {
                return Ok(influencer);
            }

            let current: Option<i64> = conn
                .query_row("SELECT version FROM influencers WHERE id = ?1", params![influencer.id], |row| {
                    row.get(0)
                })
                .optional()
                .map_err(map_sql_error)?;

            Err(match current {
                None => InfluLinkError::EntityNotFound(influencer.id),
                Some(current) => InfluLinkError::MergeConflict(format!(
                    "influencer {} is at version {current}, expected {expected_version}",
                    influencer.id
                )),
            })
        })
        .await
        .map_err(map_join_error)?
    }
}

fn load_document(conn: &SqliteConnection, id: &str) -> DomainResult<Option<Influencer>> {
    let row: Option<(String, i64)> = conn
        .query_row("SELECT document, version FROM influencers WHERE id = ?1", params![id], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .optional()
        .map_err(map_sql_error)?;

    row.map(|(document, version)| {
        let mut influencer: Influencer = serde_json::from_str(&document)
            .map_err(|err| InfluLinkError::from(InfraError::from(err)))?;
        influencer.version = u64::try_from(version)
            .map_err(|_| InfluLinkError::Database(format!("negative version for {id}")))?;
        Ok(influencer)
    })
    .transpose()
}

fn encode(influencer: &Influencer) -> DomainResult<String> {
    serde_json::to_string(influencer).map_err(|err| InfluLinkError::from(InfraError::from(err)))
}

fn to_sql_version(version: u64) -> DomainResult<i64> {
    i64::try_from(version).map_err(|_| InfluLinkError::Database("version overflow".into()))
}

fn map_join_error(err: task::JoinError) -> InfluLinkError {
    if err.is_cancelled() {
        InfluLinkError::Internal("blocking influencer repository task cancelled".into())
    } else {
        InfluLinkError::Internal(format!("blocking influencer repository task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use influlink_domain::{Provider, SocialIdentity};
    use tempfile::TempDir;

    use super::*;

    fn setup() -> (TempDir, SqliteInfluencerRepository) {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db = DbManager::new(temp_dir.path().join("influlink.db"), 2).expect("manager created");
        db.run_migrations().expect("migrations run");
        (temp_dir, SqliteInfluencerRepository::new(Arc::new(db)))
    }

    #[tokio::test]
    async fn insert_then_get_round_trips_document() {
        let (_dir, repo) = setup();
        let mut influencer = Influencer::new("inf_1", "Acme");
        influencer.social_identity.twitch =
            SocialIdentity { handle: "acme_live".into(), ..SocialIdentity::default() };

        let stored = repo.insert(influencer).await.unwrap();
        assert_eq!(stored.version, 1);

        let loaded = repo.get("inf_1").await.unwrap().expect("document present");
        assert_eq!(loaded, stored);
        assert!(repo.get("inf_missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_conflict() {
        let (_dir, repo) = setup();
        repo.insert(Influencer::new("inf_1", "Acme")).await.unwrap();

        let result = repo.insert(Influencer::new("inf_1", "Other")).await;
        assert!(matches!(result, Err(InfluLinkError::Conflict(_))));
        assert_eq!(repo.get("inf_1").await.unwrap().unwrap().name, "Acme");
    }

    #[tokio::test]
    async fn update_requires_current_version() {
        let (_dir, repo) = setup();
        let stored = repo.insert(Influencer::new("inf_1", "Acme")).await.unwrap();

        let mut first = stored.clone();
        first.disconnect(Provider::Youtube);
        first.name = "Acme Studio".into();
        let first = repo.update(first, stored.version).await.unwrap();
        assert_eq!(first.version, 2);

        let stale = repo.update(stored.clone(), stored.version).await;
        assert!(matches!(stale, Err(InfluLinkError::MergeConflict(_))));

        let loaded = repo.get("inf_1").await.unwrap().unwrap();
        assert_eq!(loaded.name, "Acme Studio");
        assert_eq!(loaded.version, 2);
    }

    #[tokio::test]
    async fn update_of_missing_document_is_not_found() {
        let (_dir, repo) = setup();
        let result = repo.update(Influencer::new("inf_ghost", "Ghost"), 1).await;
        assert!(matches!(result, Err(InfluLinkError::EntityNotFound(_))));
    }
}
