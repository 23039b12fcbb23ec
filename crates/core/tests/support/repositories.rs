//! Mock repository and notifier implementations for testing

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use influlink_core::{InfluencerRepository, LinkNotifier};
use influlink_domain::{Influencer, InfluLinkError, Provider, Result as DomainResult};
use parking_lot::Mutex;

/// In-memory mock for `InfluencerRepository`.
///
/// Counts writes and can be told to simulate concurrent writers: each
/// pending conflict bumps the stored version just before an update.
#[derive(Default, Clone)]
pub struct MockInfluencerRepository {
    documents: Arc<Mutex<HashMap<String, Influencer>>>,
    writes: Arc<AtomicUsize>,
    pending_conflicts: Arc<AtomicU32>,
}

impl MockInfluencerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document directly, bypassing write counting.
    pub fn with_influencer(self, mut influencer: Influencer) -> Self {
        influencer.version = influencer.version.max(1);
        self.documents.lock().insert(influencer.id.clone(), influencer);
        self
    }

    pub fn inject_conflicts(&self, count: u32) {
        self.pending_conflicts.store(count, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self, id: &str) -> Option<Influencer> {
        self.documents.lock().get(id).cloned()
    }
}

#[async_trait]
impl InfluencerRepository for MockInfluencerRepository {
    async fn get(&self, id: &str) -> DomainResult<Option<Influencer>> {
        Ok(self.documents.lock().get(id).cloned())
    }

    async fn insert(&self, mut influencer: Influencer) -> DomainResult<Influencer> {
        let mut documents = self.documents.lock();
        if documents.contains_key(&influencer.id) {
            return Err(InfluLinkError::Conflict(influencer.id));
        }
        influencer.version = 1;
        documents.insert(influencer.id.clone(), influencer.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(influencer)
    }

    async fn update(&self, mut influencer: Influencer, expected_version: u64) -> DomainResult<Influencer> {
        let mut documents = self.documents.lock();
        let stored = documents
            .get_mut(&influencer.id)
            .ok_or_else(|| InfluLinkError::EntityNotFound(influencer.id.clone()))?;

        if self
            .pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            stored.version += 1;
        }

        if stored.version != expected_version {
            return Err(InfluLinkError::MergeConflict(format!(
                "expected version {expected_version}, found {}",
                stored.version
            )));
        }

        influencer.version = expected_version + 1;
        *stored = influencer.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(influencer)
    }
}

/// Records every link notification.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<(String, Provider)>>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<(String, Provider)> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl LinkNotifier for RecordingNotifier {
    async fn identity_linked(&self, influencer: &Influencer, provider: Provider) -> DomainResult<()> {
        self.events.lock().push((influencer.id.clone(), provider));
        Ok(())
    }
}
