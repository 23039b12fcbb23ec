//! In-process influencer store used when no database path is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use influlink_core::InfluencerRepository;
use influlink_domain::{Influencer, InfluLinkError, Result};
use parking_lot::RwLock;

#[derive(Default)]
pub struct InMemoryInfluencerRepository {
    documents: RwLock<HashMap<String, Influencer>>,
}

impl InMemoryInfluencerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

#[async_trait]
impl InfluencerRepository for InMemoryInfluencerRepository {
    async fn get(&self, id: &str) -> Result<Option<Influencer>> {
        Ok(self.documents.read().get(id).cloned())
    }

    async fn insert(&self, mut influencer: Influencer) -> Result<Influencer> {
        let mut documents = self.documents.write();
        if documents.contains_key(&influencer.id) {
            return Err(InfluLinkError::Conflict(format!(
                "influencer {} already exists",
                influencer.id
            )));
        }
        influencer.version = 1;
        documents.insert(influencer.id.clone(), influencer.clone());
        Ok(influencer)
    }

    async fn update(&self, mut influencer: Influencer, expected_version: u64) -> Result<Influencer> {
        let mut documents = self.documents.write();
        let stored = documents
            .get_mut(&influencer.id)
            .ok_or_else(|| InfluLinkError::EntityNotFound(influencer.id.clone()))?;

        if stored.version != expected_version {
            return Err(InfluLinkError::MergeConflict(format!(
                "influencer {} is at version {}, expected {expected_version}",
                influencer.id, stored.version
            )));
        }

        influencer.version = expected_version + 1;
        *stored = influencer.clone();
        Ok(influencer)
    }
}
