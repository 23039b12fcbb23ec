//! Port interfaces for identity linking
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use influlink_domain::{
    Credentials, Influencer, ProfileCapabilities, Provider, ProviderProfileFragment, Result,
};

/// One external platform's authorization and profile lookup.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Provider whose binding this adapter produces
    fn provider(&self) -> Provider;

    /// Which identifying fields `fetch_profile` can supply; a fragment
    /// falling short of this is logged when the link completes
    fn capabilities(&self) -> ProfileCapabilities;

    /// Consent screen URL carrying `state` verbatim
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization grant for credentials
    ///
    /// Fails with `InfluLinkError::Auth` when the provider refuses the grant.
    async fn exchange(&self, grant: &str) -> Result<Credentials>;

    /// Fetch the canonical profile fragment for freshly issued credentials
    ///
    /// Fails with `InfluLinkError::ProfileFetch`; callers treat that as
    /// non-fatal.
    async fn fetch_profile(&self, credentials: &Credentials) -> Result<ProviderProfileFragment>;
}

/// Trait for influencer document persistence
#[async_trait]
pub trait InfluencerRepository: Send + Sync {
    /// Get an influencer by ID
    async fn get(&self, id: &str) -> Result<Option<Influencer>>;

    /// Insert a new influencer; the stored copy starts at version 1
    ///
    /// Fails with `InfluLinkError::Conflict` when the id is taken.
    async fn insert(&self, influencer: Influencer) -> Result<Influencer>;

    /// Replace an influencer if its stored version still equals
    /// `expected_version`, bumping the version
    ///
    /// Fails with `InfluLinkError::MergeConflict` when the version moved and
    /// `InfluLinkError::EntityNotFound` when the document is gone.
    async fn update(&self, influencer: Influencer, expected_version: u64) -> Result<Influencer>;
}

/// Notification channel signalled once per effective link change
#[async_trait]
pub trait LinkNotifier: Send + Sync {
    async fn identity_linked(&self, influencer: &Influencer, provider: Provider) -> Result<()>;
}
