//! Link notifications
//!
//! The default notifier records each effective link as a structured event;
//! downstream consumers tail the log.

use async_trait::async_trait;
use influlink_core::LinkNotifier;
use influlink_domain::{Influencer, Provider, Result};
use tracing::info;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLinkNotifier;

impl TracingLinkNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LinkNotifier for TracingLinkNotifier {
    async fn identity_linked(&self, influencer: &Influencer, provider: Provider) -> Result<()> {
        let identity = influencer.social_identity.get(provider);
        info!(
            target: "influlink::events",
            influencer_id = %influencer.id,
            %provider,
            handle = %identity.handle,
            verified = identity.verified,
            version = influencer.version,
            "identity linked"
        );
        Ok(())
    }
}
