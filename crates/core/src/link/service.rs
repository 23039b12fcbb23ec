//! Identity linking service - orchestrates the redirect flow
//!
//! initiate: entity check → state token → consent URL
//! complete: decode state → exchange grant → fetch profile → merge → notify

use std::sync::Arc;

use influlink_domain::{
    validate_influencer_id, Influencer, InfluLinkError, Provider, ProviderProfileFragment, Result,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::ports::{InfluencerRepository, LinkNotifier};
use super::registry::ProviderRegistry;
use super::resolver::{LinkOutcome, LinkResolver};
use super::state_token::StateTokenCodec;

/// Longest accepted influencer display name, in characters.
pub const MAX_NAME_LEN: usize = 200;

/// Redirect parameters delivered to the callback route.
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Provider-reported refusal (`error=access_denied` and friends).
    pub error: Option<String>,
}

pub struct LinkService {
    registry: Arc<ProviderRegistry>,
    tokens: Arc<StateTokenCodec>,
    repository: Arc<dyn InfluencerRepository>,
    resolver: LinkResolver,
    notifier: Arc<dyn LinkNotifier>,
}

impl LinkService {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        tokens: Arc<StateTokenCodec>,
        repository: Arc<dyn InfluencerRepository>,
        notifier: Arc<dyn LinkNotifier>,
    ) -> Self {
        let resolver = LinkResolver::new(Arc::clone(&repository));
        Self { registry, tokens, repository, resolver, notifier }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Build the consent URL for `provider` correlated to `influencer_id`.
    #[instrument(skip(self))]
    pub async fn begin(&self, provider: Provider, influencer_id: &str) -> Result<String> {
        validate_influencer_id(influencer_id)?;
        let adapter = self.registry.get(provider)?;
        self.load(influencer_id).await?;

        let state = self.tokens.encode(influencer_id);
        info!(influencer_id, "authorization flow started");
        Ok(adapter.authorization_url(&state))
    }

    /// Finish a redirect flow.
    ///
    /// Only the grant exchange and the state are fatal; a failed profile
    /// lookup links with credentials alone.
    #[instrument(skip(self, params))]
    pub async fn complete(&self, provider: Provider, params: &CallbackParams) -> Result<LinkOutcome> {
        let influencer_id = self.tokens.decode(params.state.as_deref().unwrap_or_default())?;
        let adapter = self.registry.get(provider)?;

        if let Some(error) = params.error.as_deref().filter(|e| !e.is_empty()) {
            warn!(%influencer_id, error, "provider refused authorization");
            return Err(InfluLinkError::Auth(format!("provider returned error: {error}")));
        }
        let code = params
            .code
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| InfluLinkError::Auth("missing authorization code".to_string()))?;

        self.load(&influencer_id).await?;

        let credentials = adapter.exchange(code).await?;
        let fragment = match adapter.fetch_profile(&credentials).await {
            Ok(fragment) => {
                let missing = fragment.missing_fields(adapter.capabilities());
                if !missing.is_empty() {
                    warn!(%influencer_id, ?missing, "profile lookup returned fewer fields than declared");
                }
                fragment
            }
            Err(err) => {
                warn!(%influencer_id, error = %err, "profile lookup failed, linking with credentials only");
                ProviderProfileFragment::credentials_only(provider, credentials)
            }
        };

        let outcome = self.resolver.resolve(&influencer_id, &fragment).await?;
        let binding = outcome.influencer.social_identity.get(provider);

        if !binding.verified {
            warn!(%influencer_id, "linked without a public handle; binding left unverified");
        }

        if outcome.changed {
            info!(%influencer_id, handle = %binding.handle, "social identity linked");
            if let Err(err) = self.notifier.identity_linked(&outcome.influencer, provider).await {
                warn!(%influencer_id, error = %err, "link notification failed");
            }
        } else {
            info!(%influencer_id, "social identity already up to date");
        }

        Ok(outcome)
    }

    /// Clear one provider binding and recompute the global flag.
    #[instrument(skip(self))]
    pub async fn disconnect(&self, influencer_id: &str, provider: Provider) -> Result<Influencer> {
        validate_influencer_id(influencer_id)?;
        let outcome = self.resolver.disconnect(influencer_id, provider).await?;
        if outcome.changed {
            info!(influencer_id, "social identity disconnected");
        }
        Ok(outcome.influencer)
    }

    /// Record an unverified, self-declared handle.
    ///
    /// # Errors
    /// `Conflict` when the binding is already verified.
    #[instrument(skip(self))]
    pub async fn declare_handle(
        &self,
        influencer_id: &str,
        provider: Provider,
        handle: &str,
        link_url: Option<&str>,
    ) -> Result<Influencer> {
        validate_influencer_id(influencer_id)?;
        let handle = handle.trim();
        if handle.is_empty() {
            return Err(InfluLinkError::InvalidInput("handle is empty".to_string()));
        }
        let link_url = link_url
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .or_else(|| provider.profile_url(Some(handle), None))
            .unwrap_or_default();

        let outcome = self
            .resolver
            .modify(influencer_id, |influencer| {
                let binding = influencer.social_identity.get_mut(provider);
                if binding.verified {
                    return Err(InfluLinkError::Conflict(format!(
                        "{provider} binding is verified; disconnect it first"
                    )));
                }
                if binding.handle == handle && binding.link_url == link_url {
                    return Ok(false);
                }
                binding.handle = handle.to_string();
                binding.link_url.clone_from(&link_url);
                Ok(true)
            })
            .await?;

        Ok(outcome.influencer)
    }

    /// Create a fresh, unlinked influencer.
    #[instrument(skip(self))]
    pub async fn create_influencer(&self, name: &str) -> Result<Influencer> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InfluLinkError::InvalidInput("name is empty".to_string()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(InfluLinkError::InvalidInput(format!(
                "name exceeds {MAX_NAME_LEN} characters"
            )));
        }

        let id = format!("inf_{}", Uuid::now_v7().simple());
        let influencer = self.repository.insert(Influencer::new(id, name)).await?;
        info!(influencer_id = %influencer.id, "influencer created");
        Ok(influencer)
    }

    /// # Errors
    /// `EntityNotFound` when absent.
    pub async fn load(&self, influencer_id: &str) -> Result<Influencer> {
        validate_influencer_id(influencer_id)?;
        self.repository
            .get(influencer_id)
            .await?
            .ok_or_else(|| InfluLinkError::EntityNotFound(influencer_id.to_string()))
    }
}
