//! Domain types and models

pub mod influencer;
pub mod profile;
pub mod provider;
pub mod stats;

pub use influencer::{
    validate_influencer_id, Credentials, Influencer, InfluencerView, SocialIdentities,
    SocialIdentity, SocialIdentityView, MAX_INFLUENCER_ID_LEN,
};
pub use profile::{ProfileCapabilities, ProviderProfileFragment};
pub use provider::{strip_at, Provider};
pub use stats::{quality_score, AudienceShare, StatsFragment, StatsOrigin, StatsSnapshot};
