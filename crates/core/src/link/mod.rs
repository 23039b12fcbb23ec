//! Identity linking: binding provider accounts to influencers through a
//! redirect-based authorization flow.

pub mod ports;
pub mod registry;
pub mod resolver;
pub mod service;
pub mod state_token;

pub use ports::{InfluencerRepository, LinkNotifier, ProviderAdapter};
pub use registry::ProviderRegistry;
pub use resolver::{LinkOutcome, LinkResolver};
pub use service::{CallbackParams, LinkService};
pub use state_token::StateTokenCodec;
