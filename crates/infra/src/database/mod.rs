//! Influencer document persistence

pub mod influencer_repository;
pub mod manager;
pub mod memory;

pub use influencer_repository::SqliteInfluencerRepository;
pub use manager::{DbManager, SqliteConnection, SqlitePool};
pub use memory::InMemoryInfluencerRepository;
