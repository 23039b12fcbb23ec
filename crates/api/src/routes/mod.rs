//! HTTP routes
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /auth/{provider}` | [`auth::begin`] |
//! | `GET /auth/{provider}/callback` | [`auth::callback`] |
//! | `POST /influencers` | [`influencers::create`] |
//! | `GET /influencers/{id}` | [`influencers::show`] |
//! | `PUT /influencers/{id}/social/{provider}` | [`influencers::declare_handle`] |
//! | `DELETE /influencers/{id}/social/{provider}` | [`influencers::disconnect`] |
//! | `GET /health` | [`health::health`] |

pub mod auth;
pub mod health;
pub mod influencers;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use influlink_domain::Provider;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::error::ApiError;

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/auth/{provider}", get(auth::begin))
        .route("/auth/{provider}/callback", get(auth::callback))
        .route("/influencers", post(influencers::create))
        .route("/influencers/{id}", get(influencers::show))
        .route(
            "/influencers/{id}/social/{provider}",
            put(influencers::declare_handle).delete(influencers::disconnect),
        )
        .route("/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Provider from a path segment; `facebook` routes to Instagram.
pub(crate) fn parse_provider(segment: &str) -> Result<Provider, ApiError> {
    segment.parse::<Provider>().map_err(ApiError::from)
}
