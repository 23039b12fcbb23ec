//! Influencer reads and the minimal write surface that feeds linking

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use influlink_domain::{InfluencerView, StatsSnapshot};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::parse_provider;
use crate::access::Caller;
use crate::context::AppContext;
use crate::error::ApiResult;

/// Public view, plus statistics for authorized callers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfluencerResponse {
    #[serde(flatten)]
    pub influencer: InfluencerView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsSnapshot>,
}

#[derive(Debug, Deserialize)]
pub struct CreateInfluencer {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclareHandle {
    handle: String,
    link_url: Option<String>,
}

/// `POST /influencers`
pub async fn create(
    State(ctx): State<Arc<AppContext>>,
    caller: Caller,
    Json(body): Json<CreateInfluencer>,
) -> ApiResult<(StatusCode, Json<InfluencerView>)> {
    caller.require()?;
    let influencer = ctx.links.create_influencer(&body.name).await?;
    Ok((StatusCode::CREATED, Json(influencer.public_view())))
}

/// `GET /influencers/{id}`
///
/// Aggregation never fails the request; degraded providers are listed in
/// the snapshot.
pub async fn show(
    State(ctx): State<Arc<AppContext>>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<InfluencerResponse>> {
    let influencer = ctx.links.load(&id).await?;

    let stats = if caller.authorized {
        let snapshot = ctx.stats.aggregate(&influencer).await;
        debug!(influencer_id = %id, degraded = snapshot.degraded.len(), "statistics aggregated");
        Some(snapshot)
    } else {
        None
    };

    Ok(Json(InfluencerResponse { influencer: influencer.public_view(), stats }))
}

/// `PUT /influencers/{id}/social/{provider}`
pub async fn declare_handle(
    State(ctx): State<Arc<AppContext>>,
    caller: Caller,
    Path((id, provider)): Path<(String, String)>,
    Json(body): Json<DeclareHandle>,
) -> ApiResult<Json<InfluencerView>> {
    caller.require()?;
    let provider = parse_provider(&provider)?;
    let influencer =
        ctx.links.declare_handle(&id, provider, &body.handle, body.link_url.as_deref()).await?;
    Ok(Json(influencer.public_view()))
}

/// `DELETE /influencers/{id}/social/{provider}`
pub async fn disconnect(
    State(ctx): State<Arc<AppContext>>,
    caller: Caller,
    Path((id, provider)): Path<(String, String)>,
) -> ApiResult<Json<InfluencerView>> {
    caller.require()?;
    let provider = parse_provider(&provider)?;
    let influencer = ctx.links.disconnect(&id, provider).await?;
    Ok(Json(influencer.public_view()))
}
