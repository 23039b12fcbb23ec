//! Redirect flow: consent redirect and provider callback

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use influlink_core::CallbackParams;
use influlink_domain::InfluLinkError;
use serde::Deserialize;
use tracing::warn;

use super::parse_provider;
use crate::access::Caller;
use crate::context::AppContext;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginQuery {
    entity_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// `GET /auth/{provider}?entityId=` → 303 to the consent screen.
pub async fn begin(
    State(ctx): State<Arc<AppContext>>,
    caller: Caller,
    Path(provider): Path<String>,
    Query(query): Query<BeginQuery>,
) -> ApiResult<Redirect> {
    caller.require()?;
    let provider = parse_provider(&provider)?;
    let entity_id = query
        .entity_id
        .ok_or_else(|| InfluLinkError::InvalidInput("entityId is required".to_string()))?;

    let consent_url = ctx.links.begin(provider, &entity_id).await?;
    Ok(Redirect::to(&consent_url))
}

/// `GET /auth/{provider}/callback` → terminal HTML page.
///
/// The failure page is the same for every cause; the reason is logged.
pub async fn callback(
    State(ctx): State<Arc<AppContext>>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let params = CallbackParams { code: query.code, state: query.state, error: query.error };

    let result = match parse_provider(&provider) {
        Ok(provider) => ctx.links.complete(provider, &params).await.map(|_| provider).map_err(ApiError::from),
        Err(err) => Err(err),
    };

    match result {
        Ok(provider) => Html(page(
            "Account linked",
            &format!("Your {provider} account is now connected. You can close this window."),
        ))
        .into_response(),
        Err(err) => {
            warn!(provider = %provider, status = %err.status(), code = err.code(), "authorization callback failed");
            let body = page("Linking failed", "We could not connect your account. Please try again.");
            (err.status(), Html(body)).into_response()
        }
    }
}

fn page(title: &str, message: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body><h1>{title}</h1><p>{message}</p></body></html>"
    )
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn page_embeds_title_and_message() {
        let html = page("Account linked", "done");
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<h1>Account linked</h1>"));
        assert!(html.contains("<p>done</p>"));
    }

    #[test]
    fn decode_failures_are_client_errors() {
        let err = ApiError::from(InfluLinkError::corrupt_state());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "INVALID_STATE");
    }
}
