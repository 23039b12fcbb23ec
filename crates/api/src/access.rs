//! Caller authorization from the `Authorization: Bearer` header

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::context::AppContext;
use crate::error::ApiError;

/// Whether the request carried the admin token.
///
/// Extraction never fails; routes that need privileges call
/// [`Caller::require`], others branch on [`Caller::authorized`].
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub authorized: bool,
}

impl Caller {
    pub fn require(self) -> Result<(), ApiError> {
        if self.authorized {
            Ok(())
        } else {
            Err(ApiError::unauthorized())
        }
    }
}

fn bearer(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then_some(token)
}

impl FromRequestParts<Arc<AppContext>> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, ctx: &Arc<AppContext>) -> Result<Self, Self::Rejection> {
        Ok(Self { authorized: ctx.is_authorized(bearer(parts)) })
    }
}
