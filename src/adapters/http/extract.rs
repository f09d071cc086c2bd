//! Bearer token extraction and per-route authorization.

use axum::{
    extract::{FromRequestParts, RawPathParams},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::{
        access_policy::{ClaimPattern, RequestContext, authorize},
        jwt::Claim,
    },
};

/// Extract token from Authorization Bearer header.
pub fn extract_from_header(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The caller's bearer token together with the raw path parameters it will
/// be checked against.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    token: Option<String>,
    params: RequestContext,
}

impl Caller {
    pub fn authorize(&self, app_state: &AppState, policy: &[ClaimPattern]) -> AppResult<Claim> {
        authorize(self.token.as_deref(), &app_state.tokens, policy, &self.params)
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(extract_from_header)
            .map(str::to_owned);

        // Routes without path parameters have nothing to scope against.
        let params = match RawPathParams::from_request_parts(parts, state).await {
            Ok(raw) => raw
                .iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
            Err(_) => RequestContext::new(),
        };

        Ok(Self { token, params })
    }
}
