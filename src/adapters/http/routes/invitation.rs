use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, extract::Caller},
    app_error::AppResult,
    application::{
        access_policy::{ClaimPattern, Constraint},
        jwt::ClaimKind,
    },
    domain::entities::role::Role,
};

const SEND_POLICY: &[ClaimPattern] = &[
    ClaimPattern::any(ClaimKind::Admin),
    ClaimPattern::with(ClaimKind::User, &[Constraint::role(Role::Admin)]),
];

/// Only an invitation minted for this very account.
const ACCEPT_POLICY: &[ClaimPattern] = &[ClaimPattern::with(
    ClaimKind::Invitation,
    &[Constraint::account_id_param("accountId")],
)];

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/accounts/{accountId}/invitation/send",
            post(send_invitation),
        )
        .route(
            "/v1/accounts/{accountId}/invitation/accept",
            post(accept_invitation),
        )
}

#[derive(Deserialize)]
struct SendInvitationPayload {
    email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AcceptInvitationPayload {
    new_password: String,
    new_password_again: String,
}

#[derive(Serialize)]
struct SendInvitationResponse {
    success: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AcceptInvitationResponse {
    login_token: String,
}

async fn send_invitation(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(account_id): Path<Uuid>,
    payload: Result<Json<SendInvitationPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    caller.authorize(&app_state, SEND_POLICY)?;
    let Json(payload) = payload?;
    app_state
        .invitation_use_cases
        .send(account_id, &payload.email)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SendInvitationResponse { success: true }),
    ))
}

async fn accept_invitation(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(account_id): Path<Uuid>,
    payload: Result<Json<AcceptInvitationPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let claim = caller.authorize(&app_state, ACCEPT_POLICY)?;
    let Json(payload) = payload?;
    let login_token = app_state
        .invitation_use_cases
        .accept(
            &claim,
            account_id,
            &payload.new_password,
            &payload.new_password_again,
        )
        .await?;
    Ok(Json(AcceptInvitationResponse { login_token }))
}
