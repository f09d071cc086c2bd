use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, extract::Caller, routes::ListResponse},
    app_error::AppResult,
    application::{
        access_policy::{ClaimPattern, Constraint},
        jwt::ClaimKind,
    },
    domain::entities::role::Role,
    use_cases::account::NewAccountInput,
};

const ADMIN_ONLY: &[ClaimPattern] = &[ClaimPattern::any(ClaimKind::Admin)];

const ADMIN_OR_ANY_USER: &[ClaimPattern] = &[
    ClaimPattern::any(ClaimKind::Admin),
    ClaimPattern::any(ClaimKind::User),
];

const ADMIN_OR_ADMIN_USER: &[ClaimPattern] = &[
    ClaimPattern::any(ClaimKind::Admin),
    ClaimPattern::with(ClaimKind::User, &[Constraint::role(Role::Admin)]),
];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/accounts", get(list_accounts).post(create_account))
        .route("/v1/accounts/", get(list_accounts).post(create_account))
        .route("/v1/accounts/create", post(create_account_with_admin))
        .route(
            "/v1/accounts/{accountId}",
            get(get_account).delete(delete_account),
        )
        .route("/v1/accounts/{accountId}/name", patch(rename_account))
        .route(
            "/v1/accounts/{accountId}/urlFriendlyName",
            patch(change_url_friendly_name),
        )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountPayload {
    name: String,
    url_friendly_name: String,
}

#[derive(Deserialize)]
struct FirstUserPayload {
    name: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct CreateAccountWithAdminPayload {
    account: AccountPayload,
    user: FirstUserPayload,
}

#[derive(Deserialize)]
struct NamePayload {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UrlFriendlyNamePayload {
    url_friendly_name: String,
}

async fn list_accounts(
    State(app_state): State<AppState>,
    caller: Caller,
) -> AppResult<impl IntoResponse> {
    caller.authorize(&app_state, ADMIN_ONLY)?;
    let accounts = app_state.account_use_cases.list().await?;
    Ok(Json(ListResponse::from(accounts)))
}

async fn create_account(
    State(app_state): State<AppState>,
    caller: Caller,
    payload: Result<Json<AccountPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    caller.authorize(&app_state, ADMIN_ONLY)?;
    let Json(payload) = payload?;
    let account = app_state
        .account_use_cases
        .create(&payload.name, &payload.url_friendly_name)
        .await?;
    Ok(Json(account))
}

/// Open sign-up endpoint.
async fn create_account_with_admin(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateAccountWithAdminPayload>,
) -> AppResult<impl IntoResponse> {
    let created = app_state
        .account_use_cases
        .create_with_admin(NewAccountInput {
            account_name: payload.account.name,
            url_friendly_name: payload.account.url_friendly_name,
            user_name: payload.user.name,
            user_email: payload.user.email,
            user_password: payload.user.password,
        })
        .await?;
    Ok(Json(created))
}

async fn get_account(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(account_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    caller.authorize(&app_state, ADMIN_OR_ANY_USER)?;
    let account = app_state.account_use_cases.get(account_id).await?;
    Ok(Json(account))
}

async fn delete_account(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(account_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    caller.authorize(&app_state, ADMIN_OR_ADMIN_USER)?;
    let deleted = app_state.account_use_cases.delete(account_id).await?;
    Ok(Json(deleted))
}

async fn rename_account(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(account_id): Path<Uuid>,
    payload: Result<Json<NamePayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    caller.authorize(&app_state, ADMIN_OR_ADMIN_USER)?;
    let Json(payload) = payload?;
    let account = app_state
        .account_use_cases
        .rename(account_id, &payload.name)
        .await?;
    Ok(Json(account))
}

async fn change_url_friendly_name(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(account_id): Path<Uuid>,
    payload: Result<Json<UrlFriendlyNamePayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    caller.authorize(&app_state, ADMIN_OR_ADMIN_USER)?;
    let Json(payload) = payload?;
    let account = app_state
        .account_use_cases
        .change_url_friendly_name(account_id, &payload.url_friendly_name)
        .await?;
    Ok(Json(account))
}
