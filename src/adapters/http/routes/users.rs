use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, extract::Caller, routes::ListResponse},
    app_error::AppResult,
    application::{
        access_policy::{ClaimPattern, Constraint},
        jwt::ClaimKind,
    },
    domain::entities::role::Role,
};

const ADMIN_OR_ANY_USER: &[ClaimPattern] = &[
    ClaimPattern::any(ClaimKind::Admin),
    ClaimPattern::any(ClaimKind::User),
];

const ADMIN_OR_ADMIN_USER: &[ClaimPattern] = &[
    ClaimPattern::any(ClaimKind::Admin),
    ClaimPattern::with(ClaimKind::User, &[Constraint::role(Role::Admin)]),
];

/// Admins, or the user editing their own record.
const ADMIN_OR_SELF: &[ClaimPattern] = &[
    ClaimPattern::any(ClaimKind::Admin),
    ClaimPattern::with(ClaimKind::User, &[Constraint::role(Role::Admin)]),
    ClaimPattern::with(ClaimKind::User, &[Constraint::user_id_param("id")]),
];

const ACCESS_TOKEN_POLICY: &[ClaimPattern] = &[
    ClaimPattern::any(ClaimKind::Admin),
    ClaimPattern::with(
        ClaimKind::Login,
        &[
            Constraint::user_id_param("id"),
            Constraint::account_id_param("accountId"),
        ],
    ),
    ClaimPattern::with(
        ClaimKind::User,
        &[
            Constraint::user_id_param("id"),
            Constraint::account_id_param("accountId"),
        ],
    ),
];

const FINALIZE_REGISTRATION_POLICY: &[ClaimPattern] = &[ClaimPattern::with(
    ClaimKind::Registration,
    &[
        Constraint::user_id_param("id"),
        Constraint::account_id_param("accountId"),
    ],
)];

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/accounts/{accountId}/users",
            get(list_users).post(create_user),
        )
        .route(
            "/v1/accounts/{accountId}/users/{id}",
            get(get_user).delete(delete_user),
        )
        .route("/v1/accounts/{accountId}/users/{id}/name", patch(rename_user))
        .route(
            "/v1/accounts/{accountId}/users/{id}/password",
            patch(change_password),
        )
        .route("/v1/accounts/{accountId}/users/{id}/role", patch(change_role))
        .route(
            "/v1/accounts/{accountId}/users/{id}/access-token",
            get(issue_access_token),
        )
        .route(
            "/v1/accounts/{accountId}/users/{id}/finalize-registration",
            post(finalize_registration),
        )
}

#[derive(Deserialize)]
struct CreateUserPayload {
    name: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct NamePayload {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordPayload {
    password: String,
    password_again: String,
}

#[derive(Deserialize)]
struct RolePayload {
    role: Role,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccessTokenResponse {
    access_token: String,
}

async fn list_users(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(account_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    caller.authorize(&app_state, ADMIN_OR_ANY_USER)?;
    let users = app_state.user_use_cases.list(account_id).await?;
    Ok(Json(ListResponse::from(users)))
}

async fn create_user(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(account_id): Path<Uuid>,
    payload: Result<Json<CreateUserPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    caller.authorize(&app_state, ADMIN_OR_ANY_USER)?;
    let Json(payload) = payload?;
    let user = app_state
        .user_use_cases
        .create(account_id, &payload.name, &payload.email, &payload.password)
        .await?;
    Ok(Json(user))
}

async fn get_user(
    State(app_state): State<AppState>,
    caller: Caller,
    Path((account_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<impl IntoResponse> {
    caller.authorize(&app_state, ADMIN_OR_ANY_USER)?;
    let user = app_state.user_use_cases.get(account_id, id).await?;
    Ok(Json(user))
}

async fn delete_user(
    State(app_state): State<AppState>,
    caller: Caller,
    Path((account_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<impl IntoResponse> {
    caller.authorize(&app_state, ADMIN_OR_ADMIN_USER)?;
    let user = app_state.user_use_cases.delete(account_id, id).await?;
    Ok(Json(user))
}

async fn rename_user(
    State(app_state): State<AppState>,
    caller: Caller,
    Path((account_id, id)): Path<(Uuid, Uuid)>,
    payload: Result<Json<NamePayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    caller.authorize(&app_state, ADMIN_OR_SELF)?;
    let Json(payload) = payload?;
    let user = app_state
        .user_use_cases
        .rename(account_id, id, &payload.name)
        .await?;
    Ok(Json(user))
}

async fn change_password(
    State(app_state): State<AppState>,
    caller: Caller,
    Path((account_id, id)): Path<(Uuid, Uuid)>,
    payload: Result<Json<PasswordPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    caller.authorize(&app_state, ADMIN_OR_SELF)?;
    let Json(payload) = payload?;
    let user = app_state
        .user_use_cases
        .change_password(account_id, id, &payload.password, &payload.password_again)
        .await?;
    Ok(Json(user))
}

async fn change_role(
    State(app_state): State<AppState>,
    caller: Caller,
    Path((account_id, id)): Path<(Uuid, Uuid)>,
    payload: Result<Json<RolePayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    caller.authorize(&app_state, ADMIN_OR_ADMIN_USER)?;
    let Json(payload) = payload?;
    let user = app_state
        .user_use_cases
        .change_role(account_id, id, payload.role)
        .await?;
    Ok(Json(user))
}

async fn issue_access_token(
    State(app_state): State<AppState>,
    caller: Caller,
    Path((account_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<impl IntoResponse> {
    caller.authorize(&app_state, ACCESS_TOKEN_POLICY)?;
    let token = app_state
        .user_use_cases
        .issue_access_token(account_id, id)
        .await?;
    Ok(Json(AccessTokenResponse {
        access_token: format!("Bearer {token}"),
    }))
}

async fn finalize_registration(
    State(app_state): State<AppState>,
    caller: Caller,
    Path((account_id, _id)): Path<(Uuid, Uuid)>,
) -> AppResult<impl IntoResponse> {
    let claim = caller.authorize(&app_state, FINALIZE_REGISTRATION_POLICY)?;
    let user = app_state
        .user_use_cases
        .finalize_registration(&claim, account_id)
        .await?;
    Ok(Json(user))
}
