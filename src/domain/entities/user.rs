use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use super::role::Role;

/// A member of exactly one account.
///
/// A missing `password_hash` marks an invitation that has not been accepted
/// yet; there is no separate status field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub role: Role,
    pub account_id: Uuid,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl User {
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Fields needed to insert a user; the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub account_id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: Role,
}
