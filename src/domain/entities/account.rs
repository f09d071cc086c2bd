use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

/// A tenant. `url_friendly_name` is kept unique by the account use cases,
/// not by the store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub url_friendly_name: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}
