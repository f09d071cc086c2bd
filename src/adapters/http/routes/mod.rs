pub mod accounts;
pub mod invitation;
pub mod users;

use axum::Router;
use serde::Serialize;

use crate::adapters::http::app_state::AppState;

/// Envelope for collection responses.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub count: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(accounts::router())
        .merge(invitation::router())
        .merge(users::router())
}
