//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::domain::entities::{account::Account, role::Role, user::User};

/// Create a test account with sensible defaults.
pub fn create_test_account(overrides: impl FnOnce(&mut Account)) -> Account {
    let id = Uuid::new_v4();
    let mut account = Account {
        id,
        name: "Test Account".to_string(),
        url_friendly_name: format!("account-{}", id.simple()),
        created_at: Some(test_datetime()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut account);
    account
}

/// Create an activated test user (password set, role `user`).
pub fn create_test_user(account_id: Uuid, overrides: impl FnOnce(&mut User)) -> User {
    let id = Uuid::new_v4();
    let mut user = User {
        id,
        name: Some("Test User".to_string()),
        email: format!("user-{}@example.com", id.simple()),
        password_hash: Some("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string()),
        role: Role::User,
        account_id,
        created_at: Some(test_datetime()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut user);
    user
}

pub fn test_datetime() -> NaiveDateTime {
    chrono::DateTime::from_timestamp(1_735_689_600, 0)
        .map(|dt| dt.naive_utc())
        .unwrap_or_default()
}
