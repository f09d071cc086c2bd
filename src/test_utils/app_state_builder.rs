//! Test app state builder for HTTP-level testing.
//!
//! `TestAppStateBuilder` wires the real use cases to in-memory ports and
//! hands the ports back so tests can assert on stored records and sent mail.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    application::jwt::{Claim, TokenCodec, TokenLifetimes},
    domain::entities::{account::Account, user::User},
    infra::config::AppConfig,
    test_utils::{InMemoryAccountRepo, InMemoryEmailSender, InMemoryUserRepo},
    use_cases::{account::AccountUseCases, invitation::InvitationUseCases, user::UserUseCases},
};

pub const TEST_SECRETS: &str = "test-secret";

/// A built state plus handles on the in-memory ports behind it.
pub struct TestApp {
    pub state: AppState,
    pub accounts: Arc<InMemoryAccountRepo>,
    pub users: Arc<InMemoryUserRepo>,
    pub email: Arc<InMemoryEmailSender>,
}

impl TestApp {
    /// Signs `claim` with the state's codec and returns a ready `Authorization` value.
    pub fn bearer(&self, claim: &Claim) -> String {
        let token = self
            .state
            .tokens
            .sign(claim, time::Duration::hours(1))
            .unwrap();
        format!("Bearer {token}")
    }
}

pub struct TestAppStateBuilder {
    accounts: Vec<Account>,
    users: Vec<User>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            accounts: Vec::new(),
            users: Vec::new(),
        }
    }

    pub fn with_account(mut self, account: Account) -> Self {
        self.accounts.push(account);
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    pub fn build(self) -> TestApp {
        let accounts = Arc::new(InMemoryAccountRepo::with_accounts(self.accounts));
        let users = Arc::new(InMemoryUserRepo::with_users(self.users));
        let email = Arc::new(InMemoryEmailSender::new());
        let tokens = Arc::new(TokenCodec::from_secret_list(TEST_SECRETS).unwrap());

        let config = AppConfig {
            secrets: SecretString::new(TEST_SECRETS.into()),
            token_lifetimes: TokenLifetimes::default(),
            app_origin: Url::parse("http://localhost:3000").unwrap(),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            bind_addr: "127.0.0.1:3001".parse::<SocketAddr>().unwrap(),
            database_url: String::new(),
            resend_api_key: SecretString::new("test_resend_key".into()),
            email_from: "noreply@example.com".to_string(),
        };

        let account_use_cases = AccountUseCases::new(
            accounts.clone(),
            users.clone(),
            email.clone(),
            tokens.clone(),
            config.token_lifetimes,
            config.app_origin.clone(),
        );
        let user_use_cases = UserUseCases::new(
            accounts.clone(),
            users.clone(),
            tokens.clone(),
            config.token_lifetimes,
        );
        let invitation_use_cases = InvitationUseCases::new(
            accounts.clone(),
            users.clone(),
            email.clone(),
            tokens.clone(),
            config.token_lifetimes,
            config.app_origin.clone(),
        );

        let state = AppState {
            config: Arc::new(config),
            tokens,
            account_use_cases: Arc::new(account_use_cases),
            user_use_cases: Arc::new(user_use_cases),
            invitation_use_cases: Arc::new(invitation_use_cases),
        };

        TestApp {
            state,
            accounts,
            users,
            email,
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
