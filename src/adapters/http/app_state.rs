use std::sync::Arc;

use crate::{
    application::jwt::TokenCodec,
    infra::config::AppConfig,
    use_cases::{account::AccountUseCases, invitation::InvitationUseCases, user::UserUseCases},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenCodec>,
    pub account_use_cases: Arc<AccountUseCases>,
    pub user_use_cases: Arc<UserUseCases>,
    pub invitation_use_cases: Arc<InvitationUseCases>,
}
