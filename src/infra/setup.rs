use crate::{
    adapters::{email::resend::ResendEmailSender, http::app_state::AppState},
    application::jwt::TokenCodec,
    infra::{config::AppConfig, postgres_persistence},
    use_cases::{
        account::{AccountRepo, AccountUseCases},
        invitation::InvitationUseCases,
        user::{EmailSender, UserRepo, UserUseCases},
    },
};
use secrecy::ExposeSecret;
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let tokens = Arc::new(TokenCodec::from_secret_list(config.secrets.expose_secret())?);

    let postgres_arc = Arc::new(postgres_persistence(&config.database_url).await?);
    let account_repo_arc = postgres_arc.clone() as Arc<dyn AccountRepo>;
    let user_repo_arc = postgres_arc.clone() as Arc<dyn UserRepo>;

    let email = Arc::new(ResendEmailSender::new(
        config.resend_api_key.clone(),
        config.email_from.clone(),
    )) as Arc<dyn EmailSender>;

    let account_use_cases = AccountUseCases::new(
        account_repo_arc.clone(),
        user_repo_arc.clone(),
        email.clone(),
        tokens.clone(),
        config.token_lifetimes,
        config.app_origin.clone(),
    );

    let user_use_cases = UserUseCases::new(
        account_repo_arc.clone(),
        user_repo_arc.clone(),
        tokens.clone(),
        config.token_lifetimes,
    );

    let invitation_use_cases = InvitationUseCases::new(
        account_repo_arc,
        user_repo_arc,
        email,
        tokens.clone(),
        config.token_lifetimes,
        config.app_origin.clone(),
    );

    Ok(AppState {
        config: Arc::new(config),
        tokens,
        account_use_cases: Arc::new(account_use_cases),
        user_use_cases: Arc::new(user_use_cases),
        invitation_use_cases: Arc::new(invitation_use_cases),
    })
}

pub fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mua_accounts=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don't show target (module path)
        .with_level(true)
        .pretty();

    // File (structured JSON logs)
    let file = File::create("app.log")?;
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();

    Ok(())
}
