use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use time::Duration;
use url::Url;

use crate::application::jwt::TokenLifetimes;

pub struct AppConfig {
    /// Space-separated token secrets; the first one signs, all of them verify.
    pub secrets: SecretString,
    pub token_lifetimes: TokenLifetimes,
    pub app_origin: Url,
    pub cors_origin: HeaderValue,
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub resend_api_key: SecretString,
    pub email_from: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let secrets = SecretString::new(get_env::<String>("SECRETS").into());

        let access_token_ttl_secs: i64 = get_env_default("ACCESS_TOKEN_TTL_SECS", 86_400);
        let login_token_ttl_secs: i64 = get_env_default("LOGIN_TOKEN_TTL_SECS", 3_600);
        let invitation_token_ttl_hours: i64 = get_env_default("INVITATION_TOKEN_TTL_HOURS", 168);
        let registration_token_ttl_hours: i64 =
            get_env_default("REGISTRATION_TOKEN_TTL_HOURS", 168);

        let app_origin: Url = get_env("APP_ORIGIN");
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");
        let bind_addr: SocketAddr =
            get_env_default("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3001)));
        let database_url: String = get_env("DATABASE_URL");
        let resend_api_key = SecretString::new(get_env::<String>("RESEND_API_KEY").into());
        let email_from: String = get_env("EMAIL_FROM");

        Self {
            secrets,
            token_lifetimes: TokenLifetimes {
                access: Duration::seconds(access_token_ttl_secs),
                login: Duration::seconds(login_token_ttl_secs),
                invitation: Duration::hours(invitation_token_ttl_hours),
                registration: Duration::hours(registration_token_ttl_hours),
            },
            app_origin,
            cors_origin,
            bind_addr,
            database_url,
            resend_api_key,
            email_from,
        }
    }
}
