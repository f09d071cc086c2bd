//! Prints a signed `admin` token to stdout.
//!
//! The service never mints admin tokens itself; operators run this with the
//! same `SECRETS` as the server.

use dotenvy::dotenv;
use env_helpers::{get_env, get_env_default};
use time::Duration;

use mua_accounts::application::jwt::{Claim, TokenCodec};

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let secrets: String = get_env("SECRETS");
    let ttl_hours: i64 = get_env_default("ADMIN_TOKEN_TTL_HOURS", 1);

    let codec = TokenCodec::from_secret_list(&secrets)?;
    let token = codec
        .sign(&Claim::Admin, Duration::hours(ttl_hours))
        .map_err(|err| anyhow::anyhow!("failed to sign admin token: {err}"))?;

    println!("{token}");
    Ok(())
}
