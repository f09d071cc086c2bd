use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::domain::entities::{account::Account, role::Role, user::User};

// ============================================================================
// Claims
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimAccount {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "urlFriendlyName")]
    pub url_friendly_name: String,
}

/// User reference carried by login tokens; the account rides along on the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    #[serde(rename = "accountId")]
    pub account_id: Uuid,
}

/// Payload of a signed token. Each variant marks one stage of the
/// onboarding flow and carries only the fields that stage needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Claim {
    Admin,
    User {
        user: ClaimUser,
        account: ClaimAccount,
        role: ClaimRole,
    },
    Login {
        user: LoginUser,
    },
    Invitation {
        user: ClaimUser,
        account: ClaimAccount,
    },
    Registration {
        user: ClaimUser,
        account: ClaimAccount,
    },
}

/// Role carried by a `user` token. Roles this service does not issue still
/// decode, so policy checks reject them as forbidden rather than malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimRole {
    Known(Role),
    Other(String),
}

impl ClaimRole {
    pub fn as_str(&self) -> &str {
        match self {
            ClaimRole::Known(role) => role.as_ref(),
            ClaimRole::Other(name) => name,
        }
    }
}

impl From<Role> for ClaimRole {
    fn from(role: Role) -> Self {
        ClaimRole::Known(role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimKind {
    Admin,
    User,
    Login,
    Invitation,
    Registration,
}

impl Claim {
    pub fn user_access(user: &User, account: &Account) -> Self {
        Claim::User {
            user: ClaimUser::from(user),
            account: ClaimAccount::from(account),
            role: user.role.into(),
        }
    }

    pub fn login(user: &User) -> Self {
        Claim::Login {
            user: LoginUser {
                id: user.id,
                email: user.email.clone(),
                account_id: user.account_id,
            },
        }
    }

    pub fn invitation(user: &User, account: &Account) -> Self {
        Claim::Invitation {
            user: ClaimUser::from(user),
            account: ClaimAccount::from(account),
        }
    }

    pub fn registration(user: &User, account: &Account) -> Self {
        Claim::Registration {
            user: ClaimUser::from(user),
            account: ClaimAccount::from(account),
        }
    }

    pub fn kind(&self) -> ClaimKind {
        match self {
            Claim::Admin => ClaimKind::Admin,
            Claim::User { .. } => ClaimKind::User,
            Claim::Login { .. } => ClaimKind::Login,
            Claim::Invitation { .. } => ClaimKind::Invitation,
            Claim::Registration { .. } => ClaimKind::Registration,
        }
    }

    /// The role, if it is one this service knows.
    pub fn role(&self) -> Option<Role> {
        match self {
            Claim::User {
                role: ClaimRole::Known(role),
                ..
            } => Some(*role),
            _ => None,
        }
    }

    /// The role exactly as it appears in the token.
    pub fn role_name(&self) -> Option<&str> {
        match self {
            Claim::User { role, .. } => Some(role.as_str()),
            _ => None,
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Claim::Admin => None,
            Claim::Login { user } => Some(user.id),
            Claim::User { user, .. }
            | Claim::Invitation { user, .. }
            | Claim::Registration { user, .. } => Some(user.id),
        }
    }

    pub fn user_email(&self) -> Option<&str> {
        match self {
            Claim::Admin => None,
            Claim::Login { user } => Some(&user.email),
            Claim::User { user, .. }
            | Claim::Invitation { user, .. }
            | Claim::Registration { user, .. } => Some(&user.email),
        }
    }

    /// The account the claim is bound to. Login tokens embed it on the user.
    pub fn account_id(&self) -> Option<Uuid> {
        match self {
            Claim::Admin => None,
            Claim::Login { user } => Some(user.account_id),
            Claim::User { account, .. }
            | Claim::Invitation { account, .. }
            | Claim::Registration { account, .. } => Some(account.id),
        }
    }
}

impl From<&User> for ClaimUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

impl From<&Account> for ClaimAccount {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            url_friendly_name: account.url_friendly_name.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    #[serde(flatten)]
    claim: Claim,
    exp: i64,
    iat: i64,
}

// ============================================================================
// Codec
// ============================================================================

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    ExpiredToken,

    #[error("No signing secret configured")]
    NoSecrets,
}

/// How long each kind of minted token stays valid.
#[derive(Debug, Clone, Copy)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub login: Duration,
    pub invitation: Duration,
    pub registration: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::days(1),
            login: Duration::hours(1),
            invitation: Duration::days(7),
            registration: Duration::days(7),
        }
    }
}

/// Signs with the first secret, verifies against all of them.
///
/// Rotation: prepend the new secret and keep the old one until every token
/// signed with it has expired.
#[derive(Debug)]
pub struct TokenCodec {
    secrets: Vec<SecretString>,
}

impl TokenCodec {
    pub fn new(secrets: Vec<SecretString>) -> Result<Self, TokenError> {
        if secrets.is_empty() {
            return Err(TokenError::NoSecrets);
        }
        Ok(Self { secrets })
    }

    /// Builds a codec from a space-separated secret list.
    pub fn from_secret_list(raw: &str) -> Result<Self, TokenError> {
        Self::new(
            raw.split_whitespace()
                .map(|s| SecretString::new(s.into()))
                .collect(),
        )
    }

    pub fn sign(&self, claim: &Claim, ttl: Duration) -> AppResult<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = TokenClaims {
            claim: claim.clone(),
            iat: now,
            exp: now + ttl.whole_seconds(),
        };
        let header = Header::new(Algorithm::HS256);
        encode(
            &header,
            &claims,
            &EncodingKey::from_secret(self.secrets[0].expose_secret().as_bytes()),
        )
        .map_err(|e| AppError::Internal(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claim, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        for secret in &self.secrets {
            let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
            match decode::<TokenClaims>(token, &key, &validation) {
                Ok(data) => return Ok(data.claims.claim),
                Err(e) => match e.kind() {
                    ErrorKind::InvalidSignature => continue,
                    ErrorKind::ExpiredSignature => return Err(TokenError::ExpiredToken),
                    _ => return Err(TokenError::InvalidToken(e.to_string())),
                },
            }
        }

        Err(TokenError::InvalidToken(
            "signature does not match any configured secret".into(),
        ))
    }
}
