use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::application::{
    email_templates::registration_email,
    jwt::{Claim, TokenCodec, TokenLifetimes},
    password::hash_password,
    validators::{is_valid_email, is_valid_url_friendly_name},
};
use crate::domain::entities::{
    account::Account,
    role::Role,
    user::{NewUser, User},
};
use crate::use_cases::user::{EmailSender, UserRepo};

#[async_trait]
pub trait AccountRepo: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Account>>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Account>>;
    async fn find_by_url_friendly_name(&self, url_friendly_name: &str)
    -> AppResult<Option<Account>>;
    async fn create(&self, name: &str, url_friendly_name: &str) -> AppResult<Account>;
    async fn update_name(&self, id: Uuid, name: &str) -> AppResult<Option<Account>>;
    async fn update_url_friendly_name(
        &self,
        id: Uuid,
        url_friendly_name: &str,
    ) -> AppResult<Option<Account>>;
    async fn delete(&self, id: Uuid) -> AppResult<Option<Account>>;
}

#[derive(Debug, Clone)]
pub struct NewAccountInput {
    pub account_name: String,
    pub url_friendly_name: String,
    pub user_name: String,
    pub user_email: String,
    pub user_password: String,
}

/// Result of the open sign-up: the first user is not an admin until the
/// registration token is presented back.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCreated {
    pub new_account: Account,
    pub new_user: User,
    pub registration_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDeleted {
    pub deleted_users: u64,
    pub deleted_account: Account,
}

#[derive(Clone)]
pub struct AccountUseCases {
    accounts: Arc<dyn AccountRepo>,
    users: Arc<dyn UserRepo>,
    email: Arc<dyn EmailSender>,
    tokens: Arc<TokenCodec>,
    lifetimes: TokenLifetimes,
    app_origin: Url,
}

impl AccountUseCases {
    pub fn new(
        accounts: Arc<dyn AccountRepo>,
        users: Arc<dyn UserRepo>,
        email: Arc<dyn EmailSender>,
        tokens: Arc<TokenCodec>,
        lifetimes: TokenLifetimes,
        app_origin: Url,
    ) -> Self {
        Self {
            accounts,
            users,
            email,
            tokens,
            lifetimes,
            app_origin,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> AppResult<Vec<Account>> {
        self.accounts.list().await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> AppResult<Account> {
        self.accounts.get_by_id(id).await?.ok_or(AppError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn create(&self, name: &str, url_friendly_name: &str) -> AppResult<Account> {
        self.ensure_url_friendly_name_free(url_friendly_name, None)
            .await?;
        self.accounts.create(name, url_friendly_name).await
    }

    #[instrument(skip(self))]
    pub async fn rename(&self, id: Uuid, name: &str) -> AppResult<Account> {
        self.accounts
            .update_name(id, name)
            .await?
            .ok_or(AppError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn change_url_friendly_name(
        &self,
        id: Uuid,
        url_friendly_name: &str,
    ) -> AppResult<Account> {
        self.ensure_url_friendly_name_free(url_friendly_name, Some(id))
            .await?;
        self.accounts
            .update_url_friendly_name(id, url_friendly_name)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Deletes the account's users first, then the account itself. The two
    /// writes are not atomic: a user created for the account between them
    /// survives as an orphan, which the store allows since `users.account_id`
    /// has no foreign key.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> AppResult<AccountDeleted> {
        let deleted_users = self.users.delete_by_account(id).await?;
        let deleted_account = self.accounts.delete(id).await?.ok_or(AppError::NotFound)?;
        tracing::info!(account_id = %id, deleted_users, "Account deleted");
        Ok(AccountDeleted {
            deleted_users,
            deleted_account,
        })
    }

    /// Open sign-up: creates the account and its first user, then mints a
    /// registration token bound to both.
    ///
    /// The existence check and the two inserts are separate store calls, so
    /// concurrent sign-ups for the same name can both pass the check, and a
    /// failure after the account insert leaves an account without users.
    #[instrument(skip(self, input), fields(url_friendly_name = %input.url_friendly_name))]
    pub async fn create_with_admin(&self, input: NewAccountInput) -> AppResult<AccountCreated> {
        let email = input.user_email.trim();
        if !is_valid_email(email) {
            return Err(AppError::Validation("Invalid email format".into()));
        }
        self.ensure_url_friendly_name_free(&input.url_friendly_name, None)
            .await?;

        let account = self
            .accounts
            .create(&input.account_name, &input.url_friendly_name)
            .await?;
        let user = self
            .users
            .create(NewUser {
                account_id: account.id,
                name: Some(input.user_name),
                email: email.to_string(),
                password_hash: Some(hash_password(&input.user_password)?),
                role: Role::User,
            })
            .await?;

        let token = self.tokens.sign(
            &Claim::registration(&user, &account),
            self.lifetimes.registration,
        )?;

        let (subject, html) = registration_email(
            &self.app_origin,
            &account.name,
            &account.url_friendly_name,
            &token,
        );
        // The caller already holds the token, so a failed email only gets logged.
        if let Err(err) = self.email.send(&user.email, &subject, &html).await {
            tracing::warn!(error = ?err, account_id = %account.id, "Failed to send registration email");
        }

        tracing::info!(account_id = %account.id, user_id = %user.id, "Account created");
        Ok(AccountCreated {
            new_account: account,
            new_user: user,
            registration_token: token,
        })
    }

    async fn ensure_url_friendly_name_free(
        &self,
        url_friendly_name: &str,
        owner: Option<Uuid>,
    ) -> AppResult<()> {
        if !is_valid_url_friendly_name(url_friendly_name) {
            return Err(AppError::Validation(
                "urlFriendlyName must be lowercase letters, digits and hyphens".into(),
            ));
        }
        match self
            .accounts
            .find_by_url_friendly_name(url_friendly_name)
            .await?
        {
            Some(existing) if Some(existing.id) != owner => {
                Err(AppError::Conflict("urlFriendlyName exist".into()))
            }
            _ => Ok(()),
        }
    }
}
