use std::sync::Arc;

use tracing::instrument;
use url::Url;
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::application::{
    email_templates::invitation_email,
    jwt::{Claim, TokenCodec, TokenLifetimes},
    password::hash_password,
    validators::is_valid_email,
};
use crate::domain::entities::{
    role::Role,
    user::{NewUser, User},
};
use crate::use_cases::{
    account::AccountRepo,
    user::{EmailSender, UserRepo, ensure_passwords_match},
};

#[derive(Debug, Clone)]
pub struct InvitationSent {
    pub user: User,
    pub token: String,
}

#[derive(Clone)]
pub struct InvitationUseCases {
    accounts: Arc<dyn AccountRepo>,
    users: Arc<dyn UserRepo>,
    email: Arc<dyn EmailSender>,
    tokens: Arc<TokenCodec>,
    lifetimes: TokenLifetimes,
    app_origin: Url,
}

impl InvitationUseCases {
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

    /// Creates a password-less user and emails it an invitation token.
    ///
    /// Any existing user with the same email blocks the invitation, including
    /// one that was invited earlier and never accepted.
    #[instrument(skip(self))]
    pub async fn send(&self, account_id: Uuid, email: &str) -> AppResult<InvitationSent> {
        let account = self
            .accounts
            .get_by_id(account_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let email = email.trim();
        if !is_valid_email(email) {
            return Err(AppError::Validation("Invalid email format".into()));
        }
        if self.users.find_by_email(account_id, email).await?.is_some() {
            return Err(AppError::MethodNotAllowed("User exist".into()));
        }

        let user = self
            .users
            .create(NewUser {
                account_id,
                name: None,
                email: email.to_string(),
                password_hash: None,
                role: Role::User,
            })
            .await?;

        let token = self
            .tokens
            .sign(&Claim::invitation(&user, &account), self.lifetimes.invitation)?;
        let (subject, html) = invitation_email(
            &self.app_origin,
            &account.name,
            &account.url_friendly_name,
            &token,
        );
        self.email.send(&user.email, &subject, &html).await?;

        tracing::info!(%account_id, user_id = %user.id, "Invitation sent");
        Ok(InvitationSent { user, token })
    }

    /// Sets the invited user's password and returns a login token.
    ///
    /// The invitation token stays valid until it expires; only the
    /// password-less precondition stops it from being used twice.
    #[instrument(skip(self, claim, new_password, new_password_again))]
    pub async fn accept(
        &self,
        claim: &Claim,
        account_id: Uuid,
        new_password: &str,
        new_password_again: &str,
    ) -> AppResult<String> {
        let user_id = claim.user_id().ok_or(AppError::Forbidden)?;
        let user = self
            .users
            .get(account_id, user_id)
            .await?
            .filter(|u| Some(u.email.as_str()) == claim.user_email())
            .ok_or(AppError::NotFound)?;

        if user.has_password() {
            return Err(AppError::MethodNotAllowed(
                "User already has a password".into(),
            ));
        }
        ensure_passwords_match(new_password, new_password_again)?;

        let hash = hash_password(new_password)?;
        let user = self
            .users
            .update_password(account_id, user.id, &hash)
            .await?
            .ok_or(AppError::NotFound)?;

        tracing::info!(%account_id, user_id = %user.id, "Invitation accepted");
        self.tokens.sign(&Claim::login(&user), self.lifetimes.login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::jwt::LoginUser;
    use crate::domain::entities::account::Account;
    use crate::test_utils::{
        InMemoryAccountRepo, InMemoryEmailSender, InMemoryUserRepo, create_test_account,
        create_test_user,
    };

    struct Fixture {
        use_cases: InvitationUseCases,
        users: Arc<InMemoryUserRepo>,
        email: Arc<InMemoryEmailSender>,
        tokens: Arc<TokenCodec>,
    }

    fn fixture(accounts: Vec<Account>, users: Vec<User>) -> Fixture {
        let accounts = Arc::new(InMemoryAccountRepo::with_accounts(accounts));
        let users = Arc::new(InMemoryUserRepo::with_users(users));
        let email = Arc::new(InMemoryEmailSender::new());
        let tokens = Arc::new(TokenCodec::from_secret_list("test-secret").unwrap());
        let use_cases = InvitationUseCases::new(
            accounts,
            users.clone(),
            email.clone(),
            tokens.clone(),
            TokenLifetimes::default(),
            Url::parse("http://localhost:3000").unwrap(),
        );
        Fixture {
            use_cases,
            users,
            email,
            tokens,
        }
    }

    #[tokio::test]
    async fn send_creates_passwordless_user_and_emails_token() {
        let account = create_test_account(|_| {});
        let f = fixture(vec![account.clone()], vec![]);

        let sent = f.use_cases.send(account.id, "b@x.com").await.unwrap();

        assert!(!sent.user.has_password());
        assert_eq!(sent.user.account_id, account.id);
        assert_eq!(
            f.tokens.verify(&sent.token).unwrap(),
            Claim::invitation(&sent.user, &account)
        );

        let emails = f.email.sent();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].to, "b@x.com");
        assert!(emails[0].html.contains(&sent.token));
    }

    #[tokio::test]
    async fn send_rejects_existing_user_even_if_not_activated() {
        let account = create_test_account(|_| {});
        let pending = create_test_user(account.id, |u| {
            u.email = "b@x.com".into();
            u.password_hash = None;
        });
        let f = fixture(vec![account.clone()], vec![pending]);

        let result = f.use_cases.send(account.id, "b@x.com").await;
        assert!(matches!(result, Err(AppError::MethodNotAllowed(msg)) if msg == "User exist"));
        assert_eq!(f.users.users.lock().unwrap().len(), 1);
        assert!(f.email.sent().is_empty());
    }

    #[tokio::test]
    async fn send_to_missing_account_is_not_found() {
        let f = fixture(vec![], vec![]);
        assert!(matches!(
            f.use_cases.send(Uuid::new_v4(), "b@x.com").await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn accept_sets_password_and_returns_login_token() {
        let account = create_test_account(|_| {});
        let f = fixture(vec![account.clone()], vec![]);
        let sent = f.use_cases.send(account.id, "b@x.com").await.unwrap();
        let claim = f.tokens.verify(&sent.token).unwrap();

        let login = f
            .use_cases
            .accept(&claim, account.id, "pw", "pw")
            .await
            .unwrap();

        assert!(f.users.users.lock().unwrap()[&sent.user.id].has_password());
        assert_eq!(
            f.tokens.verify(&login).unwrap(),
            Claim::Login {
                user: LoginUser {
                    id: sent.user.id,
                    email: "b@x.com".into(),
                    account_id: account.id,
                },
            }
        );
    }

    #[tokio::test]
    async fn accept_is_one_way_even_with_valid_token() {
        let account = create_test_account(|_| {});
        let f = fixture(vec![account.clone()], vec![]);
        let sent = f.use_cases.send(account.id, "b@x.com").await.unwrap();
        let claim = f.tokens.verify(&sent.token).unwrap();

        f.use_cases
            .accept(&claim, account.id, "pw", "pw")
            .await
            .unwrap();
        let replay = f.use_cases.accept(&claim, account.id, "new", "new").await;

        assert!(
            matches!(replay, Err(AppError::MethodNotAllowed(msg)) if msg == "User already has a password")
        );
    }

    #[tokio::test]
    async fn accept_with_mismatched_passwords_is_a_validation_error() {
        let account = create_test_account(|_| {});
        let f = fixture(vec![account.clone()], vec![]);
        let sent = f.use_cases.send(account.id, "b@x.com").await.unwrap();
        let claim = f.tokens.verify(&sent.token).unwrap();

        let result = f.use_cases.accept(&claim, account.id, "one", "two").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(!f.users.users.lock().unwrap()[&sent.user.id].has_password());
    }

    #[tokio::test]
    async fn accept_for_deleted_user_is_not_found() {
        let account = create_test_account(|_| {});
        let ghost = create_test_user(account.id, |u| u.password_hash = None);
        let f = fixture(vec![account.clone()], vec![]);

        let claim = Claim::invitation(&ghost, &account);
        let result = f.use_cases.accept(&claim, account.id, "pw", "pw").await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
