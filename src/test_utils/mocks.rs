//! In-memory implementations of the store and email ports.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    domain::entities::{
        account::Account,
        role::Role,
        user::{NewUser, User},
    },
    use_cases::{
        account::AccountRepo,
        user::{EmailSender, UserRepo},
    },
};

fn now() -> Option<chrono::NaiveDateTime> {
    Some(chrono::Utc::now().naive_utc())
}

// ============================================================================
// InMemoryAccountRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryAccountRepo {
    pub accounts: Mutex<HashMap<Uuid, Account>>,
}

impl InMemoryAccountRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        Self {
            accounts: Mutex::new(accounts.into_iter().map(|a| (a.id, a)).collect()),
        }
    }
}

#[async_trait]
impl AccountRepo for InMemoryAccountRepo {
    async fn list(&self) -> AppResult<Vec<Account>> {
        Ok(self.accounts.lock().unwrap().values().cloned().collect())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        Ok(self.accounts.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_url_friendly_name(
        &self,
        url_friendly_name: &str,
    ) -> AppResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|a| a.url_friendly_name == url_friendly_name)
            .cloned())
    }

    async fn create(&self, name: &str, url_friendly_name: &str) -> AppResult<Account> {
        let account = Account {
            id: Uuid::new_v4(),
            name: name.to_string(),
            url_friendly_name: url_friendly_name.to_string(),
            created_at: now(),
            updated_at: now(),
        };
        self.accounts
            .lock()
            .unwrap()
            .insert(account.id, account.clone());
        Ok(account)
    }

    async fn update_name(&self, id: Uuid, name: &str) -> AppResult<Option<Account>> {
        Ok(self.accounts.lock().unwrap().get_mut(&id).map(|a| {
            a.name = name.to_string();
            a.updated_at = now();
            a.clone()
        }))
    }

    async fn update_url_friendly_name(
        &self,
        id: Uuid,
        url_friendly_name: &str,
    ) -> AppResult<Option<Account>> {
        Ok(self.accounts.lock().unwrap().get_mut(&id).map(|a| {
            a.url_friendly_name = url_friendly_name.to_string();
            a.updated_at = now();
            a.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<Account>> {
        Ok(self.accounts.lock().unwrap().remove(&id))
    }
}

// ============================================================================
// InMemoryUserRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserRepo {
    pub users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users.into_iter().map(|u| (u.id, u)).collect()),
        }
    }

    fn modify(
        &self,
        account_id: Uuid,
        id: Uuid,
        change: impl FnOnce(&mut User),
    ) -> Option<User> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).filter(|u| u.account_id == account_id)?;
        change(user);
        user.updated_at = now();
        Some(user.clone())
    }
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn list_by_account(&self, account_id: Uuid) -> AppResult<Vec<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|u| u.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn get(&self, account_id: Uuid, id: Uuid) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(&id)
            .filter(|u| u.account_id == account_id)
            .cloned())
    }

    async fn find_by_email(&self, account_id: Uuid, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.account_id == account_id && u.email == email)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            account_id: user.account_id,
            created_at: now(),
            updated_at: now(),
        };
        self.users.lock().unwrap().insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_name(&self, account_id: Uuid, id: Uuid, name: &str) -> AppResult<Option<User>> {
        Ok(self.modify(account_id, id, |u| u.name = Some(name.to_string())))
    }

    async fn update_password(
        &self,
        account_id: Uuid,
        id: Uuid,
        password_hash: &str,
    ) -> AppResult<Option<User>> {
        Ok(self.modify(account_id, id, |u| {
            u.password_hash = Some(password_hash.to_string())
        }))
    }

    async fn update_role(&self, account_id: Uuid, id: Uuid, role: Role) -> AppResult<Option<User>> {
        Ok(self.modify(account_id, id, |u| u.role = role))
    }

    async fn delete(&self, account_id: Uuid, id: Uuid) -> AppResult<Option<User>> {
        let mut users = self.users.lock().unwrap();
        if users.get(&id).is_some_and(|u| u.account_id == account_id) {
            return Ok(users.remove(&id));
        }
        Ok(None)
    }

    async fn delete_by_account(&self, account_id: Uuid) -> AppResult<u64> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|_, u| u.account_id != account_id);
        Ok((before - users.len()) as u64)
    }

    async fn count_by_role(&self, role: Role) -> AppResult<i64> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|u| u.role == role)
            .count() as i64)
    }
}

// ============================================================================
// InMemoryEmailSender
// ============================================================================

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Records every email instead of sending it.
#[derive(Default)]
pub struct InMemoryEmailSender {
    sent: Mutex<Vec<SentEmail>>,
}

impl InMemoryEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for InMemoryEmailSender {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(())
    }
}
