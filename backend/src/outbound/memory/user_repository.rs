//! In-memory user store keyed by id with a unique email index.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, User, UserId};

#[derive(Debug, Default)]
struct Users {
    by_id: HashMap<UserId, User>,
    by_email: HashMap<String, UserId>,
}

/// User store backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Users>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Users>, UserPersistenceError> {
        self.users
            .lock()
            .map_err(|_| UserPersistenceError::query("user store lock poisoned"))
    }

    /// Synchronous lookup for sibling in-memory adapters.
    pub(super) fn get(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock()?.by_id.get(id).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.lock()?;
        let email = user.email().as_ref().to_owned();
        if users.by_email.contains_key(&email) {
            return Err(UserPersistenceError::duplicate_email(email));
        }
        users.by_email.insert(email, *user.id());
        users.by_id.insert(*user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        self.get(id)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let users = self.lock()?;
        Ok(users
            .by_email
            .get(email.as_ref())
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.lock()?;
        let Some(previous) = users.by_id.get(user.id()).cloned() else {
            return Err(UserPersistenceError::missing(user.id().to_string()));
        };
        if previous.email() != user.email() {
            let email = user.email().as_ref().to_owned();
            if users.by_email.contains_key(&email) {
                return Err(UserPersistenceError::duplicate_email(email));
            }
            users.by_email.remove(previous.email().as_ref());
            users.by_email.insert(email, *user.id());
        }
        users.by_id.insert(*user.id(), user.clone());
        Ok(())
    }
}
