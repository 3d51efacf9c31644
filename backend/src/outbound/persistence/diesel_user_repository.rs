//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    DisplayName, Email, PasswordDigest, StoredUser, User, UserDraft, UserId, UserRole,
};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewUserRow, UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed credential store.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, |message| UserPersistenceError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn map_write_error(error: diesel::result::Error, email: &Email) -> UserPersistenceError {
    if is_unique_violation(&error, EMAIL_CONSTRAINT) {
        UserPersistenceError::duplicate_email(email.as_ref())
    } else {
        map_diesel_error(error)
    }
}

fn invalid_row(id: uuid::Uuid, err: impl std::fmt::Display) -> UserPersistenceError {
    UserPersistenceError::query(format!("invalid stored user {id}: {err}"))
}

/// Convert a database row into a domain user.
pub(super) fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let name = DisplayName::new(&row.name).map_err(|err| invalid_row(row.id, err))?;
    let email = Email::new(&row.email).map_err(|err| invalid_row(row.id, err))?;
    let role: UserRole = row.role.parse().map_err(|err| invalid_row(row.id, err))?;

    Ok(User::restore(StoredUser {
        draft: UserDraft {
            id: UserId::from_uuid(row.id),
            name,
            email,
            password: PasswordDigest::new(row.password_hash),
            role,
            created_at: row.created_at,
        },
        active: row.active,
        updated_at: row.updated_at,
        deleted_at: row.deleted_at,
    }))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewUserRow {
            id: *user.id().as_uuid(),
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            password_hash: user.password().as_str(),
            role: user.role().as_str(),
            active: user.is_active(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
            deleted_at: user.deleted_at(),
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, user.email()))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = UserUpdate {
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            password_hash: user.password().as_str(),
            role: user.role().as_str(),
            active: user.is_active(),
            updated_at: user.updated_at(),
            deleted_at: user.deleted_at(),
        };
        let updated = diesel::update(users::table.filter(users::id.eq(user.id().as_uuid())))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err, user.email()))?;

        if updated == 0 {
            return Err(UserPersistenceError::missing(user.id().to_string()));
        }
        Ok(())
    }
}
