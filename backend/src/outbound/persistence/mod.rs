//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories implement the domain ports over `diesel-async` connections
//! drawn from a `bb8` pool. Row structs (`models.rs`) and table definitions
//! (`schema.rs`) stay private to this module; every database failure is
//! translated into the port's error type before it leaves an adapter.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/travel")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_travel_request_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_travel_request_repository::DieselTravelRequestRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{
    MIGRATIONS, MigrationError, MigrationState, embedded_migrations, force_version,
    migration_status, revert_migrations, run_pending_migrations,
};
pub use pool::{DEFAULT_POOL_SIZE, DbPool, PoolConfig, PoolError};
