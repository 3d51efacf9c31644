//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM, plus the
//!   embedded schema migrations.
//! - **memory**: mutex-guarded stores used by tests and by the server when
//!   no database URL is configured.
//! - **security**: Argon2id password hashing and HS256 bearer credentials.
//! - **notification**: owner notices written as structured log records.
//!
//! Adapters only translate between domain types and infrastructure
//! representations; they hold no workflow rules.

pub mod memory;
pub mod notification;
pub mod persistence;
pub mod security;
