//! Process-local adapters used when no database is configured and by
//! workflow tests.
//!
//! Each store guards its map with a single mutex; the travel store checks
//! revisions while holding it, which serialises competing writers.

mod travel_request_repository;
mod user_repository;

pub use travel_request_repository::InMemoryTravelRequestRepository;
pub use user_repository::InMemoryUserRepository;
