//! PostgreSQL-backed `TravelRequestRepository` implementation using Diesel ORM.
//!
//! Reads join `users` to embed the owner. Updates are guarded by the stored
//! revision so competing writers cannot both succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{TravelRequestRepository, TravelRequestRepositoryError};
use crate::domain::{
    StatusStamp, TravelRequest, TravelRequestFilters, TravelRequestId, TravelRequestRecord,
    TravelStatus, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_user_repository::row_to_user;
use super::models::{NewTravelRequestRow, TravelRequestRow, TravelRequestUpdate, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{travel_requests, users};

/// Diesel-backed travel request store.
#[derive(Clone)]
pub struct DieselTravelRequestRepository {
    pool: DbPool,
}

impl DieselTravelRequestRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TravelRequestRepositoryError {
    map_basic_pool_error(error, |message| {
        TravelRequestRepositoryError::connection(message)
    })
}

fn map_diesel_error(error: diesel::result::Error) -> TravelRequestRepositoryError {
    map_basic_diesel_error(
        error,
        TravelRequestRepositoryError::query,
        TravelRequestRepositoryError::connection,
    )
}

/// Cast domain revision (u32) to database revision (i32).
#[expect(
    clippy::cast_possible_wrap,
    reason = "revision values are always small positive integers"
)]
fn cast_revision_for_db(revision: u32) -> i32 {
    revision as i32
}

/// Cast database revision (i32) to domain revision (u32).
#[expect(
    clippy::cast_sign_loss,
    reason = "revision is always positive in database"
)]
fn cast_revision_from_db(revision: i32) -> u32 {
    revision as u32
}

fn stamp(by: Option<Uuid>, at: Option<DateTime<Utc>>) -> Option<StatusStamp> {
    match (by, at) {
        (Some(by), Some(at)) => Some(StatusStamp {
            by: UserId::from_uuid(by),
            at,
        }),
        _ => None,
    }
}

/// Convert a joined row pair into a domain travel request.
fn rows_to_request(
    request: TravelRequestRow,
    owner: UserRow,
) -> Result<TravelRequest, TravelRequestRepositoryError> {
    let id = request.id;
    let invalid = |err: String| {
        TravelRequestRepositoryError::query(format!("invalid stored travel request {id}: {err}"))
    };
    let owner = row_to_user(owner).map_err(|err| invalid(err.to_string()))?;
    let status = request
        .status
        .parse::<TravelStatus>()
        .map_err(|err| invalid(err.to_string()))?;

    let record = TravelRequestRecord {
        id: TravelRequestId::from_uuid(request.id),
        owner_id: UserId::from_uuid(request.owner_id),
        traveler_name: request.traveler_name,
        destination: request.destination,
        departure: request.departure_date,
        return_date: request.return_date,
        status,
        approved: stamp(request.approved_by, request.approved_at),
        canceled: stamp(request.canceled_by, request.canceled_at),
        created_at: request.created_at,
        updated_at: request.updated_at,
        revision: cast_revision_from_db(request.revision),
    };
    TravelRequest::restore(record, owner).map_err(|err| invalid(err.to_string()))
}

/// Escape `LIKE` wildcards in a user-supplied needle.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Explain an update that touched no rows: either the revision moved on or
/// the request is gone.
async fn handle_update_failure<C>(
    conn: &mut C,
    id: Uuid,
    expected_revision: u32,
) -> TravelRequestRepositoryError
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    let current = travel_requests::table
        .filter(travel_requests::id.eq(id))
        .select(travel_requests::revision)
        .first::<i32>(conn)
        .await
        .optional()
        .map_err(map_diesel_error);

    match current {
        Ok(Some(actual)) => TravelRequestRepositoryError::revision_mismatch(
            expected_revision,
            cast_revision_from_db(actual),
        ),
        Ok(None) => TravelRequestRepositoryError::missing(id.to_string()),
        Err(err) => err,
    }
}

#[async_trait]
impl TravelRequestRepository for DieselTravelRequestRepository {
    async fn create(&self, request: &TravelRequest) -> Result<(), TravelRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewTravelRequestRow {
            id: *request.id().as_uuid(),
            owner_id: *request.owner_id().as_uuid(),
            traveler_name: request.traveler_name(),
            destination: request.destination(),
            departure_date: request.departure(),
            return_date: request.return_date(),
            status: request.status().as_str(),
            approved_by: request.approved().map(|stamp| *stamp.by.as_uuid()),
            approved_at: request.approved().map(|stamp| stamp.at),
            canceled_by: request.canceled().map(|stamp| *stamp.by.as_uuid()),
            canceled_at: request.canceled().map(|stamp| stamp.at),
            created_at: request.created_at(),
            updated_at: request.updated_at(),
            revision: cast_revision_for_db(request.revision()),
        };
        diesel::insert_into(travel_requests::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &TravelRequestId,
    ) -> Result<Option<TravelRequest>, TravelRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<(TravelRequestRow, UserRow)> = travel_requests::table
            .inner_join(users::table)
            .filter(travel_requests::id.eq(id.as_uuid()))
            .select((TravelRequestRow::as_select(), UserRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|(request, owner)| rows_to_request(request, owner))
            .transpose()
    }

    async fn update(
        &self,
        request: &TravelRequest,
        expected_revision: u32,
    ) -> Result<(), TravelRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = TravelRequestUpdate {
            traveler_name: request.traveler_name(),
            destination: request.destination(),
            departure_date: request.departure(),
            return_date: request.return_date(),
            status: request.status().as_str(),
            approved_by: request.approved().map(|stamp| *stamp.by.as_uuid()),
            approved_at: request.approved().map(|stamp| stamp.at),
            canceled_by: request.canceled().map(|stamp| *stamp.by.as_uuid()),
            canceled_at: request.canceled().map(|stamp| stamp.at),
            updated_at: request.updated_at(),
            revision: cast_revision_for_db(request.revision()),
        };
        let updated_rows = diesel::update(travel_requests::table)
            .filter(
                travel_requests::id
                    .eq(request.id().as_uuid())
                    .and(travel_requests::revision.eq(cast_revision_for_db(expected_revision))),
            )
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated_rows == 0 {
            return Err(
                handle_update_failure(&mut conn, *request.id().as_uuid(), expected_revision).await,
            );
        }
        Ok(())
    }

    async fn list(
        &self,
        filters: &TravelRequestFilters,
    ) -> Result<Vec<TravelRequest>, TravelRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = travel_requests::table
            .inner_join(users::table)
            .select((TravelRequestRow::as_select(), UserRow::as_select()))
            .into_boxed();
        if let Some(owner) = filters.owner {
            query = query.filter(travel_requests::owner_id.eq(*owner.as_uuid()));
        }
        if let Some(status) = filters.status {
            query = query.filter(travel_requests::status.eq(status.as_str()));
        }
        if let Some(from) = filters.departure_from {
            query = query.filter(travel_requests::departure_date.ge(from));
        }
        if let Some(until) = filters.departure_until {
            query = query.filter(travel_requests::departure_date.le(until));
        }
        if let Some(needle) = filters.destination_needle() {
            query = query.filter(travel_requests::destination.ilike(like_pattern(&needle)));
        }

        let limit = i64::from(filters.page.page_size());
        let offset = i64::try_from(filters.page.offset()).unwrap_or(i64::MAX);
        let rows: Vec<(TravelRequestRow, UserRow)> = query
            .order((travel_requests::created_at.desc(), travel_requests::id.asc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(request, owner)| rows_to_request(request, owner))
            .collect()
    }
}
