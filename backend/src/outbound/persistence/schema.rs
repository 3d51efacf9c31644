//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`.
//! Regenerate with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts. `email` is unique and stored lower case.
    users (id) {
        id -> Uuid,
        #[max_length = 255]
        name -> Varchar,
        #[max_length = 255]
        email -> Varchar,
        password_hash -> Text,
        /// `USER` or `ADMIN`.
        #[max_length = 16]
        role -> Varchar,
        active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Travel requests awaiting or past an administrator decision.
    travel_requests (id) {
        id -> Uuid,
        owner_id -> Uuid,
        #[max_length = 255]
        traveler_name -> Varchar,
        #[max_length = 255]
        destination -> Varchar,
        departure_date -> Timestamptz,
        return_date -> Nullable<Timestamptz>,
        /// `SOLICITED`, `APPROVED`, or `CANCELED`.
        #[max_length = 16]
        status -> Varchar,
        approved_by -> Nullable<Uuid>,
        approved_at -> Nullable<Timestamptz>,
        canceled_by -> Nullable<Uuid>,
        canceled_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        /// Optimistic concurrency counter, starting at 1.
        revision -> Int4,
    }
}

diesel::joinable!(travel_requests -> users (owner_id));

diesel::allow_tables_to_appear_in_same_query!(travel_requests, users);
