//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the DDL issued by
//! [`super::schema_bootstrap::ensure_schema`] exactly.

diesel::table! {
    /// Stored users.
    users (id) {
        /// Primary key: serial integer.
        id -> Int4,
        name -> Varchar,
        /// Unique across all rows.
        email -> Varchar,
        created_at -> Timestamptz,
        /// Refreshed on every update.
        updated_at -> Timestamptz,
    }
}
