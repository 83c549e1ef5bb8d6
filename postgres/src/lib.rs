//! `PostgreSQL` record store for the RSVP event-registration service.
//!
//! This crate provides the production implementation of the `RecordStore`
//! trait from `rsvp-core`. It uses sqlx and supports:
//!
//! - Insert-if-absent for events, users and registrations (`ON CONFLICT DO NOTHING`)
//! - Conditional status transitions for waitlist promotion
//! - An atomic per-event seat counter for the counter admission mode
//! - Connection pooling and embedded migrations
//!
//! Every trait method issues exactly one SQL statement; there are no
//! multi-statement transactions.
//!
//! # Example
//!
//! ```ignore
//! use rsvp_postgres::{PoolConfig, PostgresRecordStore};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PostgresRecordStore::connect("postgres://localhost/rsvp", &PoolConfig::default()).await?;
//!     store.migrate().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod record_store;
mod rows;

pub use record_store::{PoolConfig, PostgresRecordStore};
