//! RSVP - event registration with capacity limits and a FIFO waitlist
//!
//! This crate is the HTTP service around `rsvp-core`. It covers:
//!
//! - **Events and users**: create, read, list, update, delete
//! - **Registrations**: confirmed while seats remain, waitlisted (or refused)
//!   once the event is full
//! - **Promotion**: deleting a confirmed registration promotes the oldest
//!   waitlisted one
//!
//! # Architecture
//!
//! ```text
//!   HTTP ──► routes ──► api handlers ──► RegistrationManager / EventCatalog / UserDirectory
//!                                                     │
//!                                                     ▼
//!                                            dyn RecordStore
//!                                        (PostgreSQL or in-memory)
//! ```
//!
//! # Admission modes
//!
//! `ADMISSION_MODE=snapshot` (default) counts confirmed registrations and then
//! inserts, so concurrent requests near capacity can overbook.
//! `ADMISSION_MODE=counter` claims a seat with one conditional update on the
//! event's seat counter before inserting and never overbooks.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod metrics;
pub mod server;

pub use config::Config;
pub use server::{AppState, build_router};
