//! # SRMS Database Crate
//!
//! The persistence gateway: a best-effort mirror of student records into a
//! relational store.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** all SQL lives here. The rest of the application talks to
//!   the `StudentGateway` trait and never sees a connection.
//! - **Connection per call:** every insert opens its own connection and
//!   closes it before returning. There is no pool; at this scale a slow or
//!   missing database only stalls the request that is writing.
//! - **Explicit outcome:** failures come back as `DbError` so callers can
//!   log them, even though they never surface to users.
//!
//! ## Public API
//!
//! - `connect`: opens one connection, choosing the driver from the URL.
//! - `StudentGateway`: the insert-only persistence contract.
//! - `SqlStudentGateway`: the SQL implementation of that contract.
//! - `DbError`: the error type returned by this crate.

pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::connect;
pub use error::DbError;
pub use repository::{SqlStudentGateway, StudentGateway};
