//! # AnimeHeaven Database Crate
//!
//! This crate acts as a high-level, application-specific interface to the
//! PostgreSQL database that stores the catalog and its users.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All SQL lives here. The rest of the application talks to
//!   the `CatalogStore` trait and never sees a query.
//! - **Asynchronous & Pooled:** All operations are asynchronous and share one
//!   bounded connection pool (`PgPool`).
//!
//! ## Public API
//!
//! - `connect`: builds the (lazily connecting) pool from the database settings.
//! - `run_migrations`: applies the embedded migrations.
//! - `ping`: a bounded `SELECT 1` round-trip.
//! - `CatalogStore`: the data access interface.
//! - `DbRepository`: the PostgreSQL implementation of `CatalogStore`.
//! - `MemoryStore` (feature `test-util`): an in-memory implementation.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod repository;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, ping, run_migrations};
pub use error::DbError;
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryStore;
pub use repository::DbRepository;
pub use store::CatalogStore;
