//! Concrete database client implementations.
//!
//! `PostgresClient` implements every repository trait defined in the domain
//! layer against a single connection pool.

pub mod postgres;

pub use postgres::{PostgresClient, PostgresConfig};
