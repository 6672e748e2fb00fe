//! Test utilities and mock implementations.
//!
//! This module provides an in-memory store implementing every repository
//! trait, plus fixture builders shared by unit and integration tests.

pub mod fixtures;
pub mod mocks;

pub use fixtures::{bearer, customer_request, seed_account, seed_customer, state_with_store};
pub use mocks::{MockConfig, MockStore};
