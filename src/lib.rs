//! Bank Demo API
//!
//! A REST API managing customers, their accounts and the transactions
//! between those accounts, backed by PostgreSQL.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   API Layer                  │
//! │  handlers, extractors, auth guards, routing  │
//! ├─────────────────────────────────────────────┤
//! │               Application Layer              │
//! │   customer, account and transaction services │
//! ├─────────────────────────────────────────────┤
//! │                 Domain Layer                 │
//! │  entities, validation, repository traits,    │
//! │  errors                                      │
//! ├─────────────────────────────────────────────┤
//! │             Infrastructure Layer             │
//! │      PostgreSQL repositories, tracing        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Every repository is an `async_trait` behind an `Arc<dyn _>`, so the
//! services run unchanged against [`infra::PostgresClient`] or the in-memory
//! `test_utils::MockStore`.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use bank_demo_api::api::create_router;
//! use bank_demo_api::app::AppState;
//! use bank_demo_api::infra::PostgresClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(PostgresClient::with_defaults(&database_url).await?);
//!     db.run_migrations().await?;
//!
//!     let state = Arc::new(AppState::from_store(db));
//!     let router = create_router(state);
//!     axum::serve(listener, router).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod domain;
pub mod infra;

// Test utilities are available in tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
