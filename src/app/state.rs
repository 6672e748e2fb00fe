//! Application state management.
//!
//! This module provides the shared application state that is
//! accessible to all request handlers via Axum's State extractor.

use std::sync::Arc;

use tracing::{instrument, warn};

use crate::domain::{
    AccountRepository, CustomerRepository, DatabaseHealth, HealthResponse, HealthStatus,
    TransactionRepository,
};

use super::{AccountService, CustomerService, TransactionService};

/// Shared application state for the Axum web server.
///
/// Holds one service per entity plus the store's health check. Every field
/// is an `Arc`, so cloning the state is cheap and it can be shared across
/// tasks.
#[derive(Clone)]
pub struct AppState {
    pub customers: Arc<CustomerService>,
    pub accounts: Arc<AccountService>,
    pub transactions: Arc<TransactionService>,
    pub health: Arc<dyn DatabaseHealth>,
}

impl AppState {
    /// Creates the services from explicit repository handles.
    #[must_use]
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        accounts: Arc<dyn AccountRepository>,
        transactions: Arc<dyn TransactionRepository>,
        health: Arc<dyn DatabaseHealth>,
    ) -> Self {
        Self {
            customers: Arc::new(CustomerService::new(customers)),
            accounts: Arc::new(AccountService::new(Arc::clone(&accounts))),
            transactions: Arc::new(TransactionService::new(transactions, accounts)),
            health,
        }
    }

    /// Wires every service to a single store implementing all repositories.
    ///
    /// ```ignore
    /// let db = Arc::new(PostgresClient::with_defaults(&database_url).await?);
    /// let state = Arc::new(AppState::from_store(db));
    /// ```
    #[must_use]
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: CustomerRepository
            + AccountRepository
            + TransactionRepository
            + DatabaseHealth
            + 'static,
    {
        Self::new(
            Arc::clone(&store) as Arc<dyn CustomerRepository>,
            Arc::clone(&store) as Arc<dyn AccountRepository>,
            Arc::clone(&store) as Arc<dyn TransactionRepository>,
            store as Arc<dyn DatabaseHealth>,
        )
    }

    /// Probes the database.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> HealthResponse {
        let database = match self.health.health_check().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => {
                warn!(error = ?e, "Database health check failed");
                HealthStatus::Unhealthy
            }
        };
        HealthResponse::new(database)
    }
}
