//! Fixture builders shared by unit and integration tests.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::app::{AppState, generate_token};
use crate::domain::{
    Account, AccountType, CreateAccountRequest, Currency, Customer, CustomerRequest,
};

use super::mocks::MockStore;

/// A customer body that passes validation.
#[must_use]
pub fn customer_request() -> CustomerRequest {
    CustomerRequest {
        first_name: Some("John".to_string()),
        last_name: Some("Doe".to_string()),
        birthday: Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).single(),
        email: Some("john.doe@example.com".to_string()),
        phone: Some("+420605401050".to_string()),
        state: Some("Czechia".to_string()),
        address: Some("123 Main St".to_string()),
    }
}

/// Inserts a valid customer with a fresh token straight into the store.
pub fn seed_customer(store: &MockStore) -> Customer {
    let customer = Customer::from_request(&customer_request(), Uuid::new_v4(), generate_token());
    store.insert_customer(customer.clone());
    customer
}

/// Inserts an active checking account straight into the store.
pub fn seed_account(
    store: &MockStore,
    customer_id: Uuid,
    balance: Decimal,
    currency: Currency,
) -> Account {
    let account = CreateAccountRequest {
        account_type: Some(AccountType::Checking),
        currency: Some(currency),
        balance: Some(balance),
        interest_rate: None,
    }
    .to_account(Uuid::new_v4(), customer_id);
    store.insert_account(account.clone());
    account
}

/// Application state wired entirely to `store`.
#[must_use]
pub fn state_with_store(store: Arc<MockStore>) -> Arc<AppState> {
    Arc::new(AppState::from_store(store))
}

/// `Authorization` header value for `token`.
#[must_use]
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
