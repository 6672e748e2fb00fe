//! Customer use cases.

use std::sync::Arc;

use rand::{Rng, distributions::Alphanumeric};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::validation::ensure_valid;
use crate::domain::{
    AppError, CreatedCustomer, Customer, CustomerDto, CustomerRepository, CustomerRequest,
    DatabaseError, Page,
};

/// Length of the bearer token issued to new customers.
pub const TOKEN_LENGTH: usize = 40;

const CUSTOMERS_NOT_FOUND: &str = "Customers not found";
const CUSTOMER_NOT_FOUND: &str = "Customer not found";

/// Generates an opaque alphanumeric bearer token.
#[must_use]
pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Customer service: listing, CRUD and token authentication.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(PostgresClient::with_defaults(&url).await?);
/// let customers = CustomerService::new(store);
///
/// let created = customers.create(&request).await?;
/// customers.authenticate(created.id, &created.token).await?;
/// ```
pub struct CustomerService {
    repo: Arc<dyn CustomerRepository>,
}

impl CustomerService {
    #[must_use]
    pub fn new(repo: Arc<dyn CustomerRepository>) -> Self {
        Self { repo }
    }

    /// Lists customers in creation order.
    ///
    /// # Errors
    /// `NotFound` when the page holds no customer.
    #[instrument(skip(self))]
    pub async fn index(&self, page: Page) -> Result<Vec<CustomerDto>, AppError> {
        let customers = self
            .repo
            .list_customers(page)
            .await
            .map_err(|e| AppError::from_database(e, CUSTOMERS_NOT_FOUND))?;
        Ok(customers.iter().map(Customer::to_dto).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<CustomerDto, AppError> {
        let customer = self.find(id).await?;
        Ok(customer.to_dto())
    }

    /// Validates the request and stores a new customer with a fresh
    /// identifier and token.
    #[instrument(skip(self, request))]
    pub async fn create(&self, request: &CustomerRequest) -> Result<CreatedCustomer, AppError> {
        ensure_valid(request.validate()).inspect_err(|e| {
            warn!(violations = ?e.violations(), "Customer validation failed");
        })?;

        let customer = Customer::from_request(request, Uuid::new_v4(), generate_token());
        let rows = self
            .repo
            .create_customer(&customer)
            .await
            .map_err(|e| AppError::from_database(e, CUSTOMER_NOT_FOUND))?;
        if rows == 0 {
            return Err(AppError::Internal("customer was not created".to_string()));
        }

        info!(customer_id = %customer.id, "Customer created");
        Ok(CreatedCustomer {
            id: customer.id,
            token: customer.token,
        })
    }

    /// Overwrites the mutable fields of an existing customer.
    #[instrument(skip(self, request))]
    pub async fn update(&self, id: Uuid, request: &CustomerRequest) -> Result<CustomerDto, AppError> {
        ensure_valid(request.validate())?;

        let mut customer = self.find(id).await?;
        request.apply_to(&mut customer);
        self.repo
            .update_customer(&customer)
            .await
            .map_err(|e| AppError::from_database(e, CUSTOMER_NOT_FOUND))?;

        info!(customer_id = %id, "Customer updated");
        Ok(customer.to_dto())
    }

    /// Deletes the customer together with their accounts.
    ///
    /// # Errors
    /// `BadRequest` while any of those accounts is referenced by a transaction.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.repo
            .delete_customer(id)
            .await
            .map_err(|e| match e {
                DatabaseError::ForeignKey(_) => AppError::BadRequest(
                    "customer has accounts with transactions and cannot be deleted".to_string(),
                ),
                other => AppError::from_database(other, CUSTOMER_NOT_FOUND),
            })?;
        info!(customer_id = %id, "Customer deleted");
        Ok(())
    }

    /// Checks that `token` is the one issued to customer `id`.
    ///
    /// # Errors
    /// `Unauthorized` on mismatch or unknown customer.
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, id: Uuid, token: &str) -> Result<(), AppError> {
        let authorized = self
            .repo
            .customer_has_token(id, token)
            .await
            .map_err(|e| AppError::from_database(e, CUSTOMER_NOT_FOUND))?;
        if !authorized {
            warn!(customer_id = %id, "Rejected bearer token");
            return Err(AppError::Unauthorized("Bad credentials".to_string()));
        }
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Customer, AppError> {
        self.repo
            .get_customer(id)
            .await
            .map_err(|e| AppError::from_database(e, CUSTOMER_NOT_FOUND))
    }
}
