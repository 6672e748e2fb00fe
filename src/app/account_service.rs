//! Account use cases, always scoped to the owning customer.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::validation::ensure_valid;
use crate::domain::{
    Account, AccountRepository, AppError, CreateAccountRequest, DatabaseError, Page,
    UpdateAccountRequest,
};

const ACCOUNTS_NOT_FOUND: &str = "Accounts not found";
const ACCOUNT_NOT_FOUND: &str = "Account not found";

pub struct AccountService {
    repo: Arc<dyn AccountRepository>,
}

impl AccountService {
    #[must_use]
    pub fn new(repo: Arc<dyn AccountRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self))]
    pub async fn index(&self, customer_id: Uuid, page: Page) -> Result<Vec<Account>, AppError> {
        self.repo
            .list_accounts(customer_id, page)
            .await
            .map_err(|e| AppError::from_database(e, ACCOUNTS_NOT_FOUND))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, customer_id: Uuid, account_id: Uuid) -> Result<Account, AppError> {
        self.repo
            .get_account(account_id, customer_id)
            .await
            .map_err(|e| AppError::from_database(e, ACCOUNT_NOT_FOUND))
    }

    /// Opens a new active account for `customer_id`.
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        customer_id: Uuid,
        request: &CreateAccountRequest,
    ) -> Result<Account, AppError> {
        ensure_valid(request.validate()).inspect_err(|e| {
            warn!(violations = ?e.violations(), "Account validation failed");
        })?;

        let account = request.to_account(Uuid::new_v4(), customer_id);
        let rows = self
            .repo
            .create_account(&account)
            .await
            .map_err(|e| AppError::from_database(e, ACCOUNT_NOT_FOUND))?;
        if rows == 0 {
            return Err(AppError::Internal("account was not created".to_string()));
        }

        info!(account_id = %account.id, "Account created");
        Ok(account)
    }

    /// Overwrites type, currency, status and interest rate. The balance only
    /// moves through transactions.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        customer_id: Uuid,
        account_id: Uuid,
        request: &UpdateAccountRequest,
    ) -> Result<Account, AppError> {
        ensure_valid(request.validate())?;

        let mut account = self.get(customer_id, account_id).await?;
        request.apply_to(&mut account);
        self.repo
            .update_account(&account)
            .await
            .map_err(|e| AppError::from_database(e, ACCOUNT_NOT_FOUND))?;

        info!(account_id = %account_id, "Account updated");
        Ok(account)
    }

    /// # Errors
    /// `BadRequest` while any transaction references the account.
    #[instrument(skip(self))]
    pub async fn delete(&self, customer_id: Uuid, account_id: Uuid) -> Result<(), AppError> {
        self.repo
            .delete_account(account_id, customer_id)
            .await
            .map_err(|e| match e {
                DatabaseError::ForeignKey(_) => AppError::BadRequest(
                    "account has transactions and cannot be deleted".to_string(),
                ),
                other => AppError::from_database(other, ACCOUNT_NOT_FOUND),
            })?;
        info!(account_id = %account_id, "Account deleted");
        Ok(())
    }

    /// # Errors
    /// `Unauthorized` when the account does not belong to the customer.
    #[instrument(skip(self))]
    pub async fn is_owner(&self, customer_id: Uuid, account_id: Uuid) -> Result<(), AppError> {
        let owned = self
            .repo
            .account_owned_by(account_id, customer_id)
            .await
            .map_err(|e| AppError::from_database(e, ACCOUNT_NOT_FOUND))?;
        if !owned {
            warn!(%customer_id, %account_id, "Account ownership check failed");
            return Err(AppError::Unauthorized(
                "account does not belong to customer".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AccountStatus, AccountType, CreateTransactionRequest, Currency, TransactionRepository,
    };
    use crate::test_utils::{MockStore, seed_account, seed_customer};
    use rust_decimal::Decimal;

    fn service(store: &Arc<MockStore>) -> AccountService {
        AccountService::new(Arc::clone(store) as Arc<dyn AccountRepository>)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = Arc::new(MockStore::new());
        let owner = seed_customer(&store);
        let accounts = service(&store);

        let request = CreateAccountRequest {
            account_type: Some(AccountType::Savings),
            currency: Some(Currency::Eur),
            balance: Some(Decimal::from(250)),
            interest_rate: Some(Decimal::new(15, 1)),
        };
        let created = accounts.create(owner.id, &request).await.unwrap();
        let fetched = accounts.get(owner.id, created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.status, AccountStatus::Active);
    }

    #[tokio::test]
    async fn test_create_validation_failure() {
        let store = Arc::new(MockStore::new());
        let owner = seed_customer(&store);

        let err = service(&store)
            .create(owner.id, &CreateAccountRequest::default())
            .await
            .unwrap_err();

        assert_eq!(
            err.violations().unwrap(),
            ["account type is required", "currency is required", "balance is required"]
        );
        assert!(store.accounts().is_empty());
    }

    #[tokio::test]
    async fn test_get_is_scoped_to_owner() {
        let store = Arc::new(MockStore::new());
        let owner = seed_customer(&store);
        let stranger = seed_customer(&store);
        let account = seed_account(&store, owner.id, Decimal::from(10), Currency::Usd);

        let err = service(&store).get(stranger.id, account.id).await.unwrap_err();
        assert_eq!(err, AppError::NotFound("Account not found".to_string()));
    }

    #[tokio::test]
    async fn test_update_never_changes_balance() {
        let store = Arc::new(MockStore::new());
        let owner = seed_customer(&store);
        let account = seed_account(&store, owner.id, Decimal::from(10), Currency::Usd);

        let request = UpdateAccountRequest {
            account_type: Some(AccountType::Business),
            currency: Some(Currency::Usd),
            status: Some(AccountStatus::Frozen),
            interest_rate: Some(Decimal::ONE),
        };
        let updated = service(&store)
            .update(owner.id, account.id, &request)
            .await
            .unwrap();

        assert_eq!(updated.status, AccountStatus::Frozen);
        assert_eq!(updated.created_at, account.created_at);
        let stored = store.find_account_by_id(account.id).unwrap();
        assert_eq!(stored.balance, Decimal::from(10));
        assert_eq!(stored.account_type, AccountType::Business);
    }

    #[tokio::test]
    async fn test_index_pages_in_creation_order() {
        let store = Arc::new(MockStore::new());
        let owner = seed_customer(&store);
        let ids: Vec<Uuid> = (0..4)
            .map(|i| seed_account(&store, owner.id, Decimal::from(i), Currency::Czk).id)
            .collect();

        let page = Page { limit: 2, offset: 1 };
        let listed = service(&store).index(owner.id, page).await.unwrap();

        assert_eq!(listed.iter().map(|a| a.id).collect::<Vec<_>>(), ids[1..3]);
    }

    #[tokio::test]
    async fn test_is_owner() {
        let store = Arc::new(MockStore::new());
        let owner = seed_customer(&store);
        let stranger = seed_customer(&store);
        let account = seed_account(&store, owner.id, Decimal::ZERO, Currency::Gbp);
        let accounts = service(&store);

        assert!(accounts.is_owner(owner.id, account.id).await.is_ok());
        assert!(matches!(
            accounts.is_owner(stranger.id, account.id).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let store = Arc::new(MockStore::new());
        let owner = seed_customer(&store);
        let account = seed_account(&store, owner.id, Decimal::ZERO, Currency::Gbp);
        let accounts = service(&store);

        accounts.delete(owner.id, account.id).await.unwrap();
        assert!(matches!(
            accounts.get(owner.id, account.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_refused_once_account_has_transactions() {
        let store = Arc::new(MockStore::new());
        let owner = seed_customer(&store);
        let account = seed_account(&store, owner.id, Decimal::from(5), Currency::Gbp);
        let transfer = CreateTransactionRequest {
            receiver_account_id: None,
            amount: Some(Decimal::ONE),
        }
        .to_transaction(Uuid::new_v4(), account.id);
        store.create_transaction(&transfer).await.unwrap();

        let err = service(&store).delete(owner.id, account.id).await.unwrap_err();

        assert_eq!(
            err,
            AppError::BadRequest("account has transactions and cannot be deleted".to_string())
        );
        assert!(store.find_account_by_id(account.id).is_some());
        assert_eq!(store.transactions(), vec![transfer]);
    }
}
