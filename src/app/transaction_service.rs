//! Transaction use cases. Transactions are append-only: there is no update
//! or delete path.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::validation::{MONEY_DIGITS, ensure_valid, numeric_limit};
use crate::domain::{
    Account, AccountRepository, AppError, CreateTransactionRequest, Page, Transaction,
    TransactionRepository,
};

const TRANSACTIONS_NOT_FOUND: &str = "Transactions not found";
const TRANSACTION_NOT_FOUND: &str = "Transaction not found";

/// Transaction service.
///
/// Business rules are checked against the current account state before the
/// repository applies the transfer; the repository re-checks the balance
/// inside its own database transaction.
pub struct TransactionService {
    transactions: Arc<dyn TransactionRepository>,
    accounts: Arc<dyn AccountRepository>,
}

impl TransactionService {
    #[must_use]
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        accounts: Arc<dyn AccountRepository>,
    ) -> Self {
        Self {
            transactions,
            accounts,
        }
    }

    /// Lists transactions in creation order, optionally only those touching
    /// `account_id`.
    #[instrument(skip(self))]
    pub async fn index(
        &self,
        account_id: Option<Uuid>,
        page: Page,
    ) -> Result<Vec<Transaction>, AppError> {
        self.transactions
            .list_transactions(account_id, page)
            .await
            .map_err(|e| AppError::from_database(e, TRANSACTIONS_NOT_FOUND))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Transaction, AppError> {
        self.transactions
            .get_transaction(id)
            .await
            .map_err(|e| AppError::from_database(e, TRANSACTION_NOT_FOUND))
    }

    /// Moves `request.amount` out of `sender_account_id`, into the receiver
    /// when one is given.
    ///
    /// # Errors
    /// - `Validation` for a missing or non-positive amount, or a self-transfer
    /// - `NotFound` when the sender or receiver account does not exist
    /// - `BadRequest` for inactive accounts, mismatched currencies or
    ///   insufficient funds; nothing is mutated in these cases
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        sender_account_id: Uuid,
        request: &CreateTransactionRequest,
    ) -> Result<Transaction, AppError> {
        ensure_valid(request.validate(sender_account_id)).inspect_err(|e| {
            warn!(violations = ?e.violations(), "Transaction validation failed");
        })?;

        let transaction = request.to_transaction(Uuid::new_v4(), sender_account_id);
        let sender = self.account(sender_account_id, "Sender account not found").await?;
        let receiver = match transaction.receiver_account_id {
            Some(id) => Some(self.account(id, "Receiver account not found").await?),
            None => None,
        };
        check_transfer(&sender, receiver.as_ref(), &transaction)?;

        let rows = self
            .transactions
            .create_transaction(&transaction)
            .await
            .map_err(|e| AppError::from_database(e, "Account not found"))?;
        if rows == 0 {
            return Err(AppError::Internal("transaction was not created".to_string()));
        }

        info!(
            transaction_id = %transaction.id,
            amount = %transaction.amount,
            "Transaction created"
        );
        Ok(transaction)
    }

    async fn account(&self, id: Uuid, not_found: &str) -> Result<Account, AppError> {
        self.accounts
            .find_account(id)
            .await
            .map_err(|e| AppError::from_database(e, not_found))
    }
}

/// Business rules a transfer must satisfy before any balance moves.
fn check_transfer(
    sender: &Account,
    receiver: Option<&Account>,
    transaction: &Transaction,
) -> Result<(), AppError> {
    if !sender.is_active() {
        return Err(AppError::BadRequest("sender account is not active".to_string()));
    }
    if let Some(receiver) = receiver {
        if !receiver.is_active() {
            return Err(AppError::BadRequest(
                "receiver account is not active".to_string(),
            ));
        }
        if receiver.currency != sender.currency {
            return Err(AppError::BadRequest(format!(
                "currency mismatch: sender uses {}, receiver uses {}",
                sender.currency, receiver.currency
            )));
        }
        if receiver.balance + transaction.amount >= numeric_limit(MONEY_DIGITS) {
            return Err(AppError::BadRequest(
                "receiver balance would exceed the maximum".to_string(),
            ));
        }
    }
    if transaction.amount > sender.balance {
        warn!(account_id = %sender.id, "Insufficient funds");
        return Err(AppError::BadRequest("insufficient funds".to_string()));
    }
    Ok(())
}
