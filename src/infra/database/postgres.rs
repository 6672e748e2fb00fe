//! PostgreSQL database client implementation.

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgPoolOptions, postgres::PgRow};
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::{
    Account, AccountRepository, Customer, CustomerRepository, DatabaseError, DatabaseHealth, Page,
    Transaction, TransactionRepository,
};

const CUSTOMER_COLUMNS: &str =
    "id, first_name, last_name, birthday, email, phone, state, address, created_at, token";

const ACCOUNT_COLUMNS: &str = "id, customer_id, balance, account_type, currency, status, \
     opening_date, last_transaction_date, interest_rate, created_at";

const TRANSACTION_COLUMNS: &str =
    "id, sender_account_id, receiver_account_id, amount, status, created_at";

/// PostgreSQL connection pool configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(3),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

/// PostgreSQL database client with connection pooling
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client with custom configuration
    pub async fn new(database_url: &str, config: PostgresConfig) -> Result<Self, DatabaseError> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect(database_url)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client with default configuration
    pub async fn with_defaults(database_url: &str) -> Result<Self, DatabaseError> {
        Self::new(database_url, PostgresConfig::default()).await
    }

    /// Run database migrations using sqlx migrate
    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the underlying connection pool (for testing)
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_customer(row: &PgRow) -> Result<Customer, DatabaseError> {
        Ok(Customer {
            id: row.try_get("id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            birthday: row.try_get("birthday")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            state: row.try_get("state")?,
            address: row.try_get("address")?,
            token: row.try_get("token")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_account(row: &PgRow) -> Result<Account, DatabaseError> {
        Ok(Account {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            balance: row.try_get("balance")?,
            account_type: parse_column(row, "account_type")?,
            currency: parse_column(row, "currency")?,
            status: parse_column(row, "status")?,
            opening_date: row.try_get("opening_date")?,
            last_transaction_date: row.try_get("last_transaction_date")?,
            interest_rate: row.try_get("interest_rate")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_transaction(row: &PgRow) -> Result<Transaction, DatabaseError> {
        Ok(Transaction {
            id: row.try_get("id")?,
            sender_account_id: row.try_get("sender_account_id")?,
            receiver_account_id: row.try_get("receiver_account_id")?,
            amount: row.try_get("amount")?,
            status: parse_column(row, "status")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Reads a TEXT column holding an enumeration.
fn parse_column<T>(row: &PgRow, column: &str) -> Result<T, DatabaseError>
where
    T: std::str::FromStr<Err = String>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(DatabaseError::Query)
}

/// Maps an empty result page to `NotFound`.
fn non_empty<T>(items: Vec<T>, what: &str) -> Result<Vec<T>, DatabaseError> {
    if items.is_empty() {
        Err(DatabaseError::NotFound(format!("no {what} rows")))
    } else {
        Ok(items)
    }
}

/// Maps a zero-row write to `NotFound`.
fn affected(rows: u64, what: &str) -> Result<(), DatabaseError> {
    if rows == 0 {
        Err(DatabaseError::NotFound(format!("no {what} rows affected")))
    } else {
        Ok(())
    }
}

#[async_trait]
impl DatabaseHealth for PostgresClient {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl CustomerRepository for PostgresClient {
    #[instrument(skip(self))]
    async fn get_customer(&self, id: Uuid) -> Result<Customer, DatabaseError> {
        let row = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1 LIMIT 1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_customer(&row)
    }

    #[instrument(skip(self))]
    async fn list_customers(&self, page: Page) -> Result<Vec<Customer>, DatabaseError> {
        let rows = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY created_at, id LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        let customers = rows
            .iter()
            .map(Self::row_to_customer)
            .collect::<Result<Vec<_>, _>>()?;
        non_empty(customers, "customer")
    }

    #[instrument(skip(self, customer), fields(customer_id = %customer.id))]
    async fn create_customer(&self, customer: &Customer) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r#"
            INSERT INTO customers
                (id, first_name, last_name, birthday, email, phone, state, address, created_at, token)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(customer.id)
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(customer.birthday)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.state)
        .bind(&customer.address)
        .bind(customer.created_at)
        .bind(&customer.token)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self, customer), fields(customer_id = %customer.id))]
    async fn update_customer(&self, customer: &Customer) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET first_name = $1, last_name = $2, birthday = $3, email = $4,
                phone = $5, state = $6, address = $7
            WHERE id = $8
            "#,
        )
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(customer.birthday)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.state)
        .bind(&customer.address)
        .bind(customer.id)
        .execute(&self.pool)
        .await?;

        affected(result.rows_affected(), "customer")
    }

    #[instrument(skip(self))]
    async fn delete_customer(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        affected(result.rows_affected(), "customer")
    }

    #[instrument(skip(self, token))]
    async fn customer_has_token(&self, id: Uuid, token: &str) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1 AND token = $2)",
        )
        .bind(id)
        .bind(token)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

#[async_trait]
impl AccountRepository for PostgresClient {
    #[instrument(skip(self))]
    async fn get_account(&self, id: Uuid, customer_id: Uuid) -> Result<Account, DatabaseError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1 AND customer_id = $2 LIMIT 1"
        ))
        .bind(id)
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_account(&row)
    }

    #[instrument(skip(self))]
    async fn find_account(&self, id: Uuid) -> Result<Account, DatabaseError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1 LIMIT 1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_account(&row)
    }

    #[instrument(skip(self))]
    async fn list_accounts(
        &self,
        customer_id: Uuid,
        page: Page,
    ) -> Result<Vec<Account>, DatabaseError> {
        let rows = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE customer_id = $1 \
             ORDER BY created_at, id LIMIT $2 OFFSET $3"
        ))
        .bind(customer_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        let accounts = rows
            .iter()
            .map(Self::row_to_account)
            .collect::<Result<Vec<_>, _>>()?;
        non_empty(accounts, "account")
    }

    #[instrument(skip(self, account), fields(account_id = %account.id))]
    async fn create_account(&self, account: &Account) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts
                (id, customer_id, balance, account_type, currency, status,
                 opening_date, last_transaction_date, interest_rate, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(account.id)
        .bind(account.customer_id)
        .bind(account.balance)
        .bind(account.account_type.as_str())
        .bind(account.currency.as_str())
        .bind(account.status.as_str())
        .bind(account.opening_date)
        .bind(account.last_transaction_date)
        .bind(account.interest_rate)
        .bind(account.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self, account), fields(account_id = %account.id))]
    async fn update_account(&self, account: &Account) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET account_type = $1, currency = $2, status = $3, interest_rate = $4
            WHERE id = $5 AND customer_id = $6
            "#,
        )
        .bind(account.account_type.as_str())
        .bind(account.currency.as_str())
        .bind(account.status.as_str())
        .bind(account.interest_rate)
        .bind(account.id)
        .bind(account.customer_id)
        .execute(&self.pool)
        .await?;

        affected(result.rows_affected(), "account")
    }

    #[instrument(skip(self))]
    async fn delete_account(&self, id: Uuid, customer_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1 AND customer_id = $2")
            .bind(id)
            .bind(customer_id)
            .execute(&self.pool)
            .await?;

        affected(result.rows_affected(), "account")
    }

    #[instrument(skip(self))]
    async fn account_owned_by(&self, id: Uuid, customer_id: Uuid) -> Result<bool, DatabaseError> {
        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1 AND customer_id = $2)",
        )
        .bind(id)
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(owned)
    }
}

#[async_trait]
impl TransactionRepository for PostgresClient {
    #[instrument(skip(self))]
    async fn get_transaction(&self, id: Uuid) -> Result<Transaction, DatabaseError> {
        let row = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1 LIMIT 1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_transaction(&row)
    }

    #[instrument(skip(self))]
    async fn list_transactions(
        &self,
        account_id: Option<Uuid>,
        page: Page,
    ) -> Result<Vec<Transaction>, DatabaseError> {
        let rows = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             WHERE $1::uuid IS NULL OR sender_account_id = $1 OR receiver_account_id = $1 \
             ORDER BY created_at, id LIMIT $2 OFFSET $3"
        ))
        .bind(account_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        let transactions = rows
            .iter()
            .map(Self::row_to_transaction)
            .collect::<Result<Vec<_>, _>>()?;
        non_empty(transactions, "transaction")
    }

    #[instrument(
        skip(self, transaction),
        fields(transaction_id = %transaction.id, sender = %transaction.sender_account_id)
    )]
    async fn create_transaction(&self, transaction: &Transaction) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Guarded debit: zero rows means the balance no longer covers the amount.
        let debit = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = balance - $1, last_transaction_date = $2
            WHERE id = $3 AND balance >= $1
            "#,
        )
        .bind(transaction.amount)
        .bind(transaction.created_at)
        .bind(transaction.sender_account_id)
        .execute(&mut *tx)
        .await?;

        if debit.rows_affected() == 0 {
            tx.rollback().await?;
            warn!("Debit rejected, balance does not cover the amount");
            return Err(DatabaseError::InsufficientFunds(
                transaction.sender_account_id.to_string(),
            ));
        }

        if let Some(receiver) = transaction.receiver_account_id {
            let credit = sqlx::query(
                r#"
                UPDATE accounts
                SET balance = balance + $1, last_transaction_date = $2
                WHERE id = $3
                "#,
            )
            .bind(transaction.amount)
            .bind(transaction.created_at)
            .bind(receiver)
            .execute(&mut *tx)
            .await?;

            if credit.rows_affected() == 0 {
                tx.rollback().await?;
                return Err(DatabaseError::NotFound(format!("receiver account {receiver}")));
            }
        }

        let insert = sqlx::query(
            r#"
            INSERT INTO transactions
                (id, sender_account_id, receiver_account_id, amount, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(transaction.id)
        .bind(transaction.sender_account_id)
        .bind(transaction.receiver_account_id)
        .bind(transaction.amount)
        .bind(transaction.status.as_str())
        .bind(transaction.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Transaction applied");
        Ok(insert.rows_affected())
    }
}
