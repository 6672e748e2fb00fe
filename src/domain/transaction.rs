//! Transaction entity. Transactions are append-only.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::validation::{MONEY_DIGITS, Violations};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Completed,
    Failed,
}

impl TransactionStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown transaction status: {other}")),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A money movement out of `sender_account_id`.
///
/// Without a receiver the transaction is a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub id: Uuid,
    pub sender_account_id: Uuid,
    pub receiver_account_id: Option<Uuid>,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/customer/{customer_id}/account/{account_id}/transactions`.
///
/// The sender comes from the path, never from the body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    #[serde(default)]
    pub receiver_account_id: Option<Uuid>,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

impl CreateTransactionRequest {
    #[must_use]
    pub fn validate(&self, sender_account_id: Uuid) -> Vec<String> {
        let mut v = Violations::new();
        if let Some(amount) = v.require_some("amount", self.amount.as_ref()) {
            if *amount <= Decimal::ZERO {
                v.push("amount must be greater than zero");
            }
            v.fits_numeric("amount", Some(amount), MONEY_DIGITS);
        }
        if self.receiver_account_id == Some(sender_account_id) {
            v.push("receiver account cannot be the sender account");
        }
        v.into_vec()
    }

    #[must_use]
    pub fn to_transaction(&self, id: Uuid, sender_account_id: Uuid) -> Transaction {
        Transaction {
            id,
            sender_account_id,
            receiver_account_id: self.receiver_account_id,
            amount: self.amount.unwrap_or_default(),
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        }
    }
}
