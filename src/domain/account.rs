//! Account entity, its enumerations and request shapes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::validation::{MONEY_DIGITS, RATE_DIGITS, Violations};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Checking,
    Savings,
    Business,
}

impl AccountType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::Business => "business",
        }
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "business" => Ok(Self::Business),
            other => Err(format!("unknown account type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Czk,
}

impl Currency {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Czk => "CZK",
        }
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            "CZK" => Ok(Self::Czk),
            other => Err(format!("unknown currency: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
    Frozen,
    Closed,
}

impl AccountStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Frozen => "frozen",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "frozen" => Ok(Self::Frozen),
            "closed" => Ok(Self::Closed),
            other => Err(format!("unknown account status: {other}")),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),+) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })+
    };
}

display_as_str!(AccountType, Currency, AccountStatus);

/// A customer's account as stored in the `accounts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Account {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub balance: Decimal,
    pub account_type: AccountType,
    pub currency: Currency,
    pub status: AccountStatus,
    pub opening_date: DateTime<Utc>,
    pub last_transaction_date: Option<DateTime<Utc>>,
    pub interest_rate: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Account {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// Body of `POST /api/customer/{customer_id}/accounts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub account_type: Option<AccountType>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub balance: Option<Decimal>,
    #[serde(default)]
    pub interest_rate: Option<Decimal>,
}

impl CreateAccountRequest {
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut v = Violations::new();
        v.require_some("account type", self.account_type.as_ref());
        v.require_some("currency", self.currency.as_ref());
        if let Some(balance) = v.require_some("balance", self.balance.as_ref()) {
            v.non_negative("balance", Some(balance));
            v.fits_numeric("balance", Some(balance), MONEY_DIGITS);
        }
        v.non_negative("interest rate", self.interest_rate.as_ref());
        v.fits_numeric("interest rate", self.interest_rate.as_ref(), RATE_DIGITS);
        v.into_vec()
    }

    /// Builds the account record for an already validated request.
    #[must_use]
    pub fn to_account(&self, id: Uuid, customer_id: Uuid) -> Account {
        let now = Utc::now();
        Account {
            id,
            customer_id,
            balance: self.balance.unwrap_or_default(),
            account_type: self.account_type.unwrap_or(AccountType::Checking),
            currency: self.currency.unwrap_or(Currency::Usd),
            status: AccountStatus::Active,
            opening_date: now,
            last_transaction_date: None,
            interest_rate: self.interest_rate.unwrap_or_default(),
            created_at: now,
        }
    }
}

/// Body of `PUT /api/customer/{customer_id}/account/{account_id}`.
///
/// Has no balance field: balances only move through transactions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub account_type: Option<AccountType>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub status: Option<AccountStatus>,
    #[serde(default)]
    pub interest_rate: Option<Decimal>,
}

impl UpdateAccountRequest {
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut v = Violations::new();
        v.require_some("account type", self.account_type.as_ref());
        v.require_some("currency", self.currency.as_ref());
        v.require_some("status", self.status.as_ref());
        if let Some(rate) = v.require_some("interest rate", self.interest_rate.as_ref()) {
            v.non_negative("interest rate", Some(rate));
            v.fits_numeric("interest rate", Some(rate), RATE_DIGITS);
        }
        v.into_vec()
    }

    pub fn apply_to(&self, account: &mut Account) {
        if let Some(account_type) = self.account_type {
            account.account_type = account_type;
        }
        if let Some(currency) = self.currency {
            account.currency = currency;
        }
        if let Some(status) = self.status {
            account.status = status;
        }
        if let Some(rate) = self.interest_rate {
            account.interest_rate = rate;
        }
    }
}
