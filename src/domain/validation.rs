//! Field checks shared by the request types.
//!
//! Every request type exposes `validate(&self) -> Vec<String>`. The list keeps
//! the order in which fields are checked so clients can rely on it.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidateEmail;

use super::error::AppError;

/// Decimal places stored for money and rates.
pub const MAX_SCALE: u32 = 4;
/// Integer digits of a `NUMERIC(19, 4)` column.
pub const MONEY_DIGITS: u32 = 15;
/// Integer digits of a `NUMERIC(9, 4)` column.
pub const RATE_DIGITS: u32 = 5;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 \-]{5,}[0-9]$").expect("phone pattern compiles"));

/// Ordered collector of violation messages.
#[derive(Debug, Default)]
pub struct Violations(Vec<String>);

impl Violations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    /// Records `"<field> is required"` when the value is missing or blank.
    /// Returns the trimmed value when present.
    pub fn require<'a>(&mut self, field: &str, value: Option<&'a str>) -> Option<&'a str> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Some(v),
            _ => {
                self.push(format!("{field} is required"));
                None
            }
        }
    }

    /// Records `"<field> is required"` for a missing non-string value.
    pub fn require_some<'a, T>(&mut self, field: &str, value: Option<&'a T>) -> Option<&'a T> {
        if value.is_none() {
            self.push(format!("{field} is required"));
        }
        value
    }

    pub fn non_negative(&mut self, field: &str, value: Option<&Decimal>) {
        if value.is_some_and(Decimal::is_sign_negative) {
            self.push(format!("{field} cannot be negative"));
        }
    }

    /// Records a violation for each way `value` would not fit a column with
    /// `digits` integer digits and [`MAX_SCALE`] decimal places.
    pub fn fits_numeric(&mut self, field: &str, value: Option<&Decimal>, digits: u32) {
        let Some(value) = value else {
            return;
        };
        if value.normalize().scale() > MAX_SCALE {
            self.push(format!(
                "{field} cannot have more than {MAX_SCALE} decimal places"
            ));
        }
        let limit = numeric_limit(digits);
        if value.abs() >= limit {
            self.push(format!("{field} must be less than {limit}"));
        }
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Smallest magnitude that no longer fits in `digits` integer digits.
#[must_use]
pub fn numeric_limit(digits: u32) -> Decimal {
    Decimal::from(10_i64.pow(digits))
}

/// Turns a violation list into a result, short-circuiting on the first
/// non-empty list.
pub fn ensure_valid(violations: Vec<String>) -> Result<(), AppError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(violations))
    }
}

#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    value.validate_email()
}

/// Accepts an optional leading `+` and 7 to 15 digits, separated by spaces
/// or dashes.
#[must_use]
pub fn is_valid_phone(value: &str) -> bool {
    if !PHONE_RE.is_match(value) {
        return false;
    }
    let digits = value.chars().filter(char::is_ascii_digit).count();
    (7..=15).contains(&digits)
}
