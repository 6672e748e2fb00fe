//! Shared request/response shapes: pagination, response envelopes and health.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::error::AppError;

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 100;

/// Resolved `LIMIT`/`OFFSET` pair handed to the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    /// Resolves raw query values. A missing limit falls back to
    /// [`DEFAULT_LIMIT`], larger values are clamped to [`MAX_LIMIT`].
    pub fn resolve(limit: Option<i64>, offset: Option<i64>) -> Result<Self, AppError> {
        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(l) if l <= 0 => {
                return Err(AppError::BadRequest(
                    "Failed to parse parameters: limit must be greater than zero".to_string(),
                ));
            }
            Some(l) => l.min(MAX_LIMIT),
        };
        let offset = match offset {
            None => 0,
            Some(o) if o < 0 => {
                return Err(AppError::BadRequest(
                    "Failed to parse parameters: offset cannot be negative".to_string(),
                ));
            }
            Some(o) => o,
        };
        Ok(Self { limit, offset })
    }

    /// Slices an in-memory, creation-ordered list the way `LIMIT/OFFSET` does.
    #[must_use]
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let offset = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.iter().skip(offset).take(limit).cloned().collect()
    }
}

/// `?limit=&offset=` query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Maximum number of records (1-100, default 50)
    pub limit: Option<i64>,
    /// Number of records to skip (default 0)
    pub offset: Option<i64>,
}

impl ListParams {
    pub fn page(&self) -> Result<Page, AppError> {
        Page::resolve(self.limit, self.offset)
    }
}

/// `?limit=&offset=&account_id=` query string of the transaction index.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransactionListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Only transactions sent or received by this account (UUID)
    pub account_id: Option<String>,
}

impl TransactionListParams {
    pub fn page(&self) -> Result<Page, AppError> {
        Page::resolve(self.limit, self.offset)
    }

    /// Parses the `account_id` filter; an empty value means no filter.
    pub fn account_id(&self) -> Result<Option<Uuid>, AppError> {
        match self.account_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => Uuid::parse_str(raw)
                .map(Some)
                .map_err(|e| AppError::BadRequest(format!("Failed to parse UUID: {e}"))),
        }
    }
}

/// Success envelope: `{message, status, data}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub message: String,
    pub status: u16,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn new(status: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            status,
            data: Some(data),
        }
    }

    pub fn empty(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status,
            data: None,
        }
    }
}

/// Error envelope: `{error_message, code}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error_message: String,
    pub code: u16,
}

/// Validation error envelope: `{message, status, errors}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub message: String,
    pub status: u16,
    pub errors: Vec<String>,
}

/// Rate limit error body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RateLimitResponse {
    pub error_message: String,
    pub code: u16,
    pub retry_after: u64,
}

/// Health check status for services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Health check response for the application.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub database: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    #[must_use]
    pub fn new(database: HealthStatus) -> Self {
        Self {
            status: database.clone(),
            database,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
        }
    }
}
