//! Bearer-token and account-ownership guards for customer-scoped routes.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::domain::AppError;

/// Requires `Authorization: Bearer <token>` matching the `{customer_id}`
/// path parameter.
///
/// A missing or malformed header is a 400, a token that does not belong to
/// the customer is a 401.
pub async fn require_token(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?.to_owned();
    let customer_id = path_uuid(&params, "customer_id")?;

    state.customers.authenticate(customer_id, &token).await?;
    Ok(next.run(request).await)
}

/// Requires `{account_id}` to belong to `{customer_id}`. Runs after
/// [`require_token`].
pub async fn require_owner(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let customer_id = path_uuid(&params, "customer_id")?;
    let account_id = path_uuid(&params, "account_id")?;

    state.accounts.is_owner(customer_id, account_id).await?;
    Ok(next.run(request).await)
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| bad_token("missing Authorization header"))?
        .to_str()
        .map_err(|_| bad_token("Authorization header is not valid text"))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| bad_token("expected `Bearer <token>`"))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(bad_token("expected `Bearer <token>`"));
    }
    Ok(token)
}

fn bad_token(reason: &str) -> AppError {
    AppError::BadRequest(format!("Failed to parse the token: {reason}"))
}

fn path_uuid(params: &HashMap<String, String>, name: &str) -> Result<Uuid, AppError> {
    let raw = params
        .get(name)
        .ok_or_else(|| AppError::BadRequest(format!("Failed to parse UUID: missing `{name}`")))?;
    Uuid::parse_str(raw).map_err(|e| AppError::BadRequest(format!("Failed to parse UUID: {e}")))
}
