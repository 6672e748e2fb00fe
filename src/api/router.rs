//! HTTP routing configuration with auth guards, rate limiting and CORS.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderValue, Method, Request, Response, StatusCode, header},
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post, put},
};
use governor::{Quota, RateLimiter};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::app::AppState;
use crate::domain::RateLimitResponse;

use super::handlers::{
    create_account, create_customer, create_transaction, delete_account, delete_customer,
    get_account, get_customer, get_transaction, health_check_handler, list_accounts,
    list_customers, list_transactions, liveness_handler, openapi_handler, readiness_handler,
    update_account, update_customer,
};
use super::middleware::{require_owner, require_token};

/// Request timeout used by [`create_router`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests per second for `/api` endpoints
    pub general_rps: u32,
    /// Burst size for `/api` endpoints
    pub general_burst: u32,
    /// Requests per second for health endpoints
    pub health_rps: u32,
    /// Burst size for health endpoints
    pub health_burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            general_rps: 10,
            general_burst: 20,
            health_rps: 100,
            health_burst: 100,
        }
    }
}

type KeyedLimiter = RateLimiter<
    IpAddr,
    governor::state::keyed::DashMapStateStore<IpAddr>,
    governor::clock::DefaultClock,
>;

/// Shared rate limiter state, keyed by client IP.
pub struct RateLimitState {
    api_limiter: KeyedLimiter,
    health_limiter: KeyedLimiter,
    config: RateLimitConfig,
}

impl RateLimitState {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        let quota = |rps: u32, burst: u32| {
            Quota::per_second(NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN))
                .allow_burst(NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN))
        };

        Self {
            api_limiter: RateLimiter::dashmap(quota(config.general_rps, config.general_burst)),
            health_limiter: RateLimiter::dashmap(quota(config.health_rps, config.health_burst)),
            config,
        }
    }
}

/// Client IP from `X-Forwarded-For`, `X-Real-IP` or the socket address.
/// Unknown clients share one bucket.
fn client_ip_from_request<B>(request: &Request<B>) -> IpAddr {
    let header_ip = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    };

    header_ip("x-forwarded-for")
        .or_else(|| header_ip("x-real-ip"))
        .or_else(|| request.extensions().get::<SocketAddr>().map(SocketAddr::ip))
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn too_many_requests(retry_after: u64, limit: Option<u32>) -> Response<Body> {
    let body = RateLimitResponse {
        error_message: "Rate limit exceeded. Please slow down your requests.".to_string(),
        code: StatusCode::TOO_MANY_REQUESTS.as_u16(),
        retry_after,
    };

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    let headers = response.headers_mut();
    if let Some(limit) = limit {
        headers.insert("X-RateLimit-Limit", HeaderValue::from(limit));
        headers.insert("X-RateLimit-Remaining", HeaderValue::from(0u32));
    }
    headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}

type DefaultInstant = <governor::clock::DefaultClock as governor::clock::Clock>::Instant;

fn retry_after_secs(not_until: &governor::NotUntil<DefaultInstant>) -> u64 {
    let wait = not_until.wait_time_from(governor::clock::Clock::now(
        &governor::clock::DefaultClock::default(),
    ));
    // Round up so clients never retry before the bucket refills.
    wait.as_secs() + u64::from(wait.subsec_nanos() > 0)
}

/// Rate limit middleware for `/api` endpoints
async fn rate_limit_api_middleware(
    State(rate_limit): State<Arc<RateLimitState>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let client_ip = client_ip_from_request(&request);
    match rate_limit.api_limiter.check_key(&client_ip) {
        Ok(_) => {
            let mut response = next.run(request).await;
            response.headers_mut().insert(
                "X-RateLimit-Limit",
                HeaderValue::from(rate_limit.config.general_rps),
            );
            response
        }
        Err(not_until) => too_many_requests(
            retry_after_secs(&not_until),
            Some(rate_limit.config.general_rps),
        ),
    }
}

/// Rate limit middleware for health endpoints
async fn rate_limit_health_middleware(
    State(rate_limit): State<Arc<RateLimitState>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let client_ip = client_ip_from_request(&request);
    match rate_limit.health_limiter.check_key(&client_ip) {
        Ok(_) => next.run(request).await,
        Err(not_until) => too_many_requests(retry_after_secs(&not_until), None),
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(300))
}

/// `/api` routes. Customer-scoped routes sit behind the token guard, single
/// account routes additionally behind the ownership guard.
fn api_routes(app_state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let token = middleware::from_fn_with_state(Arc::clone(app_state), require_token);
    let owner = middleware::from_fn_with_state(Arc::clone(app_state), require_owner);

    let public = Router::new()
        .route("/api/customers", get(list_customers).post(create_customer))
        .route("/api/customer", get(list_customers))
        .route("/api/customers/{customer_id}", get(get_customer))
        .route("/api/customer/{customer_id}", get(get_customer))
        .route("/api/transactions", get(list_transactions))
        .route("/api/transactions/{transaction_id}", get(get_transaction))
        .route("/api/transaction/{transaction_id}", get(get_transaction));

    let customer_scoped = Router::new()
        .route(
            "/api/customer/{customer_id}",
            put(update_customer).delete(delete_customer),
        )
        .route(
            "/api/customer/{customer_id}/accounts",
            get(list_accounts).post(create_account),
        )
        .route_layer(token.clone());

    // Layers added last run first: token, then ownership.
    let account_scoped = Router::new()
        .route(
            "/api/customer/{customer_id}/account/{account_id}",
            get(get_account).put(update_account).delete(delete_account),
        )
        .route(
            "/api/customer/{customer_id}/account/{account_id}/transactions",
            post(create_transaction),
        )
        .route_layer(owner)
        .route_layer(token);

    public.merge(customer_scoped).merge(account_scoped)
}

fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
}

/// Create router without rate limiting
pub fn create_router(app_state: Arc<AppState>) -> Router {
    create_router_with_options(app_state, DEFAULT_REQUEST_TIMEOUT, None)
}

/// Create router with rate limiting enabled
pub fn create_router_with_rate_limit(app_state: Arc<AppState>, config: RateLimitConfig) -> Router {
    create_router_with_options(app_state, DEFAULT_REQUEST_TIMEOUT, Some(config))
}

/// Create router with an explicit request timeout and optional rate limiting
pub fn create_router_with_options(
    app_state: Arc<AppState>,
    request_timeout: Duration,
    rate_limit: Option<RateLimitConfig>,
) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ));

    let mut api = api_routes(&app_state);
    let mut health = health_routes();
    if let Some(config) = rate_limit {
        let rate_limit_state = Arc::new(RateLimitState::new(config));
        api = api.route_layer(middleware::from_fn_with_state(
            Arc::clone(&rate_limit_state),
            rate_limit_api_middleware,
        ));
        health = health.route_layer(middleware::from_fn_with_state(
            rate_limit_state,
            rate_limit_health_middleware,
        ));
    }

    Router::new()
        .merge(api)
        .merge(health)
        .route("/api-docs/openapi.json", get(openapi_handler))
        .layer(middleware)
        .with_state(app_state)
}
