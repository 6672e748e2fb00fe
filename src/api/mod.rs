//! The API layer, containing web handlers, extractors, guards and routing.

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use router::{
    DEFAULT_REQUEST_TIMEOUT, RateLimitConfig, create_router, create_router_with_options,
    create_router_with_rate_limit,
};
