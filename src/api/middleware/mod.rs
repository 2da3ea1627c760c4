//! API middleware and extractors

pub mod admin_auth;
pub mod auth;
pub mod logging;
pub mod metrics;
pub mod security;
pub mod user_auth;

pub use admin_auth::RequireAdmin;
pub use auth::RequireApiKey;
pub use logging::{logging_middleware, redact_headers};
pub use metrics::metrics_middleware;
pub use security::security_headers_middleware;
pub use user_auth::RequireUser;
