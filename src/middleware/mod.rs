/// Middleware module
///
/// Request logging, the in-process JWT guard for the service's own
/// protected routes, and the gateway-side authentication filter.
mod gateway_filter;
mod jwt_guard;
mod request_logging;

pub use gateway_filter::GatewayAuthFilter;
pub use gateway_filter::PublicPaths;
pub use jwt_guard::JwtGuard;
pub use request_logging::RequestLogging;
