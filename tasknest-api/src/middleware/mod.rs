/// Middleware for the API server
///
/// - `auth`: the bearer-token auth gate applied to every protected route
pub mod auth;
