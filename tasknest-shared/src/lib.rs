//! # TaskNest Shared Library
//!
//! This crate contains the types and business logic shared by the TaskNest
//! API server: database models with their ownership-scoped queries, the
//! connection pool, and the authentication primitives.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data access
//! - `auth`: Password hashing and bearer token issuance/verification
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the TaskNest shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
