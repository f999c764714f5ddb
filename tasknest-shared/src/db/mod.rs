/// Database layer
///
/// - `pool`: PostgreSQL connection pool creation and health check
/// - `migrations`: embedded sqlx migration runner
pub mod migrations;
pub mod pool;
