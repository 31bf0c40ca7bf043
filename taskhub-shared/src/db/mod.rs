/// Database utilities
///
/// - `pool`: PostgreSQL connection pool construction and health checks
/// - `migrations`: migration runner wrapping `sqlx::migrate!`

pub mod migrations;
pub mod pool;
