/// API route handlers
///
/// Organized by resource:
///
/// - `health`: liveness endpoint
/// - `auth`: register, login, logout, token obtain/refresh
/// - `projects`: project CRUD + status tally
/// - `tasks`: task CRUD, per-project and per-assignee lists
/// - `users`: profile and user directory reads

pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;
