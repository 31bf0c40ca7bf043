/// Database models for TaskHub
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts with a mandatory role (manager or regular user)
/// - `project`: Projects owned by a manager
/// - `task`: Tasks bound to a project, optionally assigned to a user
/// - `session`: Issued access-token records, looked up per request

pub mod project;
pub mod session;
pub mod task;
pub mod user;
