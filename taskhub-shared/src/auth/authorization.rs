/// Authorization guards
///
/// Explicit guard functions composed before handler bodies. Each guard is
/// passed the principal (or its role) and the resource attribute it judges;
/// nothing is read from ambient request state.
///
/// Two failure shapes exist on purpose:
///
/// - [`AuthzError::RoleRequired`] surfaces as 403: create-class
///   operations openly state the role they need.
/// - [`AuthzError::NotOwner`] surfaces as 404: ownership failures are
///   indistinguishable from the resource not existing, so a caller cannot
///   probe for other managers' resources.
///
/// # Example
///
/// ```
/// use taskhub_shared::auth::authorization::{require_manager, require_owner};
/// use taskhub_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// let manager_id = Uuid::new_v4();
///
/// assert!(require_manager(UserRole::Manager).is_ok());
/// assert!(require_manager(UserRole::User).is_err());
///
/// assert!(require_owner(manager_id, manager_id).is_ok());
/// assert!(require_owner(manager_id, Uuid::new_v4()).is_err());
/// ```

use uuid::Uuid;

use crate::models::user::UserRole;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// The operation requires a role the principal does not hold
    #[error("operation requires the {0} role")]
    RoleRequired(&'static str),

    /// The principal does not own the target resource
    #[error("principal does not own the target resource")]
    NotOwner,
}

/// Requires the MANAGER role
///
/// Guards create-class operations: project creation and the manager-gated
/// task creation path.
pub fn require_manager(role: UserRole) -> Result<(), AuthzError> {
    if role.is_manager() {
        Ok(())
    } else {
        Err(AuthzError::RoleRequired("MANAGER"))
    }
}

/// Requires the principal to be the resource owner
///
/// Guards update/delete on projects (owner = the project's manager) and
/// task deletion (owner = the owning project's manager). Failures must be
/// reported as not-found, never as forbidden.
pub fn require_owner(owner_id: Uuid, principal_id: Uuid) -> Result<(), AuthzError> {
    if owner_id == principal_id {
        Ok(())
    } else {
        Err(AuthzError::NotOwner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_manager_accepts_manager() {
        assert!(require_manager(UserRole::Manager).is_ok());
    }

    #[test]
    fn test_require_manager_rejects_regular_user() {
        assert_eq!(
            require_manager(UserRole::User),
            Err(AuthzError::RoleRequired("MANAGER"))
        );
    }

    #[test]
    fn test_require_owner_accepts_owner() {
        let id = Uuid::new_v4();
        assert!(require_owner(id, id).is_ok());
    }

    #[test]
    fn test_require_owner_rejects_non_owner() {
        assert_eq!(
            require_owner(Uuid::new_v4(), Uuid::new_v4()),
            Err(AuthzError::NotOwner)
        );
    }
}
