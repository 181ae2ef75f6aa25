use uuid::Uuid;

use crate::errors::AppError;

/// Request-scoped identity, resolved once by the auth middleware and
/// threaded through every controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    Anonymous,
    User {
        id: Uuid,
        username: String,
        is_staff: bool,
    },
}

impl Principal {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::User { .. })
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Principal::User { is_staff: true, .. })
    }
}

/// Controller actions, mirroring the CRUD surface of every resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    Delete,
}

impl Action {
    /// Side-effect-free actions, granted to everyone by the *OrReadOnly rules.
    pub fn is_safe(&self) -> bool {
        matches!(self, Action::List | Action::Retrieve)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    /// No restriction.
    AllowAny,
    /// Reads for everyone, writes for staff accounts only.
    AdminOrReadOnly,
    /// Reads for everyone, writes for any authenticated account.
    AuthenticatedOrReadOnly,
    /// Any authenticated account, reads included.
    RequireAuthenticated,
    /// Staff accounts only, reads included.
    RequireStaff,
}

/// Gate `action` for `principal` under `rule`.
///
/// Anonymous callers hitting a gated action get `UnauthorizedAccess` (401);
/// authenticated callers lacking privilege get `ForbiddenAccess` (403).
/// The two must stay distinguishable from each other and from not-found.
pub fn authorize(rule: AccessRule, principal: &Principal, action: Action) -> Result<(), AppError> {
    match rule {
        AccessRule::AllowAny => Ok(()),
        AccessRule::AdminOrReadOnly => {
            if action.is_safe() || principal.is_staff() {
                Ok(())
            } else if principal.is_authenticated() {
                Err(AppError::ForbiddenAccess)
            } else {
                Err(AppError::UnauthorizedAccess)
            }
        }
        AccessRule::AuthenticatedOrReadOnly => {
            if action.is_safe() || principal.is_authenticated() {
                Ok(())
            } else {
                Err(AppError::UnauthorizedAccess)
            }
        }
        AccessRule::RequireAuthenticated => {
            if principal.is_authenticated() {
                Ok(())
            } else {
                Err(AppError::UnauthorizedAccess)
            }
        }
        AccessRule::RequireStaff => {
            if principal.is_staff() {
                Ok(())
            } else if principal.is_authenticated() {
                Err(AppError::ForbiddenAccess)
            } else {
                Err(AppError::UnauthorizedAccess)
            }
        }
    }
}

/// Per-action policy map for the contact controller.
///
/// Three tiers: anyone may submit a message, reading requires at least
/// authentication, and every other mutation is staff-only.
pub fn contact_rule(action: Action) -> AccessRule {
    match action {
        Action::Create => AccessRule::AllowAny,
        Action::List | Action::Retrieve => AccessRule::RequireAuthenticated,
        Action::Update | Action::PartialUpdate | Action::Delete => AccessRule::RequireStaff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anonymous() -> Principal {
        Principal::Anonymous
    }

    fn regular_user() -> Principal {
        Principal::User {
            id: Uuid::new_v4(),
            username: "visitor".into(),
            is_staff: false,
        }
    }

    fn staff_user() -> Principal {
        Principal::User {
            id: Uuid::new_v4(),
            username: "admin".into(),
            is_staff: true,
        }
    }

    #[test]
    fn admin_or_read_only_grants_reads_to_everyone() {
        for principal in [anonymous(), regular_user(), staff_user()] {
            assert!(authorize(AccessRule::AdminOrReadOnly, &principal, Action::List).is_ok());
            assert!(authorize(AccessRule::AdminOrReadOnly, &principal, Action::Retrieve).is_ok());
        }
    }

    #[test]
    fn admin_or_read_only_distinguishes_401_from_403_on_writes() {
        assert!(matches!(
            authorize(AccessRule::AdminOrReadOnly, &anonymous(), Action::Create),
            Err(AppError::UnauthorizedAccess)
        ));
        assert!(matches!(
            authorize(AccessRule::AdminOrReadOnly, &regular_user(), Action::Create),
            Err(AppError::ForbiddenAccess)
        ));
        assert!(authorize(AccessRule::AdminOrReadOnly, &staff_user(), Action::Create).is_ok());
    }

    #[test]
    fn authenticated_or_read_only_lets_any_account_write() {
        assert!(matches!(
            authorize(AccessRule::AuthenticatedOrReadOnly, &anonymous(), Action::Delete),
            Err(AppError::UnauthorizedAccess)
        ));
        assert!(authorize(AccessRule::AuthenticatedOrReadOnly, &regular_user(), Action::Delete).is_ok());
        assert!(authorize(AccessRule::AuthenticatedOrReadOnly, &staff_user(), Action::Delete).is_ok());
    }

    #[test]
    fn contact_map_is_three_tiered() {
        assert_eq!(contact_rule(Action::Create), AccessRule::AllowAny);
        assert_eq!(contact_rule(Action::List), AccessRule::RequireAuthenticated);
        assert_eq!(contact_rule(Action::Retrieve), AccessRule::RequireAuthenticated);
        assert_eq!(contact_rule(Action::Update), AccessRule::RequireStaff);
        assert_eq!(contact_rule(Action::PartialUpdate), AccessRule::RequireStaff);
        assert_eq!(contact_rule(Action::Delete), AccessRule::RequireStaff);
    }

    #[test]
    fn anonymous_cannot_read_contacts_but_can_create() {
        let rule = contact_rule(Action::List);
        assert!(matches!(
            authorize(rule, &anonymous(), Action::List),
            Err(AppError::UnauthorizedAccess)
        ));

        let rule = contact_rule(Action::Create);
        assert!(authorize(rule, &anonymous(), Action::Create).is_ok());
    }

    #[test]
    fn regular_user_reads_contacts_but_cannot_mutate() {
        assert!(authorize(contact_rule(Action::List), &regular_user(), Action::List).is_ok());
        assert!(matches!(
            authorize(contact_rule(Action::Delete), &regular_user(), Action::Delete),
            Err(AppError::ForbiddenAccess)
        ));
        assert!(authorize(contact_rule(Action::Delete), &staff_user(), Action::Delete).is_ok());
    }
}
