use uuid::Uuid;

use super::principal::{Principal, Role};
use crate::errors::{AppError, AppResult};

/// Outcome of an access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Static access declaration for one protected operation.
///
/// A rule combines an admitted role set (empty = any authenticated
/// principal) with an optional ownership requirement. Rules are fixed at
/// definition time; see [`super::rules`].
#[derive(Debug, Clone, Copy)]
pub struct AccessRule {
    roles: &'static [Role],
    requires_ownership: bool,
}

impl AccessRule {
    /// Any authenticated principal, regardless of role.
    pub const fn authenticated() -> Self {
        Self {
            roles: &[],
            requires_ownership: false,
        }
    }

    /// Principals holding any of the listed roles.
    pub const fn any_of(roles: &'static [Role]) -> Self {
        Self {
            roles,
            requires_ownership: false,
        }
    }

    /// Additionally require the caller to own the target resource.
    pub const fn with_ownership(self) -> Self {
        Self {
            roles: self.roles,
            requires_ownership: true,
        }
    }
}

/// Pure access decision: role-set containment AND the ownership predicate.
///
/// Membership is a plain containment test — ADMIN passes a rule only when it
/// is listed in that rule's role set.
pub fn decide(role: Role, rule: &AccessRule, ownership_satisfied: bool) -> Decision {
    let role_admitted = rule.roles.is_empty() || rule.roles.contains(&role);
    let ownership_ok = !rule.requires_ownership || ownership_satisfied;

    if role_admitted && ownership_ok {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// Gate for operations without an ownership predicate.
///
/// Rules that do carry an ownership requirement fail closed here; use
/// [`ensure_owner`] for those.
pub fn ensure(principal: &Principal, rule: &AccessRule) -> AppResult<()> {
    match decide(principal.role, rule, false) {
        Decision::Allow => Ok(()),
        Decision::Deny => {
            tracing::warn!(user_id = %principal.id, role = %principal.role, "access denied");
            Err(AppError::forbidden("insufficient role for this operation"))
        }
    }
}

/// Gate for mutations of an owned resource.
///
/// Callers must have established that the resource exists before looking up
/// its owner; ownership of a nonexistent resource is undefined.
pub fn ensure_owner(principal: &Principal, rule: &AccessRule, owner_id: Uuid) -> AppResult<()> {
    let ownership_satisfied = owner_id == principal.id;

    match decide(principal.role, rule, ownership_satisfied) {
        Decision::Allow => Ok(()),
        Decision::Deny => {
            tracing::warn!(
                user_id = %principal.id,
                role = %principal.role,
                %owner_id,
                "ownership check failed"
            );
            Err(AppError::forbidden("you can only modify your own properties"))
        }
    }
}
