//! Role and ownership based access control.
//!
//! Every protected operation declares a const [`AccessRule`] in [`rules`].
//! Handlers pass the caller's verified [`Principal`] plus the operation's
//! rule to [`ensure`] / [`ensure_owner`] before touching storage; the
//! underlying [`decide`] function is pure and holds no state.

mod policy;
mod principal;

pub use policy::{decide, ensure, ensure_owner, AccessRule, Decision};
pub use principal::{Principal, Role};

/// Access rules for the protected operations of the API.
///
/// ADMIN appears explicitly wherever AGENT does; nothing is inferred from
/// the declaration order of [`Role`].
pub mod rules {
    use super::policy::AccessRule;
    use super::principal::Role;

    pub const LIST_PROPERTIES: AccessRule = AccessRule::authenticated();
    pub const VIEW_PROPERTY: AccessRule = AccessRule::authenticated();
    pub const CREATE_PROPERTY: AccessRule = AccessRule::any_of(&[Role::Agent, Role::Admin]);
    pub const UPDATE_PROPERTY: AccessRule =
        AccessRule::any_of(&[Role::Agent, Role::Admin]).with_ownership();
    pub const MY_PROPERTIES: AccessRule = AccessRule::any_of(&[Role::Agent, Role::Admin]);
    pub const AGENT_DASHBOARD: AccessRule = AccessRule::any_of(&[Role::Agent, Role::Admin]);
    pub const ADMIN_STATS: AccessRule = AccessRule::any_of(&[Role::Admin]);
}
