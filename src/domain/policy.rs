//! Authorization policy.
//!
//! The mutation policy is a pure function over (principal, bug) so it can
//! be tested without any infrastructure.

use uuid::Uuid;

use super::bug::Bug;
use super::user::UserRole;

/// The authenticated caller: user id plus the role as currently stored.
///
/// Produced once per request by the identity layer and threaded explicitly
/// into every service call; the role is re-read from the store on each
/// request rather than trusted from the token.
#[derive(Debug, Clone, Copy)]
pub struct Principal {
    pub id: Uuid,
    pub role: UserRole,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Whether `principal` may update or delete `bug`: the creator may, and
/// admins may regardless of ownership. Reads are not gated by this policy.
pub fn can_mutate(principal: &Principal, bug: &Bug) -> bool {
    principal.id == bug.created_by || principal.role.is_admin()
}
