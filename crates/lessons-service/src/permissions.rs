//! Read/write decisions over access-control lists.

use lessons_core::models::permission::{AccessControlEntry, PermissionLevel, Protected};
use lessons_core::models::principal::Principal;

use crate::config::AccessPolicy;
use crate::membership::group_contains;

/// Evaluates access-control lists against a principal.
///
/// Only populated group references are considered; bare ids grant
/// nothing. The evaluator never fails: callers decide how to report a
/// negative answer.
#[derive(Debug, Clone, Default)]
pub struct PermissionEvaluator {
    policy: AccessPolicy,
}

impl PermissionEvaluator {
    pub fn new(policy: AccessPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    fn is_bypass(&self, principal: &Principal) -> bool {
        self.policy
            .bypass_actor_types
            .contains(&principal.actor_type)
    }

    fn member_of(&self, entry: &AccessControlEntry, principal: &Principal) -> bool {
        entry
            .group
            .group()
            .is_some_and(|g| group_contains(g, principal.id, self.policy.sub_group_access))
    }

    pub fn has_read(&self, acl: &[AccessControlEntry], principal: &Principal) -> bool {
        if self.is_bypass(principal) {
            return true;
        }
        acl.iter().any(|entry| {
            let grants_read = match entry.level {
                PermissionLevel::Read => true,
                PermissionLevel::Write => self.policy.write_implies_read,
            };
            grants_read && self.member_of(entry, principal)
        })
    }

    pub fn has_write(&self, acl: &[AccessControlEntry], principal: &Principal) -> bool {
        acl.iter()
            .any(|entry| entry.level == PermissionLevel::Write && self.member_of(entry, principal))
    }

    /// Keep the readable resources, in their original order.
    pub fn filter_has_read<T: Protected>(&self, resources: Vec<T>, principal: &Principal) -> Vec<T> {
        resources
            .into_iter()
            .filter(|r| self.has_read(r.permissions(), principal))
            .collect()
    }

    /// The strongest level the principal holds, if any.
    pub fn scope(&self, acl: &[AccessControlEntry], principal: &Principal) -> Option<PermissionLevel> {
        if self.has_write(acl, principal) {
            Some(PermissionLevel::Write)
        } else if self.has_read(acl, principal) {
            Some(PermissionLevel::Read)
        } else {
            None
        }
    }
}
