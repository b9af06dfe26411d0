//! Group membership: containment checks and population of group
//! references inside access-control lists.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use lessons_core::error::LessonsResult;
use lessons_core::models::group::Group;
use lessons_core::models::permission::{GroupRef, Protected};
use lessons_core::repository::GroupRepository;
use tracing::debug;
use uuid::Uuid;

use crate::config::SubGroupAccess;

/// Whether `user` is a member of `group`.
///
/// Direct members always count. Sub-group members count only under
/// [`SubGroupAccess::Delegated`]. A soft-deleted group has no members.
pub fn group_contains(group: &Group, user: Uuid, access: SubGroupAccess) -> bool {
    if group.is_deleted() {
        return false;
    }
    if group.users.contains(&user) {
        return true;
    }
    match access {
        SubGroupAccess::Informational => false,
        SubGroupAccess::Delegated => group
            .sub_groups
            .iter()
            .any(|sub| sub.users.contains(&user)),
    }
}

/// Replaces bare group ids in access-control lists with loaded groups.
pub struct MembershipResolver<G: GroupRepository> {
    groups: G,
}

impl<G: GroupRepository> MembershipResolver<G> {
    pub fn new(groups: G) -> Self {
        Self { groups }
    }

    pub async fn populate<T: Protected>(&self, resource: &mut T) -> LessonsResult<()> {
        self.populate_all(std::slice::from_mut(resource)).await
    }

    /// Populate every resource with a single store round trip.
    ///
    /// Ids the store does not know (or only knows as deleted) stay
    /// bare, which the evaluator treats as granting nothing.
    pub async fn populate_all<T: Protected>(&self, resources: &mut [T]) -> LessonsResult<()> {
        let wanted: BTreeSet<Uuid> = resources
            .iter()
            .flat_map(|r| r.permissions().iter())
            .filter_map(|entry| match entry.group {
                GroupRef::Id(id) => Some(id),
                GroupRef::Populated(_) => None,
            })
            .collect();

        if wanted.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = wanted.into_iter().collect();
        let loaded: HashMap<Uuid, Arc<Group>> = self
            .groups
            .get_many(&ids)
            .await?
            .into_iter()
            .map(|g| (g.id, Arc::new(g)))
            .collect();

        if loaded.len() < ids.len() {
            debug!(
                requested = ids.len(),
                loaded = loaded.len(),
                "Some referenced groups are missing"
            );
        }

        for resource in resources.iter_mut() {
            for entry in resource.permissions_mut().iter_mut() {
                let GroupRef::Id(id) = entry.group else {
                    continue;
                };
                if let Some(group) = loaded.get(&id) {
                    entry.group = GroupRef::Populated(Arc::clone(group));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use lessons_core::models::group::{GroupContext, MembershipMode, SubGroup};

    use super::*;

    fn group(users: Vec<Uuid>, sub_users: Vec<Uuid>) -> Group {
        Group {
            id: Uuid::new_v4(),
            context: GroupContext::Lesson,
            modus: MembershipMode::Standard,
            context_info: None,
            title: "test".into(),
            users,
            sub_groups: vec![SubGroup {
                title: "sub".into(),
                users: sub_users,
            }],
            autogenerated: false,
            course_id: None,
            lesson_id: None,
            permission: None,
            created_from: None,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn direct_members_are_contained() {
        let user = Uuid::new_v4();
        let g = group(vec![user], vec![]);
        assert!(group_contains(&g, user, SubGroupAccess::Informational));
        assert!(!group_contains(&g, Uuid::new_v4(), SubGroupAccess::Delegated));
    }

    #[test]
    fn sub_group_members_depend_on_policy() {
        let user = Uuid::new_v4();
        let g = group(vec![], vec![user]);
        assert!(!group_contains(&g, user, SubGroupAccess::Informational));
        assert!(group_contains(&g, user, SubGroupAccess::Delegated));
    }

    #[test]
    fn deleted_group_contains_nobody() {
        let user = Uuid::new_v4();
        let mut g = group(vec![user], vec![user]);
        g.deleted_at = Some(Utc::now());
        assert!(!group_contains(&g, user, SubGroupAccess::Delegated));
    }
}
