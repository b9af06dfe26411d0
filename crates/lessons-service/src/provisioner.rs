//! Default read/write groups for a freshly created lesson.

use lessons_core::collaborator::{CourseMembers, CourseMembership};
use lessons_core::context::RequestContext;
use lessons_core::error::{LessonsError, LessonsResult};
use lessons_core::models::group::{CreateGroup, Group, GroupContext, MembershipMode};
use lessons_core::models::lesson::Lesson;
use lessons_core::models::permission::{AccessControlEntry, PermissionLevel};
use lessons_core::repository::GroupRepository;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ProvisioningConfig;

const NO_ACCESS: &str = "You have no access.";

/// Course members split by the lesson access they get.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RosterPartition {
    pub write: Vec<Uuid>,
    pub read: Vec<Uuid>,
    /// Members holding neither a write nor a read permission.
    pub excluded: Vec<Uuid>,
}

/// Split a roster. Write permissions are checked first, so a user
/// holding both kinds lands in the write partition only.
pub fn partition_roster(members: &CourseMembers, config: &ProvisioningConfig) -> RosterPartition {
    let holds_any = |held: &std::collections::BTreeSet<String>, wanted: &[String]| {
        wanted.iter().any(|p| held.contains(p))
    };

    let mut users: Vec<_> = members.iter().collect();
    users.sort_by_key(|(id, _)| **id);

    let mut partition = RosterPartition::default();
    for (user, held) in users {
        if holds_any(held, &config.write_permissions) {
            partition.write.push(*user);
        } else if holds_any(held, &config.read_permissions) {
            partition.read.push(*user);
        } else {
            partition.excluded.push(*user);
        }
    }
    partition
}

/// Groups created for a lesson, plus the members left out of both.
#[derive(Debug, Clone)]
pub struct ProvisionedGroups {
    pub read: Group,
    pub write: Group,
    pub excluded: Vec<Uuid>,
}

impl ProvisionedGroups {
    /// The lesson's initial access-control list.
    pub fn acl(&self) -> Vec<AccessControlEntry> {
        vec![
            AccessControlEntry::new(PermissionLevel::Write, self.write.id),
            AccessControlEntry::new(PermissionLevel::Read, self.read.id),
        ]
    }
}

pub struct DefaultGroupProvisioner<G: GroupRepository, M: CourseMembership> {
    groups: G,
    membership: M,
    config: ProvisioningConfig,
}

impl<G: GroupRepository, M: CourseMembership> DefaultGroupProvisioner<G, M> {
    pub fn new(groups: G, membership: M, config: ProvisioningConfig) -> Self {
        Self {
            groups,
            membership,
            config,
        }
    }

    /// Create the default groups of `lesson` from its course roster.
    ///
    /// Every failure surfaces as Forbidden. If only one of the two
    /// groups could be created, it is soft-deleted again.
    pub async fn provision(
        &self,
        lesson: &Lesson,
        ctx: &RequestContext,
    ) -> LessonsResult<ProvisionedGroups> {
        let members = self
            .membership
            .get_members(lesson.course_id, &ctx.authorization)
            .await
            .map_err(|e| forbidden_with(LessonsError::from(e)))?;

        let partition = partition_roster(&members, &self.config);
        if !partition.excluded.is_empty() {
            warn!(
                course_id = %lesson.course_id,
                lesson_id = %lesson.id,
                excluded = ?partition.excluded,
                "Course members without lesson permissions left out of default groups"
            );
        }

        if !partition.write.contains(&ctx.principal.id) {
            return Err(LessonsError::forbidden(NO_ACCESS));
        }

        let group_input = |level: PermissionLevel, users: Vec<Uuid>| CreateGroup {
            context: GroupContext::Lesson,
            modus: MembershipMode::Standard,
            title: level.to_string(),
            users,
            autogenerated: true,
            course_id: Some(lesson.course_id),
            lesson_id: Some(lesson.id),
            permission: Some(level),
            created_from: Some(ctx.principal.id),
            ..Default::default()
        };

        let (read, write) = tokio::join!(
            self.groups
                .create(group_input(PermissionLevel::Read, partition.read)),
            self.groups
                .create(group_input(PermissionLevel::Write, partition.write)),
        );

        match (read, write) {
            (Ok(read), Ok(write)) => {
                info!(
                    lesson_id = %lesson.id,
                    read_group = %read.id,
                    write_group = %write.id,
                    "Default lesson groups created"
                );
                Ok(ProvisionedGroups {
                    read,
                    write,
                    excluded: partition.excluded,
                })
            }
            (Ok(orphan), Err(e)) | (Err(e), Ok(orphan)) => {
                self.discard(orphan.id).await;
                Err(forbidden_with(e))
            }
            (Err(e), Err(_)) => Err(forbidden_with(e)),
        }
    }

    /// Soft-delete both groups of a lesson whose creation did not finish.
    pub async fn release(&self, groups: &ProvisionedGroups) {
        tokio::join!(self.discard(groups.read.id), self.discard(groups.write.id));
    }

    async fn discard(&self, group_id: Uuid) {
        if let Err(e) = self.groups.soft_delete(group_id).await {
            warn!(%group_id, error = %e, "Failed to discard default lesson group");
        }
    }
}

fn forbidden_with(cause: LessonsError) -> LessonsError {
    LessonsError::Forbidden {
        reason: NO_ACCESS.into(),
        cause: Some(cause.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use lessons_core::error::MembershipError;

    use super::*;

    fn perms(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn write_is_checked_before_read() {
        let (u1, u2, u3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let members: CourseMembers = [
            (u1, perms(&["LESSONS_CREATE", "LESSONS_VIEW"])),
            (u2, perms(&["LESSONS_VIEW"])),
            (u3, perms(&[])),
        ]
        .into_iter()
        .collect();

        let partition = partition_roster(&members, &ProvisioningConfig::default());

        assert_eq!(partition.write, vec![u1]);
        assert_eq!(partition.read, vec![u2]);
        assert_eq!(partition.excluded, vec![u3]);
    }

    #[test]
    fn configured_permissions_are_honoured() {
        let instructor = Uuid::new_v4();
        let members: CourseMembers = [(instructor, perms(&["COURSE_EDIT"]))].into_iter().collect();
        let config = ProvisioningConfig {
            write_permissions: vec!["COURSE_EDIT".into()],
            read_permissions: vec![],
        };

        assert_eq!(partition_roster(&members, &config).write, vec![instructor]);
        assert_eq!(
            partition_roster(&members, &ProvisioningConfig::default()).excluded,
            vec![instructor]
        );
    }

    #[test]
    fn membership_failure_keeps_its_cause() {
        let err = forbidden_with(MembershipError::CourseNotFound(Uuid::nil()).into());

        match err {
            LessonsError::Forbidden { reason, cause } => {
                assert_eq!(reason, NO_ACCESS);
                let cause = cause.unwrap();
                assert!(cause.starts_with("Course membership error"));
                assert!(cause.contains("not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
