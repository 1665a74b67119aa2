//! Node assignment targets and actor resolution.
//!
//! A template node is assigned to exactly one of a user, a role, or a
//! department. Whether an acting user may handle the node is answered by
//! matching that target against an [`ActorContext`] resolved from the user
//! directory.

use crate::types::DbId;

/// Who a node is assigned to. Exactly one variant per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssigneeTarget {
    User(DbId),
    Role(DbId),
    Department(DbId),
}

/// Directory facts about an acting user, resolved by the caller.
#[derive(Debug, Clone, Default)]
pub struct ActorContext {
    pub user_id: DbId,
    pub role_ids: Vec<DbId>,
    pub department_id: Option<DbId>,
}

impl AssigneeTarget {
    /// Whether the given actor satisfies this assignment target.
    pub fn resolves_for(&self, actor: &ActorContext) -> bool {
        match *self {
            AssigneeTarget::User(id) => id == actor.user_id,
            AssigneeTarget::Role(id) => actor.role_ids.contains(&id),
            AssigneeTarget::Department(id) => actor.department_id == Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> ActorContext {
        ActorContext {
            user_id: 7,
            role_ids: vec![2, 3],
            department_id: Some(11),
        }
    }

    #[test]
    fn test_user_target_matches_only_that_user() {
        assert!(AssigneeTarget::User(7).resolves_for(&actor()));
        assert!(!AssigneeTarget::User(8).resolves_for(&actor()));
    }

    #[test]
    fn test_role_target_matches_role_membership() {
        assert!(AssigneeTarget::Role(3).resolves_for(&actor()));
        assert!(!AssigneeTarget::Role(5).resolves_for(&actor()));
    }

    #[test]
    fn test_department_target_matches_department() {
        assert!(AssigneeTarget::Department(11).resolves_for(&actor()));
        assert!(!AssigneeTarget::Department(12).resolves_for(&actor()));
    }

    #[test]
    fn test_department_target_never_matches_actor_without_department() {
        let no_dept = ActorContext {
            user_id: 7,
            role_ids: vec![],
            department_id: None,
        };
        assert!(!AssigneeTarget::Department(11).resolves_for(&no_dept));
    }
}
