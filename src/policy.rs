//!
//! # Authorization Policy
//!
//! Pure decision functions mapping (actor, action, target) to allow/deny.
//! Nothing in here touches the store or the request: handlers resolve the
//! actor and the target first, then ask the policy. Every deny carries the
//! reason string that ends up in the 403 body.
//!
//! Two kinds of answers exist. Binary checks (`create_task`, `access_task`,
//! ...) return `Result<(), Denial>`. Listing operations instead get a
//! [`Scope`] describing which rows the actor may see, which the store
//! applies at query time. Both the scope and the per-object checks derive
//! from the single [`owns_task`] predicate so they cannot drift apart; the
//! per-object check still runs on single-object operations even when the
//! scope would already have excluded the row.

use uuid::Uuid;

use crate::models::{Role, Task};

/// The authenticated identity a decision is made for. Built from the user
/// record after token validation and passed explicitly into every check.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
    pub is_active: bool,
}

impl From<&crate::models::User> for Actor {
    fn from(user: &crate::models::User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            is_active: user.is_active,
        }
    }
}

/// A denied decision and the human-readable reason for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial(pub String);

impl Denial {
    fn new(reason: &str) -> Self {
        Denial(reason.to_string())
    }
}

/// Query-time restriction on which rows a listing may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// No restriction (admins).
    All,
    /// Only rows whose task is assigned to this user.
    AssignedTo(Uuid),
}

pub const REASON_DEACTIVATED: &str = "User account has been deactivated.";
pub const REASON_NOT_YOUR_TASK: &str = "You can only access your own tasks.";
pub const REASON_ADMIN_TASKS: &str = "Only admins can create or delete tasks";
pub const REASON_ADMIN_USERS: &str = "Only admins can manage users";
pub const REASON_ADMIN_SOFT_DELETE: &str = "Only admins can soft delete users";
pub const REASON_NOT_YOUR_COMMENT: &str =
    "You can only access comments on your own tasks.";

/// The shared ownership rule: a non-admin owns a task iff it is assigned
/// to them. Scope filters and object checks both reduce to this.
fn owns_task(actor: &Actor, task: &Task) -> bool {
    task.assigned_to == actor.id
}

/// Rule 1: an inactive actor is denied everything, before any other rule.
fn require_active(actor: &Actor) -> Result<(), Denial> {
    if actor.is_active {
        Ok(())
    } else {
        Err(Denial::new(REASON_DEACTIVATED))
    }
}

fn require_admin(actor: &Actor, reason: &str) -> Result<(), Denial> {
    require_active(actor)?;
    if actor.role.is_admin() {
        Ok(())
    } else {
        Err(Denial::new(reason))
    }
}

/// Task creation: admin only.
pub fn create_task(actor: &Actor) -> Result<(), Denial> {
    require_admin(actor, REASON_ADMIN_TASKS)
}

/// Task deletion: admin only.
pub fn delete_task(actor: &Actor) -> Result<(), Denial> {
    require_admin(actor, REASON_ADMIN_TASKS)
}

/// Listing scope for tasks: admins see everything, everyone else sees
/// only tasks assigned to them.
pub fn task_scope(actor: &Actor) -> Result<Scope, Denial> {
    require_active(actor)?;
    if actor.role.is_admin() {
        Ok(Scope::All)
    } else {
        Ok(Scope::AssignedTo(actor.id))
    }
}

/// Single-object access (read/update) to a task.
pub fn access_task(actor: &Actor, task: &Task) -> Result<(), Denial> {
    require_active(actor)?;
    if actor.role.is_admin() || owns_task(actor, task) {
        Ok(())
    } else {
        Err(Denial::new(REASON_NOT_YOUR_TASK))
    }
}

/// Commenting on a task. The caller must have resolved `task` from the
/// store; a missing task is a validation failure for every role and never
/// reaches this check. Admins bypass ownership, not existence.
pub fn create_comment(actor: &Actor, task: &Task) -> Result<(), Denial> {
    require_active(actor)?;
    if actor.role.is_admin() || owns_task(actor, task) {
        Ok(())
    } else {
        Err(Denial::new(REASON_NOT_YOUR_COMMENT))
    }
}

/// Single-object access (read/update/delete) to a comment. Ownership is
/// inherited through the comment's task; authorship grants nothing.
pub fn access_comment(actor: &Actor, parent_task: &Task) -> Result<(), Denial> {
    require_active(actor)?;
    if actor.role.is_admin() || owns_task(actor, parent_task) {
        Ok(())
    } else {
        Err(Denial::new(REASON_NOT_YOUR_COMMENT))
    }
}

/// Listing scope for comments: same rule as tasks, applied to the
/// comment's parent task.
pub fn comment_scope(actor: &Actor) -> Result<Scope, Denial> {
    task_scope(actor)
}

/// User list/retrieve/update/hard-delete: admin only.
pub fn manage_users(actor: &Actor) -> Result<(), Denial> {
    require_admin(actor, REASON_ADMIN_USERS)
}

/// User soft-delete. Kept separate from [`manage_users`] on purpose: the
/// handler re-checks the role explicitly even though routing already
/// requires an authenticated actor.
pub fn soft_delete_user(actor: &Actor) -> Result<(), Denial> {
    require_admin(actor, REASON_ADMIN_SOFT_DELETE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskInput, TaskStatus};
    use pretty_assertions::assert_eq;

    fn actor(role: Role, active: bool) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role,
            is_active: active,
        }
    }

    fn task_assigned_to(user: Uuid) -> Task {
        Task::new(TaskInput {
            title: "t".into(),
            description: "d".into(),
            status: TaskStatus::ToDo,
            assigned_to: user,
        })
    }

    #[test]
    fn test_inactive_actor_denied_everything_first() {
        // Even an admin loses every permission once deactivated, and the
        // reason is the deactivation one, not a role-specific one.
        let admin = actor(Role::Admin, false);
        let own_task = task_assigned_to(admin.id);

        assert_eq!(create_task(&admin), Err(Denial::new(REASON_DEACTIVATED)));
        assert_eq!(delete_task(&admin), Err(Denial::new(REASON_DEACTIVATED)));
        assert_eq!(
            access_task(&admin, &own_task),
            Err(Denial::new(REASON_DEACTIVATED))
        );
        assert_eq!(
            create_comment(&admin, &own_task),
            Err(Denial::new(REASON_DEACTIVATED))
        );
        assert_eq!(task_scope(&admin), Err(Denial::new(REASON_DEACTIVATED)));
        assert_eq!(manage_users(&admin), Err(Denial::new(REASON_DEACTIVATED)));
        assert_eq!(
            soft_delete_user(&admin),
            Err(Denial::new(REASON_DEACTIVATED))
        );
    }

    #[test]
    fn test_task_create_delete_admin_only() {
        let admin = actor(Role::Admin, true);
        let user = actor(Role::User, true);

        assert!(create_task(&admin).is_ok());
        assert!(delete_task(&admin).is_ok());
        assert_eq!(create_task(&user), Err(Denial::new(REASON_ADMIN_TASKS)));
        assert_eq!(delete_task(&user), Err(Denial::new(REASON_ADMIN_TASKS)));
    }

    #[test]
    fn test_task_scope() {
        let admin = actor(Role::Admin, true);
        let user = actor(Role::User, true);

        assert_eq!(task_scope(&admin).unwrap(), Scope::All);
        assert_eq!(task_scope(&user).unwrap(), Scope::AssignedTo(user.id));
        assert_eq!(comment_scope(&user).unwrap(), Scope::AssignedTo(user.id));
    }

    #[test]
    fn test_task_object_access() {
        let admin = actor(Role::Admin, true);
        let user = actor(Role::User, true);
        let mine = task_assigned_to(user.id);
        let theirs = task_assigned_to(Uuid::new_v4());

        assert!(access_task(&admin, &theirs).is_ok());
        assert!(access_task(&user, &mine).is_ok());
        assert_eq!(
            access_task(&user, &theirs),
            Err(Denial::new(REASON_NOT_YOUR_TASK))
        );
    }

    #[test]
    fn test_scope_and_object_check_agree() {
        // Both gates are derived from owns_task: any task the scope filter
        // would return must also pass the object check, and vice versa.
        let user = actor(Role::User, true);
        let tasks = vec![
            task_assigned_to(user.id),
            task_assigned_to(Uuid::new_v4()),
            task_assigned_to(user.id),
        ];
        let scope = task_scope(&user).unwrap();
        for task in &tasks {
            let in_scope = match scope {
                Scope::All => true,
                Scope::AssignedTo(id) => task.assigned_to == id,
            };
            assert_eq!(in_scope, access_task(&user, task).is_ok());
        }
    }

    #[test]
    fn test_comment_ownership_is_inherited_through_task() {
        let user = actor(Role::User, true);
        let other = actor(Role::User, true);
        let users_task = task_assigned_to(user.id);

        // The assignee may comment and touch comments on their task.
        assert!(create_comment(&user, &users_task).is_ok());
        assert!(access_comment(&user, &users_task).is_ok());

        // A different user may not, even if they authored the comment:
        // authorship never factors into the decision.
        assert_eq!(
            create_comment(&other, &users_task),
            Err(Denial::new(REASON_NOT_YOUR_COMMENT))
        );
        assert_eq!(
            access_comment(&other, &users_task),
            Err(Denial::new(REASON_NOT_YOUR_COMMENT))
        );

        // Admin bypasses ownership.
        let admin = actor(Role::Admin, true);
        assert!(create_comment(&admin, &users_task).is_ok());
        assert!(access_comment(&admin, &users_task).is_ok());
    }

    #[test]
    fn test_user_management_admin_only() {
        let admin = actor(Role::Admin, true);
        let user = actor(Role::User, true);

        assert!(manage_users(&admin).is_ok());
        assert!(soft_delete_user(&admin).is_ok());
        assert_eq!(manage_users(&user), Err(Denial::new(REASON_ADMIN_USERS)));
        assert_eq!(
            soft_delete_user(&user),
            Err(Denial::new(REASON_ADMIN_SOFT_DELETE))
        );
    }

    #[test]
    fn test_exact_denial_wording_for_foreign_task() {
        let user = actor(Role::User, true);
        let theirs = task_assigned_to(Uuid::new_v4());
        let denial = access_task(&user, &theirs).unwrap_err();
        assert_eq!(denial.0, "You can only access your own tasks.");
    }
}
