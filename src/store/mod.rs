//!
//! # Persistence seam
//!
//! Handlers talk to a narrow [`Store`] trait rather than to sqlx directly,
//! so the policy-gated CRUD logic is independent of where rows live.
//! [`PgStore`] is the production backend; [`MemoryStore`] backs the test
//! suite and local runs without a database.
//!
//! Contracts every implementation must uphold:
//! - listing applies the caller's [`Scope`] inside the query, never by
//!   filtering an unbounded fetch afterwards;
//! - `deactivate_user` is a single atomic write and is idempotent;
//! - `delete_user` fails while any task references the user;
//! - `delete_task` removes the task's comments with it;
//! - task updates stamp `updated_at` from the server clock.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Comment, CommentQuery, Task, TaskChanges, TaskQuery, User, UserUpdate};
use crate::policy::Scope;

#[async_trait]
pub trait Store: Send + Sync {
    // Users
    async fn insert_user(&self, user: User) -> Result<User, AppError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn list_users(&self) -> Result<Vec<User>, AppError>;
    async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<Option<User>, AppError>;
    /// Sets `is_active = false`. Returns the user as it now stands, or
    /// `None` if no such user exists. A no-op on already-inactive users.
    async fn deactivate_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
    /// Hard delete. Fails with `BadRequest` while tasks reference the user.
    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError>;

    // Tasks
    async fn insert_task(&self, task: Task) -> Result<Task, AppError>;
    async fn task_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError>;
    /// Lists tasks within `scope`, newest first, applying the filters.
    async fn list_tasks(&self, scope: Scope, query: &TaskQuery) -> Result<Vec<Task>, AppError>;
    async fn update_task(&self, id: Uuid, changes: TaskChanges)
        -> Result<Option<Task>, AppError>;
    /// Deletes the task and its comments. Returns false if absent.
    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError>;

    // Comments
    async fn insert_comment(&self, comment: Comment) -> Result<Comment, AppError>;
    async fn comment_by_id(&self, id: Uuid) -> Result<Option<Comment>, AppError>;
    /// Lists comments whose parent task falls within `scope`, newest first.
    async fn list_comments(
        &self,
        scope: Scope,
        query: &CommentQuery,
    ) -> Result<Vec<Comment>, AppError>;
    async fn update_comment(&self, id: Uuid, content: String)
        -> Result<Option<Comment>, AppError>;
    async fn delete_comment(&self, id: Uuid) -> Result<bool, AppError>;
}
