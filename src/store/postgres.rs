//! Postgres-backed [`Store`] built on `sqlx`.
//!
//! Scope filters and list filters are compiled into the SQL itself, so the
//! database never hands back rows the actor may not see. Referential
//! integrity for task assignees is enforced twice: the handlers validate
//! the assignee exists, and the `tasks.assigned_to` foreign key is declared
//! `ON DELETE RESTRICT` so a referenced user cannot be hard-deleted.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Comment, CommentQuery, Task, TaskChanges, TaskQuery, User, UserUpdate};
use crate::policy::Scope;
use crate::store::Store;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, email, full_name, password_hash, role, is_active, created_at";
const TASK_COLUMNS: &str = "id, title, description, status, assigned_to, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, task_id, author_id, content, created_at";

fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: User) -> Result<User, AppError> {
        let result = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users ({USER_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(user.email)
        .bind(user.full_name)
        .bind(user.password_hash)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await;
        match result {
            Ok(inserted) => Ok(inserted),
            Err(e) if is_unique_violation(&e) => {
                Err(AppError::BadRequest("Email already registered".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<Option<User>, AppError> {
        // Email uniqueness holds on updates too, not just registration.
        let result = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET email = COALESCE($1, email),
                 full_name = COALESCE($2, full_name),
                 role = COALESCE($3, role)
             WHERE id = $4
             RETURNING {USER_COLUMNS}"
        ))
        .bind(update.email)
        .bind(update.full_name)
        .bind(update.role)
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        match result {
            Ok(user) => Ok(user),
            Err(e) if is_unique_violation(&e) => {
                Err(AppError::BadRequest("Email already registered".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn deactivate_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        // Single statement, so concurrent writers cannot interleave between
        // the read and the write. Already-inactive users are left as-is.
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET is_active = FALSE WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            Err(e) if is_foreign_key_violation(&e) => Err(AppError::BadRequest(
                "User is still assigned to tasks and cannot be deleted".into(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn insert_task(&self, task: Task) -> Result<Task, AppError> {
        let inserted = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks ({TASK_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(task.id)
        .bind(task.title)
        .bind(task.description)
        .bind(task.status)
        .bind(task.assigned_to)
        .bind(task.created_at)
        .bind(task.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(inserted)
    }

    async fn task_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn list_tasks(&self, scope: Scope, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        // Conditions for scope, status, assignee, and search terms are
        // appended dynamically and bound in the same order.
        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE TRUE");
        let mut param = 1;

        if matches!(scope, Scope::AssignedTo(_)) {
            sql.push_str(&format!(" AND assigned_to = ${param}"));
            param += 1;
        }
        if query.status.is_some() {
            sql.push_str(&format!(" AND status = ${param}"));
            param += 1;
        }
        if query.assigned_to.is_some() {
            sql.push_str(&format!(" AND assigned_to = ${param}"));
            param += 1;
        }
        if query.search.is_some() {
            sql.push_str(&format!(
                " AND (title ILIKE ${param} OR description ILIKE ${})",
                param + 1
            ));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut q = sqlx::query_as::<_, Task>(&sql);
        if let Scope::AssignedTo(id) = scope {
            q = q.bind(id);
        }
        if let Some(status) = query.status {
            q = q.bind(status);
        }
        if let Some(assigned_to) = query.assigned_to {
            q = q.bind(assigned_to);
        }
        if let Some(search) = &query.search {
            let pattern = format!("%{}%", search);
            q = q.bind(pattern.clone());
            q = q.bind(pattern);
        }

        let tasks = q.fetch_all(&self.pool).await?;
        Ok(tasks)
    }

    async fn update_task(
        &self,
        id: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
             SET title = COALESCE($1, title),
                 description = COALESCE($2, description),
                 status = COALESCE($3, status),
                 assigned_to = COALESCE($4, assigned_to),
                 updated_at = $5
             WHERE id = $6
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.status)
        .bind(changes.assigned_to)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError> {
        // comments.task_id is ON DELETE CASCADE; one statement removes both.
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_comment(&self, comment: Comment) -> Result<Comment, AppError> {
        let inserted = sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO comments ({COMMENT_COLUMNS})
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(comment.id)
        .bind(comment.task_id)
        .bind(comment.author_id)
        .bind(comment.content)
        .bind(comment.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(inserted)
    }

    async fn comment_by_id(&self, id: Uuid) -> Result<Option<Comment>, AppError> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn list_comments(
        &self,
        scope: Scope,
        query: &CommentQuery,
    ) -> Result<Vec<Comment>, AppError> {
        // Scope follows the parent task's assignee, via a join.
        let mut sql = String::from(
            "SELECT c.id, c.task_id, c.author_id, c.content, c.created_at
             FROM comments c JOIN tasks t ON t.id = c.task_id WHERE TRUE",
        );
        let mut param = 1;

        if matches!(scope, Scope::AssignedTo(_)) {
            sql.push_str(&format!(" AND t.assigned_to = ${param}"));
            param += 1;
        }
        if query.task.is_some() {
            sql.push_str(&format!(" AND c.task_id = ${param}"));
        }
        sql.push_str(" ORDER BY c.created_at DESC");

        let mut q = sqlx::query_as::<_, Comment>(&sql);
        if let Scope::AssignedTo(id) = scope {
            q = q.bind(id);
        }
        if let Some(task) = query.task {
            q = q.bind(task);
        }

        let comments = q.fetch_all(&self.pool).await?;
        Ok(comments)
    }

    async fn update_comment(
        &self,
        id: Uuid,
        content: String,
    ) -> Result<Option<Comment>, AppError> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "UPDATE comments SET content = $1 WHERE id = $2 RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(content)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
