//! In-memory [`Store`] used by the test suite and for running the server
//! without a database. All mutations take the single write lock, which
//! gives each store call the same read-then-write atomicity a database
//! transaction would.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Comment, CommentQuery, Task, TaskChanges, TaskQuery, User, UserUpdate};
use crate::policy::Scope;
use crate::store::Store;

#[derive(Default)]
struct Inner {
    // Insertion order doubles as creation order; listings iterate in
    // reverse to honor newest-first.
    users: Vec<User>,
    tasks: Vec<Task>,
    comments: Vec<Comment>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn in_scope(scope: Scope, assigned_to: Uuid) -> bool {
    match scope {
        Scope::All => true,
        Scope::AssignedTo(id) => assigned_to == id,
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<User, AppError> {
        let mut inner = self.inner.write().unwrap();
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::BadRequest("Email already registered".into()));
        }
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.users.iter().rev().cloned().collect())
    }

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<Option<User>, AppError> {
        let mut inner = self.inner.write().unwrap();
        // Email uniqueness holds on updates too, not just registration.
        if let Some(email) = &update.email {
            if inner.users.iter().any(|u| u.email == *email && u.id != id) {
                return Err(AppError::BadRequest("Email already registered".into()));
            }
        }
        let user = match inner.users.iter_mut().find(|u| u.id == id) {
            Some(user) => user,
            None => return Ok(None),
        };
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(full_name) = update.full_name {
            user.full_name = full_name;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        Ok(Some(user.clone()))
    }

    async fn deactivate_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let mut inner = self.inner.write().unwrap();
        match inner.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.is_active = false;
                Ok(Some(user.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.inner.write().unwrap();
        if inner.tasks.iter().any(|t| t.assigned_to == id) {
            return Err(AppError::BadRequest(
                "User is still assigned to tasks and cannot be deleted".into(),
            ));
        }
        let before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        Ok(inner.users.len() < before)
    }

    async fn insert_task(&self, task: Task) -> Result<Task, AppError> {
        let mut inner = self.inner.write().unwrap();
        inner.tasks.push(task.clone());
        Ok(task)
    }

    async fn task_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(&self, scope: Scope, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        let inner = self.inner.read().unwrap();
        let needle = query.search.as_ref().map(|s| s.to_lowercase());
        Ok(inner
            .tasks
            .iter()
            .rev()
            .filter(|t| in_scope(scope, t.assigned_to))
            .filter(|t| query.status.map_or(true, |s| t.status == s))
            .filter(|t| query.assigned_to.map_or(true, |id| t.assigned_to == id))
            .filter(|t| {
                needle.as_ref().map_or(true, |n| {
                    t.title.to_lowercase().contains(n)
                        || t.description.to_lowercase().contains(n)
                })
            })
            .cloned()
            .collect())
    }

    async fn update_task(
        &self,
        id: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError> {
        let mut inner = self.inner.write().unwrap();
        let task = match inner.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => task,
            None => return Ok(None),
        };
        if let Some(title) = changes.title {
            task.title = title;
        }
        if let Some(description) = changes.description {
            task.description = description;
        }
        if let Some(status) = changes.status {
            task.status = status;
        }
        if let Some(assigned_to) = changes.assigned_to {
            task.assigned_to = assigned_to;
        }
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.inner.write().unwrap();
        let before = inner.tasks.len();
        inner.tasks.retain(|t| t.id != id);
        if inner.tasks.len() == before {
            return Ok(false);
        }
        inner.comments.retain(|c| c.task_id != id);
        Ok(true)
    }

    async fn insert_comment(&self, comment: Comment) -> Result<Comment, AppError> {
        let mut inner = self.inner.write().unwrap();
        inner.comments.push(comment.clone());
        Ok(comment)
    }

    async fn comment_by_id(&self, id: Uuid) -> Result<Option<Comment>, AppError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments(
        &self,
        scope: Scope,
        query: &CommentQuery,
    ) -> Result<Vec<Comment>, AppError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .comments
            .iter()
            .rev()
            .filter(|c| query.task.map_or(true, |id| c.task_id == id))
            .filter(|c| {
                inner
                    .tasks
                    .iter()
                    .find(|t| t.id == c.task_id)
                    .map_or(false, |t| in_scope(scope, t.assigned_to))
            })
            .cloned()
            .collect())
    }

    async fn update_comment(
        &self,
        id: Uuid,
        content: String,
    ) -> Result<Option<Comment>, AppError> {
        let mut inner = self.inner.write().unwrap();
        match inner.comments.iter_mut().find(|c| c.id == id) {
            Some(comment) => {
                comment.content = content;
                Ok(Some(comment.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.inner.write().unwrap();
        let before = inner.comments.len();
        inner.comments.retain(|c| c.id != id);
        Ok(inner.comments.len() < before)
    }
}
