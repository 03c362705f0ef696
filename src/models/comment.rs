use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A comment on a task. The author is fixed at creation time; only the
/// content may change afterwards. Comments are removed with their task.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub task_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(task_id: Uuid, author_id: Uuid, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            author_id,
            content,
            created_at: Utc::now(),
        }
    }
}

/// Input for creating a comment. The author comes from the authenticated
/// actor, never from the payload.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CommentInput {
    pub task: Uuid,
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

/// Update payload for a comment; content is the only mutable field.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CommentUpdate {
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

/// Query parameters for listing comments.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CommentQuery {
    /// Restrict to comments on one task.
    pub task: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_input_validation() {
        let empty = CommentInput {
            task: Uuid::new_v4(),
            content: "".to_string(),
        };
        assert!(empty.validate().is_err());

        let ok = CommentInput {
            task: Uuid::new_v4(),
            content: "looks good".to_string(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_comment_records_author() {
        let author = Uuid::new_v4();
        let task = Uuid::new_v4();
        let comment = Comment::new(task, author, "hi".into());
        assert_eq!(comment.author_id, author);
        assert_eq!(comment.task_id, task);
    }
}
