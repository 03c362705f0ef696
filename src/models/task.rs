use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    ToDo,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed.
    Done,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// The title of the task.
    pub title: String,
    /// Free-text description of the task.
    pub description: String,
    /// The current status of the task.
    pub status: TaskStatus,
    /// Identifier of the user the task is assigned to. Every task has
    /// exactly one assignee; the referenced user may be inactive.
    pub assigned_to: Uuid,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the task.
    pub updated_at: DateTime<Utc>,
}

/// Input structure for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 255 characters.
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[validate(length(max = 2000))]
    pub description: String,

    /// Defaults to `ToDo` when omitted.
    #[serde(default)]
    pub status: TaskStatus,

    /// The user this task is assigned to. Required.
    pub assigned_to: Uuid,
}

/// Partial update for a task; only the provided fields change.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct TaskChanges {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Uuid>,
}

impl From<TaskInput> for TaskChanges {
    fn from(input: TaskInput) -> Self {
        Self {
            title: Some(input.title),
            description: Some(input.description),
            status: Some(input.status),
            assigned_to: Some(input.assigned_to),
        }
    }
}

/// Represents query parameters for filtering tasks when listing them.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Filter tasks by status.
    pub status: Option<TaskStatus>,
    /// Filter tasks by assignee's user ID.
    pub assigned_to: Option<Uuid>,
    /// Search term matched against title and description (case-insensitive).
    pub search: Option<String>,
}

impl Task {
    /// Creates a new `Task` from `TaskInput`, stamping both timestamps
    /// with the server clock.
    pub fn new(input: TaskInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            status: input.status,
            assigned_to: input.assigned_to,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let assignee = Uuid::new_v4();
        let input = TaskInput {
            title: "Test Task".to_string(),
            description: "Test Description".to_string(),
            status: TaskStatus::ToDo,
            assigned_to: assignee,
        };

        let task = Task::new(input);
        assert_eq!(task.title, "Test Task");
        assert_eq!(task.assigned_to, assignee);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_task_input_validation() {
        let invalid_input = TaskInput {
            title: "".to_string(), // Empty title
            description: "Valid Description".to_string(),
            status: TaskStatus::ToDo,
            assigned_to: Uuid::new_v4(),
        };
        assert!(invalid_input.validate().is_err());

        let valid_input = TaskInput {
            title: "Valid Task".to_string(),
            description: "Valid Description".to_string(),
            status: TaskStatus::Done,
            assigned_to: Uuid::new_v4(),
        };
        assert!(valid_input.validate().is_ok());
    }

    #[test]
    fn test_status_defaults_to_todo_when_omitted() {
        let input: TaskInput = serde_json::from_value(serde_json::json!({
            "title": "T",
            "description": "d",
            "assigned_to": Uuid::new_v4(),
        }))
        .unwrap();
        assert_eq!(input.status, TaskStatus::ToDo);
    }

    #[test]
    fn test_status_uses_exact_tags() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"InProgress\""
        );
        assert!(serde_json::from_str::<TaskStatus>("\"in_progress\"").is_err());
    }
}
