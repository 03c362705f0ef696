pub mod comment;
pub mod task;
pub mod user;

pub use comment::{Comment, CommentInput, CommentQuery, CommentUpdate};
pub use task::{Task, TaskChanges, TaskInput, TaskQuery, TaskStatus};
pub use user::{Role, User, UserResponse, UserUpdate};
