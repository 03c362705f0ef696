use std::sync::Arc;

use uuid::Uuid;

use crate::error::AppError;
use crate::policy::Actor;
use crate::store::Store;

/// Shared application state: the persistence seam plus the one behavior
/// flag registration needs. Handlers receive it as `web::Data<AppState>`.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub allow_caller_role: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, allow_caller_role: bool) -> Self {
        Self {
            store,
            allow_caller_role,
        }
    }

    /// Resolves the full actor (role, active flag) behind an authenticated
    /// user id. A token whose user no longer exists is treated as invalid
    /// credentials. Inactive users resolve fine; the policy denies them.
    pub async fn actor(&self, user_id: Uuid) -> Result<Actor, AppError> {
        let user = self
            .store
            .user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid token".into()))?;
        Ok(Actor::from(&user))
    }
}
