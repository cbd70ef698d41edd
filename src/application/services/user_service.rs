use crate::domain::entities::{CreateUserRequest, User};
use crate::domain::ports::user_repository::UserRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use std::sync::Arc;

#[derive(Clone)]
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_user(&self, mut request: CreateUserRequest) -> ApiResult<User> {
        request.validate()?;
        self.user_repo.create_user(&request).await
    }

    pub async fn get_user(&self, id: i64) -> ApiResult<User> {
        self.user_repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))
    }

    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.user_repo.list_users().await
    }
}
