use crate::domain::entities::{CreateUserRequest, User};
use crate::infrastructure::http::middleware::ApiResult;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, request: &CreateUserRequest) -> ApiResult<User>;
    async fn get_user_by_id(&self, id: i64) -> ApiResult<Option<User>>;
    async fn list_users(&self) -> ApiResult<Vec<User>>;
}
