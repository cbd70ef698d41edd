use crate::domain::entities::Queue;
use crate::infrastructure::http::middleware::ApiResult;
use async_trait::async_trait;

/// Storage for queues. Implementations apply [`Queue::prepare_for_save`]
/// on every create and update.
#[async_trait]
pub trait QueueRepository: Send + Sync {
    async fn create_queue(&self, queue: &Queue) -> ApiResult<Queue>;
    async fn get_queue_by_id(&self, id: i64) -> ApiResult<Option<Queue>>;
    async fn get_queue_by_slug(&self, slug: &str) -> ApiResult<Option<Queue>>;
    async fn list_queues(&self) -> ApiResult<Vec<Queue>>;
    /// Load the queue, let `edit` modify it and store the result, all under
    /// the database write lock. An error from `edit` aborts the update.
    async fn update_queue(
        &self,
        id: i64,
        edit: &(dyn for<'q> Fn(&'q mut Queue) -> ApiResult<()> + Send + Sync),
    ) -> ApiResult<Queue>;
    async fn delete_queue(&self, id: i64) -> ApiResult<()>;
    async fn record_mailbox_check(&self, id: i64, checked_at: &str) -> ApiResult<()>;
}
