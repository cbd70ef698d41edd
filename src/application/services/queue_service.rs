use crate::domain::entities::{CreateQueueRequest, Queue, UpdateQueueRequest};
use crate::domain::ports::queue_repository::QueueRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::utils::timestamps::format_timestamp;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct QueueService {
    queue_repo: Arc<dyn QueueRepository>,
    default_mailbox_interval: i64,
}

impl QueueService {
    pub fn new(queue_repo: Arc<dyn QueueRepository>, default_mailbox_interval: i64) -> Self {
        Self {
            queue_repo,
            default_mailbox_interval,
        }
    }

    #[tracing::instrument(skip(self, request), fields(slug = %request.slug))]
    pub async fn create_queue(&self, request: CreateQueueRequest) -> ApiResult<Queue> {
        let mut queue = request.into_queue(self.default_mailbox_interval);
        queue.validate()?;
        self.queue_repo.create_queue(&queue).await
    }

    pub async fn get_queue(&self, id: i64) -> ApiResult<Queue> {
        self.queue_repo
            .get_queue_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Queue {} not found", id)))
    }

    pub async fn get_queue_by_slug(&self, slug: &str) -> ApiResult<Queue> {
        self.queue_repo
            .get_queue_by_slug(slug)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Queue '{}' not found", slug)))
    }

    pub async fn list_queues(&self) -> ApiResult<Vec<Queue>> {
        self.queue_repo.list_queues().await
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn update_queue(&self, id: i64, request: UpdateQueueRequest) -> ApiResult<Queue> {
        self.queue_repo
            .update_queue(id, &|queue: &mut Queue| -> ApiResult<()> {
                request.clone().apply_to(queue);
                queue.validate()?;
                Ok(())
            })
            .await
    }

    /// Deleting a queue also deletes its tickets.
    #[tracing::instrument(skip(self))]
    pub async fn delete_queue(&self, id: i64) -> ApiResult<()> {
        self.queue_repo.delete_queue(id).await
    }

    /// Stamp `email_box_last_check`. Called by the mail checker after a poll.
    pub async fn record_mailbox_check(&self, id: i64, checked_at: DateTime<Utc>) -> ApiResult<()> {
        self.queue_repo
            .record_mailbox_check(id, &format_timestamp(checked_at))
            .await
    }

    /// Mailbox-enabled queues whose check interval has elapsed at `now`.
    pub async fn queues_due_for_mailbox_check(&self, now: DateTime<Utc>) -> ApiResult<Vec<Queue>> {
        let queues = self.queue_repo.list_queues().await?;
        Ok(queues
            .into_iter()
            .filter(|queue| queue.mailbox_check_due(now))
            .collect())
    }
}
