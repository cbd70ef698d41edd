use crate::domain::entities::{FollowUp, NewFollowUp, NewTicketChange};
use crate::infrastructure::http::middleware::ApiResult;
use async_trait::async_trait;

/// Follow-ups are append-only: there is no update operation.
#[async_trait]
pub trait FollowUpRepository: Send + Sync {
    async fn create_followup(
        &self,
        followup: &NewFollowUp,
        changes: &[NewTicketChange],
    ) -> ApiResult<FollowUp>;
    async fn get_followup_by_id(&self, id: i64) -> ApiResult<Option<FollowUp>>;
    /// Follow-ups of a ticket in ascending date order, each with its changes.
    async fn list_followups_for_ticket(&self, ticket_id: i64) -> ApiResult<Vec<FollowUp>>;
}
