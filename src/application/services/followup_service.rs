use crate::domain::entities::FollowUp;
use crate::domain::ports::followup_repository::FollowUpRepository;
use crate::domain::ports::ticket_repository::TicketRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use std::sync::Arc;

/// Read access to the ticket journal. Follow-ups are written by
/// [`super::TicketService`] as part of ticket updates.
#[derive(Clone)]
pub struct FollowUpService {
    followup_repo: Arc<dyn FollowUpRepository>,
    ticket_repo: Arc<dyn TicketRepository>,
}

impl FollowUpService {
    pub fn new(
        followup_repo: Arc<dyn FollowUpRepository>,
        ticket_repo: Arc<dyn TicketRepository>,
    ) -> Self {
        Self {
            followup_repo,
            ticket_repo,
        }
    }

    pub async fn get_followup(&self, id: i64) -> ApiResult<FollowUp> {
        self.followup_repo
            .get_followup_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Follow-up {} not found", id)))
    }

    /// Oldest first.
    pub async fn list_for_ticket(&self, ticket_id: i64) -> ApiResult<Vec<FollowUp>> {
        if self.ticket_repo.get_ticket_by_id(ticket_id).await?.is_none() {
            return Err(ApiError::NotFound(format!("Ticket {} not found", ticket_id)));
        }
        self.followup_repo.list_followups_for_ticket(ticket_id).await
    }
}
