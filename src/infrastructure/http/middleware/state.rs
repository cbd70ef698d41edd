use crate::application::services::{FollowUpService, QueueService, TicketService, UserService};

/// Shared handler state. Each service holds its repositories behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub queue_service: QueueService,
    pub ticket_service: TicketService,
    pub followup_service: FollowUpService,
    pub user_service: UserService,
}
