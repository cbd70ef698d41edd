use crate::application::services::{FollowUpService, QueueService, TicketService, UserService};
use crate::config::Config;
use crate::domain::ports::followup_repository::FollowUpRepository;
use crate::domain::ports::queue_repository::QueueRepository;
use crate::domain::ports::ticket_repository::TicketRepository;
use crate::domain::ports::user_repository::UserRepository;
use crate::infrastructure::http::middleware::AppState;
use crate::infrastructure::persistence::Database;
use std::sync::Arc;

/// Wire repositories into services. All repositories share the one pool.
pub fn build_app_state(db: Database, config: &Config) -> AppState {
    let queue_repo: Arc<dyn QueueRepository> = Arc::new(db.clone());
    let ticket_repo: Arc<dyn TicketRepository> = Arc::new(db.clone());
    let followup_repo: Arc<dyn FollowUpRepository> = Arc::new(db.clone());
    let user_repo: Arc<dyn UserRepository> = Arc::new(db);

    let queue_service = QueueService::new(queue_repo.clone(), config.default_mailbox_interval);
    let ticket_service = TicketService::new(ticket_repo.clone(), queue_repo, user_repo.clone());
    let followup_service = FollowUpService::new(followup_repo, ticket_repo);
    let user_service = UserService::new(user_repo);

    tracing::info!("Application services initialized");

    AppState {
        queue_service,
        ticket_service,
        followup_service,
        user_service,
    }
}
