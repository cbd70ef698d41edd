pub mod followup_service;
pub mod queue_service;
pub mod ticket_service;
pub mod user_service;

pub use followup_service::FollowUpService;
pub use queue_service::QueueService;
pub use ticket_service::TicketService;
pub use user_service::UserService;
