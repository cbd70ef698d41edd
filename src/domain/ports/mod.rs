pub mod followup_repository;
pub mod queue_repository;
pub mod ticket_repository;
pub mod user_repository;
