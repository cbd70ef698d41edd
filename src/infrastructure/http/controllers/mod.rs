pub mod followups;
pub mod health;
pub mod queues;
pub mod tickets;
pub mod users;
