pub mod followup;
pub mod queue;
pub mod ticket;
pub mod ticket_change;
pub mod user;

pub use followup::*;
pub use queue::*;
pub use ticket::*;
pub use ticket_change::*;
pub use user::*;
