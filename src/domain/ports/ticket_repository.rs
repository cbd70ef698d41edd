use crate::domain::entities::{
    CreateTicketRequest, FollowUp, NewFollowUp, Ticket, TicketEdit, TicketFilter,
};
use crate::infrastructure::http::middleware::ApiResult;
use async_trait::async_trait;

#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Insert a ticket with `created` stamped now. When `opening` is given it
    /// is journaled against the new ticket in the same transaction.
    async fn create_ticket(
        &self,
        request: &CreateTicketRequest,
        opening: Option<&NewFollowUp>,
    ) -> ApiResult<Ticket>;

    async fn get_ticket_by_id(&self, id: i64) -> ApiResult<Option<Ticket>>;

    /// Matching tickets, newest first, plus the total match count.
    async fn list_tickets(&self, filter: &TicketFilter) -> ApiResult<(Vec<Ticket>, i64)>;

    /// The most recently created ticket.
    async fn latest_ticket(&self) -> ApiResult<Option<Ticket>>;

    /// Load the ticket, plan the edit against it with `edit` and persist the
    /// planned row, follow-up and changes. Reading and writing happen in one
    /// transaction holding the database write lock. `created` is never written.
    async fn update_ticket_with_followup(
        &self,
        ticket_id: i64,
        edit: &(dyn for<'t> Fn(&'t Ticket) -> ApiResult<TicketEdit> + Send + Sync),
    ) -> ApiResult<FollowUp>;

    async fn delete_ticket(&self, id: i64) -> ApiResult<()>;
}
