use crate::domain::entities::{
    generate_title, AddFollowUpRequest, CreateTicketRequest, FollowUp, NewFollowUp,
    NewTicketChange, OwnerChange, Queue, Ticket, TicketEdit, TicketFilter, TicketStatus,
    UpdateTicketRequest, User, FOLLOWUP_TITLE_MAX_LEN, TITLE_TICKET_OPENED,
};
use crate::domain::ports::queue_repository::QueueRepository;
use crate::domain::ports::ticket_repository::TicketRepository;
use crate::domain::ports::user_repository::UserRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use std::sync::Arc;

pub const FIELD_TITLE: &str = "Title";
pub const FIELD_QUEUE: &str = "Queue";
pub const FIELD_SUBMITTER_EMAIL: &str = "Submitter E-Mail";
pub const FIELD_OWNER: &str = "Owner";
pub const FIELD_DESCRIPTION: &str = "Description";
pub const FIELD_RESOLUTION: &str = "Resolution";

/// Ticket lifecycle. Every edit after creation is journaled as a follow-up
/// carrying one [`NewTicketChange`] per modified field.
#[derive(Clone)]
pub struct TicketService {
    ticket_repo: Arc<dyn TicketRepository>,
    queue_repo: Arc<dyn QueueRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl TicketService {
    pub fn new(
        ticket_repo: Arc<dyn TicketRepository>,
        queue_repo: Arc<dyn QueueRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            ticket_repo,
            queue_repo,
            user_repo,
        }
    }

    async fn require_queue(&self, id: i64) -> ApiResult<Queue> {
        self.queue_repo
            .get_queue_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Queue {} not found", id)))
    }

    async fn require_user(&self, id: i64) -> ApiResult<User> {
        self.user_repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))
    }

    #[tracing::instrument(skip(self, request), fields(queue_id = request.queue_id))]
    pub async fn create_ticket(&self, mut request: CreateTicketRequest) -> ApiResult<Ticket> {
        request.validate()?;

        let queue = self.require_queue(request.queue_id).await?;
        if let Some(assignee_id) = request.assigned_to {
            self.require_user(assignee_id).await?;
        }

        let opening = match request.user_id {
            Some(user_id) => {
                self.require_user(user_id).await?;
                Some(NewFollowUp {
                    ticket_id: 0,
                    title: Some(TITLE_TICKET_OPENED.to_string()),
                    comment: request.description.clone(),
                    public: Some(true),
                    user_id,
                    new_status: None,
                })
            }
            None => None,
        };

        let ticket = self
            .ticket_repo
            .create_ticket(&request, opening.as_ref())
            .await?;

        metrics::counter!("helpdesk_tickets_created_total", "queue" => queue.slug).increment(1);
        Ok(ticket)
    }

    pub async fn get_ticket(&self, id: i64) -> ApiResult<Ticket> {
        self.ticket_repo
            .get_ticket_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Ticket {} not found", id)))
    }

    pub async fn list_tickets(&self, filter: &TicketFilter) -> ApiResult<(Vec<Ticket>, i64)> {
        self.ticket_repo.list_tickets(filter).await
    }

    pub async fn latest_ticket(&self) -> ApiResult<Ticket> {
        self.ticket_repo
            .latest_ticket()
            .await?
            .ok_or_else(|| ApiError::NotFound("No tickets exist".to_string()))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_ticket(&self, id: i64) -> ApiResult<()> {
        self.ticket_repo.delete_ticket(id).await
    }

    /// Apply a partial update and journal it. Returns the stored ticket and
    /// the follow-up that records the edit.
    #[tracing::instrument(skip(self, request), fields(user_id = request.user_id))]
    pub async fn update_ticket(
        &self,
        ticket_id: i64,
        mut request: UpdateTicketRequest,
    ) -> ApiResult<(Ticket, FollowUp)> {
        request.validate()?;
        self.require_user(request.user_id).await?;

        let new_queue = match request.queue_id {
            Some(queue_id) => Some(self.require_queue(queue_id).await?),
            None => None,
        };
        let new_assignee = match request.assigned_to {
            Some(Some(user_id)) => Some(self.require_user(user_id).await?),
            _ => None,
        };

        let plan = |current: &Ticket| -> ApiResult<TicketEdit> {
            plan_update(current, &request, new_queue.as_ref(), new_assignee.as_ref())
        };
        let saved = self
            .ticket_repo
            .update_ticket_with_followup(ticket_id, &plan)
            .await?;

        metrics::counter!("helpdesk_followups_created_total").increment(1);

        let ticket = self.get_ticket(ticket_id).await?;
        for change in &saved.changes {
            tracing::debug!("Ticket {}: {}", ticket.reference(), change);
        }
        Ok((ticket, saved))
    }

    /// A comment and/or status change with no other edits.
    pub async fn add_followup(
        &self,
        ticket_id: i64,
        request: AddFollowUpRequest,
    ) -> ApiResult<(Ticket, FollowUp)> {
        self.update_ticket(
            ticket_id,
            UpdateTicketRequest {
                user_id: request.user_id,
                status: request.new_status,
                comment: request.comment,
                public: request.public,
                ..Default::default()
            },
        )
        .await
    }
}

/// Diff `request` against the stored ticket. `new_queue` and `new_assignee`
/// are the already-resolved targets of `queue_id` and `assigned_to`.
fn plan_update(
    current: &Ticket,
    request: &UpdateTicketRequest,
    new_queue: Option<&Queue>,
    new_assignee: Option<&User>,
) -> ApiResult<TicketEdit> {
    let mut updated = current.clone();
    let mut changes = Vec::new();
    let mut owner_change = None;

    if let Some(title) = &request.title {
        if *title != current.title {
            changes.push(NewTicketChange::new(
                FIELD_TITLE,
                Some(current.title.clone()),
                Some(title.clone()),
            ));
            updated.title = title.clone();
        }
    }

    if let Some(queue) = new_queue {
        if queue.id != current.queue_id {
            changes.push(NewTicketChange::new(
                FIELD_QUEUE,
                Some(current.queue_title.clone()),
                Some(queue.title.clone()),
            ));
            updated.queue_id = queue.id;
            updated.queue_slug = queue.slug.clone();
            updated.queue_title = queue.title.clone();
        }
    }

    if let Some(email) = &request.submitter_email {
        if *email != current.submitter_email {
            changes.push(NewTicketChange::new(
                FIELD_SUBMITTER_EMAIL,
                current.submitter_email.clone(),
                email.clone(),
            ));
            updated.submitter_email = email.clone();
        }
    }

    if let Some(assigned_to) = request.assigned_to {
        if assigned_to != current.assigned_to {
            let old_name = current.assignee.as_ref().map(User::display_name);
            let new_name = new_assignee.map(User::display_name);

            owner_change = Some(match &new_name {
                Some(name) => OwnerChange::Assigned(name.clone()),
                None => OwnerChange::Unassigned,
            });
            changes.push(NewTicketChange::new(FIELD_OWNER, old_name, new_name));
            updated.assigned_to = assigned_to;
            updated.assignee = new_assignee.cloned();
        }
    }

    if let Some(description) = &request.description {
        if *description != current.description {
            changes.push(NewTicketChange::new(
                FIELD_DESCRIPTION,
                current.description.clone(),
                description.clone(),
            ));
            updated.description = description.clone();
        }
    }

    let new_status = request
        .status
        .map(|requested| current.status.transition_to(requested))
        .filter(|status| *status != current.status);

    // A resolving comment doubles as the resolution unless one is given
    let resolution = match &request.resolution {
        Some(resolution) => Some(resolution.clone()),
        None if new_status == Some(TicketStatus::Resolved) && request.comment.is_some() => {
            Some(request.comment.clone())
        }
        None => None,
    };
    if let Some(resolution) = resolution {
        if resolution != current.resolution {
            changes.push(NewTicketChange::new(
                FIELD_RESOLUTION,
                current.resolution.clone(),
                resolution.clone(),
            ));
            updated.resolution = resolution;
        }
    }

    if changes.is_empty() && new_status.is_none() && request.comment.is_none() {
        return Err(ApiError::BadRequest(
            "Update contains no changes and no comment".to_string(),
        ));
    }

    if let Some(status) = new_status {
        updated.status = status;
    }

    let title: String = generate_title(
        new_status,
        owner_change.as_ref(),
        request.comment.is_some(),
        !changes.is_empty(),
    )
    .chars()
    .take(FOLLOWUP_TITLE_MAX_LEN)
    .collect();

    Ok(TicketEdit {
        ticket: updated,
        followup: NewFollowUp {
            ticket_id: current.id,
            title: Some(title),
            comment: request.comment.clone(),
            public: request.public,
            user_id: request.user_id,
            new_status,
        },
        changes,
    })
}
