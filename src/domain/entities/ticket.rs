use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::entities::followup::{FollowUpResponse, NewFollowUp};
use crate::domain::entities::ticket_change::NewTicketChange;
use crate::domain::entities::user::User;
use crate::domain::errors::{check_max_len, DomainError, DomainResult};
use crate::shared::utils::deserialize_some;
use crate::shared::utils::email_validator::normalize_optional_email;

pub const TICKET_TITLE_MAX_LEN: usize = 200;
pub const UNASSIGNED: &str = "Unassigned";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    #[default]
    Open,
    Reopened,
    Resolved,
    Closed,
}

impl TicketStatus {
    /// Integer code persisted in `tickets.status` and `followups.new_status`.
    pub fn code(&self) -> i64 {
        match self {
            TicketStatus::Open => 1,
            TicketStatus::Reopened => 2,
            TicketStatus::Resolved => 3,
            TicketStatus::Closed => 4,
        }
    }

    /// Status actually stored when `requested` is applied to a ticket
    /// currently in `self`. Opening a resolved or closed ticket reopens it.
    pub fn transition_to(self, requested: TicketStatus) -> TicketStatus {
        match (self, requested) {
            (TicketStatus::Resolved | TicketStatus::Closed, TicketStatus::Open) => {
                TicketStatus::Reopened
            }
            _ => requested,
        }
    }
}

impl TryFrom<i64> for TicketStatus {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(TicketStatus::Open),
            2 => Ok(TicketStatus::Reopened),
            3 => Ok(TicketStatus::Resolved),
            4 => Ok(TicketStatus::Closed),
            _ => Err(format!("Invalid ticket status code: {}", code)),
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketStatus::Open => write!(f, "Open"),
            TicketStatus::Reopened => write!(f, "Reopened"),
            TicketStatus::Resolved => write!(f, "Resolved"),
            TicketStatus::Closed => write!(f, "Closed"),
        }
    }
}

/// A single support request.
///
/// `queue_slug`, `queue_title` and `assignee` are read through joins so the derived
/// accessors need no extra lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub title: String,
    pub queue_id: i64,
    pub queue_slug: String,
    pub queue_title: String,
    pub created: String,
    pub submitter_email: Option<String>,
    pub assigned_to: Option<i64>,
    #[serde(skip)]
    pub assignee: Option<User>,
    pub status: TicketStatus,
    pub description: Option<String>,
    pub resolution: Option<String>,
}

impl Ticket {
    /// "Unassigned", or the owner's full name, or the owner's username.
    pub fn assigned_to_display(&self) -> String {
        match &self.assignee {
            Some(user) => user.display_name(),
            None => UNASSIGNED.to_string(),
        }
    }

    /// Short reference used in correspondence, e.g. `[support-42]`.
    pub fn reference(&self) -> String {
        format!("[{}-{}]", self.queue_slug, self.id)
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// A planned edit: the ticket as it should be stored and the journal entry
/// describing the difference from the stored row.
#[derive(Debug, Clone)]
pub struct TicketEdit {
    pub ticket: Ticket,
    pub followup: NewFollowUp,
    pub changes: Vec<NewTicketChange>,
}

fn validate_title(title: &str) -> DomainResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::ValidationError("title is required".to_string()));
    }
    check_max_len("title", title, TICKET_TITLE_MAX_LEN)?;
    Ok(title.to_string())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTicketRequest {
    pub title: String,
    pub queue_id: i64,
    pub submitter_email: Option<String>,
    pub assigned_to: Option<i64>,
    pub status: Option<TicketStatus>,
    pub description: Option<String>,
    /// Staff member logging the ticket. When set, an opening follow-up is journaled.
    pub user_id: Option<i64>,
}

impl CreateTicketRequest {
    pub fn validate(&mut self) -> DomainResult<()> {
        self.title = validate_title(&self.title)?;
        self.submitter_email = normalize_optional_email(self.submitter_email.as_deref())?;
        Ok(())
    }
}

/// Partial ticket update journaled as one follow-up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTicketRequest {
    /// Author of the resulting follow-up.
    pub user_id: i64,
    pub title: Option<String>,
    pub queue_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub submitter_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub assigned_to: Option<Option<i64>>,
    pub status: Option<TicketStatus>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub resolution: Option<Option<String>>,
    pub comment: Option<String>,
    pub public: Option<bool>,
}

impl UpdateTicketRequest {
    pub fn validate(&mut self) -> DomainResult<()> {
        if let Some(title) = &self.title {
            self.title = Some(validate_title(title)?);
        }
        if let Some(email) = &self.submitter_email {
            self.submitter_email = Some(normalize_optional_email(email.as_deref())?);
        }
        self.comment = self
            .comment
            .take()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketFilter {
    pub queue_id: Option<i64>,
    pub status: Option<TicketStatus>,
    pub assigned_to: Option<i64>,
    /// Only tickets without an owner. Ignored when `assigned_to` is set.
    pub unassigned: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl TicketFilter {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 200;

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketResponse {
    #[serde(flatten)]
    pub ticket: Ticket,
    /// Reference such as `[support-42]`.
    #[serde(rename = "ticket")]
    pub reference: String,
    pub assigned_to_display: String,
    pub status_label: String,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            reference: ticket.reference(),
            assigned_to_display: ticket.assigned_to_display(),
            status_label: ticket.status.to_string(),
            ticket,
        }
    }
}

/// Result of a journaled update: the ticket as stored and the follow-up
/// describing the edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketUpdateResponse {
    pub ticket: TicketResponse,
    pub followup: FollowUpResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketListResponse {
    pub tickets: Vec<TicketResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
