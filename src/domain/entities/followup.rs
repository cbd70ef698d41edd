use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::entities::ticket::TicketStatus;
use crate::domain::entities::ticket_change::{TicketChange, TicketChangeResponse};

pub const FOLLOWUP_TITLE_MAX_LEN: usize = 200;

pub const TITLE_TICKET_OPENED: &str = "Ticket Opened";
pub const TITLE_COMMENT: &str = "Comment";
pub const TITLE_UPDATED: &str = "Updated";
pub const TITLE_UNASSIGNED: &str = "Unassigned";

/// An append-only journal entry on a ticket: a comment, a status change,
/// or both. Never updated after insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUp {
    pub id: i64,
    pub ticket_id: i64,
    pub date: String,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub public: Option<bool>,
    pub user_id: i64,
    pub new_status: Option<TicketStatus>,
    pub changes: Vec<TicketChange>,
}

impl FollowUp {
    /// Only follow-ups explicitly marked public are visible to the submitter.
    pub fn is_public(&self) -> bool {
        self.public.unwrap_or(false)
    }
}

impl fmt::Display for FollowUp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title.as_deref().unwrap_or(""))
    }
}

/// Insert payload. `date` is stamped by the repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewFollowUp {
    pub ticket_id: i64,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub public: Option<bool>,
    pub user_id: i64,
    pub new_status: Option<TicketStatus>,
}

/// Body for `POST /api/tickets/:id/followups`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddFollowUpRequest {
    pub user_id: i64,
    pub comment: Option<String>,
    pub public: Option<bool>,
    pub new_status: Option<TicketStatus>,
}

/// What happened to the owner in an update, for title generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerChange {
    Assigned(String),
    Unassigned,
}

/// Title for a follow-up, chosen from the action taken. Status changes win
/// over owner changes; a bare comment is a "Comment"; anything else is
/// "Updated".
pub fn generate_title(
    new_status: Option<TicketStatus>,
    owner_change: Option<&OwnerChange>,
    has_comment: bool,
    has_field_changes: bool,
) -> String {
    match (new_status, owner_change) {
        (Some(status @ (TicketStatus::Resolved | TicketStatus::Closed | TicketStatus::Reopened)), _) => {
            status.to_string()
        }
        (_, Some(OwnerChange::Assigned(name))) => format!("Assigned to {}", name),
        (_, Some(OwnerChange::Unassigned)) => TITLE_UNASSIGNED.to_string(),
        (None, None) if has_comment && !has_field_changes => TITLE_COMMENT.to_string(),
        _ => TITLE_UPDATED.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpResponse {
    pub id: i64,
    pub ticket_id: i64,
    pub date: String,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub public: bool,
    pub user_id: i64,
    pub new_status: Option<TicketStatus>,
    pub changes: Vec<TicketChangeResponse>,
}

impl From<FollowUp> for FollowUpResponse {
    fn from(followup: FollowUp) -> Self {
        let public = followup.is_public();
        Self {
            id: followup.id,
            ticket_id: followup.ticket_id,
            date: followup.date,
            title: followup.title,
            comment: followup.comment,
            public,
            user_id: followup.user_id,
            new_status: followup.new_status,
            changes: followup
                .changes
                .into_iter()
                .map(TicketChangeResponse::from)
                .collect(),
        }
    }
}
