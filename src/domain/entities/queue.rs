use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::domain::errors::{check_max_len, check_optional_max_len, DomainError, DomainResult};
use crate::shared::utils::deserialize_some;
use crate::shared::utils::email_validator::normalize_optional_email;
use crate::shared::utils::timestamps::parse_timestamp;

pub const QUEUE_TITLE_MAX_LEN: usize = 100;
pub const SLUG_MAX_LEN: usize = 50;
pub const MAILBOX_FIELD_MAX_LEN: usize = 200;
pub const IMAP_FOLDER_MAX_LEN: usize = 100;
pub const DEFAULT_IMAP_FOLDER: &str = "INBOX";
pub const DEFAULT_MAILBOX_INTERVAL: i64 = 5;

fn slug_pattern() -> &'static Regex {
    static SLUG: OnceLock<Regex> = OnceLock::new();
    SLUG.get_or_init(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern is valid"))
}

/// Mail server protocol used to pull messages into a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailboxType {
    Pop3,
    Imap,
}

impl MailboxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MailboxType::Pop3 => "pop3",
            MailboxType::Imap => "imap",
        }
    }
}

impl fmt::Display for MailboxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailboxType::Pop3 => write!(f, "POP 3"),
            MailboxType::Imap => write!(f, "IMAP"),
        }
    }
}

impl std::str::FromStr for MailboxType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pop3" => Ok(MailboxType::Pop3),
            "imap" => Ok(MailboxType::Imap),
            _ => Err(format!("Invalid mailbox type: {}", s)),
        }
    }
}

/// A collection of tickets, typically one per department or product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Queue {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub email_address: Option<String>,
    pub email_box_type: Option<MailboxType>,
    pub email_box_host: Option<String>,
    pub email_box_port: Option<i64>,
    pub email_box_user: Option<String>,
    #[serde(skip_serializing)]
    pub email_box_pass: Option<String>,
    pub email_box_imap_folder: Option<String>,
    pub email_box_interval: Option<i64>,
    pub email_box_last_check: Option<String>,
}

impl Queue {
    /// `"{title} <{email_address}>"`, or `None` when the queue has no address.
    pub fn from_address(&self) -> Option<String> {
        self.email_address
            .as_ref()
            .map(|address| format!("{} <{}>", self.title, address))
    }

    /// Defaults applied on every save. An IMAP mailbox without a folder
    /// reads from INBOX.
    pub fn prepare_for_save(&mut self) {
        let folder_missing = self
            .email_box_imap_folder
            .as_deref()
            .map_or(true, |folder| folder.trim().is_empty());

        if self.email_box_type == Some(MailboxType::Imap) && folder_missing {
            self.email_box_imap_folder = Some(DEFAULT_IMAP_FOLDER.to_string());
        }
    }

    /// Whether the mail checker should poll this queue at `now`.
    pub fn mailbox_check_due(&self, now: DateTime<Utc>) -> bool {
        if self.email_box_type.is_none() {
            return false;
        }
        let interval = self.email_box_interval.unwrap_or(DEFAULT_MAILBOX_INTERVAL);
        match self.email_box_last_check.as_deref().and_then(parse_timestamp) {
            // An interval too large to represent never comes due
            Some(last_check) => Duration::try_minutes(interval)
                .and_then(|interval| last_check.checked_add_signed(interval))
                .is_some_and(|next_check| next_check <= now),
            None => true,
        }
    }

    /// Normalizes user-supplied values and checks field constraints.
    pub fn validate(&mut self) -> DomainResult<()> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err(DomainError::ValidationError("title is required".to_string()));
        }
        check_max_len("title", &self.title, QUEUE_TITLE_MAX_LEN)?;

        self.slug = self.slug.trim().to_string();
        if !slug_pattern().is_match(&self.slug) {
            return Err(DomainError::ValidationError(
                "slug may only contain letters, numbers, underscores or hyphens".to_string(),
            ));
        }
        check_max_len("slug", &self.slug, SLUG_MAX_LEN)?;

        self.email_address = normalize_optional_email(self.email_address.as_deref())?;

        check_optional_max_len(
            "email_box_host",
            self.email_box_host.as_deref(),
            MAILBOX_FIELD_MAX_LEN,
        )?;
        check_optional_max_len(
            "email_box_user",
            self.email_box_user.as_deref(),
            MAILBOX_FIELD_MAX_LEN,
        )?;
        check_optional_max_len(
            "email_box_pass",
            self.email_box_pass.as_deref(),
            MAILBOX_FIELD_MAX_LEN,
        )?;
        check_optional_max_len(
            "email_box_imap_folder",
            self.email_box_imap_folder.as_deref(),
            IMAP_FOLDER_MAX_LEN,
        )?;

        if let Some(port) = self.email_box_port {
            if !(1..=65535).contains(&port) {
                return Err(DomainError::ValidationError(
                    "email_box_port must be between 1 and 65535".to_string(),
                ));
            }
        }

        if let Some(interval) = self.email_box_interval {
            if interval <= 0 {
                return Err(DomainError::ValidationError(
                    "email_box_interval must be a positive number of minutes".to_string(),
                ));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateQueueRequest {
    pub title: String,
    pub slug: String,
    pub email_address: Option<String>,
    pub email_box_type: Option<MailboxType>,
    pub email_box_host: Option<String>,
    pub email_box_port: Option<i64>,
    pub email_box_user: Option<String>,
    pub email_box_pass: Option<String>,
    pub email_box_imap_folder: Option<String>,
    pub email_box_interval: Option<i64>,
}

impl CreateQueueRequest {
    /// Build an unsaved queue. `id` is assigned by the repository.
    pub fn into_queue(self, default_interval: i64) -> Queue {
        Queue {
            id: 0,
            title: self.title,
            slug: self.slug,
            email_address: self.email_address,
            email_box_type: self.email_box_type,
            email_box_host: self.email_box_host,
            email_box_port: self.email_box_port,
            email_box_user: self.email_box_user,
            email_box_pass: self.email_box_pass,
            email_box_imap_folder: self.email_box_imap_folder,
            email_box_interval: Some(self.email_box_interval.unwrap_or(default_interval)),
            email_box_last_check: None,
        }
    }
}

/// Partial update. For nullable fields an explicit `null` clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateQueueRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub email_address: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub email_box_type: Option<Option<MailboxType>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub email_box_host: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub email_box_port: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub email_box_user: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub email_box_pass: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub email_box_imap_folder: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub email_box_interval: Option<Option<i64>>,
}

impl UpdateQueueRequest {
    pub fn apply_to(self, queue: &mut Queue) {
        if let Some(title) = self.title {
            queue.title = title;
        }
        if let Some(slug) = self.slug {
            queue.slug = slug;
        }
        if let Some(v) = self.email_address {
            queue.email_address = v;
        }
        if let Some(v) = self.email_box_type {
            queue.email_box_type = v;
        }
        if let Some(v) = self.email_box_host {
            queue.email_box_host = v;
        }
        if let Some(v) = self.email_box_port {
            queue.email_box_port = v;
        }
        if let Some(v) = self.email_box_user {
            queue.email_box_user = v;
        }
        if let Some(v) = self.email_box_pass {
            queue.email_box_pass = v;
        }
        if let Some(v) = self.email_box_imap_folder {
            queue.email_box_imap_folder = v;
        }
        if let Some(v) = self.email_box_interval {
            queue.email_box_interval = v;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueResponse {
    #[serde(flatten)]
    pub queue: Queue,
    pub from_address: Option<String>,
}

impl From<Queue> for QueueResponse {
    fn from(queue: Queue) -> Self {
        let from_address = queue.from_address();
        Self {
            queue,
            from_address,
        }
    }
}
