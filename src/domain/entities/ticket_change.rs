use serde::{Deserialize, Serialize};
use std::fmt;

/// One field mutation recorded against a follow-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketChange {
    pub id: i64,
    pub followup_id: i64,
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// A change not yet persisted; the follow-up id is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicketChange {
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl NewTicketChange {
    pub fn new(field: &str, old_value: Option<String>, new_value: Option<String>) -> Self {
        Self {
            field: field.to_string(),
            old_value,
            new_value,
        }
    }
}

/// Human readable summary shared by persisted and pending changes.
fn describe(
    f: &mut fmt::Formatter<'_>,
    field: &str,
    old_value: &Option<String>,
    new_value: &Option<String>,
) -> fmt::Result {
    let old = old_value.as_deref().unwrap_or_default();
    let new = new_value.as_deref().unwrap_or_default();
    if new.is_empty() {
        write!(f, "{} removed", field)
    } else if old.is_empty() {
        write!(f, "{} set to {}", field, new)
    } else {
        write!(f, "{} changed from \"{}\" to \"{}\"", field, old, new)
    }
}

impl fmt::Display for TicketChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        describe(f, &self.field, &self.old_value, &self.new_value)
    }
}

impl fmt::Display for NewTicketChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        describe(f, &self.field, &self.old_value, &self.new_value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketChangeResponse {
    #[serde(flatten)]
    pub change: TicketChange,
    pub display: String,
}

impl From<TicketChange> for TicketChangeResponse {
    fn from(change: TicketChange) -> Self {
        Self {
            display: change.to_string(),
            change,
        }
    }
}
