use serde::{Deserialize, Serialize};

use crate::domain::errors::{check_max_len, check_optional_max_len, DomainError, DomainResult};
use crate::shared::utils::email_validator::normalize_optional_email;

pub const USERNAME_MAX_LEN: usize = 150;
pub const NAME_MAX_LEN: usize = 150;

/// A staff account. Tickets are assigned to users and follow-ups are
/// authored by them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub created_at: String,
}

impl User {
    /// First and last name joined by a space, trimmed. Empty when neither is set.
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }

    /// Full name when one is configured, otherwise the username.
    pub fn display_name(&self) -> String {
        let full_name = self.full_name();
        if full_name.is_empty() {
            self.username.clone()
        } else {
            full_name
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl CreateUserRequest {
    pub fn validate(&mut self) -> DomainResult<()> {
        self.username = self.username.trim().to_string();
        if self.username.is_empty() {
            return Err(DomainError::ValidationError(
                "username is required".to_string(),
            ));
        }
        check_max_len("username", &self.username, USERNAME_MAX_LEN)?;
        check_optional_max_len("first_name", self.first_name.as_deref(), NAME_MAX_LEN)?;
        check_optional_max_len("last_name", self.last_name.as_deref(), NAME_MAX_LEN)?;
        self.email = normalize_optional_email(self.email.as_deref())?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub display_name: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let display_name = user.display_name();
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            display_name,
            created_at: user.created_at,
        }
    }
}
