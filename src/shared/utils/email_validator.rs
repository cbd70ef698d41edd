use crate::domain::errors::{DomainError, DomainResult};

/// Validate an address and normalize it to its trimmed, lowercase form.
pub fn validate_and_normalize_email(email: &str) -> DomainResult<String> {
    let trimmed = email.trim();

    if !email_address::EmailAddress::is_valid(trimmed) {
        return Err(DomainError::ValidationError(format!(
            "Invalid email address '{}'. Must be in format user@domain.tld",
            trimmed
        )));
    }

    // email_address accepts bare hosts such as user@localhost
    if let Some(at_pos) = trimmed.find('@') {
        let domain_part = &trimmed[at_pos + 1..];
        if !domain_part.contains('.') {
            return Err(DomainError::ValidationError(
                "Invalid email address. Domain must include a TLD (e.g., .com, .org)".to_string(),
            ));
        }
    }

    Ok(trimmed.to_lowercase())
}

/// Optional-field variant: blank input is treated as absent.
pub fn normalize_optional_email(email: Option<&str>) -> DomainResult<Option<String>> {
    match email.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => validate_and_normalize_email(value).map(Some),
    }
}
