//! Form validation schemas.
//!
//! Stateless, per-submission validation for the four forms the
//! application exposes: login, signup, task, and password reset. A
//! schema either accepts the input or reports field-level messages;
//! rejected input never reaches an external service.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::TaskStatus;

/// Minimum password length accepted at signup.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Maximum task title length.
pub const MAX_TITLE_LEN: usize = 200;

/// A validation message scoped to a single form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field, as the form knows it.
    pub field: String,
    /// Human-readable message for inline display.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All field errors produced by one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Wraps a non-empty list of field errors.
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first message recorded for the given field, if any.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Accumulates field errors during one validation pass.
#[derive(Debug, Default)]
struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    fn require_email(&mut self, field: &str, value: &str) {
        if !is_well_formed_email(value) {
            self.reject(field, "Invalid email address");
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(self.errors))
        }
    }
}

/// Minimal well-formedness check: one `@`, non-empty local part, and
/// a dotted domain. Real verification is the identity provider's job.
fn is_well_formed_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !value.contains(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
}

/// Parses a due date from form input: RFC 3339, or the
/// `YYYY-MM-DDTHH:MM` shape produced by datetime-local inputs
/// (interpreted as UTC).
fn parse_due_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Raw login form input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl LoginInput {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut checks = Checks::default();
        checks.require_email("email", &self.email);
        if self.password.is_empty() {
            checks.reject("password", "Password is required");
        }
        checks.finish()
    }
}

/// Raw signup form input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupInput {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub display_name: String,
}

impl SignupInput {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut checks = Checks::default();
        checks.require_email("email", &self.email);
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            checks.reject(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }
        if self.confirm_password != self.password {
            checks.reject("confirm_password", "Passwords do not match");
        }
        if self.display_name.trim().is_empty() {
            checks.reject("display_name", "Name is required");
        }
        checks.finish()
    }
}

/// Raw password-reset form input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResetInput {
    pub email: String,
}

impl ResetInput {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut checks = Checks::default();
        checks.require_email("email", &self.email);
        checks.finish()
    }
}

/// Raw task form input. Everything arrives as strings; empty strings
/// mean "not provided" for the optional fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: String,
    #[serde(default)]
    pub due_date: String,
}

impl Default for TaskInput {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: TaskStatus::Todo.as_str().to_string(),
            due_date: String::new(),
        }
    }
}

/// Task form input after a successful validation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskInput {
    pub fn validate(&self) -> Result<ValidatedTask, ValidationErrors> {
        let mut checks = Checks::default();

        let title = self.title.trim();
        if title.is_empty() {
            checks.reject("title", "Title is required");
        } else if title.chars().count() > MAX_TITLE_LEN {
            checks.reject(
                "title",
                format!("Title must be at most {MAX_TITLE_LEN} characters"),
            );
        }

        let status = match self.status.parse::<TaskStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                checks.reject("status", "Status must be todo, in-progress or done");
                None
            }
        };

        let due_date = match self.due_date.as_str() {
            "" => None,
            raw => match parse_due_date(raw) {
                Some(parsed) => Some(parsed),
                None => {
                    checks.reject("due_date", "Due date is not a valid timestamp");
                    None
                }
            },
        };

        checks.finish()?;
        Ok(ValidatedTask {
            title: title.to_string(),
            description: match self.description.trim() {
                "" => None,
                trimmed => Some(trimmed.to_string()),
            },
            // errors above short-circuit before the unwraps can run
            status: status.unwrap_or(TaskStatus::Todo),
            due_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_login_accepts_reasonable_input() {
        let input = LoginInput {
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_login_rejects_malformed_email() {
        for email in ["", "ada", "ada@", "@example.com", "ada@example", "a b@example.com"] {
            let input = LoginInput {
                email: email.to_string(),
                password: "hunter2".to_string(),
            };
            let errors = input.validate().unwrap_err();
            assert_eq!(errors.field("email"), Some("Invalid email address"), "{email}");
        }
    }

    #[test]
    fn test_signup_rejects_password_mismatch() {
        let input = SignupInput {
            email: "ada@example.com".to_string(),
            password: "hunter22".to_string(),
            confirm_password: "hunter23".to_string(),
            display_name: "Ada".to_string(),
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.field("confirm_password"), Some("Passwords do not match"));
    }

    #[test]
    fn test_signup_rejects_short_password_and_blank_name() {
        let input = SignupInput {
            email: "ada@example.com".to_string(),
            password: "abc".to_string(),
            confirm_password: "abc".to_string(),
            display_name: "   ".to_string(),
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field("password").is_some());
        assert!(errors.field("display_name").is_some());
    }

    #[test]
    fn test_task_requires_title() {
        let input = TaskInput {
            title: "   ".to_string(),
            ..TaskInput::default()
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.field("title"), Some("Title is required"));
    }

    #[test]
    fn test_task_rejects_unknown_status_and_bad_due_date() {
        let input = TaskInput {
            title: "Buy milk".to_string(),
            status: "archived".to_string(),
            due_date: "next tuesday".to_string(),
            ..TaskInput::default()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field("status").is_some());
        assert!(errors.field("due_date").is_some());
    }

    #[test]
    fn test_task_parses_datetime_local_due_date() {
        let input = TaskInput {
            title: "Buy milk".to_string(),
            due_date: "2024-03-01T09:30".to_string(),
            ..TaskInput::default()
        };
        let validated = input.validate().unwrap();
        let due = validated.due_date.unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap());
        assert_eq!(due.minute(), 30);
    }

    #[test]
    fn test_task_normalizes_optional_fields() {
        let input = TaskInput {
            title: "  Buy milk  ".to_string(),
            description: "   ".to_string(),
            ..TaskInput::default()
        };
        let validated = input.validate().unwrap();
        assert_eq!(validated.title, "Buy milk");
        assert!(validated.description.is_none());
        assert!(validated.due_date.is_none());
        assert_eq!(validated.status, TaskStatus::Todo);
    }

    #[test]
    fn test_display_joins_field_messages() {
        let errors = ValidationErrors::new(vec![
            FieldError::new("email", "Invalid email address"),
            FieldError::new("password", "Password is required"),
        ]);
        assert_eq!(
            errors.to_string(),
            "email: Invalid email address; password: Password is required"
        );
    }
}
