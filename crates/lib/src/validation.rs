//! Form validation for the contact and newsletter endpoints.
//!
//! Validators take the untyped JSON body exactly as received and report every violation
//! they find, in field-check order. The `decode` constructors on [`ContactForm`] and
//! [`NewsletterForm`] wrap them into a single step that yields either a typed form or
//! the error list, so handlers never read fields out of an unchecked body.

use serde::Serialize;
use serde_json::Value;

use crate::sanitize::sanitize_field;

pub const ERR_FIRST_NAME: &str = "First name is required and must be at least 2 characters";
pub const ERR_LAST_NAME: &str = "Last name is required and must be at least 2 characters";
pub const ERR_EMAIL: &str = "Valid email address is required";
pub const ERR_PROJECT_TYPE: &str = "Project type is required and must be at least 3 characters";
pub const ERR_MESSAGE: &str = "Message is required and must be at least 10 characters";
pub const ERR_COMPANY: &str = "Company must be a valid string";

/// Outcome of validating one submitted field set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Heuristic email check: a non-whitespace local part, one `@`, and a domain with an
/// interior `.`. Deliberately permissive; not RFC 5322.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // A dot with at least one character on each side.
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// String field whose trimmed length is at least `min` characters.
fn text_field<'a>(data: &'a Value, key: &str, min: usize) -> Option<&'a str> {
    data.get(key)
        .and_then(Value::as_str)
        .filter(|s| s.trim().chars().count() >= min)
}

fn email_field<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key)
        .and_then(Value::as_str)
        .filter(|s| is_valid_email(s))
}

/// Company is optional; when present and non-null it must be a string.
fn company_field(data: &Value) -> Result<Option<&str>, ()> {
    match data.get("company") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(()),
    }
}

/// Validate a contact form body. Reports every violation, not just the first.
pub fn validate_contact_form(data: &Value) -> ValidationResult {
    let mut errors = Vec::new();

    if text_field(data, "firstName", 2).is_none() {
        errors.push(ERR_FIRST_NAME.to_string());
    }
    if text_field(data, "lastName", 2).is_none() {
        errors.push(ERR_LAST_NAME.to_string());
    }
    if email_field(data, "email").is_none() {
        errors.push(ERR_EMAIL.to_string());
    }
    if text_field(data, "projectType", 3).is_none() {
        errors.push(ERR_PROJECT_TYPE.to_string());
    }
    if text_field(data, "message", 10).is_none() {
        errors.push(ERR_MESSAGE.to_string());
    }
    if company_field(data).is_err() {
        errors.push(ERR_COMPANY.to_string());
    }

    ValidationResult::from_errors(errors)
}

/// Validate a newsletter signup body: only a valid email is required.
pub fn validate_newsletter_form(data: &Value) -> ValidationResult {
    let mut errors = Vec::new();
    if email_field(data, "email").is_none() {
        errors.push(ERR_EMAIL.to_string());
    }
    ValidationResult::from_errors(errors)
}

/// A contact form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: Option<String>,
    pub project_type: String,
    pub message: String,
}

impl ContactForm {
    /// Decode an untyped body into a contact form, or return the violations.
    pub fn decode(data: &Value) -> Result<Self, ValidationResult> {
        let result = validate_contact_form(data);
        if !result.is_valid {
            return Err(result);
        }

        let field = |key: &str| {
            data.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Ok(Self {
            first_name: field("firstName"),
            last_name: field("lastName"),
            email: field("email"),
            company: company_field(data).ok().flatten().map(str::to_string),
            project_type: field("projectType"),
            message: field("message"),
        })
    }

    /// Copy with every field passed through the plain-text field sanitizer.
    pub fn sanitized(&self) -> Self {
        Self {
            first_name: sanitize_field(&self.first_name),
            last_name: sanitize_field(&self.last_name),
            email: sanitize_field(&self.email),
            company: self
                .company
                .as_deref()
                .map(sanitize_field)
                .filter(|c| !c.is_empty()),
            project_type: sanitize_field(&self.project_type),
            message: sanitize_field(&self.message),
        }
    }
}

/// A newsletter signup that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsletterForm {
    pub email: String,
}

impl NewsletterForm {
    pub fn decode(data: &Value) -> Result<Self, ValidationResult> {
        let result = validate_newsletter_form(data);
        if !result.is_valid {
            return Err(result);
        }
        Ok(Self {
            email: email_field(data, "email").unwrap_or_default().to_string(),
        })
    }
}
