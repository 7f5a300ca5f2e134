//! Outgoing mail and mailing-list management.
//!
//! The server talks to its email provider only through [`EmailProvider`].
//! [`MailjetProvider`] is the production implementation.

use async_trait::async_trait;

use crate::validation::ContactForm;

mod errors;
mod mailjet;

pub use errors::ProviderError;
pub use mailjet::{MAILJET_API_URL, MailjetProvider};

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
}

impl EmailMessage {
    /// The notification sent to the team for a contact form submission.
    ///
    /// `form` should already be sanitized.
    pub fn contact(form: &ContactForm, from: &str, to: &str) -> Self {
        let subject = format!(
            "Eco Fusion contact: {} {} ({})",
            form.first_name, form.last_name, form.project_type
        );
        let text = format!(
            "Name: {} {}\nEmail: {}\nCompany: {}\nProject: {}\n\nMessage:\n{}",
            form.first_name,
            form.last_name,
            form.email,
            form.company.as_deref().unwrap_or("-"),
            form.project_type,
            form.message
        );

        Self {
            from: from.to_string(),
            to: vec![to.to_string()],
            subject,
            text,
        }
    }
}

/// Operations the backend needs from a transactional email service.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Whether credentials are present. Calls on an unconfigured provider fail with
    /// [`ProviderError::NotConfigured`].
    fn is_configured(&self) -> bool;

    /// Create the contact. Fails with a conflict if it already exists.
    async fn upsert_contact(&self, email: &str) -> Result<(), ProviderError>;

    /// Subscribe `email` to `list_id`, re-subscribing if it had unsubscribed.
    async fn add_to_list(&self, email: &str, list_id: u64) -> Result<(), ProviderError>;

    async fn send(&self, message: &EmailMessage) -> Result<(), ProviderError>;
}
