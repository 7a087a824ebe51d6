//! Inquiry records and session identity.
//!
//! An [`InquiryInput`] is created once per form submission from the raw
//! [`InquiryForm`] the presentation layer collected. Construction trims every
//! string field, so validation and storage only ever see normalized values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw field values as posted by the inquiry form.
///
/// All fields default to empty so a partially filled form still deserializes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InquiryForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub goals: String,
    pub notes: String,
    /// Hidden anti-spam field. Real visitors never see it.
    #[serde(alias = "hp")]
    pub honeypot: String,
    pub user_agent: String,
}

/// A single submitted inquiry with normalized fields.
///
/// Fields are private so the trimming invariant cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InquiryInput {
    name: String,
    email: String,
    phone: String,
    goals: String,
    notes: String,
    honeypot: String,
    user_agent: String,
    submitted_at: DateTime<Utc>,
}

impl InquiryInput {
    /// Normalize a form submission received at `submitted_at`.
    pub fn at(form: InquiryForm, submitted_at: DateTime<Utc>) -> Self {
        Self {
            name: trimmed(form.name),
            email: trimmed(form.email),
            phone: trimmed(form.phone),
            goals: trimmed(form.goals),
            notes: trimmed(form.notes),
            honeypot: trimmed(form.honeypot),
            user_agent: trimmed(form.user_agent),
            submitted_at,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn goals(&self) -> &str {
        &self.goals
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn honeypot(&self) -> &str {
        &self.honeypot
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

impl From<InquiryForm> for InquiryInput {
    /// Stamp the submission with the current UTC time.
    fn from(form: InquiryForm) -> Self {
        Self::at(form, Utc::now())
    }
}

fn trimmed(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

/// Identity of a visitor session, used to key throttling state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
