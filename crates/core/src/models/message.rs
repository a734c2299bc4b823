//! Contact messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ValidationError, is_blank};
use crate::{Email, MessageId};

/// Longest accepted sender name or subject, in characters.
pub const MAX_SHORT_FIELD: usize = 200;

/// Longest accepted message body, in characters.
pub const MAX_BODY: usize = 10_000;

/// A stored contact message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id", alias = "id")]
    pub id: MessageId,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/messages`.
///
/// Every field is optional at the serde level so that a missing field is
/// reported as a validation failure rather than a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A validated contact message, ready to be stored.
///
/// Field values are kept exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactSubmission {
    /// Check the submission and turn it into a storable message.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any of the four fields is missing or
    /// blank, if the email is malformed, or if a field is too long.
    pub fn validate(self) -> Result<NewMessage, ValidationError> {
        if is_blank(self.name.as_deref())
            || is_blank(self.email.as_deref())
            || is_blank(self.subject.as_deref())
            || is_blank(self.message.as_deref())
        {
            return Err(ValidationError::new("All fields are required"));
        }

        let (Some(name), Some(email), Some(subject), Some(message)) =
            (self.name, self.email, self.subject, self.message)
        else {
            return Err(ValidationError::new("All fields are required"));
        };

        if Email::parse(email.trim()).is_err() {
            return Err(ValidationError::new("Please enter a valid email address"));
        }

        if name.chars().count() > MAX_SHORT_FIELD || subject.chars().count() > MAX_SHORT_FIELD {
            return Err(ValidationError::new(format!(
                "Name and subject must be at most {MAX_SHORT_FIELD} characters"
            )));
        }

        if message.chars().count() > MAX_BODY {
            return Err(ValidationError::new(format!(
                "Message must be at most {MAX_BODY} characters"
            )));
        }

        Ok(NewMessage {
            name,
            email,
            subject,
            message,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn submission() -> ContactSubmission {
        ContactSubmission {
            name: Some("A".to_owned()),
            email: Some("a@x.com".to_owned()),
            subject: Some("Hi".to_owned()),
            message: Some("Test".to_owned()),
        }
    }

    #[test]
    fn test_valid_submission_keeps_fields() {
        let msg = submission().validate().unwrap();
        assert_eq!(msg.name, "A");
        assert_eq!(msg.email, "a@x.com");
        assert_eq!(msg.subject, "Hi");
        assert_eq!(msg.message, "Test");
    }

    #[test]
    fn test_each_missing_field_is_rejected() {
        let blanks: [fn(&mut ContactSubmission); 4] = [
            |s| s.name = None,
            |s| s.email = Some(String::new()),
            |s| s.subject = Some("   ".to_owned()),
            |s| s.message = None,
        ];
        for blank in blanks {
            let mut s = submission();
            blank(&mut s);
            assert_eq!(
                s.validate().unwrap_err(),
                ValidationError::new("All fields are required")
            );
        }
    }

    #[test]
    fn test_malformed_email_is_rejected() {
        let mut s = submission();
        s.email = Some("not-an-email".to_owned());
        assert!(s.validate().unwrap_err().0.contains("valid email"));
    }

    #[test]
    fn test_oversized_body_is_rejected() {
        let mut s = submission();
        s.message = Some("x".repeat(MAX_BODY + 1));
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_missing_json_fields_deserialize() {
        let s: ContactSubmission = serde_json::from_str(r#"{"name":"A"}"#).unwrap();
        assert!(s.email.is_none());
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_message_wire_format() {
        let msg = Message {
            id: MessageId::new(uuid::Uuid::nil()),
            name: "A".to_owned(),
            email: "a@x.com".to_owned(),
            subject: "Hi".to_owned(),
            message: "Test".to_owned(),
            read: false,
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["_id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(value["read"], false);
        assert!(value.get("createdAt").is_some());
    }
}
