//! Wire models for the mail.tm API.
//!
//! The provider speaks JSON-LD: collections are wrapped in a `hydra:member`
//! array and errors carry a `hydra:description`. Only the fields this crate
//! reads are modelled; unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// A domain that accounts can be created under.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    /// Provider identifier.
    pub id: String,
    /// Domain name (e.g. `example.com`).
    pub domain: String,
    /// Whether new accounts may currently be created under it.
    #[serde(default)]
    pub is_active: bool,
    /// Private domains are only usable by their owner.
    #[serde(default)]
    pub is_private: bool,
    /// Creation timestamp (RFC 3339).
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A mailbox account as returned by `POST /accounts`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Provider identifier.
    pub id: String,
    /// Full email address.
    pub address: String,
    /// Storage quota in bytes.
    #[serde(default)]
    pub quota: u64,
    /// Storage used in bytes.
    #[serde(default)]
    pub used: u64,
    /// Disabled accounts cannot log in.
    #[serde(default)]
    pub is_disabled: bool,
    /// Creation timestamp (RFC 3339).
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Bearer token returned by `POST /token`.
#[derive(Clone, Deserialize)]
pub struct Token {
    /// Account identifier the token belongs to.
    pub id: String,
    /// The bearer credential.
    pub token: String,
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("id", &self.id)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Sender or recipient of a message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Participant {
    /// Email address.
    #[serde(default)]
    pub address: String,
    /// Display name, often empty.
    #[serde(default)]
    pub name: String,
}

/// Inbox entry returned by `GET /messages`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message ID.
    pub id: String,
    /// Sender.
    #[serde(default)]
    pub from: Participant,
    /// Subject line.
    #[serde(default)]
    pub subject: String,
    /// Short excerpt of the body.
    #[serde(default)]
    pub intro: String,
    /// Whether the message was already opened.
    #[serde(default)]
    pub seen: bool,
    /// Reception timestamp (RFC 3339).
    #[serde(default)]
    pub created_at: String,
}

/// Full message returned by `GET /messages/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDetails {
    /// Unique message ID.
    pub id: String,
    /// Sender.
    #[serde(default)]
    pub from: Participant,
    /// Subject line.
    #[serde(default)]
    pub subject: String,
    /// Plain-text body.
    #[serde(default)]
    pub text: String,
    /// HTML body, split into parts by the provider.
    #[serde(default)]
    pub html: Vec<String>,
    /// Reception timestamp (RFC 3339).
    #[serde(default)]
    pub created_at: String,
}

impl MessageDetails {
    /// HTML parts joined with a single space.
    pub fn html_joined(&self) -> String {
        self.html.join(" ")
    }
}

/// Credentials body shared by `POST /accounts` and `POST /token`.
#[derive(Serialize)]
pub(crate) struct Credentials<'a> {
    pub address: &'a str,
    pub password: &'a str,
}

/// JSON-LD collection envelope.
#[derive(Deserialize)]
pub(crate) struct Collection<T> {
    #[serde(rename = "hydra:member", default = "Vec::new")]
    pub member: Vec<T>,
}

/// Error body; the provider uses `hydra:description` on validation errors and
/// `detail`/`message` on a few others.
#[derive(Deserialize, Default)]
pub(crate) struct ErrorBody {
    #[serde(rename = "hydra:description")]
    pub description: Option<String>,
    pub detail: Option<String>,
    pub message: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_description(self) -> Option<String> {
        self.description
            .or(self.detail)
            .or(self.message)
            .filter(|d| !d.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_details_tolerate_missing_fields() {
        let details: MessageDetails = serde_json::from_value(json!({
            "id": "m1",
            "html": ["<p>a</p>", "<p>b</p>"]
        }))
        .unwrap();
        assert_eq!(details.text, "");
        assert_eq!(details.from.address, "");
        assert_eq!(details.html_joined(), "<p>a</p> <p>b</p>");
    }

    #[test]
    fn error_body_prefers_hydra_description() {
        let body: ErrorBody = serde_json::from_value(json!({
            "hydra:description": "address: This value is already used.",
            "detail": "other"
        }))
        .unwrap();
        assert_eq!(
            body.into_description().as_deref(),
            Some("address: This value is already used.")
        );

        let empty: ErrorBody = serde_json::from_value(json!({ "hydra:description": "" })).unwrap();
        assert!(empty.into_description().is_none());
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = Token {
            id: "acc".into(),
            token: "secret-jwt".into(),
        };
        assert!(!format!("{token:?}").contains("secret-jwt"));
    }
}
