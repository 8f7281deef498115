//! Mailbox check: log in, list the inbox and tag each message with its code.

use crate::code::{extract_code, NO_CODE};
use crate::{Client, Error, Message, Notification, Result, Token};
use futures::future::join_all;
use tracing::{debug, info};

/// Inbox entry enriched with its body and extracted code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedMessage {
    /// Message ID.
    pub id: String,
    /// Subject line.
    pub subject: String,
    /// Sender address.
    pub from: String,
    /// Reception timestamp (RFC 3339).
    pub created_at: String,
    /// Short excerpt.
    pub intro: String,
    /// HTML parts joined by a space; empty when details could not be loaded.
    pub html: String,
    /// Plain-text body; empty when details could not be loaded.
    pub text: String,
    /// First 4-6 digit code, or `"N/A"`.
    pub code: String,
}

impl CheckedMessage {
    /// Whether a code was found.
    pub fn has_code(&self) -> bool {
        self.code != NO_CODE
    }

    /// Body to display: HTML when present, else text.
    pub fn body(&self) -> &str {
        if self.html.is_empty() {
            &self.text
        } else {
            &self.html
        }
    }
}

/// Result of [`check_mailbox`].
#[derive(Debug, Clone)]
pub struct InboxReport {
    /// Address that was checked.
    pub address: String,
    /// Messages in provider order (newest first).
    pub messages: Vec<CheckedMessage>,
}

impl InboxReport {
    /// Look a message up by id.
    pub fn find(&self, id: &str) -> Option<&CheckedMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Code of the newest message, if it has one.
    pub fn latest_code(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|m| m.has_code())
            .map(|m| m.code.as_str())
    }

    /// Notification summarizing the check.
    ///
    /// A mailbox without any code is still reported as loaded successfully.
    pub fn notification(&self) -> Notification {
        match self.latest_code() {
            Some(code) => Notification::success(format!("Latest code: {code}")),
            None => Notification::success("Inbox loaded"),
        }
    }
}

/// Notification for a failed [`check_mailbox`] call.
pub fn failure_notification(err: &Error) -> Notification {
    match err {
        Error::Validation(_) => Notification::error("Enter both email and password"),
        Error::Api { description, .. } => Notification::error(format!("Login failed: {description}")),
        _ => Notification::error("Could not connect to the mail API"),
    }
}

/// Log in as `address` and return every inbox message with its extracted code.
///
/// Message details are fetched concurrently. A message whose details cannot be
/// fetched is kept with code `"N/A"` instead of failing the whole check.
///
/// # Errors
/// - [`Error::Validation`] when `address` or `password` is empty (no request is sent),
/// - login or inbox listing failures.
pub async fn check_mailbox(client: &Client, address: &str, password: &str) -> Result<InboxReport> {
    let address = address.trim();
    if address.is_empty() || password.is_empty() {
        return Err(Error::Validation("address and password are required".to_string()));
    }

    let token = client.token(address, password).await?;
    let summaries = client.get_messages(&token).await?;
    debug!(address, count = summaries.len(), "inbox listed");

    let messages = join_all(
        summaries
            .into_iter()
            .map(|summary| load_message(client, &token, summary)),
    )
    .await;

    info!(
        address,
        messages = messages.len(),
        with_code = messages.iter().filter(|m| m.has_code()).count(),
        "mailbox checked"
    );

    Ok(InboxReport {
        address: address.to_string(),
        messages,
    })
}

async fn load_message(client: &Client, token: &Token, summary: Message) -> CheckedMessage {
    match client.get_message(token, &summary.id).await {
        Ok(details) => {
            let html = details.html_joined();
            let code = extract_code(&summary.subject, &html, &details.text);
            CheckedMessage {
                id: summary.id,
                subject: summary.subject,
                from: details.from.address,
                created_at: summary.created_at,
                intro: summary.intro,
                html,
                text: details.text,
                code,
            }
        }
        Err(err) => {
            debug!(id = %summary.id, error = %err, "message details unavailable");
            CheckedMessage {
                id: summary.id,
                subject: summary.subject,
                from: summary.from.address,
                created_at: summary.created_at,
                intro: summary.intro,
                html: String::new(),
                text: String::new(),
                code: NO_CODE.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use serde_json::json;

    fn client_for(server: &MockServer) -> Client {
        Client::builder()
            .base_url(server.base_url())
            .build()
            .unwrap()
    }

    fn mock_login(server: &MockServer) {
        server.mock(|when, then| {
            when.method(POST).path("/token");
            then.status(200)
                .json_body(json!({ "id": "acc-1", "token": "jwt-abc" }));
        });
    }

    fn summary(id: &str, subject: &str) -> serde_json::Value {
        json!({
            "id": id,
            "from": { "address": "noreply@service.test", "name": "Service" },
            "subject": subject,
            "intro": "",
            "seen": false,
            "createdAt": "2024-01-01T00:00:00+00:00"
        })
    }

    #[tokio::test]
    async fn annotates_messages_with_codes_in_order() {
        let server = MockServer::start();
        mock_login(&server);
        server.mock(|when, then| {
            when.method(GET)
                .path("/messages")
                .header("Authorization", "Bearer jwt-abc");
            then.status(200).json_body(json!({
                "hydra:member": [summary("m1", "Your code is 938201"), summary("m2", "order #12")]
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/messages/m1");
            then.status(200).json_body(json!({
                "id": "m1",
                "from": { "address": "codes@service.test" },
                "subject": "Your code is 938201",
                "text": "",
                "html": []
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/messages/m2");
            then.status(200).json_body(json!({
                "id": "m2",
                "from": { "address": "shop@service.test" },
                "subject": "order #12",
                "text": "",
                "html": ["<p>pin 4821</p>"]
            }));
        });

        let report = check_mailbox(&client_for(&server), " alice@example.com ", "secret")
            .await
            .unwrap();

        assert_eq!(report.address, "alice@example.com");
        let codes: Vec<&str> = report.messages.iter().map(|m| m.code.as_str()).collect();
        assert_eq!(codes, ["938201", "4821"]);
        assert_eq!(report.messages[0].from, "codes@service.test");
        assert_eq!(report.find("m2").map(CheckedMessage::body), Some("<p>pin 4821</p>"));
        assert_eq!(
            report.notification(),
            Notification::success("Latest code: 938201")
        );
    }

    #[tokio::test]
    async fn failed_detail_degrades_to_no_code() {
        let server = MockServer::start();
        mock_login(&server);
        server.mock(|when, then| {
            when.method(GET).path("/messages");
            then.status(200).json_body(json!({
                "hydra:member": [summary("m1", "Your code is 938201")]
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/messages/m1");
            then.status(404)
                .json_body(json!({ "hydra:description": "Not Found" }));
        });

        let report = check_mailbox(&client_for(&server), "alice@example.com", "secret")
            .await
            .unwrap();

        assert_eq!(report.messages.len(), 1);
        assert_eq!(report.messages[0].code, "N/A");
        assert_eq!(report.messages[0].from, "noreply@service.test");
        assert_eq!(report.latest_code(), None);
        assert_eq!(report.notification(), Notification::success("Inbox loaded"));
    }

    #[tokio::test]
    async fn empty_inbox_is_reported_as_loaded() {
        let server = MockServer::start();
        mock_login(&server);
        server.mock(|when, then| {
            when.method(GET).path("/messages");
            then.status(200).json_body(json!({ "hydra:member": [] }));
        });

        let report = check_mailbox(&client_for(&server), "alice@example.com", "secret")
            .await
            .unwrap();

        assert!(report.messages.is_empty());
        assert!(!report.notification().is_error());
    }

    #[tokio::test]
    async fn login_failure_becomes_error_notification() {
        let server = MockServer::start();
        let messages = server.mock(|when, then| {
            when.method(GET).path("/messages");
            then.status(200).json_body(json!({ "hydra:member": [] }));
        });
        server.mock(|when, then| {
            when.method(POST).path("/token");
            then.status(401)
                .json_body(json!({ "code": 401, "message": "Invalid credentials." }));
        });

        let err = check_mailbox(&client_for(&server), "alice@example.com", "wrong")
            .await
            .unwrap_err();

        assert_eq!(
            failure_notification(&err),
            Notification::error("Login failed: Invalid credentials.")
        );
        messages.assert_hits(0);
    }

    #[tokio::test]
    async fn missing_credentials_fail_without_requests() {
        let server = MockServer::start();
        let any = server.mock(|when, then| {
            when.any_request();
            then.status(200);
        });

        let err = check_mailbox(&client_for(&server), "  ", "secret")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(failure_notification(&err).is_error());
        any.assert_hits(0);
    }
}
