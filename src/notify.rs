//! One-shot user notifications.

use std::fmt;

/// Severity of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Neutral status.
    Info,
    /// The operation succeeded.
    Success,
    /// The operation failed.
    Error,
}

/// Short message meant to be shown once to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub kind: NotificationKind,
    /// Text to display.
    pub text: String,
}

impl Notification {
    /// Info notification.
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            text: text.into(),
        }
    }

    /// Success notification.
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            text: text.into(),
        }
    }

    /// Error notification.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            text: text.into(),
        }
    }

    /// Whether this reports a failure.
    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_kind() {
        assert_eq!(Notification::info("x").kind, NotificationKind::Info);
        assert_eq!(Notification::success("x").kind, NotificationKind::Success);
        assert!(Notification::error("x").is_error());
        assert_eq!(Notification::success("Inbox loaded").to_string(), "Inbox loaded");
    }
}
