//! Error taxonomy and host event payloads for notification operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Lifecycle events a host notification can emit.
pub enum NotificationEventKind {
    /// The user activated the notification.
    Click,
    /// The host failed to display the notification.
    Error,
    /// The notification was closed by the user, the host or a timer.
    Close,
}

impl NotificationEventKind {
    /// Every event kind, in subscription order.
    pub const ALL: [Self; 3] = [Self::Click, Self::Error, Self::Close];

    /// Returns the host event name.
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Error => "error",
            Self::Close => "close",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Event delivered by the host for a live notification.
pub struct NotificationEvent {
    /// Event kind.
    pub kind: NotificationEventKind,
    /// Host-provided detail, when the host attaches one.
    pub message: Option<String>,
    /// Host timestamp in milliseconds, when available.
    pub timestamp_ms: Option<f64>,
}

impl NotificationEvent {
    /// Creates an event with no detail or timestamp.
    pub fn new(kind: NotificationEventKind) -> Self {
        Self {
            kind,
            message: None,
            timestamp_ms: None,
        }
    }

    /// Attaches a host detail message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attaches a host timestamp.
    pub fn with_timestamp_ms(mut self, timestamp_ms: f64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }
}

/// Failures surfaced by notification operations.
///
/// Errors are `Clone` because a memoized permission outcome is replayed to every waiting caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotificationError {
    /// The host has no notification capability.
    #[error("notification capability unavailable: {0}")]
    MissingCapability(String),
    /// Invoking the interactive permission prompt failed.
    #[error("notification permission request failed: {0}")]
    PermissionRequest(String),
    /// The host reported an error event for a live notification.
    #[error("notification failed")]
    NotificationFailed {
        /// Raw event that triggered the failure.
        event: NotificationEvent,
    },
}

impl NotificationError {
    /// Returns the host event attached to a [`Self::NotificationFailed`] error.
    pub fn event(&self) -> Option<&NotificationEvent> {
        match self {
            Self::NotificationFailed { event } => Some(event),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_notification_carries_its_event() {
        let event = NotificationEvent::new(NotificationEventKind::Error).with_message("blocked");
        let err = NotificationError::NotificationFailed {
            event: event.clone(),
        };
        assert_eq!(err.event(), Some(&event));
        assert_eq!(err.to_string(), "notification failed");
        assert_eq!(NotificationError::MissingCapability("x".into()).event(), None);
    }

    #[test]
    fn event_kinds_use_host_event_names() {
        let names: Vec<_> = NotificationEventKind::ALL
            .iter()
            .map(|kind| kind.event_name())
            .collect();
        assert_eq!(names, ["click", "error", "close"]);
    }
}
