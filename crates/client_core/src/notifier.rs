use std::fmt;

use tracing::{info, warn};

pub const SUCCESS_MESSAGE: &str = "Product status updated successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success() -> Self {
        Self {
            kind: NotificationKind::Success,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn rejected(messages: &[String]) -> Self {
        Self {
            kind: NotificationKind::Failure,
            message: format!("Error: {}", messages.join(", ")),
        }
    }

    pub fn transport_failed(reason: &str) -> Self {
        Self {
            kind: NotificationKind::Failure,
            message: format!("Mutation failed: {reason}"),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NotificationKind::Success
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// User-facing toast surface.
pub trait Notifier: Send + Sync {
    fn show(&self, notification: &Notification);
}

/// Routes notifications into the log when no UI is attached.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn show(&self, notification: &Notification) {
        match notification.kind {
            NotificationKind::Success => info!(message = %notification.message, "notification"),
            NotificationKind::Failure => warn!(message = %notification.message, "notification"),
        }
    }
}
