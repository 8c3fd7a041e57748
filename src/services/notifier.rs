use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Transient user-facing messages (toasts).
pub trait Notifier {
    fn notify(&self, notification: Notification);

    fn success(&self, message: &str) {
        self.notify(Notification {
            level: NotificationLevel::Success,
            message: message.to_string(),
        });
    }

    fn info(&self, message: &str) {
        self.notify(Notification {
            level: NotificationLevel::Info,
            message: message.to_string(),
        });
    }

    fn error(&self, message: &str) {
        self.notify(Notification {
            level: NotificationLevel::Error,
            message: message.to_string(),
        });
    }
}

/// Prints notifications to stderr for the terminal host.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => {
                info!(message = %notification.message, "notification");
                eprintln!("[ok] {}", notification.message);
            }
            NotificationLevel::Info => {
                info!(message = %notification.message, "notification");
                eprintln!("[..] {}", notification.message);
            }
            NotificationLevel::Error => {
                error!(message = %notification.message, "notification");
                eprintln!("[!!] {}", notification.message);
            }
        }
    }
}
