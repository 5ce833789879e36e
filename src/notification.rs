use ratatui::style::Color;
use std::time::{Duration, Instant};

/// How long a notification stays on screen before the tick loop prunes it.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Success => "✔",
            Severity::Error => "✖",
            Severity::Warning => "⚠",
            Severity::Info => "ℹ",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Severity::Success => Color::Green,
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
            Severity::Info => Color::Blue,
        }
    }
}

/// A transient corner message. Expiry is owned by the notification itself:
/// dropping it cancels the scheduled removal, and concurrent notifications
/// simply stack.
#[derive(Clone, Debug)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    created: Instant,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            created: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    fn is_expired_at(&self, now: Instant) -> bool {
        now.duration_since(self.created) >= NOTIFICATION_TTL
    }
}
