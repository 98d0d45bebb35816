use std::fmt;

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub source: &'static str,
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn new(source: &'static str, kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            source,
            kind,
            message: message.into(),
        }
    }

    pub fn info(source: &'static str, message: impl Into<String>) -> Self {
        Self::new(source, NotificationKind::Info, message)
    }

    pub fn success(source: &'static str, message: impl Into<String>) -> Self {
        Self::new(source, NotificationKind::Success, message)
    }

    pub fn warning(source: &'static str, message: impl Into<String>) -> Self {
        Self::new(source, NotificationKind::Warning, message)
    }

    pub fn error(source: &'static str, message: impl Into<String>) -> Self {
        Self::new(source, NotificationKind::Error, message)
    }
}

/// Sending half of the transient notification stream. Clone one per panel.
#[derive(Debug, Clone)]
pub struct NotificationSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl NotificationSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// A closed receiver only means nobody is listening any more.
    pub fn send(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            log::debug!("notification_dropped reason=receiver_closed");
        }
    }
}
