use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Error,
}

/// A transient, non-blocking user notification (a toast, on most surfaces)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Sends notices to whatever surface the presentation layer wires up.
///
/// Cloneable; emission never blocks and never fails — a dropped receiver
/// just means nobody is listening anymore.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl Notifier {
    /// Create a notifier and the receiving end for the presentation layer.
    pub fn channel() -> (Notifier, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Notifier { tx }, rx)
    }

    pub fn notify(&self, kind: NoticeKind, message: impl Into<String>) {
        let _ = self.tx.send(Notice {
            kind,
            message: message.into(),
        });
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(NoticeKind::Error, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(NoticeKind::Info, message);
    }
}
