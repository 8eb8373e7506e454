use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// One user-visible message. The presentation layer drains these; nothing in
/// the core blocks on them.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct NoticeSender {
    tx: UnboundedSender<Notice>,
}

impl NoticeSender {
    pub fn channel() -> (NoticeSender, UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (NoticeSender { tx }, rx)
    }

    fn push(&self, level: NoticeLevel, message: String) {
        // a dropped receiver means the session is gone; nobody left to tell
        let _ = self.tx.send(Notice {
            level,
            message,
            at: Utc::now(),
        });
    }

    pub fn info(&self, message: String) {
        self.push(NoticeLevel::Info, message);
    }

    pub fn success(&self, message: String) {
        self.push(NoticeLevel::Success, message);
    }

    pub fn error(&self, message: String) {
        self.push(NoticeLevel::Error, message);
    }
}
