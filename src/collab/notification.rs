use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    common::{Queue, Vars},
    utils::time::time_millis,
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    TaskAssigned,
    FileRedListed,
    ExtensionRequested,
    ExtensionDecided,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Notification {
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub file_id: Option<String>,
    pub metadata: Vars,
    pub create_time: i64,
}

impl Notification {
    pub fn new(
        user_id: &str,
        kind: NotificationKind,
        title: &str,
        message: String,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            kind,
            title: title.to_string(),
            message,
            file_id: None,
            metadata: Vars::new(),
            create_time: time_millis(),
        }
    }

    pub fn with_file(
        mut self,
        file_id: &str,
    ) -> Self {
        self.file_id = Some(file_id.to_string());
        self
    }

    pub fn with_metadata(
        mut self,
        metadata: Vars,
    ) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Fire-and-forget delivery; the engine never waits for confirmation.
pub trait NotificationDispatcher: Send + Sync {
    fn dispatch(
        &self,
        notification: Notification,
    ) -> Result<()>;
}

/// Default dispatcher: an outbox queue the host drains.
pub struct QueueDispatcher {
    outbox: Arc<Queue<Notification>>,
}

impl QueueDispatcher {
    pub fn new(capacity: usize) -> Self {
        Self {
            outbox: Queue::new(capacity),
        }
    }

    pub fn outbox(&self) -> Arc<Queue<Notification>> {
        self.outbox.clone()
    }

    /// Takes every notification currently queued.
    pub fn drain(&self) -> Vec<Notification> {
        let mut items = Vec::new();
        while let Some(n) = self.outbox.try_next() {
            items.push(n);
        }
        items
    }
}

impl NotificationDispatcher for QueueDispatcher {
    fn dispatch(
        &self,
        notification: Notification,
    ) -> Result<()> {
        self.outbox.send(notification)
    }
}
