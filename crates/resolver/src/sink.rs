use async_trait::async_trait;
use log::warn;
use repolink_protocol::{ActionRecord, FollowUp, MessageLevel};
use std::sync::Mutex;

/// User-visible effects of a resolution. Calls are fire-and-forget.
#[async_trait]
pub trait ActionSink: Send + Sync {
    async fn show_info(&self, text: &str);

    async fn show_error(&self, text: &str);

    async fn invoke_follow_up(&self, follow_up: FollowUp);
}

/// Sink that keeps every effect in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<ActionRecord>>,
}

impl RecordingSink {
    #[must_use]
    pub fn records(&self) -> Vec<ActionRecord> {
        match self.records.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => {
                warn!("recording sink lock poisoned");
                Vec::new()
            }
        }
    }

    #[must_use]
    pub fn last(&self) -> Option<ActionRecord> {
        self.records().pop()
    }

    #[must_use]
    pub fn follow_ups(&self) -> Vec<FollowUp> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                ActionRecord::FollowUp { action } => Some(action),
                ActionRecord::Message { .. } => None,
            })
            .collect()
    }

    fn push(&self, record: ActionRecord) {
        if let Ok(mut guard) = self.records.lock() {
            guard.push(record);
        } else {
            warn!("recording sink lock poisoned");
        }
    }
}

#[async_trait]
impl ActionSink for RecordingSink {
    async fn show_info(&self, text: &str) {
        self.push(ActionRecord::Message {
            level: MessageLevel::Info,
            text: text.to_string(),
        });
    }

    async fn show_error(&self, text: &str) {
        self.push(ActionRecord::Message {
            level: MessageLevel::Error,
            text: text.to_string(),
        });
    }

    async fn invoke_follow_up(&self, follow_up: FollowUp) {
        self.push(ActionRecord::FollowUp { action: follow_up });
    }
}
