use std::collections::VecDeque;
use std::sync::Mutex;

use super::domain::Application;
use crate::workflows::recruitment::domain::RecruitmentId;

/// The pending fan-out staged by a successful announcement: the recruitment
/// and the full set of its applications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationBatch {
    pub recruitment_id: RecruitmentId,
    pub recruitment_title: String,
    pub applications: Vec<Application>,
}

/// Staging area between the announcing transaction and the dispatcher.
/// Batches are staged only once the store write has committed, so a reader
/// never sees a notification for a rolled-back transition. The staging is
/// not durable: a crash before the dispatcher drains loses the batch.
pub trait NotificationOutbox: Send + Sync {
    fn stage(&self, batch: NotificationBatch) -> Result<(), OutboxError>;
    /// Removes and returns every staged batch, oldest first.
    fn drain(&self) -> Vec<NotificationBatch>;
}

#[derive(Debug, thiserror::Error)]
pub enum OutboxError {
    #[error("notification outbox unavailable: {0}")]
    Unavailable(String),
}

#[derive(Default)]
pub struct InMemoryOutbox {
    batches: Mutex<VecDeque<NotificationBatch>>,
}

impl InMemoryOutbox {
    pub fn staged(&self) -> usize {
        self.batches.lock().map(|batches| batches.len()).unwrap_or(0)
    }
}

impl NotificationOutbox for InMemoryOutbox {
    fn stage(&self, batch: NotificationBatch) -> Result<(), OutboxError> {
        let mut batches = self
            .batches
            .lock()
            .map_err(|_| OutboxError::Unavailable("outbox lock poisoned".to_string()))?;
        batches.push_back(batch);
        Ok(())
    }

    fn drain(&self) -> Vec<NotificationBatch> {
        match self.batches.lock() {
            Ok(mut batches) => batches.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }
}
