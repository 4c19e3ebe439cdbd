use tracing::{info, warn};
use uuid::Uuid;

use crate::queue::{DeleteEntry, Message, MessageQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// The batch call went through; the queue reported these per-entry counts.
    Acknowledged { succeeded: usize, failed: usize },
    /// The batch call itself failed. Nothing is known to be deleted.
    CallFailed { attempted: usize },
}

impl AckOutcome {
    /// `(succeeded, failed)`. A failed call counts every entry as failed.
    pub fn counts(&self) -> (usize, usize) {
        match *self {
            AckOutcome::Acknowledged { succeeded, failed } => (succeeded, failed),
            AckOutcome::CallFailed { attempted } => (0, attempted),
        }
    }
}

/// Best-effort batched deletion of persisted messages.
pub struct AckBatcher;

impl AckBatcher {
    /// One delete entry per message, each with a fresh correlation id.
    pub fn entries(messages: &[Message]) -> Vec<DeleteEntry> {
        messages
            .iter()
            .map(|m| DeleteEntry {
                id: Uuid::new_v4().to_string(),
                receipt_handle: m.receipt_handle.clone(),
            })
            .collect()
    }

    /// Delete `messages` with a single batch call.
    ///
    /// Never fails: a failed call or failed entries are logged and reported.
    /// Entries are not retried; the queue redelivers them once their
    /// visibility timeout expires.
    pub async fn acknowledge<Q: MessageQueue>(queue: &Q, messages: &[Message]) -> AckOutcome {
        if messages.is_empty() {
            return AckOutcome::Acknowledged {
                succeeded: 0,
                failed: 0,
            };
        }

        let entries = Self::entries(messages);
        let attempted = entries.len();
        match queue.delete_batch(entries).await {
            Ok(outcome) => {
                for f in &outcome.failed {
                    warn!(
                        entry_id = %f.id,
                        code = %f.code,
                        sender_fault = f.sender_fault,
                        reason = f.message.as_deref().unwrap_or(""),
                        "delete entry failed"
                    );
                }
                let succeeded = outcome.successful.len();
                let failed = outcome.failed.len();
                info!("delete result: deleted {succeeded} messages, {failed} not deleted");
                AckOutcome::Acknowledged { succeeded, failed }
            }
            Err(e) => {
                warn!(error = %e, count = attempted, "delete message batch failed");
                AckOutcome::CallFailed { attempted }
            }
        }
    }
}
