use std::time::Duration;

/// A single delivery received from the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Stable across redeliveries of the same logical message.
    pub id: String,
    pub body: String,
    /// Valid only for this delivery; required to delete it.
    pub receipt_handle: String,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        body: impl Into<String>,
        receipt_handle: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            receipt_handle: receipt_handle.into(),
        }
    }
}

/// What one receive call returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceivedBatch {
    pub messages: Vec<Message>,
    /// Deliveries the queue returned that could not be turned into a [`Message`].
    pub unusable: usize,
}

impl ReceivedBatch {
    /// Nothing came back at all, not even unusable deliveries.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.unusable == 0
    }
}

impl From<Vec<Message>> for ReceivedBatch {
    fn from(messages: Vec<Message>) -> Self {
        Self {
            messages,
            unusable: 0,
        }
    }
}

/// Parameters of one long-poll receive call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveRequest {
    pub max_messages: i32,
    pub wait_time: Duration,
    pub visibility_timeout: Duration,
}

/// One entry of a batched delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteEntry {
    /// Correlates the entry with the batch response. Unrelated to the message id.
    pub id: String,
    pub receipt_handle: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    pub id: String,
    pub code: String,
    pub message: Option<String>,
    pub sender_fault: bool,
}

/// Per-entry result of a batched delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Entry ids the queue reported as deleted.
    pub successful: Vec<String>,
    pub failed: Vec<DeleteFailure>,
}

/// A queue the drain loop can receive from and delete from.
///
/// [`crate::sqs::SqsQueue`] is the AWS implementation.
pub trait MessageQueue {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Receive up to `request.max_messages` messages, waiting at most
    /// `request.wait_time` for the first one. An empty batch means nothing
    /// arrived within the wait.
    fn receive(
        &self,
        request: &ReceiveRequest,
    ) -> impl Future<Output = Result<ReceivedBatch, Self::Error>> + Send;

    /// Delete the given deliveries in a single call.
    ///
    /// `Err` means the call as a whole failed; per-entry failures are reported
    /// in [`DeleteOutcome::failed`].
    fn delete_batch(
        &self,
        entries: Vec<DeleteEntry>,
    ) -> impl Future<Output = Result<DeleteOutcome, Self::Error>> + Send;
}
