use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use aws_sdk_sqs::Client;
use aws_sdk_sqs::types::{DeleteMessageBatchRequestEntry, MessageSystemAttributeName};
use thiserror::Error;
use tracing::warn;

use crate::queue::{
    DeleteEntry, DeleteFailure, DeleteOutcome, Message, MessageQueue, ReceiveRequest,
    ReceivedBatch,
};

pub async fn get_queue_url(client: &Client, queue_name: &str) -> Result<String> {
    let out = client
        .get_queue_url()
        .queue_name(queue_name)
        .send()
        .await
        .with_context(|| format!("getting queue url for {queue_name}"))?;

    out.queue_url()
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow!("queue url missing in response"))
}

#[derive(Error, Debug)]
pub enum SqsError {
    #[error(transparent)]
    Service(#[from] aws_sdk_sqs::Error),

    #[error("building delete entry: {0}")]
    Build(String),
}

/// [`MessageQueue`] backed by an AWS SQS queue.
#[derive(Clone, Debug)]
pub struct SqsQueue {
    client: Client,
    queue_url: String,
}

impl SqsQueue {
    pub fn new(client: Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }
}

/// Deliveries without an id or receipt handle can be neither persisted nor
/// deleted; they are counted as unusable instead.
fn to_batch(received: Vec<aws_sdk_sqs::types::Message>) -> ReceivedBatch {
    let mut batch = ReceivedBatch::default();
    for m in received {
        let (Some(id), Some(receipt_handle)) = (m.message_id, m.receipt_handle) else {
            warn!("message without id or receipt handle, skipping");
            batch.unusable += 1;
            continue;
        };
        batch.messages.push(Message {
            id,
            body: m.body.unwrap_or_default(),
            receipt_handle,
        });
    }
    batch
}

fn secs(d: Duration) -> i32 {
    i32::try_from(d.as_secs()).unwrap_or(i32::MAX)
}

impl MessageQueue for SqsQueue {
    type Error = SqsError;

    async fn receive(&self, request: &ReceiveRequest) -> Result<ReceivedBatch, SqsError> {
        let out = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(request.max_messages)
            .wait_time_seconds(secs(request.wait_time))
            .visibility_timeout(secs(request.visibility_timeout))
            .message_attribute_names("All")
            .message_system_attribute_names(MessageSystemAttributeName::All)
            .send()
            .await
            .map_err(aws_sdk_sqs::Error::from)?;

        Ok(to_batch(out.messages.unwrap_or_default()))
    }

    async fn delete_batch(&self, entries: Vec<DeleteEntry>) -> Result<DeleteOutcome, SqsError> {
        let entries = entries
            .into_iter()
            .map(|e| {
                DeleteMessageBatchRequestEntry::builder()
                    .id(e.id)
                    .receipt_handle(e.receipt_handle)
                    .build()
                    .map_err(|e| SqsError::Build(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let out = self
            .client
            .delete_message_batch()
            .queue_url(&self.queue_url)
            .set_entries(Some(entries))
            .send()
            .await
            .map_err(aws_sdk_sqs::Error::from)?;

        Ok(DeleteOutcome {
            successful: out.successful().iter().map(|s| s.id().to_string()).collect(),
            failed: out
                .failed()
                .iter()
                .map(|f| DeleteFailure {
                    id: f.id().to_string(),
                    code: f.code().to_string(),
                    message: f.message().map(str::to_string),
                    sender_fault: f.sender_fault(),
                })
                .collect(),
        })
    }
}
