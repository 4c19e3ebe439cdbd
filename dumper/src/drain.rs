use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use crate::ack::AckBatcher;
use crate::errors::DumpError;
use crate::persist::{MessagePersister, PersistOutcome, ensure_output_root};
use crate::queue::{MessageQueue, ReceiveRequest};

/// Upper bound the queue accepts for one receive.
pub const RECEIVE_BATCH_SIZE: i32 = 10;
/// Long-poll wait of each receive.
pub const RECEIVE_WAIT: Duration = Duration::from_secs(10);

/// Immutable settings of one drain run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainSession {
    pub max_iterations: u32,
    pub visibility_timeout: Duration,
    /// Delete messages after persisting them.
    pub acknowledge: bool,
    pub output: PathBuf,
}

impl DrainSession {
    pub fn receive_request(&self) -> ReceiveRequest {
        ReceiveRequest {
            max_messages: RECEIVE_BATCH_SIZE,
            wait_time: RECEIVE_WAIT,
            visibility_timeout: self.visibility_timeout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    IterationLimit,
    QueueDrained,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainSummary {
    pub iterations: u32,
    pub received: usize,
    pub written: usize,
    /// Messages whose file already existed.
    pub skipped: usize,
    pub acknowledged: usize,
    pub ack_failed: usize,
    /// Deliveries without an id or receipt handle.
    pub unusable: usize,
    pub stop: StopReason,
}

impl DrainSummary {
    fn new() -> Self {
        Self {
            iterations: 0,
            received: 0,
            written: 0,
            skipped: 0,
            acknowledged: 0,
            ack_failed: 0,
            unusable: 0,
            stop: StopReason::IterationLimit,
        }
    }
}

/// Receive, persist every message, then (optionally) delete the batch, one
/// iteration at a time.
///
/// Stops after `max_iterations` receives, or as soon as a receive comes back
/// empty when deletion is enabled. Without deletion an empty receive does not
/// stop the loop, so a queue can be sampled without being drained. Receive
/// and persistence failures are returned as `Err`.
pub async fn drain<Q: MessageQueue>(
    queue: &Q,
    session: &DrainSession,
) -> Result<DrainSummary, DumpError> {
    ensure_output_root(&session.output).await?;

    let mut persister = MessagePersister::new(&session.output);
    let request = session.receive_request();
    let mut summary = DrainSummary::new();

    for iteration in 1..=session.max_iterations {
        summary.iterations = iteration;

        let batch = queue
            .receive(&request)
            .await
            .map_err(|e| DumpError::Receive {
                iteration,
                source: Box::new(e),
            })?;

        if batch.is_empty() {
            if session.acknowledge {
                info!("all messages consumed, stopping");
                summary.stop = StopReason::QueueDrained;
                break;
            }
            debug!(iteration, "empty receive");
            continue;
        }

        summary.unusable += batch.unusable;
        let batch = batch.messages;
        if batch.is_empty() {
            debug!(iteration, "only unusable deliveries");
            continue;
        }

        summary.received += batch.len();
        for message in &batch {
            match persister.persist(message).await? {
                PersistOutcome::Written(_) => summary.written += 1,
                PersistOutcome::Skipped(_) => summary.skipped += 1,
            }
        }

        if session.acknowledge {
            let (succeeded, failed) = AckBatcher::acknowledge(queue, &batch).await.counts();
            summary.acknowledged += succeeded;
            summary.ack_failed += failed;
        }

        debug!(
            iteration,
            received = batch.len(),
            written = summary.written,
            skipped = summary.skipped,
            "iteration done"
        );
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receive_request_uses_fixed_batch_and_wait() {
        let session = DrainSession {
            max_iterations: 3,
            visibility_timeout: Duration::from_secs(45),
            acknowledge: false,
            output: PathBuf::from("out"),
        };

        let req = session.receive_request();
        assert_eq!(req.max_messages, 10);
        assert_eq!(req.wait_time, Duration::from_secs(10));
        assert_eq!(req.visibility_timeout, Duration::from_secs(45));
    }
}
