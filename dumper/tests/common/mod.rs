use std::collections::VecDeque;
use std::sync::Mutex;

use sqs_dumper::queue::{
    DeleteEntry, DeleteFailure, DeleteOutcome, Message, MessageQueue, ReceiveRequest,
    ReceivedBatch,
};

#[derive(Debug, thiserror::Error)]
#[error("fake queue: {0}")]
pub struct FakeError(pub String);

/// What the fake answers to the next receive.
pub enum Step {
    Batch(Vec<Message>),
    /// Deliveries the adapter could not turn into messages.
    Unusable(usize),
    Fail(&'static str),
}

/// Scripted in-memory queue. Once the script runs out, receives return
/// empty batches.
#[derive(Default)]
pub struct FakeQueue {
    script: Mutex<VecDeque<Step>>,
    /// Number of entries to report as deleted per delete call; the rest fail.
    delete_ok: Option<usize>,
    fail_deletes: bool,
    pub receives: Mutex<Vec<ReceiveRequest>>,
    pub deletes: Mutex<Vec<Vec<DeleteEntry>>>,
}

impl FakeQueue {
    pub fn scripted(steps: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            ..Default::default()
        }
    }

    pub fn deleting_only(self, ok: usize) -> Self {
        Self {
            delete_ok: Some(ok),
            ..self
        }
    }

    pub fn failing_deletes(self) -> Self {
        Self {
            fail_deletes: true,
            ..self
        }
    }

    pub fn receive_count(&self) -> usize {
        self.receives.lock().unwrap().len()
    }

    pub fn delete_calls(&self) -> Vec<Vec<DeleteEntry>> {
        self.deletes.lock().unwrap().clone()
    }
}

impl MessageQueue for FakeQueue {
    type Error = FakeError;

    async fn receive(&self, request: &ReceiveRequest) -> Result<ReceivedBatch, FakeError> {
        self.receives.lock().unwrap().push(*request);
        match self.script.lock().unwrap().pop_front() {
            Some(Step::Batch(batch)) => Ok(batch.into()),
            Some(Step::Unusable(unusable)) => Ok(ReceivedBatch {
                messages: Vec::new(),
                unusable,
            }),
            Some(Step::Fail(reason)) => Err(FakeError(reason.to_string())),
            None => Ok(ReceivedBatch::default()),
        }
    }

    async fn delete_batch(&self, entries: Vec<DeleteEntry>) -> Result<DeleteOutcome, FakeError> {
        self.deletes.lock().unwrap().push(entries.clone());
        if self.fail_deletes {
            return Err(FakeError("delete unavailable".into()));
        }
        let ok = self.delete_ok.unwrap_or(entries.len());
        let (done, failed) = entries.split_at(ok.min(entries.len()));
        Ok(DeleteOutcome {
            successful: done.iter().map(|e| e.id.clone()).collect(),
            failed: failed
                .iter()
                .map(|e| DeleteFailure {
                    id: e.id.clone(),
                    code: "InternalError".into(),
                    message: Some("try again".into()),
                    sender_fault: false,
                })
                .collect(),
        })
    }
}

pub fn message(id: &str, body: &str) -> Message {
    Message::new(id, body, format!("receipt-{id}"))
}
