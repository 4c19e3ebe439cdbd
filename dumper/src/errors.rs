use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a drain. Acknowledgement failures are only logged.
#[derive(Error, Debug)]
pub enum DumpError {
    /// The queue rejected or failed a receive call.
    #[error("receiving messages (iteration {iteration})")]
    Receive {
        iteration: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("writing message {message_id} to {}", path.display())]
    Write {
        message_id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The message id cannot be used as a file name under the output root.
    #[error("message id {0:?} cannot be mapped to an output file")]
    InvalidMessageId(String),

    #[error("creating output directory {}", path.display())]
    OutputRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
