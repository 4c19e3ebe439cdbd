pub mod ack;
pub mod cli;
pub mod config;
pub mod drain;
pub mod errors;
pub mod logging;
pub mod persist;
pub mod queue;
pub mod sqs;
