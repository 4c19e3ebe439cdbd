use anyhow::{Context, Result};
use clap::Parser;
use sqs_dumper::cli::{Args, merged_config, require_queue_url};
use sqs_dumper::config::build_sqs_client;
use sqs_dumper::drain::{StopReason, drain};
use sqs_dumper::logging;
use sqs_dumper::sqs::SqsQueue;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let cfg = merged_config(&args)?;
    let client = build_sqs_client(&cfg).await?;
    let url = require_queue_url(&client, &cfg).await?;
    let session = cfg.drain_session();

    info!(
        "[drain] queue={} output={} loops={} visibility={}s delete={}",
        url,
        session.output.display(),
        session.max_iterations,
        session.visibility_timeout.as_secs(),
        session.acknowledge
    );

    let queue = SqsQueue::new(client, url);
    let summary = drain(&queue, &session)
        .await
        .with_context(|| format!("draining {}", queue.queue_url()))?;

    let stop = match summary.stop {
        StopReason::QueueDrained => "queue drained",
        StopReason::IterationLimit => "loop count reached",
    };
    info!(
        iterations = summary.iterations,
        received = summary.received,
        written = summary.written,
        skipped = summary.skipped,
        deleted = summary.acknowledged,
        not_deleted = summary.ack_failed,
        unusable = summary.unusable,
        "done: {stop}"
    );
    Ok(())
}
