use std::path::PathBuf;

use anyhow::{Result, anyhow};
use aws_sdk_sqs::Client;
use clap::Parser;
use config::Environment;

use crate::config::{AppConfig, environment};
use crate::sqs;

/// Drain an SQS queue into `<output>/<first char of id>/<id>.json` files.
///
/// Every flag also has a config file / `DUMPER_*` environment counterpart;
/// flags win.
#[derive(Clone, Debug, Parser)]
#[command(name = "sqs-dumper", version, about)]
pub struct Args {
    /// Config file (defaults to ./sqs-dumper.toml when present)
    #[arg(long)]
    pub config: Option<String>,

    /// Output directory [default: ./messages]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// AWS profile
    #[arg(short, long)]
    pub profile: Option<String>,

    /// AWS region (otherwise resolved from the profile / environment)
    #[arg(long)]
    pub region: Option<String>,

    /// Queue URL
    #[arg(short, long = "queue")]
    pub queue_url: Option<String>,

    /// Queue name, resolved to a URL when --queue is not given
    #[arg(long)]
    pub queue_name: Option<String>,

    /// Custom SQS endpoint (e.g. LocalStack)
    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// Number of receive calls [default: 1000]
    #[arg(long)]
    pub loop_count: Option<u32>,

    /// Visibility timeout in seconds applied to each receive [default: 60]
    #[arg(long)]
    pub visibility_timeout: Option<i32>,

    /// Delete messages after saving them instead of letting the visibility timeout expire
    #[arg(long)]
    pub delete: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Merge defaults + config file + env + command-line flags into an AppConfig.
pub fn merged_config(args: &Args) -> Result<AppConfig> {
    merge_flags(args, environment(None))
}

fn merge_flags(args: &Args, env: Environment) -> Result<AppConfig> {
    AppConfig::load_with_env(args.config.as_deref(), env, |mut b| {
        if let Some(output) = &args.output {
            b = b.set_override("drain.output", output.to_string_lossy().into_owned())?;
        }
        if let Some(profile) = &args.profile {
            b = b.set_override("runtime.profile", profile.clone())?;
        }
        if let Some(region) = &args.region {
            b = b.set_override("runtime.region", region.clone())?;
        }
        if let Some(url) = &args.queue_url {
            b = b.set_override("sqs.queue_url", url.clone())?;
        }
        if let Some(name) = &args.queue_name {
            b = b.set_override("sqs.queue_name", name.clone())?;
        }
        if let Some(ep) = &args.endpoint_url {
            b = b.set_override("sqs.endpoint_url", ep.clone())?;
        }
        if let Some(n) = args.loop_count {
            b = b.set_override("drain.loop_count", i64::from(n))?;
        }
        if let Some(vt) = args.visibility_timeout {
            b = b.set_override("drain.visibility_timeout_secs", i64::from(vt))?;
        }
        if args.delete {
            b = b.set_override("drain.delete", true)?;
        }
        Ok(b)
    })
}

/// Queue URL from config, or looked up from the queue name; otherwise fail.
pub async fn require_queue_url(client: &Client, cfg: &AppConfig) -> Result<String> {
    if let Some(url) = &cfg.sqs.queue_url {
        return Ok(url.clone());
    }
    match &cfg.sqs.queue_name {
        Some(name) => sqs::get_queue_url(client, name).await,
        None => Err(anyhow!(
            "A queue is required. Pass --queue <url> or --queue-name, \
             or set [sqs].queue_url in the config."
        )),
    }
}
