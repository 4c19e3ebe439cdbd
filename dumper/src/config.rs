use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use aws_config::BehaviorVersion;
use aws_credential_types::{Credentials, provider::SharedCredentialsProvider};
use aws_sdk_sqs as sqs;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, Map};
use serde::Deserialize;

use crate::drain::DrainSession;

pub const DEFAULT_CONFIG_FILE: &str = "sqs-dumper.toml";
/// Largest visibility timeout SQS accepts (12 hours).
pub const MAX_VISIBILITY_TIMEOUT_SECS: i32 = 43_200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    Local,
    Aws,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    pub mode: RuntimeMode,
    pub region: Option<String>,
    /// Named profile from the shared AWS config/credentials files.
    pub profile: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SqsConfig {
    pub queue_url: Option<String>,
    pub queue_name: Option<String>,
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DrainConfig {
    pub output: PathBuf,
    pub loop_count: u32,
    pub visibility_timeout_secs: i32,
    pub delete: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub sqs: SqsConfig,
    pub drain: DrainConfig,
}

/// Builder pre-loaded with the built-in defaults.
pub fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("runtime.mode", "aws")?
        .set_default("drain.output", "./messages")?
        .set_default("drain.loop_count", 1000_i64)?
        .set_default("drain.visibility_timeout_secs", 60_i64)?
        .set_default("drain.delete", false)?)
}

/// `DUMPER_*` variables with "__" nesting, e.g. DUMPER_DRAIN__LOOP_COUNT=5.
/// `vars` replaces the process environment when given.
pub fn environment(vars: Option<Map<String, String>>) -> Environment {
    Environment::with_prefix("DUMPER")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .source(vars)
}

/// What a caller's override closure receives and returns.
pub type Overrides = ConfigBuilder<DefaultState>;

impl AppConfig {
    /// [`AppConfig::load_with_env`] reading the process environment.
    pub fn load(
        path: Option<&str>,
        overrides: impl FnOnce(Overrides) -> Result<Overrides>,
    ) -> Result<Self> {
        Self::load_with_env(path, environment(None), overrides)
    }

    /// Load and MERGE, later sources overriding earlier ones:
    ///  - built-in defaults
    ///  - config file (`path`, or `sqs-dumper.toml` if present)
    ///  - `env`
    ///  - `overrides`, applied by the caller (command-line flags)
    pub fn load_with_env(
        path: Option<&str>,
        env: Environment,
        overrides: impl FnOnce(Overrides) -> Result<Overrides>,
    ) -> Result<Self> {
        let mut builder = defaults()?;

        match path {
            Some(p) => {
                if !Path::new(p).exists() {
                    return Err(anyhow!("Config file not found at '{}'.", p));
                }
                builder = builder.add_source(File::with_name(p));
            }
            None => {
                builder =
                    builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false));
            }
        }

        builder = builder.add_source(env);

        let builder = overrides(builder)?;
        let cfg = builder.build().context("building merged config")?;
        let out: AppConfig = cfg.try_deserialize().context("deserializing AppConfig")?;
        out.validate()?;
        Ok(out)
    }

    fn validate(&self) -> Result<()> {
        let vt = self.drain.visibility_timeout_secs;
        if !(0..=MAX_VISIBILITY_TIMEOUT_SECS).contains(&vt) {
            return Err(anyhow!(
                "visibility timeout must be between 0 and {} seconds (got {})",
                MAX_VISIBILITY_TIMEOUT_SECS,
                vt
            ));
        }
        Ok(())
    }

    pub fn drain_session(&self) -> DrainSession {
        DrainSession {
            max_iterations: self.drain.loop_count,
            visibility_timeout: Duration::from_secs(
                self.drain.visibility_timeout_secs.unsigned_abs().into(),
            ),
            acknowledge: self.drain.delete,
            output: self.drain.output.clone(),
        }
    }
}

pub async fn build_sqs_client(cfg: &AppConfig) -> Result<sqs::Client> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &cfg.runtime.region {
        loader = loader.region(aws_config::Region::new(region.clone()));
    }
    if let Some(profile) = &cfg.runtime.profile {
        loader = loader.profile_name(profile);
    }

    // If we're on LocalStack (runtime=local) OR an explicit endpoint is provided,
    // use static dummy creds to bypass SSO/profile resolution.
    let using_localstack =
        matches!(cfg.runtime.mode, RuntimeMode::Local) || cfg.sqs.endpoint_url.is_some();

    if using_localstack {
        let creds = Credentials::new("test", "test", None, None, "localstack");
        loader = loader.credentials_provider(SharedCredentialsProvider::new(creds));
    }

    let shared_cfg = loader.load().await;

    let mut b = sqs::config::Builder::from(&shared_cfg);
    if let Some(ep) = &cfg.sqs.endpoint_url {
        b = b.endpoint_url(ep.clone());
    }
    Ok(sqs::Client::from_conf(b.build()))
}
