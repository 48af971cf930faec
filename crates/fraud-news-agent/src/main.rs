use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use shared::{
    get_default_preview_dir, save_preview, Config, DigestAgent, EnvSecretStore, FileSecretStore,
    HttpServiceFactory, SecretStore, SecretsBackend,
};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

#[derive(Parser)]
#[command(name = "fraud-news-agent")]
#[command(about = "Fetch the week's fraud & security news, then email and post a digest")]
struct Args {
    /// Secret holding the credential bundle (overrides SECRET_NAME)
    #[arg(long)]
    secret_name: Option<String>,

    /// Secret store region (overrides REGION_NAME)
    #[arg(long)]
    region: Option<String>,

    /// Where to read credentials from: file or env (overrides SECRETS_BACKEND)
    #[arg(long)]
    secrets_backend: Option<String>,

    /// Root directory of the file secret store (overrides SECRETS_DIR)
    #[arg(long)]
    secrets_dir: Option<PathBuf>,

    /// Skip the AI summary stage
    #[arg(long)]
    no_summarize: bool,

    /// Render the digest to files instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Directory for dry-run output (default: Documents)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// JSON file with the trigger event passed by the scheduler
    #[arg(short, long)]
    event: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    debug!(
        secret = %config.secret_id,
        region = %config.region,
        backend = ?config.secrets_backend,
        summarize = config.summarize,
        dry_run = config.dry_run,
        "Loaded configuration"
    );

    let event = match &args.event {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read event file: {}", path.display()))?;
            serde_json::from_str(&raw).context("Event file is not valid JSON")?
        }
        None => serde_json::Value::Null,
    };

    let secrets: Box<dyn SecretStore> = match config.secrets_backend {
        SecretsBackend::File => Box::new(FileSecretStore::new(&config.secrets_dir)),
        SecretsBackend::Env => Box::new(EnvSecretStore::new()),
    };
    let factory = HttpServiceFactory;
    let agent = DigestAgent::new(&config, secrets.as_ref(), &factory);

    let now = Utc::now();
    let outcome = agent.run(&event, now).await.context("Digest run aborted")?;

    if config.dry_run {
        let dir = args.output_dir.unwrap_or_else(get_default_preview_dir);
        let paths = save_preview(&dir, &outcome.digest, now.date_naive())?;
        for path in paths {
            info!(path = %path.display(), "Wrote preview");
        }
    }

    println!("{}", serde_json::to_string(&outcome)?);

    Ok(())
}

fn build_config(args: &Args) -> Result<Config> {
    let mut config = Config::from_env()?;

    if let Some(name) = &args.secret_name {
        config.secret_id = name.clone();
    }
    if let Some(region) = &args.region {
        config.region = region.clone();
    }
    if let Some(backend) = &args.secrets_backend {
        config.secrets_backend = SecretsBackend::from_name(backend).ok_or_else(|| {
            anyhow::anyhow!("Invalid secrets backend: {}. Use 'file' or 'env'", backend)
        })?;
    }
    if let Some(dir) = &args.secrets_dir {
        config.secrets_dir = dir.clone();
    }
    if args.no_summarize {
        config.summarize = false;
    }
    config.dry_run = args.dry_run;

    Ok(config)
}
