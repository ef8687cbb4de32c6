use anyhow::{Result, Context};
use clap::Parser;
use serde::Deserialize;
use serde_json::{json, Value as Json};
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use sseaudit_aws::S3Inventory;
use sseaudit_core::{ScanConfig, Scanner};
use sseaudit_discord::DiscordWebhook;
use sseaudit_gemini::GeminiClient;

#[derive(Parser, Debug)]
#[command(author, version, about="sseaudit: audit S3 buckets for default encryption")]
struct Cli {
    /// Settings file (YAML)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// AWS region for the S3 client
    #[arg(long)]
    region: Option<String>,

    /// Gemini model used for the risk analysis
    #[arg(long)]
    model: Option<String>,

    /// JSON event handed to the handler
    #[arg(long)]
    event: Option<PathBuf>,

    /// Do not post to DISCORD_WEBHOOK_URL for this run
    #[arg(long, default_value_t=false)]
    no_notify: bool,

    /// Pretty-print the response envelope
    #[arg(long, default_value_t=false)]
    pretty: bool,
}

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
struct Settings {
    #[serde(default)] region: Option<String>,
    #[serde(default)] model: Option<String>,
    #[serde(default)] gemini_base_url: Option<String>,
    #[serde(default)] footer: Option<String>,
}

impl Settings {
    fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                let raw = std::fs::read(p)
                    .with_context(|| format!("read settings {}", p.display()))?;
                serde_yaml::from_slice(&raw)
                    .with_context(|| format!("parse settings {}", p.display()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Command-line flags win over the file.
    fn with_overrides(mut self, cli: &Cli) -> Self {
        if cli.region.is_some() { self.region = cli.region.clone(); }
        if cli.model.is_some() { self.model = cli.model.clone(); }
        self
    }
}

fn load_event(path: Option<&Path>) -> Result<Json> {
    match path {
        Some(p) => {
            let raw = std::fs::read(p).with_context(|| format!("read event {}", p.display()))?;
            serde_json::from_slice(&raw).with_context(|| format!("parse event {}", p.display()))
        }
        None => Ok(json!({})),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .json()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .init();
    let cli = Cli::parse();

    let settings = Settings::load(cli.file.as_deref())?.with_overrides(&cli);
    let event = load_event(cli.event.as_deref())?;

    let mut config = ScanConfig::from_env();
    if cli.no_notify { config = config.without_webhook(); }

    let http = reqwest::Client::new();
    let scanner = Scanner::new(
        config,
        Box::new(S3Inventory::from_env(settings.region.clone()).await),
        Box::new(GeminiClient::new(
            http.clone(),
            settings.gemini_base_url.clone(),
            settings.model.clone(),
        )),
        Box::new(DiscordWebhook::new(http, settings.footer.clone())),
    );

    let envelope = match scanner.handle(&event, &json!({})).await {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::error!(error = %e, "scan aborted");
            return Err(e.into());
        }
    };
    let out = if cli.pretty {
        serde_json::to_string_pretty(&envelope)?
    } else {
        serde_json::to_string(&envelope)?
    };
    println!("{out}");
    Ok(())
}
