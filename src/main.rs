//! Runcoach: Telegram running-journal bot

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use runcoach_agent::IntentExtractor;
use runcoach_core::UserId;
use runcoach_gateway::config::{oracle_key_from_env, DEFAULT_CONFIG_FILE};
use runcoach_gateway::{start_bot, RuncoachConfig, Secrets};
use runcoach_journal::Journal;
use runcoach_llm::AnthropicProvider;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "runcoach", about = "Runcoach: log runs by chatting with a Telegram bot")]
struct Cli {
    /// TOML config file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot (default)
    Run,
    /// Classify one message and print the extracted intent as JSON
    Classify {
        text: String,
        /// Date to treat as today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Print a user's logged runs
    History {
        #[arg(short, long)]
        user: String,
        /// Journal file (default: from config)
        #[arg(short, long)]
        journal: Option<PathBuf>,
    },
    /// Print the default config as TOML
    InitConfig,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let _guard = init_tracing(cli.log_file.as_deref())?;
            let config = RuncoachConfig::load(&cli.config).with_env_overrides();
            let secrets = Secrets::from_env()?;
            start_bot(config, secrets).await?;
        }

        Commands::Classify { text, date } => {
            let _guard = init_tracing(cli.log_file.as_deref())?;
            let config = RuncoachConfig::load(&cli.config).with_env_overrides();
            let api_key = oracle_key_from_env()?;

            let mut provider = AnthropicProvider::new(api_key);
            if let Some(url) = &config.oracle.base_url {
                provider = provider.with_base_url(url.clone());
            }
            let extractor = IntentExtractor::new(Arc::new(provider), config.extractor_config());
            let today = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let result = extractor.classify(&text, today).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::History { user, journal } => {
            let _guard = init_tracing(cli.log_file.as_deref())?;
            let path = match journal {
                Some(path) => path,
                None => RuncoachConfig::load(&cli.config).journal.path,
            };
            let entries = Journal::open(path).entries(&UserId::new(user)).await;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }

        Commands::InitConfig => {
            print!("{}", RuncoachConfig::default().to_toml());
        }

        Commands::Version => {
            println!("runcoach v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// Console logging, plus a non-blocking file writer when `log_file` is set.
/// The returned guard flushes the file on drop.
fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("--log-file has no file name: {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runcoach=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}
