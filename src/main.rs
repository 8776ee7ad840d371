use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use agent_notify::app::Config;
use agent_notify::context::SessionContext;
use agent_notify::focus::FocusResolver;
use agent_notify::notify::{Dispatcher, Notification};
use agent_notify::runner::SystemRunner;

/// Agent Notify - desktop notifications when a coding agent finishes out of sight
#[derive(Parser)]
#[command(name = "agent-notify")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/agent-notify/config.toml)
    #[arg(short, long, env = "AGENT_NOTIFY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Overrides {
    /// Agent command name to look for in multiplexer panes
    #[arg(long, global = true)]
    agent: Option<String>,
    /// Notification title
    #[arg(long, global = true)]
    title: Option<String>,
    /// Notification subtitle
    #[arg(long, global = true)]
    subtitle: Option<String>,
    /// Notification message
    #[arg(long, global = true)]
    message: Option<String>,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(agent) = self.agent {
            config.agent_command = agent;
        }
        if let Some(title) = self.title {
            config.title = title;
        }
        if let Some(subtitle) = self.subtitle {
            config.subtitle = subtitle;
        }
        if let Some(message) = self.message {
            config.message = message;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Agent finished: notify if its pane is out of focus (default)
    Done {
        /// Read the hook's JSON event payload from stdin
        #[arg(long)]
        stdin: bool,
    },
    /// Print whether a notification would be sent right now
    Check,
    /// Send a notification regardless of focus
    Send,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli.overrides.apply(&mut config);

    init_logging(cli.log_level.as_deref().unwrap_or(&config.log_level))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;

    match cli.command.unwrap_or(Commands::Done { stdin: false }) {
        Commands::Done { stdin } => {
            if stdin {
                log_event_payload();
            }
            runtime.block_on(run_done(&config, false))
        }
        Commands::Check => runtime.block_on(run_check(&config)),
        Commands::Send => runtime.block_on(run_done(&config, true)),
    }
}

async fn run_done(config: &Config, force: bool) -> Result<()> {
    let ctx = SessionContext::capture();
    let runner = SystemRunner;

    if !force && !FocusResolver::new(&runner, config).should_notify(&ctx).await {
        info!("Agent pane is in focus, skipping notification");
        return Ok(());
    }

    let notification = Notification::from_config(config);
    let mut dispatcher = Dispatcher::new(&runner, ctx.platform, config, std::io::stdout());
    match dispatcher.dispatch(&notification).await {
        Ok(outcome) => {
            if let Some(warning) = outcome.warning() {
                eprintln!("Warning: {}", warning);
            }
        }
        Err(e) => {
            warn!("Notification delivery failed: {}", e);
            eprintln!("Warning: {}", e);
        }
    }
    Ok(())
}

async fn run_check(config: &Config) -> Result<()> {
    let ctx = SessionContext::capture();
    debug!(
        "Session context: {}",
        serde_json::to_string(&ctx).context("Failed to serialize session context")?
    );

    let verdict = FocusResolver::new(&SystemRunner, config).resolve(&ctx).await;
    debug!("Verdict: {:?}", verdict);
    println!("{}", if verdict.should_notify() { "notify" } else { "suppress" });
    Ok(())
}

/// Hooks pass event details as JSON on stdin; nothing in it is required.
fn log_event_payload() {
    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        warn!("Failed to read event payload: {}", e);
        return;
    }
    if input.trim().is_empty() {
        return;
    }
    match serde_json::from_str::<serde_json::Value>(&input) {
        Ok(event) => debug!("Event payload: {}", event),
        Err(e) => warn!("Ignoring malformed event payload: {}", e),
    }
}

fn init_logging(level: &str) -> Result<()> {
    let log_dir = directories::ProjectDirs::from("", "", "agent-notify")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("agent-notify"));

    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("agent-notify.log"))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(log_file),
        )
        .init();

    info!("Agent Notify starting");
    Ok(())
}
