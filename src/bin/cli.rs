//! CLI binary for sable.

use clap::{Parser, Subcommand};
use sable::reminders::{spawn_checker, ReminderStore};
use sable::{Assistant, AssistantConfig, ConsoleSpeech};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Sable: a voice-driven personal assistant.
#[derive(Parser)]
#[command(name = "sable", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Start the wake-word session loop.
    Chat,

    /// Print the effective configuration and exit.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Suppress noisy dependency logs by default; RUST_LOG overrides.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sable=info,ureq=warn,lettre=warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = if let Some(ref path) = cli.config {
        AssistantConfig::from_file(path)?
    } else {
        AssistantConfig::from_env()
    };

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => run_chat(config).await,
        Command::Config => print_config(&config),
    }
}

async fn run_chat(config: AssistantConfig) -> anyhow::Result<()> {
    println!("Sable v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "\nType a line containing \"{}\" to wake the assistant, then your command. \
         Press Ctrl+C to quit.\n",
        config.session.wake_word
    );

    let reminders = Arc::new(ReminderStore::load(&config.reminders_path()));
    let speaker = Arc::new(ConsoleSpeech::new(&config.session.wake_word));
    let cancel = CancellationToken::new();

    // Due reminders are announced from a background task while the
    // session loop blocks on input.
    let checker = spawn_checker(
        Arc::clone(&reminders),
        speaker.clone(),
        config.reminders.check_interval_secs,
        cancel.clone(),
    );

    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down...");
            cancel_on_signal.cancel();
            std::process::exit(0);
        }
    });

    let wake_word = config.session.wake_word.clone();
    let mut assistant = Assistant::new(config, reminders);
    // The session loop is blocking stdin I/O; keep it off the runtime's
    // core threads.
    tokio::task::spawn_blocking(move || {
        let mut input = ConsoleSpeech::new(&wake_word);
        assistant.run(&mut input, &*speaker);
    })
    .await?;

    cancel.cancel();
    checker.await?;
    Ok(())
}

fn print_config(config: &AssistantConfig) -> anyhow::Result<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
