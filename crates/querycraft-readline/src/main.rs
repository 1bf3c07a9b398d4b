mod command;
mod helper;
mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use querycraft_application::ChatUseCase;
use querycraft_core::ConversationStore;
use querycraft_core::config::AppConfig;
use querycraft_core::state::StateRepository;
use querycraft_infrastructure::{JsonStateRepository, MemoryStateRepository, TomlConfigRepository};

use crate::command::Command;
use crate::helper::CliHelper;
use crate::repl::{Output, Repl};

#[derive(Parser)]
#[command(name = "querycraft")]
#[command(about = "QueryCraft - chat with projects and conversations from the terminal", long_about = None)]
struct Cli {
    /// Directory holding query-craft-storage.json (default: platform data dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Path to config.toml (default: platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep everything in memory; nothing is written to disk
    #[arg(long)]
    ephemeral: bool,

    /// Log filter used when RUST_LOG is not set (overrides the config file)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ===== Configuration =====
    // An explicit --config is only read; the default location is seeded on first run.
    let (config_repository, config_result) = match &cli.config {
        Some(path) => {
            let repository = TomlConfigRepository::with_path(path);
            let result = repository.load();
            (repository, result)
        }
        None => {
            let repository = TomlConfigRepository::new()?;
            let result = repository.load_or_init();
            (repository, result)
        }
    };
    let config = config_result.clone().unwrap_or_default();

    init_tracing(cli.log_level.as_deref().unwrap_or(&config.log_level));
    if let Err(e) = config_result {
        warn!(
            "Ignoring unreadable config {}: {}",
            config_repository.path().display(),
            e
        );
    }

    // ===== Backend Initialization =====
    let repository = state_repository(&cli)?;
    let store = ConversationStore::load(repository, config.store.clone())
        .context("Failed to load saved conversations")?;
    let chat = ChatUseCase::from_config(&config.reply);

    let mut repl = Repl::new(store, chat);
    repl.start()?;

    run(&mut repl, &config).await
}

fn init_tracing(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn state_repository(cli: &Cli) -> Result<Arc<dyn StateRepository>> {
    if cli.ephemeral {
        info!("Ephemeral session, state is not persisted");
        return Ok(Arc::new(MemoryStateRepository::new()));
    }

    let repository = match &cli.data_dir {
        Some(dir) => JsonStateRepository::with_data_dir(dir),
        None => JsonStateRepository::new()?,
    };
    info!("State file: {}", repository.path().display());
    Ok(Arc::new(repository))
}

async fn run(repl: &mut Repl, config: &AppConfig) -> Result<()> {
    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== QueryCraft ===".bright_magenta().bold());
    println!(
        "{}",
        format!(
            "Reply style: {}. Type a message, '/help' for commands, or 'quit' to exit.",
            config.reply.style
        )
        .bright_black()
    );
    println!();

    // ===== Main REPL Loop =====
    loop {
        match rl.readline(&repl.prompt()) {
            Ok(line) => {
                let command = match command::parse(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        eprintln!("{}", e.to_string().red());
                        continue;
                    }
                };

                let _ = rl.add_history_entry(line.as_str());

                if matches!(command, Command::Say(_)) {
                    println!("{}", "...".bright_black());
                }

                match repl.execute(command).await {
                    Ok(output) => {
                        if render(&output) {
                            println!("{}", "Goodbye!".bright_green());
                            break;
                        }
                    }
                    Err(e) => eprintln!("{}", e.to_string().red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    repl.store()
        .flush()
        .context("Failed to save conversations on exit")?;
    Ok(())
}

/// Prints command output. Returns true when the REPL should exit.
fn render(output: &[Output]) -> bool {
    for line in output {
        match line {
            Output::Reply(text) => {
                for l in text.lines() {
                    println!("{}", l.bright_blue());
                }
            }
            Output::User(text) => println!("{}", format!("> {}", text).green()),
            Output::Info(text) => println!("{}", text.bright_black()),
            Output::Entry { active, text } => {
                if *active {
                    println!("{} {}", "*".bright_green(), text.bold());
                } else {
                    println!("  {}", text);
                }
            }
            Output::Quit => return true,
        }
    }
    false
}
