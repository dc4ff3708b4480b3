mod chat;
mod detect;
mod gateway;

use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use wheredunno_channels::Room;
use wheredunno_core::{
    config::{self, install_bundled_prompts, shellexpand, Prompts},
    traits::{MessageChannel, Provider},
};
use wheredunno_memory::Store;
use wheredunno_providers::gemini::GeminiProvider;

/// How often the room re-reads the database for other clients' messages.
const ROOM_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(
    name = "wheredunno",
    version,
    about = "wheredunno: a chat room whose assistant remembers where everyone went"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Join the room in this terminal.
    Start,
    /// Check configuration, storage, and provider availability.
    Status,
    /// Ask the AI assistant a question on behalf of the room.
    Ask {
        /// The question.
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
    /// Ask a question about the recent conversation.
    Analyze {
        /// The question.
        #[arg(trailing_var_arg = true)]
        question: Vec<String>,
    },
    /// Show the last known whereabout of someone.
    Where {
        /// Name, or part of it.
        #[arg(trailing_var_arg = true)]
        name: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;

    // The terminal session owns stdout, so its logs go to a file.
    let _log_guard = init_logging(&cfg, matches!(cli.command, Commands::Start))?;

    match cli.command {
        Commands::Start => {
            let identity = cfg.identity.identity();
            let store = Store::new(&cfg.memory).await?;
            let gw = build_gateway(&cfg, store.clone()).await?;

            let cancel = CancellationToken::new();
            let poller = tokio::spawn(gw.room.clone().poll(ROOM_POLL_INTERVAL, cancel.clone()));
            let mut handles = gw.gateway.spawn_background(cancel.clone());
            handles.push(poller);

            let channel: Arc<dyn MessageChannel> = gw.room.clone();
            let result = chat::run(gw.gateway.clone(), channel, identity, cancel.clone()).await;
            gw.gateway.shutdown(&cancel, handles).await;
            result?;
        }
        Commands::Status => {
            println!("wheredunno status\n");
            println!("Config: {}", cli.config);
            println!("Data dir: {}", shellexpand(&cfg.wheredunno.data_dir));
            println!("Identity: {}", cfg.identity.identity().user_name);
            println!("Default provider: {}", cfg.provider.default);
            println!();

            match Store::new(&cfg.memory).await {
                Ok(store) => {
                    let count = store.message_count().await?;
                    let known = store.recent_whereabouts(cfg.memory.lookup_window).await?;
                    println!("  store: {} ({count} messages)", shellexpand(&cfg.memory.db_path));
                    println!("  whereabouts known: {}", known.len());
                    store.close().await;
                }
                Err(e) => println!("  store: unavailable ({e})"),
            }

            match build_provider(&cfg) {
                Ok(provider) => {
                    let available = provider.is_available().await;
                    println!(
                        "  {}: {}",
                        provider.name(),
                        if available { "available" } else { "unavailable" }
                    );
                }
                Err(e) => println!("  provider: {e}"),
            }
            println!(
                "  responder: {}",
                if cfg.responder.enabled {
                    format!("enabled ({}ms delay)", cfg.responder.delay_ms)
                } else {
                    "disabled".to_string()
                }
            );
        }
        Commands::Ask { message } => {
            if message.is_empty() {
                anyhow::bail!("no question provided. Usage: wheredunno ask <question>");
            }
            let question = message.join(" ");
            let store = Store::new(&cfg.memory).await?;
            let gw = build_gateway(&cfg, store).await?;

            match gw.gateway.ask(&question).await {
                Some(gateway::AskOutcome::Answered(text)) => println!("{text}"),
                Some(gateway::AskOutcome::Failed { notice, .. }) => anyhow::bail!(notice),
                None => anyhow::bail!("no question provided"),
            }
        }
        Commands::Analyze { question } => {
            if question.is_empty() {
                anyhow::bail!("no question provided. Usage: wheredunno analyze <question>");
            }
            let question = question.join(" ");
            let store = Store::new(&cfg.memory).await?;
            let gw = build_gateway(&cfg, store).await?;

            let answer = gw.gateway.analyze(&question).await?;
            println!("{answer}");
        }
        Commands::Where { name } => {
            let name = name.join(" ");
            if name.trim().is_empty() {
                anyhow::bail!("no name provided. Usage: wheredunno where <name>");
            }
            let store = Store::new(&cfg.memory).await?;
            match store.find_whereabout_by_name(&name).await? {
                Some(fact) => println!("{}", gateway::render_response(&fact)),
                None => println!("No recent information about {name}'s whereabouts."),
            }
            store.close().await;
        }
    }

    Ok(())
}

/// Install the log subscriber. Returns the file writer's guard, which must
/// outlive every log call.
fn init_logging(cfg: &config::Config, to_file: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.wheredunno.log_level));

    if !to_file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    }

    let log_dir = std::path::Path::new(&shellexpand(&cfg.wheredunno.data_dir)).join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let appender = tracing_appender::rolling::never(&log_dir, "wheredunno.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}

/// Service handles shared by the room-facing commands.
struct Wiring {
    gateway: Arc<gateway::Gateway>,
    room: Arc<Room>,
}

async fn build_gateway(cfg: &config::Config, store: Store) -> anyhow::Result<Wiring> {
    install_bundled_prompts(&cfg.wheredunno.data_dir);
    let prompts = Prompts::load(&cfg.wheredunno.data_dir);

    let provider = build_provider(cfg)?;
    let room = Arc::new(Room::open(store.clone()).await?);
    let gateway = Arc::new(gateway::Gateway::new(
        provider,
        room.clone(),
        store,
        prompts,
        cfg.assistant.clone(),
        cfg.responder.clone(),
    ));
    Ok(Wiring { gateway, room })
}

/// Build the configured provider.
fn build_provider(cfg: &config::Config) -> anyhow::Result<Arc<dyn Provider>> {
    match cfg.provider.default.as_str() {
        "gemini" => {
            let gemini = cfg.provider.gemini.clone().unwrap_or_default();
            if !gemini.enabled {
                anyhow::bail!("gemini provider is disabled in config");
            }
            if gemini.api_key.is_empty() {
                anyhow::bail!(
                    "Gemini API key is empty. Set it in config.toml or the GEMINI_API_KEY env var."
                );
            }
            Ok(Arc::new(GeminiProvider::from_config(&gemini)))
        }
        other => anyhow::bail!("unsupported provider: {other}"),
    }
}
