use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use companion_gateway::companion::chat_turn;
use companion_gateway::voice::{SpeechSource, synthesize_or_silence};
use companion_gateway::{ApiServerBuilder, Backends, Config, Memory, Responder};

/// Companion - HTTP API for a virtual companion persona
#[derive(Parser)]
#[command(name = "companion", version, about)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "COMPANION_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "COMPANION_PORT")]
    port: Option<u16>,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single chat turn and print the result as JSON
    Chat {
        /// Message to send
        message: String,
    },
    /// Synthesize text to a WAV file
    Speak {
        /// Text to speak
        text: String,
        /// Output file
        #[arg(short, long, default_value = "speech.wav")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,companion_gateway=info",
        1 => "info,companion_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    tracing::debug!(?config, "loaded configuration");

    let backends = Backends::from_config(&config);

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Chat { message } => cmd_chat(&config, backends, &message).await,
            Command::Speak { text, out } => cmd_speak(backends, &text, &out).await,
        };
    }

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        persona = %config.persona.name,
        "starting companion gateway"
    );

    ApiServerBuilder::new(&config, backends).build().run().await?;
    Ok(())
}

async fn cmd_chat(config: &Config, backends: Backends, message: &str) -> anyhow::Result<()> {
    let message = message.trim();
    anyhow::ensure!(!message.is_empty(), "message must not be empty");

    let responder = Responder::new(backends.llm, config.persona.clone())
        .sampling(config.llm.sampling)
        .history_limit(config.llm.history_limit);

    let turn = chat_turn(&responder, message, Memory::default(), &[]).await;
    println!("{}", serde_json::to_string_pretty(&turn)?);
    Ok(())
}

async fn cmd_speak(backends: Backends, text: &str, out: &std::path::Path) -> anyhow::Result<()> {
    let text = text.trim();
    anyhow::ensure!(!text.is_empty(), "text must not be empty");

    let (source, audio) = synthesize_or_silence(backends.tts.as_deref(), text).await;
    if source == SpeechSource::Fallback {
        tracing::warn!("writing silence in place of synthesized speech");
    }

    tokio::fs::write(out, &audio).await?;
    println!("wrote {} bytes to {}", audio.len(), out.display());
    Ok(())
}
