use anyhow::{Context, Result};
use chat_widget::panel::{ChatPanel, RecordingStart};
use chat_widget::session::IgnoreReason;
use chat_widget::{
    create_router, AppState, AudioClip, ChatWidget, Config, ExchangeOutcome, Origin,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Parser)]
#[command(name = "chat-widget")]
#[command(about = "Chat client for a single reply endpoint", long_about = None)]
struct Cli {
    /// Config file, without extension
    #[arg(long, global = true, default_value = "config/chat-widget")]
    config: String,

    /// Override endpoint.url
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Override audio.source (`microphone` or `file:<path>`)
    #[arg(long, global = true)]
    source: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send one text message and print the reply
    Send { text: String },
    /// Send an audio file as a voice message and print the reply
    SendAudio { file: PathBuf },
    /// Interactive chat on stdin
    Chat,
    /// Serve the panel's HTTP API for an external shell
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut cfg = Config::load(&cli.config)?;
    if let Some(endpoint) = cli.endpoint {
        cfg.endpoint.url = endpoint;
    }
    if let Some(source) = cli.source {
        cfg.audio.source = source;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Reply endpoint: {}", cfg.endpoint.url);

    let mut widget = ChatWidget::from_config(&cfg)?;

    match cli.command {
        Command::Send { text } => {
            let panel = widget.open();
            panel.submit_text(&text).await;
            print_new_messages(&panel, 1);
        }
        Command::SendAudio { file } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let panel = widget.open();
            panel.session().send_audio(AudioClip::from_bytes(bytes)).await;
            print_new_messages(&panel, 1);
        }
        Command::Chat => run_chat(widget.open()).await?,
        Command::Serve => serve(&cfg, widget).await?,
    }

    Ok(())
}

async fn run_chat(panel: std::sync::Arc<ChatPanel>) -> Result<()> {
    println!("{}  (/record, /stop, /cancel, /quit)", panel.title());
    let mut shown = print_new_messages(&panel, 0);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match line.trim() {
            "/quit" => break,
            "/record" => match panel.start_recording().await {
                Ok(RecordingStart::Started) => println!("● recording... (/stop to send)"),
                Ok(other) => println!("(not recording: {:?})", other),
                Err(e) => println!("! {}", panel.take_notice().unwrap_or_else(|| e.to_string())),
            },
            "/stop" => {
                if panel.stop_recording().await.is_none() {
                    println!("(not recording)");
                }
            }
            "/cancel" => {
                if panel.cancel_recording().await {
                    println!("(recording discarded)");
                }
            }
            _ => {
                let outcome = panel.submit_text(&line).await;
                if outcome == ExchangeOutcome::Ignored(IgnoreReason::Recording) {
                    println!("(recording: /stop or /cancel first)");
                }
            }
        }
        shown = print_new_messages(&panel, shown);
    }

    Ok(())
}

/// Print messages after the first `shown`; returns the new count
fn print_new_messages(panel: &ChatPanel, shown: usize) -> usize {
    let view = panel.render();
    for message in view.messages.iter().skip(shown) {
        let who = match message.origin {
            Origin::User => "you",
            Origin::Assistant => "bot",
        };
        println!("[{}] {}: {}", message.time, who, message.text);
    }
    view.messages.len()
}

async fn serve(cfg: &Config, widget: ChatWidget) -> Result<()> {
    let app = create_router(AppState::new(widget));
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Panel API listening on http://{}", addr);

    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
