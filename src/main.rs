//! titlebot entry point: config, logging, transport, and the run loop.

use titlebot::config::Config;
use titlebot::db::Db;
use titlebot::dispatch::{Dispatcher, DispatcherConfig};
use titlebot::messaging::{ChatTransport as _, IrcTransport};
use titlebot::titles::TitleFetcher;

use clap::Parser;
use futures::StreamExt as _;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Parser)]
#[command(name = "titlebot", about = "IRC bot that announces page titles and answers #seen queries")]
struct Args {
    /// Path to the JSON configuration file.
    #[arg(long, default_value = "conf.json")]
    config: PathBuf,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::new("info")
    };

    tracing_subscriber::fmt().with_env_filter(filter).compact().init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);

    // Startup failures past this point are fatal: no config, no bot.
    let config = Config::load(&args.config)?;
    let ignore = config.ignore_pattern()?;
    tracing::info!(server = %config.server, nick = %config.nick, "starting up");

    let db = Db::connect(&config.database).await?;
    let transport = Arc::new(IrcTransport::connect(&config).await?);
    let mut inbound = transport.start().await?;

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher::new(
        DispatcherConfig {
            room: config.room.clone(),
            ignore,
        },
        db.pool.clone(),
        TitleFetcher::new(),
        outbound_tx,
    );

    // Handler replies flow through the outbound channel so handler tasks
    // never touch the transport directly.
    let outbound_transport = transport.clone();
    tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if let Err(error) = outbound_transport
                .send_message(&message.target, &message.text)
                .await
            {
                tracing::warn!(%error, "failed to send outgoing message");
            }
        }
    });

    loop {
        tokio::select! {
            message = inbound.next() => match message {
                Some(message) => dispatcher.dispatch(message),
                None => {
                    tracing::warn!("inbound stream closed");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    // In-flight handler tasks are abandoned with the runtime; there is
    // nothing transactional to unwind.
    transport.shutdown().await?;
    db.close().await;

    Ok(())
}
