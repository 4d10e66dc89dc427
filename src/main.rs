use std::io::{self, Write};
use std::time::Duration;

use clap::Parser;
use futures::channel::mpsc;
use futures::{StreamExt, future, stream};
use roomchat::client::{self, Command, Exit};
use roomchat::config::{Cli, ClientConfig, ConfigError};
use roomchat::net::channel::inbound_events;
use roomchat::net::socket::{self, ChannelError};
use roomchat::state::session::Session;
use roomchat::terminal::TerminalView;
use roomchat::util::dark_mode::DarkMode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// How long to wait for the connection task to wind down after quitting.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("input closed before a room and username were given")]
    LoginAborted,
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = ClientConfig::from_cli(Cli::parse())?;
    let mut lines = stdin_lines();

    let (room, username) = login(&config, &mut lines).await?;

    let conn = socket::connect(&config.socket_url).await?;
    // Subscribe before the loop sends its join so the history reply is not missed.
    let inbound = Box::pin(inbound_events(&conn.subscriptions));

    let mut session = Session::with_options(conn.channel.clone(), config.session);
    let mut dark_mode = DarkMode::load(config.prefs_file.clone());
    let mut view = TerminalView::new(io::stdout(), true);
    let commands = stream::once(future::ready(Command::Join { room, username }))
        .chain(lines.map(|line| Command::parse(&line)));

    let exit = client::run(&mut session, &mut view, &mut dark_mode, inbound, commands).await;

    drop(session);
    drop(conn.channel);
    match tokio::time::timeout(SHUTDOWN_GRACE, conn.task).await {
        Ok(Ok(Err(e))) if exit == Exit::Disconnected => return Err(e.into()),
        Ok(Ok(_)) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "connection task panicked"),
        Err(_) => tracing::warn!("connection task did not stop in time"),
    }
    if exit == Exit::Disconnected {
        eprintln!("disconnected from server");
    }
    Ok(())
}

/// Forward stdin lines into a stream the event loop can select on.
fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded();
    tokio::spawn(async move {
        let mut reader = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match reader.next_line().await {
                Ok(Some(line)) => {
                    if tx.unbounded_send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "stdin read failed");
                    break;
                }
            }
        }
    });
    rx
}

/// Take room and username from config, prompting for whatever is missing.
async fn login(
    config: &ClientConfig,
    lines: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(String, String), ClientError> {
    let room = match &config.room {
        Some(room) => room.trim().to_owned(),
        None => prompt("room: ", lines).await?,
    };
    let username = match &config.username {
        Some(username) => username.trim().to_owned(),
        None => prompt("username: ", lines).await?,
    };
    Ok((room, username))
}

async fn prompt(label: &str, lines: &mut mpsc::UnboundedReceiver<String>) -> Result<String, ClientError> {
    loop {
        let mut out = io::stdout();
        write!(out, "{label}")?;
        out.flush()?;
        let line = lines.next().await.ok_or(ClientError::LoginAborted)?;
        let value = line.trim();
        if !value.is_empty() {
            return Ok(value.to_owned());
        }
    }
}
