//! Socket.IO websocket connection: the concrete channel adapter.
//!
//! LIFECYCLE
//! =========
//! 1. Open the websocket and read the Engine.IO open packet (`0{...}`)
//! 2. Send a namespace connect (`40`) and wait for the server's `40{...}`,
//!    answering pings meanwhile; `44{...}` means the server refused us.
//!    Steps 1 and 2 together must finish within [`HANDSHAKE_TIMEOUT`]
//! 3. Spawn the connection task: a `select!` loop that
//!    - answers server pings (`2` → `3`) and publishes events (`42[...]`)
//!      into the shared [`Subscriptions`]
//!    - forwards emitted [`Outbound`] events as `42["name",payload]`
//!    - fails if no ping arrives within `pingInterval + pingTimeout`
//! 4. On close, error, or when every [`SocketChannel`] handle is dropped,
//!    the task ends and closes all subscriptions. There is no reconnect.

#[cfg(test)]
#[path = "socket_test.rs"]
mod socket_test;

use std::time::Duration;

use futures::channel::mpsc;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, info, warn};
use wire::packet::{self, DEFAULT_NAMESPACE};
use wire::{Handshake, Outbound, Packet};

use crate::net::channel::{Channel, Subscriptions};

/// Upper bound on the open packet plus namespace ack.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("websocket connect failed: {0}")]
    Connect(Box<tungstenite::Error>),
    #[error("websocket transport error: {0}")]
    Transport(Box<tungstenite::Error>),
    #[error("websocket closed")]
    Closed,
    #[error("expected {0} during handshake")]
    Handshake(&'static str),
    #[error("server refused connection: {0}")]
    Refused(String),
    #[error("no heartbeat from server within {0:?}")]
    HeartbeatTimeout(Duration),
    #[error("handshake not completed within {0:?}")]
    HandshakeTimeout(Duration),
}

impl From<tungstenite::Error> for ChannelError {
    fn from(e: tungstenite::Error) -> Self {
        Self::Transport(Box::new(e))
    }
}

/// Cloneable emit handle for an open connection.
#[derive(Clone, Debug)]
pub struct SocketChannel {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl Channel for SocketChannel {
    fn emit(&self, event: Outbound) {
        self.tx.emit(event);
    }
}

/// An established connection.
pub struct Connection {
    pub channel: SocketChannel,
    pub subscriptions: Subscriptions,
    pub handshake: Handshake,
    /// Resolves when the connection ends.
    pub task: JoinHandle<Result<(), ChannelError>>,
}

/// Connect to a Socket.IO endpoint such as
/// `ws://host/socket.io/?EIO=4&transport=websocket`.
///
/// # Errors
///
/// Fails if the websocket cannot be opened or the handshake is rejected.
pub async fn connect(url: &str) -> Result<Connection, ChannelError> {
    let (ws, _response) = connect_async(url).await.map_err(|e| ChannelError::Connect(Box::new(e)))?;
    let (write, read) = ws.split();
    establish(write, read).await
}

/// Run the handshake over an already-open transport and start the
/// connection task.
///
/// # Errors
///
/// Fails if the transport closes, the server refuses the namespace, or the
/// handshake takes longer than [`HANDSHAKE_TIMEOUT`].
pub async fn establish<W, R>(mut write: W, mut read: R) -> Result<Connection, ChannelError>
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin + Send + 'static,
    R: Stream<Item = Result<Message, tungstenite::Error>> + Unpin + Send + 'static,
{
    let handshake = tokio::time::timeout(HANDSHAKE_TIMEOUT, handshake(&mut write, &mut read))
        .await
        .map_err(|_| ChannelError::HandshakeTimeout(HANDSHAKE_TIMEOUT))??;
    info!(sid = %handshake.sid, ping_interval = handshake.ping_interval, "socket connected");

    let subscriptions = Subscriptions::new();
    let (tx, rx) = mpsc::unbounded();
    let heartbeat = Duration::from_millis(handshake.ping_interval + handshake.ping_timeout);
    let task = tokio::spawn(run_connection(write, read, rx, subscriptions.clone(), heartbeat));

    Ok(Connection { channel: SocketChannel { tx }, subscriptions, handshake, task })
}

async fn handshake<W, R>(write: &mut W, read: &mut R) -> Result<Handshake, ChannelError>
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
    R: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    let handshake = loop {
        match read_packet(read).await? {
            Some(Packet::Open(handshake)) => break handshake,
            Some(_) => return Err(ChannelError::Handshake("engine open packet")),
            None => {}
        }
    };

    send_packet(write, &Packet::Connect { namespace: DEFAULT_NAMESPACE.to_owned(), data: None }).await?;

    loop {
        match read_packet(read).await? {
            Some(Packet::Connect { .. }) => return Ok(handshake),
            Some(Packet::ConnectError { data, .. }) => {
                let reason = data
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map_or_else(|| data.to_string(), ToOwned::to_owned);
                return Err(ChannelError::Refused(reason));
            }
            Some(Packet::Ping) => send_packet(write, &Packet::Pong).await?,
            Some(Packet::Close) => return Err(ChannelError::Closed),
            Some(other) => debug!(?other, "ignoring packet before namespace connect"),
            None => {}
        }
    }
}

async fn run_connection<W, R>(
    mut write: W,
    mut read: R,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    subscriptions: Subscriptions,
    heartbeat: Duration,
) -> Result<(), ChannelError>
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
    R: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    let result = pump(&mut write, &mut read, &mut outbound, &subscriptions, heartbeat).await;
    subscriptions.close();
    match &result {
        Ok(()) => info!("socket disconnected"),
        Err(e) => warn!(error = %e, "socket connection lost"),
    }
    result
}

async fn pump<W, R>(
    write: &mut W,
    read: &mut R,
    outbound: &mut mpsc::UnboundedReceiver<Outbound>,
    subscriptions: &Subscriptions,
    heartbeat: Duration,
) -> Result<(), ChannelError>
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
    R: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    let mut deadline = Instant::now() + heartbeat;

    loop {
        tokio::select! {
            packet = read_packet(read) => match packet? {
                Some(Packet::Ping) => {
                    deadline = Instant::now() + heartbeat;
                    send_packet(write, &Packet::Pong).await?;
                }
                Some(Packet::Event { name, payload, .. }) => {
                    let deliveries = subscriptions.publish(&name, &payload);
                    debug!(event = %name, deliveries, "inbound event");
                }
                Some(Packet::Close | Packet::Disconnect { .. }) => return Ok(()),
                Some(other) => debug!(?other, "ignoring packet"),
                None => {}
            },
            event = outbound.next() => match event {
                Some(event) => {
                    debug!(event = event.name(), "outbound event");
                    send_packet(write, &event.to_packet()).await?;
                }
                None => {
                    // Every emit handle is gone; the client is done.
                    if let Err(e) = write.close().await {
                        debug!(error = %e, "websocket close failed");
                    }
                    return Ok(());
                }
            },
            () = tokio::time::sleep_until(deadline) => {
                return Err(ChannelError::HeartbeatTimeout(heartbeat));
            }
        }
    }
}

/// Read the next websocket message as a packet.
///
/// Returns `Ok(None)` for frames that carry no packet (binary, websocket
/// ping/pong) and for text that fails to decode, which is logged.
async fn read_packet<R>(read: &mut R) -> Result<Option<Packet>, ChannelError>
where
    R: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    match read.next().await {
        None | Some(Ok(Message::Close(_))) => Err(ChannelError::Closed),
        Some(Err(e)) => Err(e.into()),
        Some(Ok(Message::Text(text))) => match packet::decode(text.as_str()) {
            Ok(packet) => Ok(Some(packet)),
            Err(e) => {
                warn!(error = %e, "dropping undecodable packet");
                Ok(None)
            }
        },
        Some(Ok(_)) => Ok(None),
    }
}

async fn send_packet<W>(write: &mut W, packet: &Packet) -> Result<(), ChannelError>
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    write.send(Message::Text(packet::encode(packet).into())).await?;
    Ok(())
}
