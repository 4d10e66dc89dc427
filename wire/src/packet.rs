//! Engine.IO v4 / Socket.IO v5 text packet codec.
//!
//! DESIGN
//! ======
//! Every websocket text message is one Engine.IO packet: a single type digit
//! followed by an optional body. Type `4` ("message") wraps a Socket.IO
//! packet, which adds its own type digit, an optional `/namespace,` prefix,
//! an optional numeric ack id, and a JSON body:
//!
//! ```text
//! 0{"sid":"..","pingInterval":25000,"pingTimeout":20000}   open
//! 2 / 3                                                    ping / pong
//! 40                                                       connect "/"
//! 42["chat message",{"text":"hi"}]                         event
//! 42/admin,7["typing",{"room":"r"}]                        event, ns + ack
//! ```
//!
//! Binary attachments, acks, and transport upgrades never occur on this
//! protocol and decode to [`CodecError::Unsupported`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The namespace every chat event travels on.
pub const DEFAULT_NAMESPACE: &str = "/";

/// Error returned by [`decode`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("empty packet")]
    Empty,
    #[error("unknown packet type `{0}`")]
    UnknownType(char),
    #[error("unsupported packet: {0}")]
    Unsupported(&'static str),
    #[error("invalid ack id")]
    InvalidAckId,
    #[error("event packet must be an array starting with the event name")]
    MalformedEvent,
    #[error("invalid packet JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Engine.IO open handshake sent by the server as the first packet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Milliseconds between server pings.
    pub ping_interval: u64,
    /// Milliseconds the server waits for a pong.
    pub ping_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

/// One decoded packet.
#[derive(Clone, Debug, PartialEq)]
pub enum Packet {
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Noop,
    Connect { namespace: String, data: Option<Value> },
    Disconnect { namespace: String },
    Event { namespace: String, ack_id: Option<u64>, name: String, payload: Value },
    ConnectError { namespace: String, data: Value },
}

/// Encode a packet into its websocket text form.
///
/// An event whose payload is `null` is written with the name only, matching
/// how servers emit payload-less events.
#[must_use]
pub fn encode(packet: &Packet) -> String {
    match packet {
        // Serializing a plain struct of strings and integers cannot fail.
        Packet::Open(handshake) => format!("0{}", serde_json::to_string(handshake).unwrap_or_default()),
        Packet::Close => "1".to_owned(),
        Packet::Ping => "2".to_owned(),
        Packet::Pong => "3".to_owned(),
        Packet::Noop => "6".to_owned(),
        Packet::Connect { namespace, data } => {
            let body = data.as_ref().map(Value::to_string).unwrap_or_default();
            format!("40{}{body}", namespace_prefix(namespace))
        }
        Packet::Disconnect { namespace } => format!("41{}", namespace_prefix(namespace)),
        Packet::Event { namespace, ack_id, name, payload } => {
            let args = if payload.is_null() {
                Value::Array(vec![Value::String(name.clone())])
            } else {
                Value::Array(vec![Value::String(name.clone()), payload.clone()])
            };
            let ack = ack_id.map(|id| id.to_string()).unwrap_or_default();
            format!("42{}{ack}{args}", namespace_prefix(namespace))
        }
        Packet::ConnectError { namespace, data } => format!("44{}{data}", namespace_prefix(namespace)),
    }
}

/// Decode one websocket text message.
///
/// # Errors
///
/// Returns a [`CodecError`] for empty input, unknown or unsupported packet
/// types, bad ack ids, and malformed JSON bodies.
pub fn decode(raw: &str) -> Result<Packet, CodecError> {
    let mut chars = raw.chars();
    let kind = chars.next().ok_or(CodecError::Empty)?;
    let rest = chars.as_str();

    match kind {
        '0' => Ok(Packet::Open(serde_json::from_str(rest)?)),
        '1' => Ok(Packet::Close),
        // Ping/pong may carry a "probe" body during upgrades; it is irrelevant here.
        '2' => Ok(Packet::Ping),
        '3' => Ok(Packet::Pong),
        '4' => decode_socket(rest),
        '5' => Err(CodecError::Unsupported("transport upgrade")),
        '6' => Ok(Packet::Noop),
        other => Err(CodecError::UnknownType(other)),
    }
}

fn decode_socket(raw: &str) -> Result<Packet, CodecError> {
    let mut chars = raw.chars();
    let kind = chars.next().ok_or(CodecError::Empty)?;
    let (namespace, rest) = split_namespace(chars.as_str());

    match kind {
        '0' => {
            let data = if rest.is_empty() { None } else { Some(serde_json::from_str(rest)?) };
            Ok(Packet::Connect { namespace, data })
        }
        '1' => Ok(Packet::Disconnect { namespace }),
        '2' => {
            let (ack_id, body) = split_ack_id(rest)?;
            let Value::Array(mut args) = serde_json::from_str::<Value>(body)? else {
                return Err(CodecError::MalformedEvent);
            };
            if args.is_empty() {
                return Err(CodecError::MalformedEvent);
            }
            let Value::String(name) = args.remove(0) else {
                return Err(CodecError::MalformedEvent);
            };
            let payload = args.into_iter().next().unwrap_or(Value::Null);
            Ok(Packet::Event { namespace, ack_id, name, payload })
        }
        '3' => Err(CodecError::Unsupported("ack")),
        '4' => {
            let data = if rest.is_empty() { Value::Null } else { serde_json::from_str(rest)? };
            Ok(Packet::ConnectError { namespace, data })
        }
        '5' | '6' => Err(CodecError::Unsupported("binary attachment")),
        other => Err(CodecError::UnknownType(other)),
    }
}

fn namespace_prefix(namespace: &str) -> String {
    if namespace == DEFAULT_NAMESPACE || namespace.is_empty() {
        String::new()
    } else {
        format!("{namespace},")
    }
}

/// Split a leading `/namespace,` off a socket packet body.
fn split_namespace(raw: &str) -> (String, &str) {
    if !raw.starts_with('/') {
        return (DEFAULT_NAMESPACE.to_owned(), raw);
    }
    match raw.split_once(',') {
        Some((namespace, rest)) => (namespace.to_owned(), rest),
        None => (raw.to_owned(), ""),
    }
}

fn split_ack_id(raw: &str) -> Result<(Option<u64>, &str), CodecError> {
    let digits = raw.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Ok((None, raw));
    }
    let (id, body) = raw.split_at(digits);
    let id = id.parse::<u64>().map_err(|_| CodecError::InvalidAckId)?;
    Ok((Some(id), body))
}

#[cfg(test)]
#[path = "packet_test.rs"]
mod tests;
