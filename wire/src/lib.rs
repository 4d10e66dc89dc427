//! Shared event vocabulary for the room chat protocol.
//!
//! This crate owns the wire representation exchanged with the chat server:
//! the named events in both directions, their payload shapes, and the
//! Socket.IO text packet framing that carries them (see [`packet`]).
//! Payload field names are fixed by the server and must not change.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use time::OffsetDateTime;

pub mod packet;

pub use packet::{CodecError, Handshake, Packet};

/// Event names used on the channel.
pub mod event {
    /// Inbound: full message history, sent once right after a join.
    pub const HISTORY: &str = "history";
    /// Inbound and outbound: a single chat message.
    pub const CHAT_MESSAGE: &str = "chat message";
    /// Inbound: a remote user started typing.
    pub const USER_TYPING: &str = "user typing";
    /// Inbound: the remote typer stopped.
    pub const USER_STOPPED_TYPING: &str = "user stopped typing";
    /// Inbound: the current room roster.
    pub const UPDATE_USER_LIST: &str = "update user list";
    /// Outbound: enter a room.
    pub const JOIN_ROOM: &str = "join room";
    /// Outbound: local user is typing.
    pub const TYPING: &str = "typing";
    /// Outbound: local user stopped typing.
    pub const STOP_TYPING: &str = "stop typing";

    /// Every inbound event name the session consumes.
    pub const INBOUND: [&str; 5] = [HISTORY, CHAT_MESSAGE, USER_TYPING, USER_STOPPED_TYPING, UPDATE_USER_LIST];
}

/// Error returned by [`Inbound::decode`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The event name is not part of the inbound vocabulary.
    #[error("unknown inbound event `{0}`")]
    UnknownEvent(String),
    /// The payload did not match the shape expected for the event.
    #[error("malformed `{event}` payload: {source}")]
    Payload {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Who authored a [`Message`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Written by a room member.
    #[default]
    Message,
    /// Generated by the server (joins, leaves).
    Notification,
}

/// A chat line as delivered by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Serialized as `type`; servers that omit it get [`MessageKind::Message`].
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

impl Message {
    /// A user-authored message stamped with `created_at`.
    #[must_use]
    pub fn from_user(text: impl Into<String>, username: impl Into<String>, created_at: OffsetDateTime) -> Self {
        Self {
            text: text.into(),
            username: Some(username.into()),
            kind: MessageKind::Message,
            created_at: Some(created_at),
        }
    }

    /// A server notification with no author.
    #[must_use]
    pub fn notification(text: impl Into<String>) -> Self {
        Self { text: text.into(), username: None, kind: MessageKind::Notification, created_at: None }
    }
}

/// An event received from the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound {
    History(Vec<Message>),
    ChatMessage(Message),
    UserTyping(String),
    UserStoppedTyping,
    UserList(Vec<String>),
}

impl Inbound {
    /// Decode a named event and its JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownEvent`] for names outside
    /// [`event::INBOUND`] and [`DecodeError::Payload`] when the payload shape
    /// does not match.
    pub fn decode(name: &str, payload: Value) -> Result<Self, DecodeError> {
        match name {
            event::HISTORY => parse(event::HISTORY, payload).map(Self::History),
            event::CHAT_MESSAGE => parse(event::CHAT_MESSAGE, payload).map(Self::ChatMessage),
            event::USER_TYPING => parse(event::USER_TYPING, payload).map(Self::UserTyping),
            // Carries no payload; anything the server attaches is ignored.
            event::USER_STOPPED_TYPING => Ok(Self::UserStoppedTyping),
            event::UPDATE_USER_LIST => parse(event::UPDATE_USER_LIST, payload).map(Self::UserList),
            other => Err(DecodeError::UnknownEvent(other.to_owned())),
        }
    }

    /// Wire name of this event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::History(_) => event::HISTORY,
            Self::ChatMessage(_) => event::CHAT_MESSAGE,
            Self::UserTyping(_) => event::USER_TYPING,
            Self::UserStoppedTyping => event::USER_STOPPED_TYPING,
            Self::UserList(_) => event::UPDATE_USER_LIST,
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(event: &'static str, payload: Value) -> Result<T, DecodeError> {
    serde_json::from_value(payload).map_err(|source| DecodeError::Payload { event, source })
}

/// An event sent to the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outbound {
    JoinRoom { room: String, username: String },
    ChatMessage { room: String, message: String, username: String },
    Typing { room: String, username: String },
    StopTyping { room: String },
}

impl Outbound {
    /// Wire name of this event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinRoom { .. } => event::JOIN_ROOM,
            Self::ChatMessage { .. } => event::CHAT_MESSAGE,
            Self::Typing { .. } => event::TYPING,
            Self::StopTyping { .. } => event::STOP_TYPING,
        }
    }

    /// JSON payload exactly as the server expects it.
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::JoinRoom { room, username } | Self::Typing { room, username } => {
                json!({ "room": room, "username": username })
            }
            Self::ChatMessage { room, message, username } => {
                json!({ "room": room, "message": message, "username": username })
            }
            Self::StopTyping { room } => json!({ "room": room }),
        }
    }

    /// Frame this event as a Socket.IO event packet on the default namespace.
    #[must_use]
    pub fn to_packet(&self) -> Packet {
        Packet::Event {
            namespace: packet::DEFAULT_NAMESPACE.to_owned(),
            ack_id: None,
            name: self.name().to_owned(),
            payload: self.payload(),
        }
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
