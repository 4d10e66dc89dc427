//! Terminal client for room-based realtime chat.
//!
//! The crate splits into:
//! - [`state`]: the session and typing debouncer, independent of I/O
//! - [`net`]: the channel contract and its Socket.IO websocket adapter
//! - [`presentation`]: render/scroll scheduling and the [`presentation::View`] seam
//! - [`client`]: the event loop tying those together
//! - [`terminal`]: a line-oriented view for stdout

pub mod client;
pub mod config;
pub mod net;
pub mod presentation;
pub mod state;
pub mod terminal;
pub mod util;
