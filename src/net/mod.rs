//! Realtime channel: the contract the session talks to, and the websocket
//! connection that implements it.

pub mod channel;
pub mod socket;
