//! Client-side chat session: the single owner of room state.
//!
//! DESIGN
//! ======
//! Every mutation goes through a method on [`Session`], driven by one of
//! three sources: an inbound channel event ([`Session::apply`]), a user
//! action (`join`, `send`, `update_draft`, `notify_typing`), or the typing
//! countdown ([`Session::poll_typing`]). The event loop serializes those
//! sources, so no locking happens here.
//!
//! After each visible change the session raises a flag on its
//! [`PresentationSync`]; it never calls into the view directly.
//!
//! ECHO HANDLING
//! =============
//! A sent message is appended locally right away, and the server also
//! broadcasts it back to the sender. To keep one copy, each local send
//! records its text as a pending echo; the first inbound `chat message`
//! from our own username with matching text consumes that entry instead of
//! being appended. The queue is bounded for servers that never echo, and
//! suppression can be turned off entirely.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::VecDeque;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::time::Instant;
use tracing::{debug, info};
use wire::{Inbound, Message, MessageKind, Outbound};

use crate::net::channel::Channel;
use crate::presentation::{PresentationSync, View};
use crate::state::typing::{DEFAULT_TYPING_TIMEOUT, TypingDebouncer};

/// Upper bound on sent messages still waiting for their server echo.
const MAX_PENDING_ECHOES: usize = 32;

/// Tunables for a [`Session`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionOptions {
    pub typing_timeout: Duration,
    pub suppress_echo: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { typing_timeout: DEFAULT_TYPING_TIMEOUT, suppress_echo: true }
    }
}

/// Everything the view reads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    room: String,
    username: String,
    logged_in: bool,
    messages: Vec<Message>,
    roster: Vec<String>,
    typing_user: Option<String>,
    draft: String,
    history_generation: u64,
}

impl SessionState {
    #[must_use]
    pub fn room(&self) -> &str {
        &self.room
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn logged_in(&self) -> bool {
        self.logged_in
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Usernames in the room, in server order without duplicates.
    #[must_use]
    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    #[must_use]
    pub fn typing_user(&self) -> Option<&str> {
        self.typing_user.as_deref()
    }

    /// The compose buffer.
    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Incremented whenever history replaces the message list.
    #[must_use]
    pub fn history_generation(&self) -> u64 {
        self.history_generation
    }
}

pub struct Session<C> {
    channel: C,
    state: SessionState,
    typing: TypingDebouncer,
    presentation: PresentationSync,
    pending_echoes: VecDeque<String>,
    suppress_echo: bool,
}

impl<C: Channel> Session<C> {
    pub fn new(channel: C) -> Self {
        Self::with_options(channel, SessionOptions::default())
    }

    pub fn with_options(channel: C, options: SessionOptions) -> Self {
        Self {
            channel,
            state: SessionState::default(),
            typing: TypingDebouncer::new(options.typing_timeout),
            presentation: PresentationSync::default(),
            pending_echoes: VecDeque::new(),
            suppress_echo: options.suppress_echo,
        }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn channel(&self) -> &C {
        &self.channel
    }

    #[must_use]
    pub fn presentation(&self) -> &PresentationSync {
        &self.presentation
    }

    /// When the event loop must next call [`Session::poll_typing`].
    #[must_use]
    pub fn typing_deadline(&self) -> Option<Instant> {
        self.typing.deadline()
    }

    // =========================================================================
    // USER ACTIONS
    // =========================================================================

    /// Enter `room` as `username`.
    ///
    /// Both values are trimmed and must be non-empty; otherwise nothing
    /// happens. Login is optimistic: the `join room` emit is not acknowledged.
    /// Identity is fixed for the session, so a second join is ignored.
    /// Returns whether this call logged the session in.
    pub fn join(&mut self, room: &str, username: &str) -> bool {
        let room = room.trim();
        let username = username.trim();
        if room.is_empty() || username.is_empty() {
            debug!("join ignored: room and username are required");
            return false;
        }
        if self.state.logged_in {
            debug!(room = %self.state.room, "join ignored: already in a room");
            return false;
        }

        self.state.room = room.to_owned();
        self.state.username = username.to_owned();
        self.state.logged_in = true;
        info!(%room, %username, "joining room");
        self.channel.emit(Outbound::JoinRoom { room: room.to_owned(), username: username.to_owned() });
        self.presentation.request_render();
        true
    }

    /// Send `text` to the room. Whitespace-only text is ignored.
    ///
    /// Appends the message locally, emits `chat message` then `stop typing`,
    /// cancels the typing countdown, and clears the compose buffer.
    pub fn send(&mut self, text: &str) -> bool {
        if !self.state.logged_in || text.trim().is_empty() {
            return false;
        }

        let message = Message::from_user(text, self.state.username.clone(), OffsetDateTime::now_utc());
        self.state.messages.push(message);
        if self.suppress_echo {
            if self.pending_echoes.len() == MAX_PENDING_ECHOES {
                self.pending_echoes.pop_front();
            }
            self.pending_echoes.push_back(text.to_owned());
        }

        self.channel.emit(Outbound::ChatMessage {
            room: self.state.room.clone(),
            message: text.to_owned(),
            username: self.state.username.clone(),
        });
        self.channel.emit(Outbound::StopTyping { room: self.state.room.clone() });
        self.typing.cancel();
        self.state.draft.clear();
        self.presentation.request_scroll_to_latest();
        true
    }

    /// Send whatever is in the compose buffer.
    pub fn send_draft(&mut self) -> bool {
        let text = self.state.draft.clone();
        self.send(&text)
    }

    /// Replace the compose buffer and signal typing activity.
    pub fn update_draft(&mut self, text: &str, now: Instant) {
        if !self.state.logged_in {
            return;
        }
        text.clone_into(&mut self.state.draft);
        self.presentation.request_render();
        self.notify_typing(now);
    }

    /// Emit `typing` and restart the stop countdown from `now`.
    ///
    /// Every call emits; only the stop notification is debounced.
    pub fn notify_typing(&mut self, now: Instant) {
        if !self.state.logged_in {
            return;
        }
        self.channel.emit(Outbound::Typing { room: self.state.room.clone(), username: self.state.username.clone() });
        self.typing.restart(now);
    }

    /// Emit `stop typing` if the countdown has elapsed by `now`.
    pub fn poll_typing(&mut self, now: Instant) {
        if self.typing.expire(now) {
            debug!(room = %self.state.room, "typing countdown elapsed");
            self.channel.emit(Outbound::StopTyping { room: self.state.room.clone() });
        }
    }

    // =========================================================================
    // INBOUND EVENTS
    // =========================================================================

    /// Apply one inbound event.
    pub fn apply(&mut self, event: Inbound) {
        match event {
            Inbound::History(messages) => self.receive_history(messages),
            Inbound::ChatMessage(message) => self.receive_message(message),
            Inbound::UserTyping(username) => self.receive_typing(username),
            Inbound::UserStoppedTyping => self.receive_stopped_typing(),
            Inbound::UserList(users) => self.receive_roster(users),
        }
    }

    /// Replace the message list wholesale.
    pub fn receive_history(&mut self, messages: Vec<Message>) {
        debug!(count = messages.len(), "history received");
        self.state.messages = messages;
        self.state.history_generation += 1;
        self.pending_echoes.clear();
        self.presentation.request_scroll_to_latest();
    }

    /// Append one message, unless it is the echo of our own send.
    pub fn receive_message(&mut self, message: Message) {
        if self.take_pending_echo(&message) {
            debug!("own message echo suppressed");
            return;
        }
        self.state.messages.push(message);
        self.presentation.request_scroll_to_latest();
    }

    pub fn receive_typing(&mut self, username: String) {
        self.state.typing_user = Some(username);
        self.presentation.request_render();
    }

    pub fn receive_stopped_typing(&mut self) {
        self.state.typing_user = None;
        self.presentation.request_render();
    }

    /// Replace the roster wholesale. Repeated names collapse to the first.
    pub fn receive_roster(&mut self, users: Vec<String>) {
        let mut roster: Vec<String> = Vec::with_capacity(users.len());
        for user in users {
            if !roster.contains(&user) {
                roster.push(user);
            }
        }
        self.state.roster = roster;
        self.presentation.request_render();
    }

    /// Ask for a redraw without changing state, e.g. after a theme switch.
    pub fn request_render(&mut self) {
        self.presentation.request_render();
    }

    /// Render and scroll if anything changed since the last flush.
    pub fn flush<V: View + ?Sized>(&mut self, view: &mut V) {
        self.presentation.flush(view, &self.state);
    }

    fn take_pending_echo(&mut self, message: &Message) -> bool {
        if !self.suppress_echo || message.kind != MessageKind::Message {
            return false;
        }
        if message.username.as_deref() != Some(self.state.username.as_str()) {
            return false;
        }
        match self.pending_echoes.iter().position(|text| *text == message.text) {
            Some(index) => {
                self.pending_echoes.remove(index);
                true
            }
            None => false,
        }
    }
}
