//! Line-oriented terminal presenter.
//!
//! The transcript is append-only output, so rendering prints only what is
//! new since the previous render: fresh messages, a changed roster, or a
//! changed typing indicator. A history replace reprints the whole list.
//!
//! Text supplied by other room members is printed only after [`sanitize`]
//! has replaced its control characters, so it cannot move the cursor, emit
//! escape sequences, or break out of its own line.

#[cfg(test)]
#[path = "terminal_test.rs"]
mod terminal_test;

use std::borrow::Cow;
use std::io::Write;

use wire::{Message, MessageKind};

use crate::presentation::{View, ViewError};
use crate::state::session::SessionState;
use crate::util::color::{ANSI_RESET, ansi_foreground, username_color};

const NOTICE_COLOR_LIGHT: &str = "#6b7280";
const NOTICE_COLOR_DARK: &str = "#9ca3af";

/// Shown in place of each control character in remote text.
const REPLACEMENT: char = '\u{fffd}';

/// Replace C0, DEL and C1 control characters with U+FFFD.
pub fn sanitize(text: &str) -> Cow<'_, str> {
    if text.chars().any(char::is_control) {
        Cow::Owned(text.chars().map(|c| if c.is_control() { REPLACEMENT } else { c }).collect())
    } else {
        Cow::Borrowed(text)
    }
}

pub struct TerminalView<W> {
    out: W,
    ansi: bool,
    dark_mode: bool,
    announced: bool,
    generation: u64,
    printed: usize,
    roster: Vec<String>,
    typing_user: Option<String>,
}

impl<W: Write> TerminalView<W> {
    /// `ansi` enables colored output.
    pub fn new(out: W, ansi: bool) -> Self {
        Self {
            out,
            ansi,
            dark_mode: false,
            announced: false,
            generation: 0,
            printed: 0,
            roster: Vec::new(),
            typing_user: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, hex: &str, text: &str) -> String {
        if self.ansi {
            format!("{}{text}{ANSI_RESET}", ansi_foreground(hex))
        } else {
            text.to_owned()
        }
    }

    fn notice(&self, text: &str) -> String {
        let hex = if self.dark_mode { NOTICE_COLOR_DARK } else { NOTICE_COLOR_LIGHT };
        self.paint(hex, text)
    }

    fn format_message(&self, message: &Message) -> String {
        let stamp = message
            .created_at
            .map(|t| format!("[{:02}:{:02}] ", t.hour(), t.minute()))
            .unwrap_or_default();
        let text = sanitize(&message.text);
        match (message.kind, message.username.as_deref()) {
            (MessageKind::Message, Some(username)) => {
                format!("{stamp}{}: {text}", self.paint(username_color(username), &sanitize(username)))
            }
            _ => format!("{stamp}{}", self.notice(&format!("* {text}"))),
        }
    }
}

impl<W: Write> View for TerminalView<W> {
    fn render(&mut self, state: &SessionState) -> Result<(), ViewError> {
        if !state.logged_in() {
            return Ok(());
        }
        if !self.announced {
            self.announced = true;
            let line = self.notice(&format!("joined #{} as {}", sanitize(state.room()), sanitize(state.username())));
            writeln!(self.out, "{line}")?;
        }

        if state.history_generation() != self.generation {
            self.generation = state.history_generation();
            self.printed = 0;
            let line = self.notice(&format!("-- {} earlier messages --", state.messages().len()));
            writeln!(self.out, "{line}")?;
        }
        let messages = state.messages();
        for message in messages.iter().skip(self.printed) {
            let line = self.format_message(message);
            writeln!(self.out, "{line}")?;
        }
        self.printed = messages.len();

        if state.roster() != self.roster.as_slice() {
            state.roster().clone_into(&mut self.roster);
            let names: Vec<Cow<'_, str>> = self.roster.iter().map(|name| sanitize(name)).collect();
            let line = self.notice(&format!("in room: {}", names.join(", ")));
            writeln!(self.out, "{line}")?;
        }

        if state.typing_user() != self.typing_user.as_deref() {
            self.typing_user = state.typing_user().map(ToOwned::to_owned);
            if let Some(user) = &self.typing_user {
                let line = self.notice(&format!("{} is typing...", sanitize(user)));
                writeln!(self.out, "{line}")?;
            }
        }
        Ok(())
    }

    fn scroll_to_latest(&mut self) -> Result<(), ViewError> {
        self.out.flush()?;
        Ok(())
    }

    fn set_dark_mode(&mut self, enabled: bool) {
        self.dark_mode = enabled;
    }
}
