//! Session event loop.
//!
//! DESIGN
//! ======
//! One `select!` loop owns the session and serializes its three mutation
//! sources:
//! - inbound channel events, applied in delivery order
//! - user commands from the input side
//! - the typing countdown, armed only while a deadline is pending
//!
//! Each turn ends with a presentation flush, so the view sees every change
//! once the turn's mutation is complete.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use futures::{Stream, StreamExt};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};
use wire::Inbound;

use crate::net::channel::Channel;
use crate::presentation::View;
use crate::state::session::Session;
use crate::util::dark_mode::DarkMode;

/// A user action.
///
/// The line-based terminal produces `Join` once at login and the variants
/// [`Command::parse`] returns afterwards. `Draft` and `SendDraft` are for
/// front-ends that see individual keystrokes and keep the compose buffer in
/// the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Join { room: String, username: String },
    /// The compose buffer changed (a keystroke).
    Draft(String),
    /// Typing activity without a buffer.
    Typing,
    /// Send the compose buffer.
    SendDraft,
    Send(String),
    ToggleDarkMode,
    Quit,
}

impl Command {
    /// Interpret one line of terminal input.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "/quit" | "/exit" => Self::Quit,
            "/dark" => Self::ToggleDarkMode,
            "/typing" => Self::Typing,
            _ => Self::Send(line.to_owned()),
        }
    }
}

/// Why [`run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    /// The user quit or the input closed.
    Quit,
    /// The inbound event stream ended.
    Disconnected,
}

/// Drive `session` until the user quits or the channel goes away.
pub async fn run<C, V, I, U>(
    session: &mut Session<C>,
    view: &mut V,
    dark_mode: &mut DarkMode,
    mut inbound: I,
    mut commands: U,
) -> Exit
where
    C: Channel,
    V: View + ?Sized,
    I: Stream<Item = Inbound> + Unpin,
    U: Stream<Item = Command> + Unpin,
{
    view.set_dark_mode(dark_mode.enabled());
    session.request_render();
    session.flush(view);

    loop {
        let deadline = session.typing_deadline();
        let exit = tokio::select! {
            biased;
            event = inbound.next() => match event {
                Some(event) => {
                    debug!(event = event.name(), "applying inbound event");
                    session.apply(event);
                    None
                }
                None => Some(Exit::Disconnected),
            },
            command = commands.next() => match command {
                None | Some(Command::Quit) => Some(Exit::Quit),
                Some(command) => {
                    handle_command(session, view, dark_mode, command);
                    None
                }
            },
            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                session.poll_typing(Instant::now());
                None
            }
        };

        session.flush(view);
        if let Some(exit) = exit {
            info!(?exit, "session loop finished");
            return exit;
        }
    }
}

fn handle_command<C, V>(session: &mut Session<C>, view: &mut V, dark_mode: &mut DarkMode, command: Command)
where
    C: Channel,
    V: View + ?Sized,
{
    match command {
        Command::Join { room, username } => {
            session.join(&room, &username);
        }
        Command::Draft(text) => session.update_draft(&text, Instant::now()),
        Command::Typing => session.notify_typing(Instant::now()),
        Command::SendDraft => {
            session.send_draft();
        }
        Command::Send(text) => {
            session.send(&text);
        }
        Command::ToggleDarkMode => {
            view.set_dark_mode(dark_mode.toggle());
            session.request_render();
        }
        Command::Quit => {}
    }
}
