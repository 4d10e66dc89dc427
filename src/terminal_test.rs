use super::*;
use crate::net::channel::RecordingChannel;
use crate::state::session::Session;

fn session() -> Session<RecordingChannel> {
    let mut session = Session::new(RecordingChannel::default());
    session.join("lobby", "bob");
    session
}

fn chat(text: &str, username: &str) -> Message {
    Message { text: text.to_owned(), username: Some(username.to_owned()), kind: MessageKind::Message, created_at: None }
}

fn output(view: TerminalView<Vec<u8>>) -> String {
    String::from_utf8(view.into_inner()).expect("utf8 output")
}

struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
    }
}

// =============================================================
// Rendering
// =============================================================

#[test]
fn nothing_is_drawn_before_login() {
    let mut view = TerminalView::new(Vec::new(), false);
    view.render(Session::new(RecordingChannel::default()).state()).expect("render");
    assert_eq!(output(view), "");
}

#[test]
fn first_render_announces_join_then_history() {
    let mut session = session();
    session.receive_history(vec![Message::notification("alice joined"), chat("hi", "alice")]);

    let mut view = TerminalView::new(Vec::new(), false);
    view.render(session.state()).expect("render");

    assert_eq!(
        output(view),
        "joined #lobby as bob\n-- 2 earlier messages --\n* alice joined\nalice: hi\n"
    );
}

#[test]
fn later_renders_print_only_new_content() {
    let mut session = session();
    let mut view = TerminalView::new(Vec::new(), false);
    view.render(session.state()).expect("render");

    session.receive_message(chat("one", "alice"));
    view.render(session.state()).expect("render");
    view.render(session.state()).expect("redundant render");
    session.receive_message(chat("two", "carol"));
    view.render(session.state()).expect("render");

    assert_eq!(output(view), "joined #lobby as bob\nalice: one\ncarol: two\n");
}

#[test]
fn history_replace_reprints_everything() {
    let mut session = session();
    let mut view = TerminalView::new(Vec::new(), false);
    session.receive_message(chat("old", "alice"));
    view.render(session.state()).expect("render");

    session.receive_history(vec![chat("new", "alice")]);
    view.render(session.state()).expect("render");

    assert_eq!(
        output(view),
        "joined #lobby as bob\nalice: old\n-- 1 earlier messages --\nalice: new\n"
    );
}

#[test]
fn roster_and_typing_changes_are_announced_once() {
    let mut session = session();
    let mut view = TerminalView::new(Vec::new(), false);
    session.receive_roster(vec!["alice".to_owned(), "bob".to_owned()]);
    session.receive_typing("alice".to_owned());
    view.render(session.state()).expect("render");
    view.render(session.state()).expect("redundant render");

    session.receive_stopped_typing();
    view.render(session.state()).expect("render");
    session.receive_typing("alice".to_owned());
    view.render(session.state()).expect("render");

    assert_eq!(
        output(view),
        "joined #lobby as bob\nin room: alice, bob\nalice is typing...\nalice is typing...\n"
    );
}

#[test]
fn timestamps_are_shown_when_present() {
    let mut session = session();
    let created_at = time::OffsetDateTime::from_unix_timestamp(1_714_564_800 + 9 * 60).expect("timestamp");
    session.receive_message(Message::from_user("hi", "alice", created_at));

    let mut view = TerminalView::new(Vec::new(), false);
    view.render(session.state()).expect("render");
    assert!(output(view).ends_with("[12:09] alice: hi\n"));
}

#[test]
fn ansi_output_colors_usernames_by_palette() {
    let mut session = session();
    session.receive_message(chat("hi", "alice"));

    let mut view = TerminalView::new(Vec::new(), true);
    view.render(session.state()).expect("render");

    let expected = format!("{}alice{ANSI_RESET}: hi", ansi_foreground(username_color("alice")));
    assert!(output(view).contains(&expected));
}

#[test]
fn dark_mode_switches_notice_color() {
    let session = session();
    let mut view = TerminalView::new(Vec::new(), true);
    view.set_dark_mode(true);
    view.render(session.state()).expect("render");
    assert!(output(view).starts_with(&ansi_foreground(NOTICE_COLOR_DARK)));
}

#[test]
fn remote_control_sequences_are_neutralized() {
    let mut session = session();
    session.receive_message(chat("hi\x1b[2J\x1b]0;owned\x07\r", "ev\x1b[31mil"));
    session.receive_roster(vec!["a\x1b[H".to_owned()]);
    session.receive_typing("t\u{9b}2J".to_owned());

    let mut view = TerminalView::new(Vec::new(), false);
    view.render(session.state()).expect("render");
    let out = output(view);

    assert!(!out.contains('\x1b'));
    assert!(!out.contains('\r'));
    assert!(!out.contains('\x07'));
    assert!(!out.contains('\u{9b}'));
    assert!(out.contains("ev\u{fffd}[31mil: hi\u{fffd}[2J\u{fffd}]0;owned\u{fffd}\u{fffd}\n"));
    assert!(out.contains("in room: a\u{fffd}[H\n"));
    assert!(out.contains("t\u{fffd}2J is typing...\n"));
}

#[test]
fn sanitize_leaves_plain_text_borrowed() {
    assert!(matches!(sanitize("héllo, wörld"), Cow::Borrowed("héllo, wörld")));
    assert_eq!(sanitize("a\nb\tc\u{7f}"), "a\u{fffd}b\u{fffd}c\u{fffd}");
}

// =============================================================
// Failures
// =============================================================

#[test]
fn write_failures_surface_as_view_errors() {
    let session = session();
    let mut view = TerminalView::new(BrokenPipe, false);
    assert!(matches!(view.render(session.state()), Err(ViewError::Io(_))));
    assert!(matches!(view.scroll_to_latest(), Err(ViewError::Io(_))));
}
