//! Bridge from session mutations to the view.
//!
//! The session only raises flags here; nothing is drawn until the event loop
//! calls [`PresentationSync::flush`] at the end of a turn. A scroll request
//! is held until after the render that follows it, since the position of the
//! latest message is unknown before layout.

#[cfg(test)]
#[path = "presentation_test.rs"]
mod presentation_test;

use tracing::warn;

use crate::state::session::SessionState;

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("view output failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("scroll target unavailable")]
    NoScrollTarget,
}

/// A concrete presenter of session state.
pub trait View {
    /// Draw the current state. Must tolerate redundant calls.
    fn render(&mut self, state: &SessionState) -> Result<(), ViewError>;

    /// Bring the most recent message into view.
    fn scroll_to_latest(&mut self) -> Result<(), ViewError>;

    /// Switch between the light and dark palette.
    fn set_dark_mode(&mut self, _enabled: bool) {}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PresentationSync {
    render_requested: bool,
    scroll_pending: bool,
}

impl PresentationSync {
    pub fn request_render(&mut self) {
        self.render_requested = true;
    }

    /// Scroll after the next render. Implies a render.
    pub fn request_scroll_to_latest(&mut self) {
        self.render_requested = true;
        self.scroll_pending = true;
    }

    #[must_use]
    pub fn render_requested(&self) -> bool {
        self.render_requested
    }

    #[must_use]
    pub fn scroll_pending(&self) -> bool {
        self.scroll_pending
    }

    /// Run the pending render, then the pending scroll.
    ///
    /// View failures are logged and dropped; both flags are cleared either way.
    pub fn flush<V: View + ?Sized>(&mut self, view: &mut V, state: &SessionState) {
        if std::mem::take(&mut self.render_requested) {
            if let Err(e) = view.render(state) {
                warn!(error = %e, "render failed");
            }
        }
        if std::mem::take(&mut self.scroll_pending) {
            if let Err(e) = view.scroll_to_latest() {
                warn!(error = %e, "scroll to latest failed");
            }
        }
    }
}
