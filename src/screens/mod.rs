//! Screen modules for the two interactive pages.
//!
//! # Page Flow
//!
//! 1. **Speaker Selection** ([`selection`]): one tappable row per discovered
//!    speaker, plus a close control
//! 2. **Now Playing** ([`now_playing`]): artwork, track metadata and
//!    transport buttons for the chosen speaker
//!
//! The main loop alternates between the two: closing the now-playing page
//! returns to selection, closing the selection page ends the session.
//!
//! # Event Handling
//!
//! Both pages share one loop shape: build the page, then tick at
//! [`crate::config::TICK`], polling the touchscreen once per tick and
//! routing released taps through the page's hit tests. The now-playing page
//! additionally reconciles remote track state on its own coarser poll
//! clock; touch handling always runs first within a tick.

mod now_playing;
mod selection;

pub use now_playing::run_now_playing;
pub use selection::run_selection;

use crate::button::Button;
use crate::colors::{BLACK, BLUE};
use crate::config::CLOSE_BUTTON;
use crate::styles::FONT_STD;

/// The "X" close control every page draws in its top-right corner.
fn close_button() -> Button {
    let (x, y, w, h) = CLOSE_BUTTON;
    Button::new("X", x, y, w, h, FONT_STD).with_colors(BLUE, BLACK)
}
