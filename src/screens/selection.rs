//! Speaker-selection page: one tappable row per discovered speaker.
//!
//! # Visual Layout
//!
//! ```text
//! +----------------------------------+
//! |                             [X]  |
//! |   +--------------------------+   |
//! |   |         Kitchen          |   |
//! |   +--------------------------+   |
//! |   +--------------------------+   |
//! |   |       Living Room        |   |
//! |   +--------------------------+   |
//! |                                  |
//! +----------------------------------+
//! ```
//!
//! Rows stack top to bottom in listing order, stepping
//! [`LIST_STEP_Y`](crate::config::LIST_STEP_Y) pixels so a 20 px gap
//! separates them. Tapping a row hands the chosen name back to the caller;
//! tapping the close control ends the session. The screen is handed over
//! still showing the list: the now-playing page repaints the same device
//! from scratch, so there is no farewell clear here.

use std::path::Path;
use std::thread;

use anyhow::{Result, anyhow};
use log::{debug, info};

use crate::button::Button;
use crate::calibration::Calibration;
use crate::config::{LIST_HEIGHT, LIST_MARGIN, LIST_START_Y, LIST_STEP_Y, LIST_X, PanelConfig, TICK};
use crate::error::PanelError;
use crate::fb::{Console, FbSink, FrameSink};
use crate::screen::Screen;
use crate::speaker::SpeakerControl;
use crate::styles::FONT_STD;
use crate::touch::TouchReader;

use super::close_button;

// =============================================================================
// Page State
// =============================================================================

/// What a handled tap means for the selection loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The close control was tapped; the session is over.
    Close,
    /// A speaker row was tapped.
    Chosen(String),
}

/// Speaker-selection page: the screen plus its tappable rows.
pub struct SelectionPage<S: FrameSink> {
    screen: Screen<S>,
    rows: Vec<Button>,
    close: Button,
}

impl<S: FrameSink> SelectionPage<S> {
    /// Draw one row per name and the close control, then flush.
    pub fn new(
        mut screen: Screen<S>,
        names: &[String],
    ) -> Result<Self, PanelError> {
        let row_width = screen.width().saturating_sub(LIST_MARGIN);
        let rows: Vec<Button> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                Button::new(
                    name,
                    LIST_X,
                    LIST_START_Y + i as i32 * LIST_STEP_Y,
                    row_width,
                    LIST_HEIGHT,
                    FONT_STD,
                )
            })
            .collect();
        let close = close_button();

        for row in &rows {
            screen.draw_button(row);
        }
        screen.draw_button(&close);
        screen.flush()?;
        Ok(Self { screen, rows, close })
    }

    /// Route a calibrated tap through the page's hit tests.
    pub fn handle_tap(
        &self,
        x: i32,
        y: i32,
    ) -> Option<SelectionOutcome> {
        if self.close.contains(x, y) {
            return Some(SelectionOutcome::Close);
        }
        self.rows
            .iter()
            .find(|row| row.contains(x, y))
            .map(|row| SelectionOutcome::Chosen(row.label().to_owned()))
    }
}

// =============================================================================
// Page Loop
// =============================================================================

/// Run the selection page until a speaker is chosen or the page is closed.
///
/// Returns the chosen speaker name, or `None` when the close control ends
/// the session. The screen is left showing the list on return; the caller
/// decides whether a farewell clear follows.
pub fn run_selection<C: SpeakerControl>(
    config: &PanelConfig,
    cal: &Calibration,
    speaker: &C,
) -> Result<Option<String>> {
    let names = speaker
        .list_names()
        .map_err(|e| anyhow!("speaker listing failed: {e}"))?;
    info!("selection page: {} speakers discovered", names.len());

    let sink = FbSink::open(Path::new(&config.fb_path))?;
    let console = Console::new(Path::new(&config.console_path));
    let page = SelectionPage::new(Screen::new(sink, console)?, &names)?;
    let mut touch = TouchReader::open(Path::new(&config.touch_path), *cal)?;

    loop {
        thread::sleep(TICK);
        let Some((x, y)) = touch.poll()? else { continue };
        debug!("selection tap at ({x}, {y})");
        match page.handle_tap(x, y) {
            Some(SelectionOutcome::Close) => return Ok(None),
            Some(SelectionOutcome::Chosen(name)) => {
                info!("speaker \"{name}\" chosen");
                return Ok(Some(name));
            }
            None => {}
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
