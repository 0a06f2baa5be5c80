//! Now-playing page: artwork, track metadata, and transport controls.
//!
//! # Visual Layout (320x480)
//!
//! ```text
//! +----------------------------------+
//! | Kitchen                     [X]  |
//! |       +----------------+         |
//! |       |                |         |
//! |       |    artwork     |         |
//! |       |    220x220     |         |
//! |       +----------------+         |
//! |           Track Title            |
//! |           Artist Name            |
//! |  +--------+         +--------+   |
//! |  | Pause  |         |  Mute  |   |
//! |  +--------+         +--------+   |
//! +----------------------------------+
//! ```
//!
//! The page keeps a cached [`TrackMetadata`] snapshot of what is on
//! screen. A monotonic reconciliation timer re-queries the speaker every
//! two seconds; only a changed artist or track triggers a re-render (with
//! a fresh artwork lookup), so an idle device costs no framebuffer
//! traffic. Within one tick, touch handling always runs before
//! reconciliation.
//!
//! Remote failures split two ways: the initial queries are fatal (there is
//! nothing to render without them), while failures during the loop are
//! logged and skipped, leaving the last good snapshot on screen.

use std::path::Path;
use std::thread;
use std::time::Instant;

use anyhow::{Result, anyhow};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::{debug, info, warn};

use crate::artwork::ArtworkSource;
use crate::button::Button;
use crate::calibration::Calibration;
use crate::colors::{BLACK, BLUE, LIGHT_GREY, WHITE};
use crate::config::{
    ART_CENTER_Y, ART_SIZE, ARTIST_Y, BAND_BOTTOM, BAND_TOP, MUTE_BUTTON, PLAY_BUTTON,
    PanelConfig, POLL_INTERVAL, TICK, TRACK_Y,
};
use crate::error::PanelError;
use crate::fb::{Console, FbSink, FrameSink};
use crate::screen::{Pos, Screen};
use crate::speaker::{PlaybackState, SpeakerControl, TrackMetadata};
use crate::styles::{FONT_BIG, FONT_STD};
use crate::touch::TouchReader;

use super::close_button;

// =============================================================================
// Page State
// =============================================================================

/// What a handled tap means for the now-playing loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// The close control was tapped; return to speaker selection.
    Close,
    /// Tap handled (or missed nothing tappable); keep looping.
    Stay,
}

/// Play-button label for a transport state; names the action a tap takes.
const fn play_label(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Playing => "Pause",
        _ => "Play",
    }
}

/// Mute-button label for a mute flag; names the action a tap takes.
const fn mute_label(muted: bool) -> &'static str {
    if muted { "Unmute" } else { "Mute" }
}

/// Now-playing page for one chosen speaker.
pub struct NowPlayingPage<'a, S: FrameSink, C: SpeakerControl, A: ArtworkSource> {
    screen: Screen<S>,
    speaker: &'a C,
    art: &'a A,
    name: String,
    snapshot: TrackMetadata,
    play: Button,
    mute: Button,
    close: Button,
}

impl<'a, S: FrameSink, C: SpeakerControl, A: ArtworkSource> NowPlayingPage<'a, S, C, A> {
    /// Build the page: speaker name, the now-playing region, and the
    /// transport buttons with labels matching the device's current state,
    /// all flushed in one frame.
    ///
    /// The initial remote queries are fatal; without them there is
    /// nothing meaningful to render.
    pub fn new(
        mut screen: Screen<S>,
        speaker: &'a C,
        art: &'a A,
        name: &str,
    ) -> Result<Self> {
        screen.draw_text(name, Pos::At(0), Pos::At(0), WHITE, FONT_STD);

        let snapshot = speaker
            .track_info(name)
            .map_err(|e| anyhow!("track query for \"{name}\" failed: {e}"))?;
        let state = speaker
            .transport_state(name)
            .map_err(|e| anyhow!("state query for \"{name}\" failed: {e}"))?;
        let muted = speaker
            .mute(name)
            .map_err(|e| anyhow!("mute query for \"{name}\" failed: {e}"))?;

        let (px, py, pw, ph) = PLAY_BUTTON;
        let (mx, my, mw, mh) = MUTE_BUTTON;
        let mut page = Self {
            screen,
            speaker,
            art,
            name: name.to_owned(),
            snapshot,
            play: Button::new(play_label(state), px, py, pw, ph, FONT_STD),
            mute: Button::new(mute_label(muted), mx, my, mw, mh, FONT_STD),
            close: close_button(),
        };
        page.render_now_playing();
        page.screen.draw_button(&page.play);
        page.screen.draw_button(&page.mute);
        page.screen.draw_button(&page.close);
        page.screen.flush()?;
        Ok(page)
    }

    /// Draw the now-playing region from the snapshot: artwork fitted to
    /// its box, the metadata band cleared, then track and artist lines.
    /// Does not flush.
    fn render_now_playing(&mut self) {
        info!(
            "now playing on \"{}\": \"{}\" by \"{}\"",
            self.name, self.snapshot.track, self.snapshot.artist
        );
        let tile = self.art.lookup(&self.snapshot.artist, &self.snapshot.track);
        let center_x = self.screen.width() as i32 / 2;
        self.screen.draw_image(
            &tile,
            ART_SIZE,
            ART_SIZE,
            Pos::Centered(center_x),
            Pos::Centered(ART_CENTER_Y),
            0,
        );

        let band_height = (BAND_BOTTOM - BAND_TOP + 1) as u32;
        let band = Rectangle::new(Point::new(0, BAND_TOP), Size::new(self.screen.width(), band_height));
        self.screen.fill_rect(band, BLACK);
        self.screen.draw_text(
            &self.snapshot.track,
            Pos::Centered(center_x),
            Pos::At(TRACK_Y),
            LIGHT_GREY,
            FONT_BIG,
        );
        self.screen.draw_text(
            &self.snapshot.artist,
            Pos::Centered(center_x),
            Pos::At(ARTIST_Y),
            BLUE,
            FONT_STD,
        );
    }

    // -------------------------------------------------------------------------
    // Tap Handling
    // -------------------------------------------------------------------------

    /// Route a calibrated tap through the page's hit tests.
    ///
    /// Remote command failures are logged and leave the page unchanged;
    /// the user simply taps again. Only framebuffer errors propagate.
    pub fn handle_tap(
        &mut self,
        x: i32,
        y: i32,
    ) -> Result<TapOutcome, PanelError> {
        if self.close.contains(x, y) {
            return Ok(TapOutcome::Close);
        }
        if self.play.contains(x, y) {
            self.toggle_play()?;
        } else if self.mute.contains(x, y) {
            self.toggle_mute()?;
        }
        Ok(TapOutcome::Stay)
    }

    /// Query the transport state, issue the opposite command, and relabel
    /// the play button with the action now available.
    fn toggle_play(&mut self) -> Result<(), PanelError> {
        let state = match self.speaker.transport_state(&self.name) {
            Ok(state) => state,
            Err(err) => {
                warn!("state query for \"{}\" failed: {err}", self.name);
                return Ok(());
            }
        };
        let (issued, label) = if state == PlaybackState::Playing {
            (self.speaker.pause(&self.name), "Play")
        } else {
            (self.speaker.play(&self.name), "Pause")
        };
        if let Err(err) = issued {
            warn!("transport command for \"{}\" failed: {err}", self.name);
            return Ok(());
        }
        self.play.set_label(label);
        self.screen.draw_button(&self.play);
        self.screen.flush()
    }

    /// Toggle the remote mute flag and relabel the mute button.
    fn toggle_mute(&mut self) -> Result<(), PanelError> {
        let muted = match self.speaker.mute(&self.name) {
            Ok(muted) => muted,
            Err(err) => {
                warn!("mute query for \"{}\" failed: {err}", self.name);
                return Ok(());
            }
        };
        if let Err(err) = self.speaker.set_mute(&self.name, !muted) {
            warn!("mute command for \"{}\" failed: {err}", self.name);
            return Ok(());
        }
        self.mute.set_label(mute_label(!muted));
        self.screen.draw_button(&self.mute);
        self.screen.flush()
    }

    // -------------------------------------------------------------------------
    // Reconciliation
    // -------------------------------------------------------------------------

    /// Re-query remote metadata and re-render the now-playing region if
    /// the artist or track changed. A failed query leaves the snapshot
    /// (and the screen) untouched until the next poll.
    ///
    /// Returns whether a re-render happened.
    pub fn reconcile(&mut self) -> Result<bool, PanelError> {
        debug!("reconciling \"{}\"", self.name);
        let fresh = match self.speaker.track_info(&self.name) {
            Ok(fresh) => fresh,
            Err(err) => {
                warn!("track query for \"{}\" failed: {err}", self.name);
                return Ok(false);
            }
        };
        if fresh.artist == self.snapshot.artist && fresh.track == self.snapshot.track {
            return Ok(false);
        }
        self.snapshot = fresh;
        self.render_now_playing();
        self.screen.flush()?;
        Ok(true)
    }

    /// Clear to the farewell color and restore the console cursor.
    pub fn close(&mut self) -> Result<(), PanelError> {
        self.screen.close()
    }
}

// =============================================================================
// Page Loop
// =============================================================================

/// Run the now-playing page for one speaker until its close control is
/// tapped, then clear the screen on the way out.
pub fn run_now_playing<C: SpeakerControl, A: ArtworkSource>(
    config: &PanelConfig,
    cal: &Calibration,
    speaker: &C,
    art: &A,
    name: &str,
) -> Result<()> {
    let sink = FbSink::open(Path::new(&config.fb_path))?;
    let console = Console::new(Path::new(&config.console_path));
    let mut page = NowPlayingPage::new(Screen::new(sink, console)?, speaker, art, name)?;
    let mut touch = TouchReader::open(Path::new(&config.touch_path), *cal)?;
    let mut last_poll = Instant::now();

    loop {
        thread::sleep(TICK);
        if let Some((x, y)) = touch.poll()? {
            debug!("now-playing tap at ({x}, {y})");
            if page.handle_tap(x, y)? == TapOutcome::Close {
                break;
            }
        }
        if last_poll.elapsed() >= POLL_INTERVAL {
            last_poll = Instant::now();
            page.reconcile()?;
        }
    }
    page.close()?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use embedded_graphics::pixelcolor::Rgb888;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::artwork::PlaceholderArt;
    use crate::canvas::Canvas;
    use crate::colors::{DARK_BLUE, YELLOW};
    use crate::fb::MemorySink;
    use crate::speaker::SpeakerResult;

    // -------------------------------------------------------------------------
    // Fakes
    // -------------------------------------------------------------------------

    /// Scripted speaker: fixed rather than simulated state, with call
    /// counters for the transport commands.
    struct FakeSpeaker {
        state: Cell<PlaybackState>,
        muted: Cell<bool>,
        meta: RefCell<TrackMetadata>,
        fail_queries: Cell<bool>,
        fail_commands: Cell<bool>,
        play_calls: Cell<u32>,
        pause_calls: Cell<u32>,
    }

    impl FakeSpeaker {
        fn playing(
            artist: &str,
            track: &str,
        ) -> Self {
            Self {
                state: Cell::new(PlaybackState::Playing),
                muted: Cell::new(false),
                meta: RefCell::new(metadata(artist, track)),
                fail_queries: Cell::new(false),
                fail_commands: Cell::new(false),
                play_calls: Cell::new(0),
                pause_calls: Cell::new(0),
            }
        }

        fn set_meta(
            &self,
            artist: &str,
            track: &str,
        ) {
            *self.meta.borrow_mut() = metadata(artist, track);
        }
    }

    fn metadata(
        artist: &str,
        track: &str,
    ) -> TrackMetadata {
        TrackMetadata {
            artist: artist.to_owned(),
            track: track.to_owned(),
            album: String::new(),
        }
    }

    impl SpeakerControl for FakeSpeaker {
        fn list_names(&self) -> SpeakerResult<Vec<String>> {
            Ok(vec!["Kitchen".to_owned()])
        }

        fn transport_state(&self, _name: &str) -> SpeakerResult<PlaybackState> {
            if self.fail_queries.get() {
                return Err("speaker unreachable".into());
            }
            Ok(self.state.get())
        }

        fn track_info(&self, _name: &str) -> SpeakerResult<TrackMetadata> {
            if self.fail_queries.get() {
                return Err("speaker unreachable".into());
            }
            Ok(self.meta.borrow().clone())
        }

        fn play(&self, _name: &str) -> SpeakerResult<()> {
            if self.fail_commands.get() {
                return Err("command refused".into());
            }
            self.play_calls.set(self.play_calls.get() + 1);
            self.state.set(PlaybackState::Playing);
            Ok(())
        }

        fn pause(&self, _name: &str) -> SpeakerResult<()> {
            if self.fail_commands.get() {
                return Err("command refused".into());
            }
            self.pause_calls.set(self.pause_calls.get() + 1);
            self.state.set(PlaybackState::Paused);
            Ok(())
        }

        fn stop(&self, _name: &str) -> SpeakerResult<()> {
            self.state.set(PlaybackState::Stopped);
            Ok(())
        }

        fn set_mute(&self, _name: &str, mute: bool) -> SpeakerResult<()> {
            if self.fail_commands.get() {
                return Err("command refused".into());
            }
            self.muted.set(mute);
            Ok(())
        }

        fn mute(&self, _name: &str) -> SpeakerResult<bool> {
            if self.fail_queries.get() {
                return Err("speaker unreachable".into());
            }
            Ok(self.muted.get())
        }

        fn set_volume(&self, _name: &str, _volume: u8) -> SpeakerResult<()> {
            Ok(())
        }

        fn volume(&self, _name: &str) -> SpeakerResult<u8> {
            Ok(50)
        }
    }

    /// Artwork source that counts lookups and returns a solid tile.
    struct FakeArt {
        lookups: Cell<u32>,
    }

    impl FakeArt {
        fn new() -> Self {
            Self { lookups: Cell::new(0) }
        }
    }

    impl ArtworkSource for FakeArt {
        fn lookup(&self, _artist: &str, _title: &str) -> Canvas {
            self.lookups.set(self.lookups.get() + 1);
            Canvas::new(ART_SIZE, ART_SIZE, DARK_BLUE)
        }
    }

    fn test_page<'a, A: ArtworkSource>(
        speaker: &'a FakeSpeaker,
        art: &'a A,
    ) -> (NowPlayingPage<'a, MemorySink, FakeSpeaker, A>, NamedTempFile) {
        let console_file = NamedTempFile::new().expect("temp console");
        let screen = Screen::new(MemorySink::new(320, 480), Console::new(console_file.path()))
            .expect("screen init");
        let page = NowPlayingPage::new(screen, speaker, art, "Kitchen").expect("page init");
        (page, console_file)
    }

    /// True if any pixel inside the half-open box carries the color.
    fn region_has_color(
        canvas: &Canvas,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: Rgb888,
    ) -> bool {
        (y0..y1).any(|y| (x0..x1).any(|x| canvas.pixel(x, y) == Some(color)))
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    #[test]
    fn test_initial_labels_reflect_playing_unmuted_device() {
        let speaker = FakeSpeaker::playing("Nadia Reyes", "Glass Orchard");
        let art = FakeArt::new();
        let (page, _console) = test_page(&speaker, &art);
        assert_eq!(page.play.label(), "Pause", "a playing device offers pause");
        assert_eq!(page.mute.label(), "Mute", "an unmuted device offers mute");
        assert_eq!(page.screen.sink().frames.len(), 1, "construction flushes exactly once");
        assert_eq!(art.lookups.get(), 1, "construction looks artwork up once");
    }

    #[test]
    fn test_initial_labels_reflect_paused_muted_device() {
        let speaker = FakeSpeaker::playing("Nadia Reyes", "Glass Orchard");
        speaker.state.set(PlaybackState::Paused);
        speaker.muted.set(true);
        let art = FakeArt::new();
        let (page, _console) = test_page(&speaker, &art);
        assert_eq!(page.play.label(), "Play", "a paused device offers play");
        assert_eq!(page.mute.label(), "Unmute", "a muted device offers unmute");
    }

    #[test]
    fn test_initial_query_failure_is_fatal() {
        let speaker = FakeSpeaker::playing("Nadia Reyes", "Glass Orchard");
        speaker.fail_queries.set(true);
        let art = FakeArt::new();
        let console_file = NamedTempFile::new().expect("temp console");
        let screen = Screen::new(MemorySink::new(320, 480), Console::new(console_file.path()))
            .expect("screen init");
        let built = NowPlayingPage::new(screen, &speaker, &art, "Kitchen");
        assert!(built.is_err(), "a page cannot open without the initial track query");
    }

    // -------------------------------------------------------------------------
    // Tap Handling
    // -------------------------------------------------------------------------

    #[test]
    fn test_play_tap_on_playing_device_issues_pause() {
        let speaker = FakeSpeaker::playing("Nadia Reyes", "Glass Orchard");
        let art = FakeArt::new();
        let (mut page, _console) = test_page(&speaker, &art);

        let outcome = page.handle_tap(80, 435).expect("tap handled");
        assert_eq!(outcome, TapOutcome::Stay);
        assert_eq!(speaker.pause_calls.get(), 1, "playing device gets a pause command");
        assert_eq!(speaker.play_calls.get(), 0);
        assert_eq!(page.play.label(), "Play", "label now names the opposite action");
        assert_eq!(page.screen.sink().frames.len(), 2, "button redraw flushes one frame");
    }

    #[test]
    fn test_play_tap_on_paused_device_issues_play() {
        let speaker = FakeSpeaker::playing("Nadia Reyes", "Glass Orchard");
        speaker.state.set(PlaybackState::Paused);
        let art = FakeArt::new();
        let (mut page, _console) = test_page(&speaker, &art);

        page.handle_tap(80, 435).expect("tap handled");
        assert_eq!(speaker.play_calls.get(), 1, "paused device gets a play command");
        assert_eq!(page.play.label(), "Pause");
    }

    #[test]
    fn test_mute_tap_toggles_both_ways() {
        let speaker = FakeSpeaker::playing("Nadia Reyes", "Glass Orchard");
        let art = FakeArt::new();
        let (mut page, _console) = test_page(&speaker, &art);

        page.handle_tap(240, 435).expect("tap handled");
        assert!(speaker.muted.get(), "first tap mutes");
        assert_eq!(page.mute.label(), "Unmute");

        page.handle_tap(240, 435).expect("tap handled");
        assert!(!speaker.muted.get(), "second tap unmutes");
        assert_eq!(page.mute.label(), "Mute");
        assert_eq!(page.screen.sink().frames.len(), 3, "each toggle flushes one frame");
    }

    #[test]
    fn test_close_tap_reports_close_without_redraw() {
        let speaker = FakeSpeaker::playing("Nadia Reyes", "Glass Orchard");
        let art = FakeArt::new();
        let (mut page, _console) = test_page(&speaker, &art);

        let outcome = page.handle_tap(305, 15).expect("tap handled");
        assert_eq!(outcome, TapOutcome::Close);
        assert_eq!(page.screen.sink().frames.len(), 1, "close itself draws nothing");
    }

    #[test]
    fn test_tap_on_dead_space_changes_nothing() {
        let speaker = FakeSpeaker::playing("Nadia Reyes", "Glass Orchard");
        let art = FakeArt::new();
        let (mut page, _console) = test_page(&speaker, &art);

        let outcome = page.handle_tap(5, 300).expect("tap handled");
        assert_eq!(outcome, TapOutcome::Stay);
        assert_eq!(speaker.play_calls.get() + speaker.pause_calls.get(), 0);
        assert_eq!(page.screen.sink().frames.len(), 1);
    }

    #[test]
    fn test_failed_command_leaves_button_and_screen_alone() {
        let speaker = FakeSpeaker::playing("Nadia Reyes", "Glass Orchard");
        speaker.fail_commands.set(true);
        let art = FakeArt::new();
        let (mut page, _console) = test_page(&speaker, &art);

        let outcome = page.handle_tap(80, 435).expect("tap handled");
        assert_eq!(outcome, TapOutcome::Stay, "a refused command does not end the page");
        assert_eq!(page.play.label(), "Pause", "label keeps the pre-tap state");
        assert_eq!(page.screen.sink().frames.len(), 1, "no redraw without a state change");
    }

    // -------------------------------------------------------------------------
    // Reconciliation
    // -------------------------------------------------------------------------

    #[test]
    fn test_reconcile_with_unchanged_track_skips_render() {
        let speaker = FakeSpeaker::playing("Nadia Reyes", "Glass Orchard");
        let art = FakeArt::new();
        let (mut page, _console) = test_page(&speaker, &art);

        let rendered = page.reconcile().expect("reconcile");
        assert!(!rendered, "identical metadata must not re-render");
        assert_eq!(page.screen.sink().frames.len(), 1);
        assert_eq!(art.lookups.get(), 1, "no artwork lookup without a change");
    }

    #[test]
    fn test_reconcile_with_new_track_rerenders_once() {
        let speaker = FakeSpeaker::playing("Nadia Reyes", "Glass Orchard");
        let art = FakeArt::new();
        let (mut page, _console) = test_page(&speaker, &art);

        speaker.set_meta("Nadia Reyes", "Twelve Doors");
        let rendered = page.reconcile().expect("reconcile");
        assert!(rendered, "a changed track re-renders");
        assert_eq!(page.screen.sink().frames.len(), 2, "exactly one extra frame");
        assert_eq!(art.lookups.get(), 2, "the re-render fetches artwork afresh");
        assert_eq!(page.snapshot.track, "Twelve Doors", "snapshot follows the device");
    }

    #[test]
    fn test_reconcile_failure_keeps_stale_snapshot() {
        let speaker = FakeSpeaker::playing("Nadia Reyes", "Glass Orchard");
        let art = FakeArt::new();
        let (mut page, _console) = test_page(&speaker, &art);

        speaker.fail_queries.set(true);
        let rendered = page.reconcile().expect("reconcile");
        assert!(!rendered, "a failed poll must not re-render");
        assert_eq!(page.snapshot.track, "Glass Orchard", "stale snapshot survives the failure");
        assert_eq!(page.screen.sink().frames.len(), 1);
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    #[test]
    fn test_placeholder_artwork_still_renders_metadata_text() {
        let speaker = FakeSpeaker::playing("Nadia Reyes", "Glass Orchard");
        let art = PlaceholderArt;
        let (page, _console) = test_page(&speaker, &art);
        let canvas = page.screen.canvas();

        // Artwork box is centered at (160, 160); the placeholder's field
        // corner and frame land at fixed offsets inside it.
        assert_eq!(canvas.pixel(50, 50), Some(DARK_BLUE), "placeholder field fills the art box");
        assert_eq!(canvas.pixel(56, 160), Some(YELLOW), "placeholder frame is visible");
        assert!(
            region_has_color(canvas, 0, TRACK_Y, 320, TRACK_Y + 30, LIGHT_GREY),
            "track title renders in light grey under the artwork"
        );
        assert!(
            region_has_color(canvas, 0, ARTIST_Y, 320, ARTIST_Y + 26, BLUE),
            "artist line renders in blue under the track title"
        );
    }

    #[test]
    fn test_render_clears_band_before_text() {
        let speaker = FakeSpeaker::playing("Nadia Reyes", "Glass Orchard");
        let art = FakeArt::new();
        let (mut page, _console) = test_page(&speaker, &art);

        speaker.set_meta("Nadia Reyes", "Hum");
        page.reconcile().expect("reconcile");
        let canvas = page.screen.canvas();
        // A short new title leaves the band edges black where the longer
        // previous title used to reach.
        assert_eq!(canvas.pixel(10, TRACK_Y + 5), Some(BLACK), "band edge is cleared");
        assert_eq!(canvas.pixel(310, BAND_BOTTOM - 5), Some(BLACK));
    }
}
