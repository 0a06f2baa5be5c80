// Crate-level lints: allow the cast patterns pixel math leans on
#![allow(clippy::cast_possible_truncation)] // Intentional i64->i32, f64->u32 casts in calibration and scaling
#![allow(clippy::cast_precision_loss)] // u32->f64 in aspect-ratio fitting
#![allow(clippy::cast_possible_wrap)] // u32->i32 for pixel coordinates
#![allow(clippy::cast_sign_loss)] // i32->u32 where geometry guarantees the sign

//! Touchscreen "now playing" panel for a networked audio speaker.
//!
//! Runs on a small Linux framebuffer touchscreen (320x480 on the bench)
//! and shows what the chosen speaker is playing:
//!
//! - Speaker selection: one tappable row per discovered speaker
//! - Album artwork (or a generated placeholder), track title, artist
//! - Play/Pause and Mute/Unmute toggles, labelled from live device state
//!
//! # Architecture
//!
//! ```text
//! /dev/input/touchscreen --> touch --> calibration --+
//!                                                    v
//!                   screens (selection, now_playing) --> screen --> fb --> /dev/fb0
//!                      ^          ^                        |
//!                      |          |                        +--> canvas (RGBA compositor)
//!                  speaker      artwork
//!             (SpeakerControl) (ArtworkSource)
//! ```
//!
//! Everything runs on one thread as a cooperative polling loop: each page
//! sleeps a 50 ms tick and polls the touchscreen once per tick; the
//! now-playing page additionally re-queries remote track state every 2 s
//! on a monotonic timer. A remote query that hangs stalls the whole loop;
//! the provided backends are local and fast, and bounding remote calls
//! with a timeout is an open question for a networked backend.
//!
//! # Page Flow
//!
//! Selection and now-playing alternate until the selection page's close
//! control is tapped; the panel then paints its farewell color, restores
//! the console cursor, and exits.
//!
//! # Devices
//!
//! | Device | Purpose |
//! |--------|---------|
//! | `/dev/fb0` | memory-mapped frame writes in the reported depth (16/32 bpp) |
//! | `/dev/input/touchscreen` | evdev absolute-axis and touch-button events |
//! | `/etc/pointercal` | 7-coefficient tslib calibration (identity when absent) |
//! | `/dev/tty1` | cursor hide/restore escape sequences |
//!
//! Each path can be overridden per deployment; see [`config`] for the
//! `TAPDECK_*` environment variables.
//!
//! # Demo Mode
//!
//! The speaker network and artwork pipeline are external collaborators
//! behind the [`speaker::SpeakerControl`] and [`artwork::ArtworkSource`]
//! traits. The provided implementations ([`speaker::SimulatedSpeaker`],
//! [`artwork::PlaceholderArt`]) simulate three rooms with rotating
//! playlists, so the binary runs on a bench with no speakers at all.
//!
//! Logging goes through `env_logger`; `RUST_LOG=tapdeck=debug` traces
//! every tap and reconciliation poll.

mod artwork;
mod button;
mod calibration;
mod canvas;
mod colors;
mod config;
mod error;
mod fb;
mod screen;
mod screens;
mod speaker;
mod styles;
mod touch;

use std::path::Path;

use anyhow::{Context, Result};
use artwork::PlaceholderArt;
use calibration::Calibration;
use config::PanelConfig;
use fb::{Console, FbSink};
use log::info;
use screen::Screen;
use screens::{run_now_playing, run_selection};
use speaker::SimulatedSpeaker;

fn main() -> Result<()> {
    env_logger::init();
    info!("tapdeck starting");

    let config = PanelConfig::from_env();
    let cal = Calibration::load(Path::new(&config.pointercal_path))
        .with_context(|| format!("loading calibration from {}", config.pointercal_path))?;

    let speaker = SimulatedSpeaker::new();
    let art = PlaceholderArt;

    loop {
        match run_selection(&config, &cal, &speaker)? {
            Some(name) => run_now_playing(&config, &cal, &speaker, &art, &name)?,
            None => break,
        }
    }

    // The selection page hands its screen over without clearing; a final
    // throwaway screen paints the farewell color and restores the cursor.
    let sink = FbSink::open(Path::new(&config.fb_path))?;
    let mut screen = Screen::new(sink, Console::new(Path::new(&config.console_path)))?;
    screen.close()?;
    info!("tapdeck stopped");
    Ok(())
}
