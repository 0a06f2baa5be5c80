//! Speaker control boundary: the query/command interface and a simulated
//! backend.
//!
//! The panel never talks to a speaker network directly; everything goes
//! through [`SpeakerControl`], a synchronous by-name interface. Errors from
//! a backend are opaque boxed errors: the panel only decides between fatal
//! (session setup) and log-and-continue (tap handlers, reconciliation
//! polls), never inspects them.
//!
//! # Transport states
//!
//! Remote transport reports arrive as the uppercase wire strings; the
//! legacy `PAUSED_PLAYBACK` form collapses into [`PlaybackState::Paused`].
//! Textual state *requests* (play/pause/stop) are case-insensitive and
//! accept both the verb and adjective forms.
//!
//! # Metadata quirk
//!
//! Some sources deliver "Title - Artist" combined in the track field with
//! an empty artist. [`TrackMetadata::normalized`] splits that on the first
//! `-` into track/artist. The split is a best-effort guess and will
//! mis-split legitimately hyphenated titles when the artist is missing;
//! that behavior is kept as-is.
//!
//! [`SimulatedSpeaker`] stands in for the real network so the binary runs
//! end-to-end on a bench: a fixed set of rooms, each cycling through a
//! small playlist on wall time.

use std::cell::Cell;
use std::error::Error;
use std::fmt;
use std::time::Instant;

use log::debug;

use crate::error::PanelError;

/// Backend results carry whatever error the transport produced.
pub type SpeakerResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// =============================================================================
// Transport State
// =============================================================================

/// Transport state of one remote speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Stopped,
    /// Between tracks or buffering; neither playing nor paused.
    Transitioning,
    /// Nothing queued on the device.
    NoMedia,
}

impl PlaybackState {
    /// Parse a remote transport report.
    ///
    /// `PAUSED_PLAYBACK` and `PAUSED` both map to [`Self::Paused`]; any
    /// unlisted string is an [`PanelError::InvalidState`].
    #[allow(dead_code)] // Wire-report mapping for networked backends; the simulator stores typed states
    pub fn from_report(report: &str) -> Result<Self, PanelError> {
        match report {
            "PLAYING" => Ok(Self::Playing),
            "PAUSED_PLAYBACK" | "PAUSED" => Ok(Self::Paused),
            "STOPPED" => Ok(Self::Stopped),
            "TRANSITIONING" => Ok(Self::Transitioning),
            "NO_MEDIA_PRESENT" => Ok(Self::NoMedia),
            other => Err(PanelError::InvalidState(other.to_owned())),
        }
    }

    /// The normalized report string for this state.
    pub const fn as_report(&self) -> &'static str {
        match self {
            Self::Playing => "PLAYING",
            Self::Paused => "PAUSED",
            Self::Stopped => "STOPPED",
            Self::Transitioning => "TRANSITIONING",
            Self::NoMedia => "NO_MEDIA_PRESENT",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_report())
    }
}

/// A textual state-change request, parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackCommand {
    Play,
    Pause,
    Stop,
}

impl PlaybackCommand {
    /// Parse `play`/`playing`, `pause`/`paused`, `stop`/`stopped` in any
    /// case. Anything else is a caller bug, reported as
    /// [`PanelError::InvalidState`].
    pub fn parse(request: &str) -> Result<Self, PanelError> {
        match request.to_ascii_lowercase().as_str() {
            "play" | "playing" => Ok(Self::Play),
            "pause" | "paused" => Ok(Self::Pause),
            "stop" | "stopped" => Ok(Self::Stop),
            _ => Err(PanelError::InvalidState(request.to_owned())),
        }
    }
}

// =============================================================================
// Track Metadata
// =============================================================================

/// Point-in-time copy of what a speaker reports it is playing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub artist: String,
    pub track: String,
    pub album: String,
}

impl TrackMetadata {
    /// Apply the combined-title split and trim every field.
    ///
    /// When the artist field is empty (exactly empty, not whitespace) and
    /// the track contains `-`, the track splits on the first `-` into
    /// track/artist. All three fields are then whitespace-trimmed.
    pub fn normalized(&self) -> TrackMetadata {
        let mut track = self.track.as_str();
        let mut artist = self.artist.as_str();
        if artist.is_empty() {
            if let Some((left, right)) = track.split_once('-') {
                track = left;
                artist = right;
            }
        }
        TrackMetadata {
            artist: artist.trim().to_owned(),
            track: track.trim().to_owned(),
            album: self.album.trim().to_owned(),
        }
    }
}

// =============================================================================
// Control Interface
// =============================================================================

/// Synchronous by-name control surface of the speaker network.
///
/// Queries and commands address speakers by their listed name. Calls are
/// assumed fast relative to the UI tick; there is no timeout here, so a
/// backend that hangs stalls the whole panel loop.
#[allow(dead_code)] // Full control surface; the panel UI drives only a subset
pub trait SpeakerControl {
    /// Names of every currently discoverable speaker, in listing order.
    fn list_names(&self) -> SpeakerResult<Vec<String>>;

    /// Current transport state of the named speaker.
    fn transport_state(&self, name: &str) -> SpeakerResult<PlaybackState>;

    /// Current track metadata, normalized per [`TrackMetadata::normalized`].
    fn track_info(&self, name: &str) -> SpeakerResult<TrackMetadata>;

    fn play(&self, name: &str) -> SpeakerResult<()>;
    fn pause(&self, name: &str) -> SpeakerResult<()>;
    fn stop(&self, name: &str) -> SpeakerResult<()>;

    fn set_mute(&self, name: &str, mute: bool) -> SpeakerResult<()>;
    fn mute(&self, name: &str) -> SpeakerResult<bool>;

    /// Set the volume, `0..=100`.
    fn set_volume(&self, name: &str, volume: u8) -> SpeakerResult<()>;
    fn volume(&self, name: &str) -> SpeakerResult<u8>;

    /// Dispatch a textual state request ([`PlaybackCommand::parse`] rules).
    fn request_state(&self, name: &str, request: &str) -> SpeakerResult<()> {
        match PlaybackCommand::parse(request)? {
            PlaybackCommand::Play => self.play(name),
            PlaybackCommand::Pause => self.pause(name),
            PlaybackCommand::Stop => self.stop(name),
        }
    }
}

// =============================================================================
// Simulated Backend
// =============================================================================

/// Seconds each simulated track stays current before the playlist advances.
const TRACK_SECONDS: u64 = 20;

/// Bench playlist. The third entry carries the combined "Title - Artist"
/// form with an empty artist, so the normalization split stays exercised.
const PLAYLIST: &[(&str, &str, &str)] = &[
    ("Orbital Decay", "Window Seat", "Night Transit"),
    ("The Letterpress", "Margins", "Proof of Concept"),
    ("", "Golden Hour - Marlowe Finch", "Field Recordings"),
    ("Cedar & Pine", "Long Exposure", "Darkroom"),
    ("Ada Quaye", "Harmattan", "Crosswinds"),
];

/// Playlist slot for a room at a point in elapsed time.
///
/// # Parameters
/// - `elapsed_secs`: seconds since the simulator started
/// - `offset`: the room's fixed starting slot, so rooms differ
fn playlist_index(
    elapsed_secs: u64,
    offset: usize,
) -> usize {
    ((elapsed_secs / TRACK_SECONDS) as usize + offset) % PLAYLIST.len()
}

struct Room {
    name: String,
    state: Cell<PlaybackState>,
    muted: Cell<bool>,
    volume: Cell<u8>,
    /// Starting playlist slot; keeps rooms from playing in lockstep.
    playlist_offset: usize,
}

/// In-process stand-in for the speaker network.
///
/// Fixed rooms, per-room transport/mute/volume state, and a playlist that
/// advances on wall time whether or not the room is "playing". Commands
/// mutate through [`Cell`]s so the trait's `&self` surface matches a real
/// remote backend.
pub struct SimulatedSpeaker {
    started: Instant,
    rooms: Vec<Room>,
}

impl SimulatedSpeaker {
    pub fn new() -> Self {
        let rooms = [("Kitchen", 25u8), ("Living Room", 40), ("Office", 30)]
            .into_iter()
            .enumerate()
            .map(|(i, (name, volume))| Room {
                name: name.to_owned(),
                state: Cell::new(PlaybackState::Playing),
                muted: Cell::new(false),
                volume: Cell::new(volume),
                playlist_offset: i * 2,
            })
            .collect();
        Self { started: Instant::now(), rooms }
    }

    /// Room lookup is case-insensitive, like discovery by player name.
    fn room(&self, name: &str) -> SpeakerResult<&Room> {
        self.rooms
            .iter()
            .find(|room| room.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("no speaker named \"{name}\"").into())
    }
}

impl Default for SimulatedSpeaker {
    fn default() -> Self { Self::new() }
}

impl SpeakerControl for SimulatedSpeaker {
    fn list_names(&self) -> SpeakerResult<Vec<String>> {
        Ok(self.rooms.iter().map(|room| room.name.clone()).collect())
    }

    fn transport_state(&self, name: &str) -> SpeakerResult<PlaybackState> {
        Ok(self.room(name)?.state.get())
    }

    fn track_info(&self, name: &str) -> SpeakerResult<TrackMetadata> {
        let room = self.room(name)?;
        let slot = playlist_index(self.started.elapsed().as_secs(), room.playlist_offset);
        let (artist, track, album) = PLAYLIST[slot];
        let raw = TrackMetadata {
            artist: artist.to_owned(),
            track: track.to_owned(),
            album: album.to_owned(),
        };
        Ok(raw.normalized())
    }

    fn play(&self, name: &str) -> SpeakerResult<()> {
        debug!("simulated {name}: play");
        self.room(name)?.state.set(PlaybackState::Playing);
        Ok(())
    }

    fn pause(&self, name: &str) -> SpeakerResult<()> {
        debug!("simulated {name}: pause");
        self.room(name)?.state.set(PlaybackState::Paused);
        Ok(())
    }

    fn stop(&self, name: &str) -> SpeakerResult<()> {
        debug!("simulated {name}: stop");
        self.room(name)?.state.set(PlaybackState::Stopped);
        Ok(())
    }

    fn set_mute(&self, name: &str, mute: bool) -> SpeakerResult<()> {
        self.room(name)?.muted.set(mute);
        Ok(())
    }

    fn mute(&self, name: &str) -> SpeakerResult<bool> {
        Ok(self.room(name)?.muted.get())
    }

    fn set_volume(&self, name: &str, volume: u8) -> SpeakerResult<()> {
        self.room(name)?.volume.set(volume.min(100));
        Ok(())
    }

    fn volume(&self, name: &str) -> SpeakerResult<u8> {
        Ok(self.room(name)?.volume.get())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
