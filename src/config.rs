//! Panel configuration: device paths and pre-computed layout constants.
//!
//! Layout positions are `const` so the per-tick render code never
//! recomputes them; the values come from the 320x480 panel the layout was
//! designed on, with the speaker-list and wrap widths derived from the
//! actual device width at runtime.
//!
//! Device paths default to the standard Linux nodes and can be overridden
//! per deployment through environment variables, resolved once at startup:
//!
//! | Variable | Default | Purpose |
//! |----------|---------|---------|
//! | `TAPDECK_FB` | `/dev/fb0` | framebuffer device |
//! | `TAPDECK_TOUCH` | `/dev/input/touchscreen` | touch event device |
//! | `TAPDECK_POINTERCAL` | `/etc/pointercal` | tslib calibration file |
//! | `TAPDECK_CONSOLE` | `/dev/tty1` | console for cursor escapes |

use std::time::Duration;

// =============================================================================
// Timing Configuration
// =============================================================================

/// Base cooperative loop delay. Touch polls happen once per tick.
pub const TICK: Duration = Duration::from_millis(50);

/// Delay between remote track-info queries on the now-playing page.
/// Measured on a monotonic clock, independent of tick count.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

// =============================================================================
// Text Layout
// =============================================================================

/// Margin subtracted from the screen width for the default wrap width.
pub const WRAP_MARGIN: u32 = 20;

// =============================================================================
// Now-Playing Page Layout
// =============================================================================

/// Album artwork bounding box (square, never upscaled).
pub const ART_SIZE: u32 = 220;

/// Vertical center of the artwork box.
pub const ART_CENTER_Y: i32 = 160;

/// Top edge of the black band cleared behind track/artist text.
pub const BAND_TOP: i32 = 285;

/// Bottom edge of the black band cleared behind track/artist text.
pub const BAND_BOTTOM: i32 = 400;

/// Baseline-top Y of the track title line.
pub const TRACK_Y: i32 = 290;

/// Baseline-top Y of the artist line.
pub const ARTIST_Y: i32 = 345;

// =============================================================================
// Button Geometry
// =============================================================================

/// Close button "X": top-right corner, small tap target.
pub const CLOSE_BUTTON: (i32, i32, u32, u32) = (295, 5, 20, 20);

/// Play/Pause toggle on the now-playing page.
pub const PLAY_BUTTON: (i32, i32, u32, u32) = (20, 410, 120, 50);

/// Mute/Unmute toggle on the now-playing page.
pub const MUTE_BUTTON: (i32, i32, u32, u32) = (180, 410, 120, 50);

/// Speaker-list buttons: left edge X.
pub const LIST_X: i32 = 40;

/// Speaker-list buttons: first row Y.
pub const LIST_START_Y: i32 = 40;

/// Speaker-list buttons: vertical step between rows (50 high + 20 gap).
pub const LIST_STEP_Y: i32 = 70;

/// Speaker-list buttons: row height.
pub const LIST_HEIGHT: u32 = 50;

/// Speaker-list buttons: total horizontal margin (width = screen - this).
pub const LIST_MARGIN: u32 = 80;

/// Corner radius for all button backgrounds.
pub const BUTTON_RADIUS: u32 = 16;

/// Button labels sit this many pixels above the geometric center.
pub const BUTTON_LABEL_LIFT: i32 = 5;

/// Artwork frame thickness in pixels.
pub const FRAME_WIDTH: u32 = 2;

// =============================================================================
// Device Paths
// =============================================================================

/// Resolved device paths for one panel session.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Framebuffer device node.
    pub fb_path: String,
    /// Touchscreen evdev node.
    pub touch_path: String,
    /// tslib pointercal file; missing file means identity calibration.
    pub pointercal_path: String,
    /// Console device for cursor escape sequences.
    pub console_path: String,
}

impl PanelConfig {
    /// Resolve the configuration from the environment, falling back to the
    /// standard device nodes.
    pub fn from_env() -> Self {
        Self {
            fb_path: env_str("TAPDECK_FB", "/dev/fb0"),
            touch_path: env_str("TAPDECK_TOUCH", "/dev/input/touchscreen"),
            pointercal_path: env_str("TAPDECK_POINTERCAL", "/etc/pointercal"),
            console_path: env_str("TAPDECK_CONSOLE", "/dev/tty1"),
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self { Self::from_env() }
}

fn env_str(
    name: &str,
    default: &str,
) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}
