//! Error types for the device and configuration layer.
//!
//! Startup failures (calibration, geometry, device opens) and framebuffer
//! writes are fatal: the panel cannot run without its display and a known
//! resolution, so these propagate out of `main` instead of entering a
//! degraded mode. Remote speaker errors are not represented here; the
//! [`crate::speaker::SpeakerControl`] trait carries its own boxed error so
//! backends can surface whatever their transport produces.

use thiserror::Error;

/// Fatal panel errors: configuration, device I/O, and caller bugs.
#[derive(Debug, Error)]
pub enum PanelError {
    /// Calibration file was present but not 7 parseable integers.
    #[error("bad calibration file {path}: {reason}")]
    Calibration {
        /// Path of the offending pointercal file
        path: String,
        /// What was wrong with its contents
        reason: String,
    },

    /// Calibration divisor coefficient is zero; the transform would divide
    /// by it on every touch.
    #[error("calibration divisor (7th coefficient) is zero")]
    ZeroDivisor,

    /// Framebuffer geometry could not be read from sysfs.
    #[error("unreadable framebuffer geometry for {device}: {reason}")]
    Geometry {
        /// Framebuffer device the probe was for
        device: String,
        /// What failed while probing
        reason: String,
    },

    /// The device reports a bit depth the flush path cannot pack.
    #[error("unsupported framebuffer depth: {0} bpp (expected 16 or 32)")]
    UnsupportedDepth(u32),

    /// Framebuffer open/map/write failed. Fatal for the session.
    #[error("framebuffer I/O on {path}")]
    Framebuffer {
        /// Framebuffer device path
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Touch input device could not be opened or configured.
    #[error("touch input device {path}")]
    Input {
        /// Input device path
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Console escape write failed.
    #[error("console device {path}")]
    Console {
        /// Console device path
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A playback-state string that names no known state was passed to the
    /// control interface. Caller bug, not a runtime fault.
    #[error("unknown playback state \"{0}\"")]
    InvalidState(String),
}
