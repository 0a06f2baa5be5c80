//! Linux framebuffer sink and console control.
//!
//! Geometry comes from sysfs at startup: `virtual_size` reports
//! `"width,height"` and `bits_per_pixel` the depth, both under
//! `/sys/class/graphics/<fb>/`. A flush converts the RGBA canvas to the
//! device's native byte order, maps the device for exactly
//! `width * height * bpp / 8` bytes, and copies the frame in one bulk
//! write before unmapping. The device is reopened per flush; holding the
//! map between frames buys nothing at two or three flushes per user
//! action.
//!
//! [`FrameSink`] is the seam between composition and the device: the
//! panel draws against the trait, production uses [`FbSink`], tests
//! capture frames with [`MemorySink`].
//!
//! The console cursor is hidden while the panel owns the display and
//! restored (with a clear) on close, via raw escape sequences written to
//! the console device. That path is independent of the framebuffer.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use log::{debug, info};
use memmap2::MmapOptions;

use crate::canvas::Canvas;
use crate::error::PanelError;

// =============================================================================
// Geometry Probe
// =============================================================================

/// Framebuffer geometry read from sysfs at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FbGeometry {
    /// Horizontal resolution in pixels.
    pub width: u32,
    /// Vertical resolution in pixels.
    pub height: u32,
    /// Device bit depth; 16 and 32 are supported by the flush path.
    pub bits_per_pixel: u32,
}

impl FbGeometry {
    /// Probe the sysfs node matching a framebuffer device path.
    ///
    /// `/dev/fb0` is described by `/sys/class/graphics/fb0/`. Unreadable
    /// or malformed geometry is fatal; the panel cannot lay anything out
    /// without a known resolution.
    pub fn probe(fb_path: &Path) -> Result<Self, PanelError> {
        let device = fb_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| geometry_err(fb_path, "device path has no file name"))?;

        let sysfs = format!("/sys/class/graphics/{device}");

        let size_text = std::fs::read_to_string(format!("{sysfs}/virtual_size"))
            .map_err(|e| geometry_err(fb_path, &format!("virtual_size: {e}")))?;
        let (width, height) = parse_virtual_size(&size_text)
            .ok_or_else(|| geometry_err(fb_path, &format!("bad virtual_size \"{}\"", size_text.trim())))?;

        let bpp_text = std::fs::read_to_string(format!("{sysfs}/bits_per_pixel"))
            .map_err(|e| geometry_err(fb_path, &format!("bits_per_pixel: {e}")))?;
        let bits_per_pixel = bpp_text
            .trim()
            .parse::<u32>()
            .map_err(|_| geometry_err(fb_path, &format!("bad bits_per_pixel \"{}\"", bpp_text.trim())))?;

        info!("framebuffer {device}: {width}x{height} at {bits_per_pixel} bpp");
        Ok(Self { width, height, bits_per_pixel })
    }

    /// Exact byte length of one frame on the device.
    #[inline]
    pub const fn byte_len(&self) -> usize {
        (self.width * self.height * self.bits_per_pixel / 8) as usize
    }
}

fn geometry_err(
    fb_path: &Path,
    reason: &str,
) -> PanelError {
    PanelError::Geometry {
        device: fb_path.display().to_string(),
        reason: reason.to_owned(),
    }
}

/// Parse the sysfs `virtual_size` format: `"width,height"`.
fn parse_virtual_size(input: &str) -> Option<(u32, u32)> {
    let mut parts = input.trim().split(',');
    let w = parts.next()?.trim().parse::<u32>().ok()?;
    let h = parts.next()?.trim().parse::<u32>().ok()?;
    Some((w, h))
}

/// Convert a canvas to the device's native byte order.
///
/// 32 bpp devices take BGRA, 16 bpp take RGB565 little-endian. Anything
/// else is a configuration the flush path cannot serve.
fn canvas_to_native(
    canvas: &Canvas,
    bits_per_pixel: u32,
) -> Result<Vec<u8>, PanelError> {
    match bits_per_pixel {
        32 => Ok(canvas.to_bgra()),
        16 => Ok(canvas.to_rgb565()),
        other => Err(PanelError::UnsupportedDepth(other)),
    }
}

// =============================================================================
// Frame Sinks
// =============================================================================

/// Destination for flushed frames.
///
/// The canvas handed to `write_frame` always matches `size()` exactly;
/// [`crate::screen::Screen`] rescales beforehand if its canvas drifted.
pub trait FrameSink {
    /// Device resolution as (width, height).
    fn size(&self) -> (u32, u32);

    /// Write one full frame. Errors are fatal for the session.
    fn write_frame(&mut self, canvas: &Canvas) -> Result<(), PanelError>;
}

/// The real memory-mapped framebuffer device.
pub struct FbSink {
    path: String,
    geometry: FbGeometry,
}

impl FbSink {
    /// Probe geometry and wrap the device. The device itself is opened
    /// per flush.
    pub fn open(path: &Path) -> Result<Self, PanelError> {
        let geometry = FbGeometry::probe(path)?;
        if !matches!(geometry.bits_per_pixel, 16 | 32) {
            return Err(PanelError::UnsupportedDepth(geometry.bits_per_pixel));
        }
        Ok(Self { path: path.display().to_string(), geometry })
    }
}

impl FrameSink for FbSink {
    fn size(&self) -> (u32, u32) {
        (self.geometry.width, self.geometry.height)
    }

    fn write_frame(&mut self, canvas: &Canvas) -> Result<(), PanelError> {
        let native = canvas_to_native(canvas, self.geometry.bits_per_pixel)?;

        let as_fb_err = |source: std::io::Error| PanelError::Framebuffer {
            path: self.path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(as_fb_err)?;

        // SAFETY: mapping a device node we just opened read-write; the map
        // lives only for this bulk copy
        let mut map = unsafe { MmapOptions::new().len(self.geometry.byte_len()).map_mut(&file) }
            .map_err(as_fb_err)?;
        map.copy_from_slice(&native);
        map.flush().map_err(as_fb_err)?;

        debug!("flushed {} bytes to {}", native.len(), self.path);
        Ok(())
    }
}

/// Captures flushed frames in memory. Test double for [`FbSink`].
#[cfg(test)]
pub struct MemorySink {
    width: u32,
    height: u32,
    /// Every frame flushed, in order.
    pub frames: Vec<Canvas>,
}

#[cfg(test)]
impl MemorySink {
    pub fn new(
        width: u32,
        height: u32,
    ) -> Self {
        Self { width, height, frames: Vec::new() }
    }

    /// The most recently flushed frame.
    pub fn last_frame(&self) -> Option<&Canvas> {
        self.frames.last()
    }
}

#[cfg(test)]
impl FrameSink for MemorySink {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn write_frame(&mut self, canvas: &Canvas) -> Result<(), PanelError> {
        self.frames.push(canvas.clone());
        Ok(())
    }
}

// =============================================================================
// Console Cursor Control
// =============================================================================

/// Escape sequence: hide the text cursor.
const HIDE_CURSOR: &str = "\x1b[?25l";

/// Escape sequence: clear the screen, home the cursor, show it again.
const RESTORE: &str = "\x1b[2J\x1b[H\x1b[?25h";

/// Console device for cursor escapes, separate from the pixel path.
pub struct Console {
    path: String,
}

impl Console {
    pub fn new(path: &Path) -> Self {
        Self { path: path.display().to_string() }
    }

    /// Hide the blinking text cursor while the panel owns the display.
    pub fn hide_cursor(&self) -> Result<(), PanelError> {
        self.write_seq(HIDE_CURSOR)
    }

    /// Clear the console and bring the cursor back. Final step of a
    /// panel session.
    pub fn restore(&self) -> Result<(), PanelError> {
        self.write_seq(RESTORE)
    }

    fn write_seq(
        &self,
        seq: &str,
    ) -> Result<(), PanelError> {
        let as_console_err = |source: std::io::Error| PanelError::Console {
            path: self.path.clone(),
            source,
        };
        let mut tty = OpenOptions::new().write(true).open(&self.path).map_err(as_console_err)?;
        tty.write_all(seq.as_bytes()).map_err(as_console_err)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
