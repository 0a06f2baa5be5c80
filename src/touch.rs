//! Touchscreen tap detection over evdev.
//!
//! The kernel delivers a touch as a stream of discrete events: absolute
//! axis updates (`ABS_X`/`ABS_Y`) while the finger moves, and a
//! `BTN_TOUCH` key transition for contact down/up. A tap is reported at
//! the moment of release, using the last axis values seen, mapped
//! through the calibration transform.
//!
//! The event fold is a pure function ([`resolve_tap`]) over an iterator
//! of [`TouchEvent`], so the tap semantics are testable without a
//! device. [`TouchReader`] owns the evdev device, puts its fd in
//! non-blocking mode, and feeds each poll's drained events through the
//! fold, carrying `last_x`/`last_y` across polls.

use std::io;
use std::os::fd::AsRawFd;
use std::path::Path;

use evdev::{AbsoluteAxisType, InputEventKind, Key};
use log::{debug, info};

use crate::calibration::Calibration;
use crate::error::PanelError;

/// One decoded touchscreen event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEvent {
    /// Absolute X axis update (raw digitizer units).
    MoveX(i32),
    /// Absolute Y axis update (raw digitizer units).
    MoveY(i32),
    /// Finger made contact. Ignored; only the release matters.
    Down,
    /// Finger left the surface. Materializes a tap.
    Up,
}

/// Fold a drained batch of events into at most one calibrated tap.
///
/// Axis events update the running raw coordinates; each `Up` snapshots
/// the calibrated position at that instant, so with several queued
/// releases the last one wins. Returns the tap (if any) and the raw
/// coordinates to carry into the next poll.
pub fn resolve_tap<I>(
    events: I,
    cal: &Calibration,
    mut last_x: i32,
    mut last_y: i32,
) -> (Option<(i32, i32)>, i32, i32)
where
    I: IntoIterator<Item = TouchEvent>,
{
    let mut tap = None;
    for event in events {
        match event {
            TouchEvent::MoveX(x) => last_x = x,
            TouchEvent::MoveY(y) => last_y = y,
            TouchEvent::Up => tap = Some(cal.apply(last_x, last_y)),
            TouchEvent::Down => {}
        }
    }
    (tap, last_x, last_y)
}

/// Non-blocking tap source over an evdev touchscreen device.
pub struct TouchReader {
    device: evdev::Device,
    path: String,
    cal: Calibration,
    last_x: i32,
    last_y: i32,
}

impl TouchReader {
    /// Open the touch device and switch its fd to non-blocking reads.
    ///
    /// With `O_NONBLOCK` set, an empty event queue makes `fetch_events`
    /// return `WouldBlock` instead of stalling the UI tick.
    pub fn open(
        path: &Path,
        cal: Calibration,
    ) -> Result<Self, PanelError> {
        let as_input_err = |source: io::Error| PanelError::Input {
            path: path.display().to_string(),
            source,
        };

        let device = evdev::Device::open(path).map_err(as_input_err)?;

        let fd = device.as_raw_fd();
        // SAFETY: fcntl on a fd we own; F_GETFL/F_SETFL do not touch memory
        let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
        if flags < 0 {
            return Err(as_input_err(io::Error::last_os_error()));
        }
        let rc = unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) };
        if rc < 0 {
            return Err(as_input_err(io::Error::last_os_error()));
        }

        info!(
            "opened touch device {} ({})",
            path.display(),
            device.name().unwrap_or("unnamed")
        );
        Ok(Self {
            device,
            path: path.display().to_string(),
            cal,
            last_x: 0,
            last_y: 0,
        })
    }

    /// Drain all pending events and report at most one calibrated tap.
    ///
    /// Returns immediately with `None` when the queue is empty. Read
    /// errors other than `WouldBlock` are fatal; the touchscreen is a
    /// hard dependency like the framebuffer.
    pub fn poll(&mut self) -> Result<Option<(i32, i32)>, PanelError> {
        let mut queued = Vec::new();
        loop {
            match self.device.fetch_events() {
                Ok(events) => {
                    let before = queued.len();
                    for ev in events {
                        match ev.kind() {
                            InputEventKind::AbsAxis(AbsoluteAxisType::ABS_X) => {
                                queued.push(TouchEvent::MoveX(ev.value()));
                            }
                            InputEventKind::AbsAxis(AbsoluteAxisType::ABS_Y) => {
                                queued.push(TouchEvent::MoveY(ev.value()));
                            }
                            InputEventKind::Key(Key::BTN_TOUCH) => {
                                queued.push(if ev.value() == 0 {
                                    TouchEvent::Up
                                } else {
                                    TouchEvent::Down
                                });
                            }
                            _ => {} // SYN markers, pressure axes
                        }
                    }
                    // An empty batch means the queue is drained
                    if queued.len() == before {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    return Err(PanelError::Input { path: self.path.clone(), source: e });
                }
            }
        }

        let (tap, x, y) = resolve_tap(queued, &self.cal, self.last_x, self.last_y);
        self.last_x = x;
        self.last_y = y;
        if let Some((sx, sy)) = tap {
            debug!("tap at ({sx}, {sy}) raw ({x}, {y})");
        }
        Ok(tap)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
