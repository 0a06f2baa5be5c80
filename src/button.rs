//! Tappable button: geometry, label, and hit testing.
//!
//! A button is plain data; rendering delegates to
//! [`crate::screen::Screen::draw_button`], which paints the rounded
//! background and centers the label. Geometry is fixed at construction,
//! the label may be swapped to reflect toggled state ("Play"/"Pause").
//!
//! # Hit Testing
//!
//! [`Button::contains`] uses strict inequalities on all four edges, so a
//! tap landing exactly on a border pixel is not a hit. Adjacent buttons
//! therefore never both claim a boundary tap.

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::colors::{BLACK, BLUE};

/// Rectangular tappable button.
#[derive(Debug, Clone)]
pub struct Button {
    label: String,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    /// Label font.
    pub font: &'static MonoFont<'static>,
    /// Label color.
    pub color: Rgb888,
    /// Fill color of the rounded background.
    pub background: Rgb888,
}

impl Button {
    /// Create a button with the default palette: black label on blue.
    pub fn new(
        label: &str,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        font: &'static MonoFont<'static>,
    ) -> Self {
        Self {
            label: label.to_owned(),
            x,
            y,
            width,
            height,
            font,
            color: BLACK,
            background: BLUE,
        }
    }

    /// Override label and background colors (builder style).
    #[must_use]
    pub fn with_colors(
        mut self,
        color: Rgb888,
        background: Rgb888,
    ) -> Self {
        self.color = color;
        self.background = background;
        self
    }

    /// Current label text.
    #[inline]
    pub fn label(&self) -> &str { &self.label }

    /// Replace the label (e.g. "Play" -> "Pause"). Geometry is untouched,
    /// so the caller redraws the button in place.
    pub fn set_label(
        &mut self,
        label: &str,
    ) {
        self.label = label.to_owned();
    }

    /// Top-left X.
    #[inline]
    pub const fn x(&self) -> i32 { self.x }

    /// Top-left Y.
    #[inline]
    pub const fn y(&self) -> i32 { self.y }

    /// Width in pixels.
    #[inline]
    pub const fn width(&self) -> u32 { self.width }

    /// Height in pixels.
    #[inline]
    pub const fn height(&self) -> u32 { self.height }

    /// Bounding rectangle for rendering.
    pub const fn bounds(&self) -> Rectangle {
        Rectangle::new(Point::new(self.x, self.y), Size::new(self.width, self.height))
    }

    /// Strict point containment: edges are not hits.
    #[inline]
    pub const fn contains(
        &self,
        px: i32,
        py: i32,
    ) -> bool {
        self.x < px
            && px < self.x + self.width as i32
            && self.y < py
            && py < self.y + self.height as i32
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
