//! High-level drawing surface for one visible page.
//!
//! A [`Screen`] owns the canvas for exactly one page: it is constructed
//! when the page appears, composites everything the page draws, and is
//! dropped (or closed) when the page exits. Drawing never touches the
//! device; [`Screen::flush`] pushes the whole canvas through the page's
//! [`FrameSink`] in one write.
//!
//! # Drawing model
//!
//! | Operation | What it composites |
//! |-----------|--------------------|
//! | [`Screen::draw_text`] | word-wrapped lines, centered per line |
//! | [`Screen::draw_image`] | fitted bitmap with a yellow highlight frame |
//! | [`Screen::draw_button`] | rounded filled rect plus centered label |
//! | [`Screen::fill_rect`] | solid rectangle (band clears) |
//!
//! Positions are given per axis with [`Pos`]: an absolute top/left edge or
//! a center coordinate the content extent is resolved against. The track
//! title, for instance, is centered on X but pinned to an absolute Y.
//!
//! Construction hides the console text cursor; [`Screen::close`] paints a
//! solid farewell color, flushes it, then clears the console and brings the
//! cursor back.

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    PrimitiveStyle, PrimitiveStyleBuilder, Rectangle, RoundedRectangle, StrokeAlignment,
};
use embedded_graphics::text::Text;
use log::info;

use crate::button::Button;
use crate::canvas::Canvas;
use crate::colors::{BLACK, BLUE, YELLOW};
use crate::config::{BUTTON_LABEL_LIFT, BUTTON_RADIUS, FRAME_WIDTH, WRAP_MARGIN};
use crate::error::PanelError;
use crate::fb::{Console, FrameSink};
use crate::styles;

// =============================================================================
// Positioning
// =============================================================================

/// One axis of a drawing position.
///
/// Each axis resolves independently, so content can be centered
/// horizontally while sitting at a fixed vertical offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pos {
    /// Absolute coordinate of the content's top/left edge.
    At(i32),
    /// Coordinate of the content's center on this axis.
    Centered(i32),
}

impl Pos {
    /// Resolve to the top/left edge for content of the given extent.
    const fn resolve(
        self,
        extent: u32,
    ) -> i32 {
        match self {
            Self::At(edge) => edge,
            Self::Centered(center) => center - (extent / 2) as i32,
        }
    }
}

// =============================================================================
// Text Wrapping
// =============================================================================

/// Greedily wrap `text` into lines no wider than `max_width` pixels.
///
/// Whitespace-delimited words are appended to the current line while the
/// candidate line still measures within the limit; otherwise a new line
/// starts. A single word wider than the limit gets its own (overwide)
/// line rather than being broken mid-word.
pub fn wrap_text(
    text: &str,
    font: &MonoFont,
    max_width: u32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if styles::text_width(font, &candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(current);
            current = word.to_owned();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Bounding box of wrapped lines: widest line by total stacked height.
pub fn block_size(
    lines: &[String],
    font: &MonoFont,
) -> (u32, u32) {
    let width = lines.iter().map(|line| styles::text_width(font, line)).max().unwrap_or(0);
    let height = lines.len() as u32 * styles::line_height(font);
    (width, height)
}

// =============================================================================
// Screen
// =============================================================================

/// Compositor for one page: canvas, flush sink, console cursor control.
pub struct Screen<S: FrameSink> {
    canvas: Canvas,
    sink: S,
    console: Console,
    width: u32,
    height: u32,
}

impl<S: FrameSink> Screen<S> {
    /// Create a black canvas at the sink's resolution and hide the console
    /// cursor for the session.
    pub fn new(
        sink: S,
        console: Console,
    ) -> Result<Self, PanelError> {
        let (width, height) = sink.size();
        console.hide_cursor()?;
        Ok(Self { canvas: Canvas::new(width, height, BLACK), sink, console, width, height })
    }

    /// Device width in pixels.
    #[inline]
    pub const fn width(&self) -> u32 { self.width }

    /// Device height in pixels.
    #[inline]
    pub const fn height(&self) -> u32 { self.height }

    // -------------------------------------------------------------------------
    // Drawing
    // -------------------------------------------------------------------------

    /// Fill a rectangle on the canvas.
    pub fn fill_rect(
        &mut self,
        rect: Rectangle,
        color: Rgb888,
    ) {
        rect.into_styled(PrimitiveStyle::with_fill(color)).draw(&mut self.canvas).ok();
    }

    /// Draw word-wrapped text.
    ///
    /// Wrapping uses the screen's default maximum line width (device width
    /// minus the wrap margin). Lines are centered within the wrapped
    /// block's bounding box, which `x`/`y` position per [`Pos`].
    pub fn draw_text(
        &mut self,
        text: &str,
        x: Pos,
        y: Pos,
        color: Rgb888,
        font: &MonoFont<'static>,
    ) {
        let lines = wrap_text(text, font, self.width - WRAP_MARGIN);
        if lines.is_empty() {
            return;
        }
        let (block_w, block_h) = block_size(&lines, font);
        let left = x.resolve(block_w);
        let top = y.resolve(block_h);
        let center_x = left + (block_w / 2) as i32;

        let style = MonoTextStyle::new(font, color);
        for (i, line) in lines.iter().enumerate() {
            let line_y = top + (i as u32 * styles::line_height(font)) as i32;
            Text::with_text_style(line, Point::new(center_x, line_y), style, styles::CENTERED)
                .draw(&mut self.canvas)
                .ok();
        }
    }

    /// Composite a bitmap with its highlight frame.
    ///
    /// The bitmap is rotated by `quarter_turns * 90` degrees
    /// counter-clockwise, scaled down (never up) to fit `max_w` x `max_h`
    /// preserving aspect ratio, then alpha-composited at the resolved
    /// position behind a black backing rectangle with a yellow outline two
    /// pixels proud of the image on every side.
    pub fn draw_image(
        &mut self,
        image: &Canvas,
        max_w: u32,
        max_h: u32,
        x: Pos,
        y: Pos,
        quarter_turns: u8,
    ) {
        let fitted = if quarter_turns % 4 == 0 {
            image.fit(max_w, max_h)
        } else {
            image.rotate_quarters(quarter_turns).fit(max_w, max_h)
        };
        let left = x.resolve(fitted.width());
        let top = y.resolve(fitted.height());

        let frame = Rectangle::new(
            Point::new(left - FRAME_WIDTH as i32, top - FRAME_WIDTH as i32),
            Size::new(fitted.width() + 2 * FRAME_WIDTH, fitted.height() + 2 * FRAME_WIDTH),
        );
        frame
            .into_styled(
                PrimitiveStyleBuilder::new()
                    .fill_color(BLACK)
                    .stroke_color(YELLOW)
                    .stroke_width(FRAME_WIDTH)
                    .stroke_alignment(StrokeAlignment::Inside)
                    .build(),
            )
            .draw(&mut self.canvas)
            .ok();
        self.canvas.blit(&fitted, left, top);
    }

    /// Render a button: rounded filled background, label centered slightly
    /// above the geometric middle.
    pub fn draw_button(
        &mut self,
        button: &Button,
    ) {
        RoundedRectangle::with_equal_corners(
            button.bounds(),
            Size::new(BUTTON_RADIUS, BUTTON_RADIUS),
        )
        .into_styled(PrimitiveStyle::with_fill(button.background))
        .draw(&mut self.canvas)
        .ok();

        self.draw_text(
            button.label(),
            Pos::Centered(button.x() + (button.width() / 2) as i32),
            Pos::Centered(button.y() + (button.height() / 2) as i32 - BUTTON_LABEL_LIFT),
            button.color,
            button.font,
        );
    }

    // -------------------------------------------------------------------------
    // Flush / Teardown
    // -------------------------------------------------------------------------

    /// Push the canvas to the device in one bulk write.
    pub fn flush(&mut self) -> Result<(), PanelError> {
        let (dev_w, dev_h) = self.sink.size();
        if (self.canvas.width(), self.canvas.height()) != (dev_w, dev_h) {
            let scaled = self.canvas.resize_nearest(dev_w, dev_h);
            return self.sink.write_frame(&scaled);
        }
        self.sink.write_frame(&self.canvas)
    }

    /// End the session: paint the farewell color, flush it, then clear the
    /// console and restore the cursor.
    pub fn close(&mut self) -> Result<(), PanelError> {
        info!("closing panel session");
        self.canvas.clear(BLUE).ok();
        self.flush()?;
        self.console.restore()
    }

    /// Composited pixels, for assertions on what a page actually drew.
    #[cfg(test)]
    pub const fn canvas(&self) -> &Canvas { &self.canvas }

    /// The sink, for assertions on flushed frames.
    #[cfg(test)]
    pub const fn sink(&self) -> &S { &self.sink }
}

// =============================================================================
// Unit Tests
// =============================================================================
