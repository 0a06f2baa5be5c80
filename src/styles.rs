//! Shared fonts and text alignment styles.
//!
//! The panel uses two ProFont sizes: the standard 18 pt face for labels,
//! artist lines, and button text, and the 24 pt face for track titles.
//! Both are bitmap fonts compiled into the binary, so no font files are
//! loaded at runtime.
//!
//! # Dynamic Color Styles
//!
//! Text color varies by call site (track title is light grey, artist is
//! blue, button labels use the button's own colors), so this module exposes
//! the font references and callers build `MonoTextStyle::new(FONT_STD, color)`
//! at the point of use. Alignment styles are const and shared.

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::text::{Alignment, Baseline, TextStyle, TextStyleBuilder};
use profont::{PROFONT_18_POINT, PROFONT_24_POINT};

// =============================================================================
// Text Alignment Styles (const - zero runtime cost)
// =============================================================================

/// Centered text anchored at its top edge. Every text draw goes through
/// this style; the renderer positions lines by their top-left bounding box,
/// so the baseline must sit below the anchor, not on it.
pub const CENTERED: TextStyle =
    TextStyleBuilder::new().alignment(Alignment::Center).baseline(Baseline::Top).build();

// =============================================================================
// Font References (for dynamic color styles)
// =============================================================================

/// Standard text font (`ProFont` 18pt, ~12px advance).
/// Usage: `MonoTextStyle::new(FONT_STD, dynamic_color)`
pub const FONT_STD: &MonoFont = &PROFONT_18_POINT;

/// Large text font (`ProFont` 24pt, ~14px advance). Track titles.
pub const FONT_BIG: &MonoFont = &PROFONT_24_POINT;

/// Vertical advance for a line of text in the given font.
///
/// Glyph height plus the font's inter-line spacing; used by the wrapped
/// text renderer and by centering math.
#[inline]
pub const fn line_height(font: &MonoFont) -> u32 {
    font.character_size.height + font.character_spacing
}

/// Rendered width of `text` in the given monospace font.
///
/// Monospace metrics make this exact: glyph advance times character count.
/// The last character contributes no trailing inter-character spacing.
#[inline]
pub fn text_width(
    font: &MonoFont,
    text: &str,
) -> u32 {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return 0;
    }
    chars * (font.character_size.width + font.character_spacing) - font.character_spacing
}
