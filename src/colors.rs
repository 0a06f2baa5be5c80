//! Color palette for the now-playing panel.
//!
//! # Rgb888 Color Format
//!
//! The canvas composites in `Rgb888` (8 bits per channel) because the target
//! framebuffer is a 32 bpp BGRA device; pixels are only repacked at flush
//! time (see [`crate::canvas`]). On 16 bpp devices the same palette is
//! quantized to RGB565 during conversion, so colors are defined once here at
//! full depth.

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

// =============================================================================
// Standard Colors (from RgbColor trait - guaranteed optimal values)
// =============================================================================

/// Pure black (0, 0, 0). Canvas background and button label text.
pub const BLACK: Rgb888 = Rgb888::BLACK;

/// Pure white (255, 255, 255). Default text color on dark backgrounds.
pub const WHITE: Rgb888 = Rgb888::WHITE;

// =============================================================================
// Panel Colors (application-specific)
// =============================================================================

/// Near-white grey (240, 240, 240). Track title text.
pub const LIGHT_GREY: Rgb888 = Rgb888::new(240, 240, 240);

/// Warm yellow (230, 230, 90). Artwork frame outline.
pub const YELLOW: Rgb888 = Rgb888::new(230, 230, 90);

/// Sky blue (90, 170, 230). Button backgrounds, artist text, farewell screen.
pub const BLUE: Rgb888 = Rgb888::new(90, 170, 230);

/// Deep navy (12, 32, 44). Placeholder artwork field.
pub const DARK_BLUE: Rgb888 = Rgb888::new(12, 32, 44);
