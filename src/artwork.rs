//! Album artwork boundary and the generated placeholder tile.
//!
//! Cover art acquisition (metadata search, image download, decode) is an
//! external collaborator behind [`ArtworkSource`]. The contract is
//! infallible: a lookup that finds nothing, or a backend with no network
//! at all, returns the placeholder tile instead of an error, so artwork
//! problems can never take the now-playing page down.
//!
//! [`PlaceholderArt`] is the bundled implementation: it draws the
//! placeholder locally (dark blue field, yellow frame, a beamed pair of
//! eighth notes) instead of loading an asset from disk, so the binary has
//! no runtime file dependencies.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle, Rectangle};
use log::debug;

use crate::canvas::Canvas;
use crate::colors::{DARK_BLUE, YELLOW};
use crate::config::ART_SIZE;

/// Source of album artwork for a playing track.
pub trait ArtworkSource {
    /// Bitmap for an artist/title pair.
    ///
    /// Never fails: any miss (no match, no backend, decode trouble)
    /// yields the placeholder tile.
    fn lookup(&self, artist: &str, title: &str) -> Canvas;
}

// =============================================================================
// Placeholder Tile Layout (fixed geometry on the 220x220 tile)
// =============================================================================

/// Frame inset from the tile edge.
const FRAME_INSET: i32 = 6;

/// Notehead diameter.
const HEAD_DIAMETER: u32 = 30;

/// Left notehead, top-left corner.
const LEFT_HEAD: Point = Point::new(70, 133);

/// Right notehead, top-left corner.
const RIGHT_HEAD: Point = Point::new(125, 133);

/// Stem width in pixels.
const STEM_WIDTH: u32 = 4;

/// Stems rise from the right edge of each head to the beam.
const LEFT_STEM: Rectangle = Rectangle::new(Point::new(96, 78), Size::new(STEM_WIDTH, 70));
const RIGHT_STEM: Rectangle = Rectangle::new(Point::new(151, 78), Size::new(STEM_WIDTH, 70));

/// Beam joining the two stems.
const BEAM: Rectangle = Rectangle::new(Point::new(96, 78), Size::new(59, 14));

/// Solid yellow for the note glyph.
const NOTE_STYLE: PrimitiveStyle<Rgb888> = PrimitiveStyle::with_fill(YELLOW);

/// Yellow frame stroke.
const FRAME_STYLE: PrimitiveStyle<Rgb888> = PrimitiveStyle::with_stroke(YELLOW, 3);

// =============================================================================
// Placeholder Implementation
// =============================================================================

/// Artwork source with no backend: every lookup is a placeholder.
pub struct PlaceholderArt;

impl ArtworkSource for PlaceholderArt {
    fn lookup(&self, artist: &str, title: &str) -> Canvas {
        debug!("placeholder artwork for \"{title}\" by \"{artist}\"");
        placeholder_tile()
    }
}

/// Draw the deterministic placeholder tile.
fn placeholder_tile() -> Canvas {
    let mut tile = Canvas::new(ART_SIZE, ART_SIZE, DARK_BLUE);

    Rectangle::new(
        Point::new(FRAME_INSET, FRAME_INSET),
        Size::new(ART_SIZE - 2 * FRAME_INSET as u32, ART_SIZE - 2 * FRAME_INSET as u32),
    )
    .into_styled(FRAME_STYLE)
    .draw(&mut tile)
    .ok();

    Circle::new(LEFT_HEAD, HEAD_DIAMETER).into_styled(NOTE_STYLE).draw(&mut tile).ok();
    Circle::new(RIGHT_HEAD, HEAD_DIAMETER).into_styled(NOTE_STYLE).draw(&mut tile).ok();
    LEFT_STEM.into_styled(NOTE_STYLE).draw(&mut tile).ok();
    RIGHT_STEM.into_styled(NOTE_STYLE).draw(&mut tile).ok();
    BEAM.into_styled(NOTE_STYLE).draw(&mut tile).ok();

    tile
}

// =============================================================================
// Unit Tests
// =============================================================================
