//! Affine touch calibration in the tslib pointercal format.
//!
//! A pointercal file holds 7 whitespace-separated signed integers
//! `c1..c7` defining the map from raw digitizer coordinates to screen
//! pixels:
//!
//! ```text
//! x = (c1*x_raw + c2*y_raw + c3) / c7
//! y = (c4*x_raw + c5*y_raw + c6) / c7
//! ```
//!
//! tslib scales the first six coefficients by 65536 and puts 65536 in `c7`,
//! so the products overflow `i32` for real panels; the transform therefore
//! runs in `i64` and truncates the quotient to pixel coordinates.
//!
//! Coefficients load once at startup and are immutable afterwards. A
//! missing file means the panel was never calibrated and the identity
//! transform is used; a file that is present but malformed is a fatal
//! configuration error, as is a zero `c7`.

use std::path::Path;

use log::{debug, info};

use crate::error::PanelError;

/// The 7-coefficient affine touch transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    coeffs: [i64; 7],
}

impl Calibration {
    /// The identity transform: raw coordinates pass through unchanged.
    pub const IDENTITY: Self = Self { coeffs: [1, 0, 0, 0, 1, 0, 1] };

    /// Build from explicit coefficients.
    ///
    /// Fails only on a zero divisor coefficient (`c7`).
    pub const fn new(coeffs: [i64; 7]) -> Result<Self, PanelError> {
        if coeffs[6] == 0 {
            return Err(PanelError::ZeroDivisor);
        }
        Ok(Self { coeffs })
    }

    /// Load coefficients from a pointercal file.
    ///
    /// A missing file yields the identity transform. A present file must
    /// contain at least 7 integer tokens; only the first 7 are used, extra
    /// tokens are ignored. Fewer than 7 tokens, a non-integer among the
    /// first 7, or a zero `c7` are fatal.
    pub fn load(path: &Path) -> Result<Self, PanelError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("no calibration file at {}, using identity transform", path.display());
                return Ok(Self::IDENTITY);
            }
            Err(e) => {
                return Err(PanelError::Calibration {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };

        let mut coeffs = [0i64; 7];
        let mut tokens = text.split_whitespace();
        for (i, slot) in coeffs.iter_mut().enumerate() {
            let token = tokens.next().ok_or_else(|| PanelError::Calibration {
                path: path.display().to_string(),
                reason: format!("expected 7 integers, found {i}"),
            })?;
            *slot = token.parse().map_err(|_| PanelError::Calibration {
                path: path.display().to_string(),
                reason: format!("token {} is not an integer: \"{token}\"", i + 1),
            })?;
        }

        if coeffs[6] == 0 {
            return Err(PanelError::ZeroDivisor);
        }

        debug!("loaded calibration {:?} from {}", coeffs, path.display());
        Ok(Self { coeffs })
    }

    /// Map a raw digitizer sample to screen pixel coordinates.
    ///
    /// Pure integer math; the quotient truncates toward zero.
    #[inline]
    pub const fn apply(
        &self,
        x_raw: i32,
        y_raw: i32,
    ) -> (i32, i32) {
        let [c1, c2, c3, c4, c5, c6, c7] = self.coeffs;
        let xr = x_raw as i64;
        let yr = y_raw as i64;
        let x = (c1 * xr + c2 * yr + c3) / c7;
        let y = (c4 * xr + c5 * yr + c6) / c7;
        (x as i32, y as i32)
    }
}

impl Default for Calibration {
    fn default() -> Self { Self::IDENTITY }
}

// =============================================================================
// Unit Tests
// =============================================================================
