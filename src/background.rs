//! The background predicate: the sole pixel classifier used by detection
//! and extraction.
//!
//! A pixel counts as background when it is effectively transparent or
//! near-white (the paper the sticker sheet was drawn on). The thresholds
//! are tuned for white sheets but kept configurable for near-white paper
//! stock that scans slightly darker.

use image::Rgba;

/// Thresholds classifying a pixel as background.
///
/// A pixel is background iff its alpha is **below** `max_alpha` (effectively
/// transparent) or all three color channels are **above** `min_white`
/// (near-white). The predicate is pure and stateless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundThresholds {
    /// Alpha values strictly below this are treated as transparent.
    pub max_alpha: u8,
    /// Channel values strictly above this (on all of R, G, B) are near-white.
    pub min_white: u8,
}

impl Default for BackgroundThresholds {
    fn default() -> Self {
        Self {
            max_alpha: 20,
            min_white: 240,
        }
    }
}

impl BackgroundThresholds {
    /// Classify one RGBA sample.
    #[must_use]
    pub fn is_background(&self, px: Rgba<u8>) -> bool {
        px[3] < self.max_alpha
            || (px[0] > self.min_white && px[1] > self.min_white && px[2] > self.min_white)
    }
}
