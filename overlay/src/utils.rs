//! Common utility functions for overlay rendering

use tiny_skia::Color;

/// Convert [u8; 4] RGBA array to tiny_skia Color
#[inline]
pub fn color_from_rgba(rgba: [u8; 4]) -> Color {
    Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3])
}

/// Same color with its alpha replaced
#[inline]
pub fn with_alpha(rgba: [u8; 4], alpha: u8) -> [u8; 4] {
    [rgba[0], rgba[1], rgba[2], alpha]
}

/// Confidence as shown next to labels and attributes (two decimals)
pub fn format_confidence(confidence: f32) -> String {
    format!("{:.2}", confidence)
}
