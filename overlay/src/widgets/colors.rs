use tiny_skia::Color;

#[inline]
pub fn transparent() -> Color {
    Color::from_rgba8(0, 0, 0, 0)
}

#[inline]
pub fn black() -> Color {
    Color::from_rgba8(0, 0, 0, 255)
}

#[inline]
pub fn white() -> Color {
    Color::from_rgba8(255, 255, 255, 255)
}

// ─────────────────────────────────────────────────────────────────────────
// Text Panels
// ─────────────────────────────────────────────────────────────────────────

/// Background behind frame attribute and classification text
#[inline]
pub fn panel_bg() -> Color {
    Color::from_rgba8(0, 0, 0, 150)
}

/// Background behind per-object attribute text
#[inline]
pub fn attr_bg() -> Color {
    Color::from_rgba8(20, 20, 20, 170)
}

// ─────────────────────────────────────────────────────────────────────────
// Media States
// ─────────────────────────────────────────────────────────────────────────

/// Fill for media that failed to load
#[inline]
pub fn not_found_bg() -> Color {
    Color::from_rgba8(40, 40, 40, 255)
}

/// Text on the "not found" visual
#[inline]
pub fn not_found_text() -> Color {
    Color::from_rgba8(220, 90, 90, 255)
}

/// Outline of the focused region
#[inline]
pub fn focus_outline() -> Color {
    Color::from_rgba8(255, 255, 255, 230)
}
