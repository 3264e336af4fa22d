//! Header bar drawn along the top edge of a region
//!
//! Renders the label on the left and the object index right-aligned.

use tiny_skia::Color;

use crate::surface::RenderSurface;
use crate::widgets::colors;

/// Fixed gap reserved between label and index when sizing the bar
pub const HEADER_FIXED_PADDING: f32 = 51.0;

/// A filled label bar
#[derive(Debug, Clone)]
pub struct HeaderBar {
    pub label: String,
    pub index: Option<String>,
    pub color: Color,
    pub text_color: Color,
}

impl HeaderBar {
    pub fn new(label: impl Into<String>, color: Color) -> Self {
        Self {
            label: label.into(),
            index: None,
            color,
            text_color: colors::black(),
        }
    }

    pub fn with_index(mut self, index: Option<String>) -> Self {
        self.index = index;
        self
    }

    /// Width needed to show label and index without overlap
    pub fn required_width(
        &self,
        surface: &mut dyn RenderSurface,
        font_size: f32,
        text_padding: f32,
    ) -> f32 {
        let (label_w, _) = surface.measure_text(&self.label, font_size);
        let index_w = self
            .index
            .as_deref()
            .map(|index| surface.measure_text(index, font_size).0)
            .unwrap_or(0.0);
        label_w + index_w + HEADER_FIXED_PADDING + 2.0 * text_padding
    }

    /// Render the bar with its top-left corner at (x, y)
    pub fn render(
        &self,
        surface: &mut dyn RenderSurface,
        x: f32,
        y: f32,
        width: f32,
        bar_height: f32,
        font_size: f32,
        text_padding: f32,
    ) {
        surface.fill_rect(x, y, width, bar_height, self.color);

        let baseline = y + (bar_height + font_size) / 2.0 - font_size * 0.15;
        surface.draw_text(&self.label, x + text_padding, baseline, font_size, self.text_color);

        if let Some(index) = &self.index {
            let (index_w, _) = surface.measure_text(index, font_size);
            surface.draw_text(
                index,
                x + width - index_w - text_padding,
                baseline,
                font_size,
                self.text_color,
            );
        }
    }
}
