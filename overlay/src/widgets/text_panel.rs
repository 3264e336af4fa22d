//! Multi-line text block on a translucent background

use tiny_skia::Color;

use crate::surface::RenderSurface;
use crate::widgets::colors;

/// Pixel rectangle covered by a rendered panel
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanelBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PanelBounds {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// Lines of text drawn top-down with a shared background
#[derive(Debug, Clone)]
pub struct TextPanel {
    pub lines: Vec<String>,
    pub background: Color,
    pub text_color: Color,
    pub padding: f32,
}

impl TextPanel {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            background: colors::panel_bg(),
            text_color: colors::white(),
            padding: 4.0,
        }
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    fn line_height(font_size: f32) -> f32 {
        font_size * 1.2
    }

    /// Returns (width, height) including padding
    pub fn measure(&self, surface: &mut dyn RenderSurface, font_size: f32) -> (f32, f32) {
        if self.lines.is_empty() {
            return (0.0, 0.0);
        }
        let widest = self
            .lines
            .iter()
            .map(|line| surface.measure_text(line, font_size).0)
            .fold(0.0f32, f32::max);
        let height = self.lines.len() as f32 * Self::line_height(font_size);
        (widest + 2.0 * self.padding, height + 2.0 * self.padding)
    }

    /// Render with the top-left corner at (x, y). Empty panels draw nothing.
    pub fn render(
        &self,
        surface: &mut dyn RenderSurface,
        x: f32,
        y: f32,
        font_size: f32,
    ) -> PanelBounds {
        let (width, height) = self.measure(surface, font_size);
        let bounds = PanelBounds {
            x,
            y,
            width,
            height,
        };
        if self.lines.is_empty() {
            return bounds;
        }

        surface.fill_rect(x, y, width, height, self.background);
        let line_height = Self::line_height(font_size);
        let mut baseline = y + self.padding + font_size;
        for line in &self.lines {
            surface.draw_text(line, x + self.padding, baseline, font_size, self.text_color);
            baseline += line_height;
        }
        bounds
    }
}
