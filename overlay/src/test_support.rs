//! Recording surface used by overlay, engine and player tests

use tiny_skia::Color;

use crate::surface::RenderSurface;

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    FillRect { x: f32, y: f32, w: f32, h: f32 },
    StrokeRect { x: f32, y: f32, w: f32, h: f32, stroke_width: f32 },
    Text { text: String, x: f32, y: f32, size: f32 },
    Blit { src_w: u32, src_h: u32, x: f32, y: f32, w: f32, h: f32, rgba: Vec<u8> },
}

/// Surface that records calls instead of rasterizing.
///
/// Text is measured as `chars * size * 0.5` wide and `size` high.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub width: u32,
    pub height: u32,
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn blits(&self) -> Vec<&DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Blit { .. }))
            .collect()
    }

    /// Stroked rectangles as (x, y, w, h, stroke_width)
    pub fn strokes(&self) -> Vec<(f32, f32, f32, f32, f32)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::StrokeRect {
                    x,
                    y,
                    w,
                    h,
                    stroke_width,
                } => Some((*x, *y, *w, *h, *stroke_width)),
                _ => None,
            })
            .collect()
    }
}

impl RenderSurface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self, _color: Color) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, _color: Color) {
        self.ops.push(DrawOp::FillRect { x, y, w, h });
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, stroke_width: f32, _color: Color) {
        self.ops.push(DrawOp::StrokeRect {
            x,
            y,
            w,
            h,
            stroke_width,
        });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, _color: Color) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            size: font_size,
        });
    }

    fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        (text.chars().count() as f32 * font_size * 0.5, font_size)
    }

    fn draw_rgba(
        &mut self,
        rgba: &[u8],
        src_width: u32,
        src_height: u32,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    ) {
        self.ops.push(DrawOp::Blit {
            src_w: src_width,
            src_h: src_height,
            x,
            y,
            w,
            h,
            rgba: rgba.to_vec(),
        });
    }
}
