//! Render surface contract
//!
//! The host provides a pixel buffer of known size; overlays draw into it
//! through [`RenderSurface`]. [`PixmapSurface`] is the CPU implementation
//! backed by [`Renderer`].

use std::io::Write;

use tiny_skia::Color;

use crate::error::PlayerError;
use crate::renderer::Renderer;

/// Drawing primitives the overlays need from a host surface
pub trait RenderSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Resize the internal pixel buffer (contents are discarded)
    fn resize(&mut self, width: u32, height: u32);

    fn clear(&mut self, color: Color);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);
    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, stroke_width: f32, color: Color);

    /// Draw text with its baseline at `y`
    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Color);

    /// Returns (width, height) of `text` at `font_size`
    fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32);

    /// Blit straight-alpha RGBA pixels scaled into the destination rect
    fn draw_rgba(
        &mut self,
        rgba: &[u8],
        src_width: u32,
        src_height: u32,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    );
}

/// Bytes of RGBA storage for a `width` x `height` buffer
fn buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

/// A CPU pixel surface (premultiplied RGBA)
pub struct PixmapSurface {
    width: u32,
    height: u32,
    buffer: Vec<u8>,
    renderer: Renderer,
}

impl PixmapSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            buffer: vec![0u8; buffer_len(width, height)],
            renderer: Renderer::new(),
        }
    }

    /// Premultiplied RGBA pixels
    pub fn pixels(&self) -> &[u8] {
        &self.buffer
    }

    /// Premultiplied RGBA of one pixel
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.buffer.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Encode the surface as a straight-alpha PNG
    pub fn write_png<W: Write>(&self, writer: W) -> Result<(), PlayerError> {
        let mut encoder = png::Encoder::new(writer, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;

        let mut straight = self.buffer.clone();
        for px in straight.chunks_exact_mut(4) {
            let a = px[3] as u32;
            if a > 0 && a < 255 {
                for c in &mut px[..3] {
                    *c = ((*c as u32 * 255 + a / 2) / a).min(255) as u8;
                }
            }
        }
        writer.write_image_data(&straight)?;
        Ok(())
    }

    pub fn save_png(&self, path: &std::path::Path) -> Result<(), PlayerError> {
        let file = std::fs::File::create(path)?;
        self.write_png(std::io::BufWriter::new(file))
    }
}

impl RenderSurface for PixmapSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.buffer = vec![0u8; buffer_len(width, height)];
    }

    fn clear(&mut self, color: Color) {
        self.renderer
            .clear(&mut self.buffer, self.width, self.height, color);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.renderer
            .fill_rect(&mut self.buffer, self.width, self.height, x, y, w, h, color);
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, stroke_width: f32, color: Color) {
        self.renderer.stroke_rect(
            &mut self.buffer,
            self.width,
            self.height,
            x,
            y,
            w,
            h,
            stroke_width,
            color,
        );
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Color) {
        self.renderer.draw_text(
            &mut self.buffer,
            self.width,
            self.height,
            text,
            x,
            y,
            font_size,
            color,
        );
    }

    fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        self.renderer.measure_text(text, font_size)
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
        self.renderer.draw_rgba(
            &mut self.buffer,
            self.width,
            self.height,
            rgba,
            src_width,
            src_height,
            x,
            y,
            w,
            h,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_len_does_not_wrap() {
        assert_eq!(buffer_len(640, 480), 640 * 480 * 4);
        // 70000 * 70000 * 4 exceeds u32::MAX
        assert_eq!(buffer_len(70_000, 70_000), 19_600_000_000);
    }

    #[test]
    fn test_pixel_lookup() {
        let mut surface = PixmapSurface::new(4, 3);
        surface.fill_rect(3.0, 2.0, 1.0, 1.0, Color::from_rgba8(255, 0, 0, 255));
        assert_eq!(surface.pixel(3, 2), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(4, 0), None);
    }
}
