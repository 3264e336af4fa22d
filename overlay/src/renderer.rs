//! Software renderer using tiny-skia and cosmic-text
//!
//! Draws into caller-owned premultiplied RGBA buffers. Text shaping results
//! are cached per (text, size) since labels repeat on every frame.
#![allow(clippy::too_many_arguments)]
use std::collections::HashMap;

use cosmic_text::{
    Attrs, Buffer, Color as CosmicColor, Family, FontSystem, LayoutGlyph, Metrics, Shaping,
    SwashCache,
};
use tiny_skia::{
    Color, FilterQuality, Paint, PathBuilder, PixmapMut, PixmapPaint, PixmapRef, Rect, Stroke,
    Transform,
};

pub use crate::widgets::colors;

/// Maximum entries in the text shaping cache (LRU eviction when exceeded)
const TEXT_CACHE_MAX_ENTRIES: usize = 512;

struct ShapedText {
    glyphs: Vec<LayoutGlyph>,
    width: f32,
    height: f32,
    last_used: u64,
}

/// (text, font size in tenths of a pixel)
type ShapeKey = (String, u32);

/// CPU renderer shared by every overlay drawn onto one surface
pub struct Renderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    shaped: HashMap<ShapeKey, ShapedText>,
    access_counter: u64,
    /// Grow-only staging buffer for premultiplying blitted images
    scratch: Vec<u8>,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            shaped: HashMap::with_capacity(256),
            access_counter: 0,
            scratch: Vec::new(),
        }
    }

    /// Current scratch capacity in bytes (never shrinks)
    pub fn scratch_len(&self) -> usize {
        self.scratch.len()
    }

    fn evict_if_needed(&mut self) {
        if self.shaped.len() <= TEXT_CACHE_MAX_ENTRIES {
            return;
        }
        let keep = TEXT_CACHE_MAX_ENTRIES * 3 / 4;
        let mut by_age: Vec<(ShapeKey, u64)> = self
            .shaped
            .iter()
            .map(|(k, v)| (k.clone(), v.last_used))
            .collect();
        by_age.sort_by_key(|(_, used)| *used);
        let drop_count = self.shaped.len() - keep;
        for (key, _) in by_age.into_iter().take(drop_count) {
            self.shaped.remove(&key);
        }
    }

    /// Shape `text` if not cached; returns (width, height)
    fn shape(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        let size_key = (font_size * 10.0).round() as u32;
        self.access_counter += 1;
        let now = self.access_counter;

        if let Some(hit) = self
            .shaped
            .iter_mut()
            .find(|(k, _)| k.1 == size_key && k.0 == text)
            .map(|(_, v)| v)
        {
            hit.last_used = now;
            return (hit.width, hit.height);
        }

        let metrics = Metrics::new(font_size, font_size * 1.2);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        let attrs = Attrs::new().family(Family::SansSerif);
        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let mut glyphs = Vec::new();
        let mut width = 0.0f32;
        let mut height = 0.0f32;
        for run in buffer.layout_runs() {
            width = width.max(run.line_w);
            height += run.line_height;
            glyphs.extend(run.glyphs.iter().cloned());
        }

        self.shaped.insert(
            (text.to_string(), size_key),
            ShapedText {
                glyphs,
                width,
                height,
                last_used: now,
            },
        );
        self.evict_if_needed();
        (width, height)
    }

    pub fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        self.shape(text, font_size)
    }

    pub fn clear(&self, buffer: &mut [u8], width: u32, height: u32, color: Color) {
        if let Some(mut pixmap) = PixmapMut::from_bytes(buffer, width, height) {
            pixmap.fill(color);
        }
    }

    pub fn fill_rect(
        &self,
        buffer: &mut [u8],
        width: u32,
        height: u32,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    ) {
        let Some(mut pixmap) = PixmapMut::from_bytes(buffer, width, height) else {
            return;
        };
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    pub fn stroke_rect(
        &self,
        buffer: &mut [u8],
        width: u32,
        height: u32,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        stroke_width: f32,
        color: Color,
    ) {
        let Some(mut pixmap) = PixmapMut::from_bytes(buffer, width, height) else {
            return;
        };
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);

        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        let stroke = Stroke {
            width: stroke_width,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Draw text with its baseline at `y`
    pub fn draw_text(
        &mut self,
        buffer: &mut [u8],
        buf_width: u32,
        buf_height: u32,
        text: &str,
        x: f32,
        y: f32,
        font_size: f32,
        color: Color,
    ) {
        self.shape(text, font_size);
        let size_key = (font_size * 10.0).round() as u32;
        // Clone out of the cache: the swash cache needs `&mut self.font_system`
        let glyphs = self
            .shaped
            .iter()
            .find(|(k, _)| k.1 == size_key && k.0 == text)
            .map(|(_, v)| v.glyphs.clone())
            .unwrap_or_default();

        let Some(mut pixmap) = PixmapMut::from_bytes(buffer, buf_width, buf_height) else {
            return;
        };
        let text_color = color.to_color_u8();
        let text_color = CosmicColor::rgba(
            text_color.red(),
            text_color.green(),
            text_color.blue(),
            text_color.alpha(),
        );

        for glyph in &glyphs {
            let physical = glyph.physical((x, y), 1.0);
            if let Some(image) = self
                .swash_cache
                .get_image(&mut self.font_system, physical.cache_key)
            {
                blend_glyph(
                    &mut pixmap,
                    &image.data,
                    image.placement.width,
                    image.placement.height,
                    physical.x + image.placement.left,
                    physical.y - image.placement.top,
                    text_color,
                );
            }
        }
    }

    /// Blit straight-alpha RGBA pixels scaled into the destination rect.
    ///
    /// The pixels are premultiplied into the grow-only scratch buffer first.
    pub fn draw_rgba(
        &mut self,
        buffer: &mut [u8],
        buf_width: u32,
        buf_height: u32,
        rgba: &[u8],
        src_width: u32,
        src_height: u32,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    ) {
        let len = src_width as usize * src_height as usize * 4;
        if len == 0 || rgba.len() < len || w <= 0.0 || h <= 0.0 {
            return;
        }
        if self.scratch.len() < len {
            self.scratch.resize(len, 0);
        }
        premultiply_into(&rgba[..len], &mut self.scratch[..len]);

        let Some(src) = PixmapRef::from_bytes(&self.scratch[..len], src_width, src_height) else {
            return;
        };
        let Some(mut pixmap) = PixmapMut::from_bytes(buffer, buf_width, buf_height) else {
            return;
        };

        let paint = PixmapPaint {
            quality: FilterQuality::Nearest,
            ..Default::default()
        };
        let transform = Transform::from_row(
            w / src_width as f32,
            0.0,
            0.0,
            h / src_height as f32,
            x,
            y,
        );
        pixmap.draw_pixmap(0, 0, src, &paint, transform, None);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn premultiply_into(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let a = s[3] as u32;
        d[0] = ((s[0] as u32 * a + 127) / 255) as u8;
        d[1] = ((s[1] as u32 * a + 127) / 255) as u8;
        d[2] = ((s[2] as u32 * a + 127) / 255) as u8;
        d[3] = s[3];
    }
}

/// Alpha-blend a glyph coverage image onto a pixmap
fn blend_glyph(
    pixmap: &mut PixmapMut,
    coverage: &[u8],
    glyph_width: u32,
    glyph_height: u32,
    dest_x: i32,
    dest_y: i32,
    color: CosmicColor,
) {
    let pw = pixmap.width() as i32;
    let ph = pixmap.height() as i32;
    let data = pixmap.data_mut();
    let rgb = [color.r() as u32, color.g() as u32, color.b() as u32];

    for gy in 0..glyph_height as i32 {
        let py = dest_y + gy;
        if py < 0 || py >= ph {
            continue;
        }
        for gx in 0..glyph_width as i32 {
            let px = dest_x + gx;
            if px < 0 || px >= pw {
                continue;
            }
            let Some(&cov) = coverage.get((gy as u32 * glyph_width + gx as u32) as usize) else {
                continue;
            };
            if cov == 0 {
                continue;
            }

            let i = ((py * pw + px) * 4) as usize;
            let src_a = (cov as u32 * color.a() as u32) / 255;
            let inv_a = 255 - src_a;
            for c in 0..3 {
                data[i + c] = ((rgb[c] * src_a + data[i + c] as u32 * inv_a) / 255) as u8;
            }
            data[i + 3] = (src_a + (data[i + 3] as u32 * inv_a) / 255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_premultiply() {
        let mut out = [0u8; 8];
        premultiply_into(&[255, 128, 0, 128, 10, 20, 30, 0], &mut out);
        assert_eq!(&out[..4], &[128, 64, 0, 128]);
        assert_eq!(&out[4..], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_scratch_grows_and_blit_scales() {
        let mut renderer = Renderer::new();
        let mut buffer = vec![0u8; 4 * 4 * 4];
        let red = [255, 0, 0, 255].repeat(4);
        renderer.draw_rgba(&mut buffer, 4, 4, &red, 2, 2, 0.0, 0.0, 4.0, 4.0);
        assert_eq!(renderer.scratch_len(), 16);
        assert_eq!(&buffer[..4], &[255, 0, 0, 255]);
        assert_eq!(&buffer[buffer.len() - 4..], &[255, 0, 0, 255]);

        renderer.draw_rgba(&mut buffer, 4, 4, &[0, 0, 255, 255], 1, 1, 0.0, 0.0, 1.0, 1.0);
        assert_eq!(renderer.scratch_len(), 16, "scratch never shrinks");
        assert_eq!(&buffer[..4], &[0, 0, 255, 255]);
    }
}
