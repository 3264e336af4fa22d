//! Full-surface segmentation masks

use labelplay_core::mask::MaskArray;

use super::{Containment, Overlay, OverlayContext};
use crate::surface::RenderSurface;

/// A segmentation mask covering the whole frame.
///
/// Label ids are translated to palette colors on the first draw and the
/// mask keeps the RGBA result from then on.
#[derive(Debug)]
pub struct FrameMaskOverlay {
    mask: MaskArray,
    frame_number: Option<i64>,
    canvas: (f32, f32),
}

impl FrameMaskOverlay {
    pub fn new(mask: MaskArray, frame_number: Option<i64>) -> Self {
        Self {
            mask,
            frame_number,
            canvas: (0.0, 0.0),
        }
    }

    pub fn mask(&self) -> &MaskArray {
        &self.mask
    }

    pub fn frame_number(&self) -> Option<i64> {
        self.frame_number
    }

    /// Surface point to mask pixel
    fn mask_coords(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        let (width, height) = self.canvas;
        if width <= 0.0 || height <= 0.0 || x < 0.0 || y < 0.0 || x >= width || y >= height {
            return None;
        }
        let mx = (x / width * self.mask.width() as f32) as usize;
        let my = (y / height * self.mask.height() as f32) as usize;
        Some((mx, my))
    }
}

impl Overlay for FrameMaskOverlay {
    fn setup(
        &mut self,
        _surface: &mut dyn RenderSurface,
        _ctx: &mut OverlayContext,
        width: f32,
        height: f32,
    ) {
        self.canvas = (width, height);
    }

    fn draw(&mut self, surface: &mut dyn RenderSurface, ctx: &mut OverlayContext, _focused: bool) {
        let alpha = ctx.options.mask_alpha;
        let palette = &mut *ctx.palette;
        let mask_index = ctx.mask_index;
        if self
            .mask
            .colorize(|label| palette.mask_color(label, mask_index, alpha))
        {
            tracing::debug!(frame = ?self.frame_number, "mask colorized");
        }

        let Some(rgba) = self.mask.rgba() else {
            return;
        };
        let (width, height) = self.canvas;
        surface.draw_rgba(
            rgba,
            self.mask.width() as u32,
            self.mask.height() as u32,
            0.0,
            0.0,
            width,
            height,
        );
    }

    fn contains_point(&self, x: f32, y: f32) -> Containment {
        match self.mask_coords(x, y) {
            Some((mx, my)) if self.mask.is_set(mx, my) => Containment::Inside,
            _ => Containment::Outside,
        }
    }
}
