//! Bounding-box detections with label header, attribute text and mask

use labelplay_core::labels::{Attribute, BoundingBox, ObjectRecord};
use labelplay_core::mask::MaskArray;
use labelplay_types::PlayerOptions;

use super::attrs::{AttrLayout, attribute_lines};
use super::{Containment, Overlay, OverlayContext, SelectData};
use crate::palette::ColorKey;
use crate::surface::RenderSurface;
use crate::utils::{color_from_rgba, format_confidence, with_alpha};
use crate::widgets::{HeaderBar, TextPanel, colors};

const TEXT_PADDING: f32 = 4.0;
const STROKE_WIDTH: f32 = 2.0;
const FOCUSED_STROKE_WIDTH: f32 = 4.0;

/// Axis-aligned rectangle in surface pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    pub fn from_normalized(bbox: &BoundingBox, width: f32, height: f32) -> Self {
        let x0 = bbox.top_left.x.min(bbox.bottom_right.x);
        let x1 = bbox.top_left.x.max(bbox.bottom_right.x);
        let y0 = bbox.top_left.y.min(bbox.bottom_right.y);
        let y1 = bbox.top_left.y.max(bbox.bottom_right.y);
        Self {
            x: x0 * width,
            y: y0 * height,
            width: (x1 - x0) * width,
            height: (y1 - y0) * height,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Distance from an inside point to the nearest edge
    pub fn edge_distance(&self, x: f32, y: f32) -> f32 {
        let dx = (x - self.x).min(self.x + self.width - x);
        let dy = (y - self.y).min(self.y + self.height - y);
        dx.min(dy).max(0.0)
    }
}

/// Layout computed in `setup` and refreshed when options change
#[derive(Debug, Clone, Default)]
struct RegionLayout {
    rect: PixelRect,
    label_font: f32,
    attr_font: f32,
    bar_height: f32,
    header_width: f32,
    header_label: String,
    header_index: Option<String>,
    attr_lines: Vec<String>,
}

/// One detected object: a box, its header and optional per-object mask
#[derive(Debug)]
pub struct RegionOverlay {
    label: String,
    index: Option<i64>,
    confidence: Option<f32>,
    frame_number: Option<i64>,
    bbox: BoundingBox,
    attrs: Vec<Attribute>,
    mask: Option<MaskArray>,

    color: [u8; 4],
    canvas: (f32, f32),
    layout: Option<RegionLayout>,
    snapshot: Option<AttrLayout>,
}

impl RegionOverlay {
    pub fn new(record: &ObjectRecord, frame_number: Option<i64>, mask: Option<MaskArray>) -> Self {
        Self {
            label: record.label.clone(),
            index: record.index,
            confidence: record.confidence,
            frame_number: record.frame_number.or(frame_number),
            bbox: record.bounding_box,
            attrs: record
                .attrs
                .as_ref()
                .map(|a| a.attrs().to_vec())
                .unwrap_or_default(),
            mask,
            color: [255, 255, 255, 255],
            canvas: (0.0, 0.0),
            layout: None,
            snapshot: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn index(&self) -> Option<i64> {
        self.index
    }

    pub fn mask(&self) -> Option<&MaskArray> {
        self.mask.as_ref()
    }

    /// Assigned palette color (valid after setup)
    pub fn color(&self) -> [u8; 4] {
        self.color
    }

    /// Box in surface pixels (valid after setup)
    pub fn rect(&self) -> Option<PixelRect> {
        self.layout.as_ref().map(|l| l.rect)
    }

    pub fn header_width(&self) -> Option<f32> {
        self.layout.as_ref().map(|l| l.header_width)
    }

    pub fn attr_lines(&self) -> &[String] {
        self.layout
            .as_ref()
            .map(|l| l.attr_lines.as_slice())
            .unwrap_or(&[])
    }

    fn color_key(&self) -> ColorKey {
        match self.index {
            Some(index) => ColorKey::Index(index),
            None => ColorKey::Label(self.label.clone()),
        }
    }

    /// Recompute text-dependent layout for the current options
    fn layout(&self, surface: &mut dyn RenderSurface, options: &PlayerOptions) -> RegionLayout {
        let (width, height) = self.canvas;
        let rect = PixelRect::from_normalized(&self.bbox, width, height);
        let label_font = (0.09 * height).min(20.0);
        let attr_font = (0.088 * height).min(18.0);
        let bar_height = (0.13 * height).min(26.0);

        let header_label = match (options.show_confidence, self.confidence) {
            (true, Some(conf)) => format!("{} {}", self.label, format_confidence(conf)),
            _ => self.label.clone(),
        };
        let header_index = self
            .index
            .filter(|_| options.show_index)
            .map(|i| i.to_string());

        let header = HeaderBar::new(header_label.clone(), colors::black())
            .with_index(header_index.clone());
        let needed = header.required_width(surface, label_font, TEXT_PADDING);
        let header_width = if needed > rect.width {
            needed
        } else {
            rect.width
        };

        RegionLayout {
            rect,
            label_font,
            attr_font,
            bar_height,
            header_width,
            header_label,
            header_index,
            attr_lines: attribute_lines(&self.attrs, options),
        }
    }
}

impl Overlay for RegionOverlay {
    fn setup(
        &mut self,
        surface: &mut dyn RenderSurface,
        ctx: &mut OverlayContext,
        width: f32,
        height: f32,
    ) {
        self.canvas = (width, height);
        self.color = ctx.palette.entry_for(self.color_key()).rgba;
        self.layout = Some(self.layout(surface, ctx.options));
        self.snapshot = Some(AttrLayout::snapshot(ctx.options));
    }

    fn draw(&mut self, surface: &mut dyn RenderSurface, ctx: &mut OverlayContext, focused: bool) {
        if self.layout.is_none() || !self.is_shown(ctx.options) {
            return;
        }

        let current = AttrLayout::snapshot(ctx.options);
        if self.snapshot.as_ref() != Some(&current) {
            self.layout = Some(self.layout(surface, ctx.options));
            self.snapshot = Some(current);
        }
        let Some(layout) = &self.layout else {
            return;
        };
        let rect = layout.rect;
        let color = color_from_rgba(self.color);

        if let Some(mask) = &mut self.mask {
            let fill = with_alpha(self.color, ctx.options.mask_alpha);
            mask.colorize(|label| if label != 0 { fill } else { [0, 0, 0, 0] });
            if let Some(rgba) = mask.rgba() {
                surface.draw_rgba(
                    rgba,
                    mask.width() as u32,
                    mask.height() as u32,
                    rect.x,
                    rect.y,
                    rect.width,
                    rect.height,
                );
            }
        }

        if focused {
            surface.stroke_rect(
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                FOCUSED_STROKE_WIDTH + 2.0,
                colors::focus_outline(),
            );
        }
        let stroke = if focused {
            FOCUSED_STROKE_WIDTH
        } else {
            STROKE_WIDTH
        };
        surface.stroke_rect(rect.x, rect.y, rect.width, rect.height, stroke, color);

        let header_y = if rect.y >= layout.bar_height {
            rect.y - layout.bar_height
        } else {
            rect.y
        };
        HeaderBar::new(layout.header_label.clone(), color)
            .with_index(layout.header_index.clone())
            .render(
                surface,
                rect.x,
                header_y,
                layout.header_width,
                layout.bar_height,
                layout.label_font,
                TEXT_PADDING,
            );

        if !layout.attr_lines.is_empty() {
            TextPanel::new(layout.attr_lines.clone())
                .with_background(colors::attr_bg())
                .with_padding(TEXT_PADDING)
                .render(
                    surface,
                    rect.x,
                    header_y + layout.bar_height,
                    layout.attr_font,
                );
        }
    }

    fn contains_point(&self, x: f32, y: f32) -> Containment {
        match &self.layout {
            Some(layout) if layout.rect.contains(x, y) => Containment::Inside,
            _ => Containment::Outside,
        }
    }

    fn mouse_distance(&self, x: f32, y: f32) -> f32 {
        match &self.layout {
            Some(layout) if layout.rect.contains(x, y) => layout.rect.edge_distance(x, y),
            _ => f32::MAX,
        }
    }

    fn is_selectable(&self) -> bool {
        self.index.is_some()
    }

    fn select_data(&self) -> Option<SelectData> {
        Some(SelectData {
            label: self.label.clone(),
            index: self.index,
            frame_number: self.frame_number,
            confidence: self.confidence,
        })
    }

    fn is_shown(&self, options: &PlayerOptions) -> bool {
        options.is_visible(&self.label, &self.label, self.confidence)
    }
}
