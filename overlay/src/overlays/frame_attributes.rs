//! Frame-level attribute text in the top-left corner

use labelplay_core::labels::Attribute;

use super::attrs::attribute_lines;
use super::{Containment, Overlay, OverlayContext};
use crate::surface::RenderSurface;
use crate::widgets::{PanelBounds, TextPanel};

const PANEL_MARGIN: f32 = 10.0;
const PANEL_PADDING: f32 = 6.0;

#[derive(Debug)]
pub struct FrameAttributesOverlay {
    attrs: Vec<Attribute>,
    font_size: f32,
    bounds: Option<PanelBounds>,
}

impl FrameAttributesOverlay {
    pub fn new(attrs: Vec<Attribute>) -> Self {
        Self {
            attrs,
            font_size: 14.0,
            bounds: None,
        }
    }

    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    /// Area covered by the last draw
    pub fn bounds(&self) -> Option<PanelBounds> {
        self.bounds
    }
}

impl Overlay for FrameAttributesOverlay {
    fn setup(
        &mut self,
        _surface: &mut dyn RenderSurface,
        _ctx: &mut OverlayContext,
        _width: f32,
        height: f32,
    ) {
        self.font_size = (0.088 * height).min(18.0);
    }

    fn draw(&mut self, surface: &mut dyn RenderSurface, ctx: &mut OverlayContext, _focused: bool) {
        let lines = attribute_lines(&self.attrs, ctx.options);
        if lines.is_empty() {
            self.bounds = None;
            return;
        }
        let panel = TextPanel::new(lines).with_padding(PANEL_PADDING);
        self.bounds = Some(panel.render(surface, PANEL_MARGIN, PANEL_MARGIN, self.font_size));
    }

    fn contains_point(&self, x: f32, y: f32) -> Containment {
        match self.bounds {
            Some(bounds) if bounds.contains(x, y) => Containment::Inside,
            _ => Containment::Outside,
        }
    }
}
