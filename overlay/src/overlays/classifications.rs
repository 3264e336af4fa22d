//! Classification lists aggregated per bucket

use labelplay_core::labels::ClassificationGroup;
use labelplay_types::PlayerOptions;

use super::{Containment, Overlay, OverlayContext};
use crate::surface::RenderSurface;
use crate::utils::format_confidence;
use crate::widgets::{PanelBounds, TextPanel, colors};

const PANEL_MARGIN: f32 = 10.0;

/// One (field, frame) group of classifications
#[derive(Debug, Clone)]
pub struct ClassificationEntry {
    pub frame_number: Option<i64>,
    pub group: ClassificationGroup,
}

/// Every classification group that applies to one bucket.
///
/// Drawn as a text panel in the top-right corner. Never intercepts the
/// pointer through containment; hit-testing treats it as outside.
#[derive(Debug, Default)]
pub struct ClassificationsOverlay {
    entries: Vec<ClassificationEntry>,
    canvas_width: f32,
    font_size: f32,
    bounds: Option<PanelBounds>,
}

impl ClassificationsOverlay {
    pub fn new(entries: Vec<ClassificationEntry>) -> Self {
        Self {
            entries,
            canvas_width: 0.0,
            font_size: 14.0,
            bounds: None,
        }
    }

    pub fn entries(&self) -> &[ClassificationEntry] {
        &self.entries
    }

    pub fn bounds(&self) -> Option<PanelBounds> {
        self.bounds
    }

    /// Visible `field: label` lines
    pub fn lines(&self, options: &PlayerOptions) -> Vec<String> {
        let mut lines = Vec::new();
        for entry in &self.entries {
            for class in &entry.group.classifications {
                if !options.is_visible(&entry.group.field, &class.label, class.confidence) {
                    continue;
                }
                let line = match (options.show_confidence, class.confidence) {
                    (true, Some(conf)) => format!(
                        "{}: {} ({})",
                        entry.group.field,
                        class.label,
                        format_confidence(conf)
                    ),
                    _ => format!("{}: {}", entry.group.field, class.label),
                };
                lines.push(line);
            }
        }
        lines
    }
}

impl Overlay for ClassificationsOverlay {
    fn setup(
        &mut self,
        _surface: &mut dyn RenderSurface,
        _ctx: &mut OverlayContext,
        width: f32,
        height: f32,
    ) {
        self.canvas_width = width;
        self.font_size = (0.088 * height).min(18.0);
    }

    fn draw(&mut self, surface: &mut dyn RenderSurface, ctx: &mut OverlayContext, _focused: bool) {
        let lines = self.lines(ctx.options);
        if lines.is_empty() {
            self.bounds = None;
            return;
        }
        let panel = TextPanel::new(lines).with_background(colors::panel_bg());
        let (width, _) = panel.measure(surface, self.font_size);
        let x = (self.canvas_width - width - PANEL_MARGIN).max(0.0);
        self.bounds = Some(panel.render(surface, x, PANEL_MARGIN, self.font_size));
    }

    fn contains_point(&self, _x: f32, _y: f32) -> Containment {
        Containment::Outside
    }

    fn is_always_outside(&self) -> bool {
        true
    }
}
