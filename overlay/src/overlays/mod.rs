//! Drawable annotation variants
//!
//! Every annotation kind is a variant of the closed [`OverlayKind`] union.
//! Variants share the [`Overlay`] capability set and are dispatched with an
//! exhaustive match, so adding a kind means touching every dispatch site.
//!
//! # Two-phase construction
//!
//! Constructors only capture raw payload fields. [`Overlay::setup`] runs once
//! the surface has pixel dimensions and computes geometry and text metrics.
//! [`Overlay::draw`] is idempotent and cheap to repeat every frame.
//!
//! Overlays never hold a handle to the player. The little they need from it
//! (options, palette, mask visibility) arrives through [`OverlayContext`].

mod attrs;
mod classifications;
mod frame_attributes;
mod frame_mask;
mod region;

pub use attrs::{AttrLayout, attribute_lines};
pub use classifications::{ClassificationEntry, ClassificationsOverlay};
pub use frame_attributes::FrameAttributesOverlay;
pub use frame_mask::FrameMaskOverlay;
pub use region::{PixelRect, RegionOverlay};

use labelplay_core::labels::MaskIndex;
use labelplay_types::PlayerOptions;

use crate::palette::Palette;
use crate::surface::RenderSurface;

// ─────────────────────────────────────────────────────────────────────────────
// Shared Types
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only state (plus the palette) passed into every overlay call
pub struct OverlayContext<'a> {
    pub options: &'a PlayerOptions,
    pub palette: &'a mut Palette,
    pub mask_index: &'a MaskIndex,
}

/// Result of a containment test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Outside,
    Inside,
}

impl Containment {
    pub fn is_inside(self) -> bool {
        self == Containment::Inside
    }
}

/// Payload emitted to the host when an overlay is selected or focused
#[derive(Debug, Clone, PartialEq)]
pub struct SelectData {
    pub label: String,
    pub index: Option<i64>,
    pub frame_number: Option<i64>,
    pub confidence: Option<f32>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Overlay Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Capability set shared by every annotation variant
pub trait Overlay {
    /// Compute pixel geometry for a `width` x `height` surface
    fn setup(
        &mut self,
        surface: &mut dyn RenderSurface,
        ctx: &mut OverlayContext,
        width: f32,
        height: f32,
    );

    /// Draw onto the surface. Safe to call repeatedly.
    fn draw(&mut self, surface: &mut dyn RenderSurface, ctx: &mut OverlayContext, focused: bool);

    fn contains_point(&self, x: f32, y: f32) -> Containment;

    /// Tie-breaker among contained candidates (smaller wins)
    fn mouse_distance(&self, _x: f32, _y: f32) -> f32 {
        f32::MAX
    }

    fn is_selectable(&self) -> bool {
        false
    }

    fn select_data(&self) -> Option<SelectData> {
        None
    }

    /// Never a contained candidate, regardless of position
    fn is_always_outside(&self) -> bool {
        false
    }

    /// Whether the live options allow this overlay to be drawn at all
    fn is_shown(&self, _options: &PlayerOptions) -> bool {
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Closed Variant Union
// ─────────────────────────────────────────────────────────────────────────────

/// Every overlay stored in the index
#[derive(Debug)]
pub enum OverlayKind {
    Region(RegionOverlay),
    FrameMask(FrameMaskOverlay),
    FrameAttributes(FrameAttributesOverlay),
    Classifications(ClassificationsOverlay),
}

impl OverlayKind {
    pub fn name(&self) -> &'static str {
        match self {
            OverlayKind::Region(_) => "region",
            OverlayKind::FrameMask(_) => "frame_mask",
            OverlayKind::FrameAttributes(_) => "frame_attributes",
            OverlayKind::Classifications(_) => "classifications",
        }
    }

    pub fn as_region(&self) -> Option<&RegionOverlay> {
        match self {
            OverlayKind::Region(region) => Some(region),
            _ => None,
        }
    }

    pub fn as_frame_mask(&self) -> Option<&FrameMaskOverlay> {
        match self {
            OverlayKind::FrameMask(mask) => Some(mask),
            _ => None,
        }
    }
}

impl Overlay for OverlayKind {
    fn setup(
        &mut self,
        surface: &mut dyn RenderSurface,
        ctx: &mut OverlayContext,
        width: f32,
        height: f32,
    ) {
        match self {
            OverlayKind::Region(o) => o.setup(surface, ctx, width, height),
            OverlayKind::FrameMask(o) => o.setup(surface, ctx, width, height),
            OverlayKind::FrameAttributes(o) => o.setup(surface, ctx, width, height),
            OverlayKind::Classifications(o) => o.setup(surface, ctx, width, height),
        }
    }

    fn draw(&mut self, surface: &mut dyn RenderSurface, ctx: &mut OverlayContext, focused: bool) {
        match self {
            OverlayKind::Region(o) => o.draw(surface, ctx, focused),
            OverlayKind::FrameMask(o) => o.draw(surface, ctx, focused),
            OverlayKind::FrameAttributes(o) => o.draw(surface, ctx, focused),
            OverlayKind::Classifications(o) => o.draw(surface, ctx, focused),
        }
    }

    fn contains_point(&self, x: f32, y: f32) -> Containment {
        match self {
            OverlayKind::Region(o) => o.contains_point(x, y),
            OverlayKind::FrameMask(o) => o.contains_point(x, y),
            OverlayKind::FrameAttributes(o) => o.contains_point(x, y),
            OverlayKind::Classifications(o) => o.contains_point(x, y),
        }
    }

    fn mouse_distance(&self, x: f32, y: f32) -> f32 {
        match self {
            OverlayKind::Region(o) => o.mouse_distance(x, y),
            OverlayKind::FrameMask(o) => o.mouse_distance(x, y),
            OverlayKind::FrameAttributes(o) => o.mouse_distance(x, y),
            OverlayKind::Classifications(o) => o.mouse_distance(x, y),
        }
    }

    fn is_selectable(&self) -> bool {
        match self {
            OverlayKind::Region(o) => o.is_selectable(),
            OverlayKind::FrameMask(o) => o.is_selectable(),
            OverlayKind::FrameAttributes(o) => o.is_selectable(),
            OverlayKind::Classifications(o) => o.is_selectable(),
        }
    }

    fn select_data(&self) -> Option<SelectData> {
        match self {
            OverlayKind::Region(o) => o.select_data(),
            OverlayKind::FrameMask(o) => o.select_data(),
            OverlayKind::FrameAttributes(o) => o.select_data(),
            OverlayKind::Classifications(o) => o.select_data(),
        }
    }

    fn is_always_outside(&self) -> bool {
        match self {
            OverlayKind::Region(o) => o.is_always_outside(),
            OverlayKind::FrameMask(o) => o.is_always_outside(),
            OverlayKind::FrameAttributes(o) => o.is_always_outside(),
            OverlayKind::Classifications(o) => o.is_always_outside(),
        }
    }

    fn is_shown(&self, options: &PlayerOptions) -> bool {
        match self {
            OverlayKind::Region(o) => o.is_shown(options),
            OverlayKind::FrameMask(o) => o.is_shown(options),
            OverlayKind::FrameAttributes(o) => o.is_shown(options),
            OverlayKind::Classifications(o) => o.is_shown(options),
        }
    }
}
