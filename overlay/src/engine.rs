//! Per-frame drawing and pointer hit-testing
//!
//! The engine owns the transient focus state. Draw order and hit
//! resolution are plain functions over a bucket so they can be tested
//! without a surface.

use std::cmp::Ordering;

use labelplay_types::{InteractionMode, PlayerOptions};

use crate::index::OverlayIndex;
use crate::overlays::{Overlay, OverlayContext, OverlayKind, SelectData};
use crate::palette::Palette;
use crate::surface::RenderSurface;
use crate::widgets::colors;

/// Displayed element's rectangle in client (screen) coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ClientRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rescale a client point into surface pixel space
    pub fn to_surface(&self, client_x: f32, client_y: f32, surface_w: u32, surface_h: u32) -> (f32, f32) {
        if self.width <= 0.0 || self.height <= 0.0 {
            return (0.0, 0.0);
        }
        (
            (client_x - self.left) / self.width * surface_w as f32,
            (client_y - self.top) / self.height * surface_h as f32,
        )
    }
}

/// Transient pointer focus, rebuilt on every pointer event
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FocusState {
    /// (bucket key, position in bucket) of the focused overlay
    pub focused: Option<(i64, usize)>,
    /// Position of the focused overlay within the candidate list
    pub focus_index: usize,
    pub mouse_pos: Option<(f32, f32)>,
    pub rotation_index: usize,
}

/// Candidates under a point: contained ones nearest first, then outside ones
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HitCandidates {
    pub contained: Vec<usize>,
    pub outside: Vec<usize>,
}

impl HitCandidates {
    /// Contained followed by outside
    pub fn ordered(&self) -> Vec<usize> {
        self.contained
            .iter()
            .chain(self.outside.iter())
            .copied()
            .collect()
    }

    /// Focus candidate for the current rotation
    pub fn focus(&self, rotation: usize, outside_fallback: bool) -> Option<usize> {
        if !self.contained.is_empty() {
            return Some(self.contained[rotation % self.contained.len()]);
        }
        if outside_fallback {
            return self.outside.first().copied();
        }
        None
    }
}

/// Bucket positions in draw order.
///
/// With `only_show_focused` and nothing focused nothing is drawn; otherwise
/// everything in bucket order with the focused overlay moved last.
pub fn draw_order(len: usize, focused: Option<usize>, only_show_focused: bool) -> Vec<usize> {
    if only_show_focused && focused.is_none() {
        return Vec::new();
    }
    let focused = focused.filter(|f| *f < len);
    let mut order: Vec<usize> = (0..len).filter(|i| Some(*i) != focused).collect();
    order.extend(focused);
    order
}

/// Partition a bucket around (x, y)
pub fn resolve_hit(bucket: &[OverlayKind], options: &PlayerOptions, x: f32, y: f32) -> HitCandidates {
    let mut contained: Vec<(usize, f32)> = Vec::new();
    let mut aggregates = Vec::new();
    let mut misses = Vec::new();

    for (i, overlay) in bucket.iter().enumerate() {
        if !overlay.is_shown(options) {
            continue;
        }
        if overlay.is_always_outside() {
            aggregates.push(i);
        } else if overlay.contains_point(x, y).is_inside() {
            contained.push((i, overlay.mouse_distance(x, y)));
        } else {
            misses.push(i);
        }
    }

    contained.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    aggregates.extend(misses);
    HitCandidates {
        contained: contained.into_iter().map(|(i, _)| i).collect(),
        outside: aggregates,
    }
}

/// Focus and draw dispatch for one player
#[derive(Debug, Default)]
pub struct Engine {
    focus: FocusState,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> &FocusState {
        &self.focus
    }

    /// Focused position within `bucket_key`, if any
    fn focused_in(&self, bucket_key: i64) -> Option<usize> {
        match self.focus.focused {
            Some((key, i)) if key == bucket_key => Some(i),
            _ => None,
        }
    }

    /// Clear the surface and draw the bucket serving `frame`.
    ///
    /// Returns the number of overlays drawn.
    pub fn process_frame(
        &mut self,
        index: &mut OverlayIndex,
        frame: i64,
        surface: &mut dyn RenderSurface,
        options: &PlayerOptions,
        palette: &mut Palette,
    ) -> usize {
        surface.clear(colors::transparent());
        let Some(key) = index.resolve_bucket(frame) else {
            return 0;
        };
        let focused = self.focused_in(key);
        let Some((bucket, mask_index)) = index.bucket_mut(key) else {
            return 0;
        };

        let mut ctx = OverlayContext {
            options,
            palette,
            mask_index,
        };
        let order = draw_order(bucket.len(), focused, options.only_show_focused);
        let mut drawn = 0;
        for i in order {
            if let Some(overlay) = bucket.get_mut(i) {
                overlay.draw(surface, &mut ctx, Some(i) == focused);
                drawn += 1;
            }
        }
        drawn
    }

    /// Resolve focus at the stored pointer position
    fn refocus(&mut self, index: &OverlayIndex, frame: i64, options: &PlayerOptions) -> bool {
        let before = self.focus.focused;
        self.focus.focused = None;
        self.focus.focus_index = 0;

        if let (Some((x, y)), Some(key)) = (self.focus.mouse_pos, index.resolve_bucket(frame)) {
            if let Some(bucket) = index.bucket(key) {
                let hits = resolve_hit(bucket, options, x, y);
                if let Some(i) = hits.focus(self.focus.rotation_index, options.focus_outside_fallback)
                {
                    self.focus.focused = Some((key, i));
                    self.focus.focus_index = hits.ordered().iter().position(|c| *c == i).unwrap_or(0);
                }
            }
        }
        before != self.focus.focused
    }

    /// Pointer moved to (x, y) in surface space.
    ///
    /// In hover mode focus follows the pointer and rotation resets; returns
    /// `true` if the focused overlay changed. In click mode the last click
    /// point is kept, so moving never changes focus or rotation.
    pub fn pointer_move(
        &mut self,
        index: &OverlayIndex,
        frame: i64,
        x: f32,
        y: f32,
        options: &PlayerOptions,
    ) -> bool {
        if options.interaction == InteractionMode::Click {
            return false;
        }
        self.focus.mouse_pos = Some((x, y));
        self.focus.rotation_index = 0;
        self.refocus(index, frame, options)
    }

    /// Pointer left the surface. Click-mode focus survives.
    pub fn pointer_leave(&mut self, options: &PlayerOptions) -> bool {
        if options.interaction == InteractionMode::Click {
            return false;
        }
        self.focus.mouse_pos = None;
        self.focus.rotation_index = 0;
        if self.focus.focused.is_some() {
            self.focus.focused = None;
            return true;
        }
        false
    }

    /// Click at (x, y).
    ///
    /// Returns (focus changed, selection). A selection is only produced for
    /// a contained candidate that declares itself selectable.
    pub fn click(
        &mut self,
        index: &OverlayIndex,
        frame: i64,
        x: f32,
        y: f32,
        options: &PlayerOptions,
    ) -> (bool, Option<SelectData>) {
        if self.focus.mouse_pos != Some((x, y)) {
            self.focus.rotation_index = 0;
        }
        self.focus.mouse_pos = Some((x, y));
        let changed = self.refocus(index, frame, options);

        let Some(key) = index.resolve_bucket(frame) else {
            return (changed, None);
        };
        let Some(bucket) = index.bucket(key) else {
            return (changed, None);
        };
        let hits = resolve_hit(bucket, options, x, y);
        let selected = hits
            .focus(self.focus.rotation_index, false)
            .and_then(|i| bucket.get(i))
            .filter(|overlay| overlay.is_selectable())
            .and_then(|overlay| overlay.select_data());
        (changed, selected)
    }

    /// Cycle focus through the contained candidates at the pointer (the
    /// hover position, or the last click point in click mode)
    pub fn rotate(&mut self, index: &OverlayIndex, frame: i64, options: &PlayerOptions) -> bool {
        let Some((x, y)) = self.focus.mouse_pos else {
            return false;
        };
        let Some(bucket) = index.resolve_bucket(frame).and_then(|key| index.bucket(key)) else {
            return false;
        };
        let contained = resolve_hit(bucket, options, x, y).contained.len();
        if contained < 2 {
            return false;
        }
        self.focus.rotation_index = (self.focus.rotation_index + 1) % contained;
        self.refocus(index, frame, options)
    }

    /// Selection payload of the focused overlay
    pub fn focused_data(&self, index: &OverlayIndex) -> Option<SelectData> {
        let (key, i) = self.focus.focused?;
        index.bucket(key)?.get(i)?.select_data()
    }
}
