//! Shared configuration types for labelplay
//!
//! This crate contains serializable option types that are shared between
//! the surface-independent core, the overlay renderer and the host binary.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─────────────────────────────────────────────────────────────────────────────
// Media
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of media element the overlays are attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Time-based media; frame numbers derive from playback position
    #[default]
    Video,
    /// Single still image; always uses the sentinel bucket
    Image,
    /// Ordered image frames addressed by index
    ImageSequence,
    /// Independent images addressed by index
    Gallery,
}

impl MediaKind {
    /// Returns true if the current frame is derived from a playback clock
    pub fn is_time_based(&self) -> bool {
        matches!(self, MediaKind::Video)
    }

    /// Returns true if this media has no frame concept at all
    pub fn is_frameless(&self) -> bool {
        matches!(self, MediaKind::Image)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Interaction
// ─────────────────────────────────────────────────────────────────────────────

/// How pointer focus is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    /// Focus follows the pointer continuously
    #[default]
    Hover,
    /// Focus only changes on click
    Click,
}

/// Visibility filter applied to a label or attribute name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LabelFilter {
    /// Hide entries whose confidence is known and below this threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f32>,
    /// If set, only these values are shown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

impl LabelFilter {
    /// Returns true if an entry with this value/confidence passes the filter
    pub fn accepts(&self, value: &str, confidence: Option<f32>) -> bool {
        if let (Some(min), Some(conf)) = (self.min_confidence, confidence) {
            if conf < min {
                return false;
            }
        }
        match &self.values {
            Some(values) => values.iter().any(|v| v == value),
            None => true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Player Options
// ─────────────────────────────────────────────────────────────────────────────

/// Externally mutable options consulted on every draw.
///
/// Overlays keep a snapshot of the options they last laid out with and
/// recompute derived text whenever the live options differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerOptions {
    #[serde(default)]
    pub interaction: InteractionMode,
    #[serde(default)]
    pub only_show_focused: bool,
    #[serde(default = "default_true")]
    pub show_attrs: bool,
    /// `name: value` lines when true, comma-joined values when false
    #[serde(default = "default_true")]
    pub attrs_as_pairs: bool,
    #[serde(default)]
    pub show_confidence: bool,
    #[serde(default = "default_true")]
    pub show_index: bool,
    /// Labels and attribute names that may be drawn (None = all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_labels: Option<Vec<String>>,
    #[serde(default)]
    pub filter: HashMap<String, LabelFilter>,
    /// Focus the first "outside" candidate when nothing contains the pointer
    #[serde(default)]
    pub focus_outside_fallback: bool,
    /// Explicit playback rate for time-based media
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(default = "default_fps")]
    pub default_fps: f64,
    /// Logical width of the internal pixel buffer
    #[serde(default = "default_surface_width")]
    pub surface_width: u32,
    #[serde(default = "default_mask_alpha")]
    pub mask_alpha: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette_seed: Option<u64>,
    #[serde(default = "default_rotate_key")]
    pub rotate_key: String,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            interaction: InteractionMode::default(),
            only_show_focused: false,
            show_attrs: true,
            attrs_as_pairs: true,
            show_confidence: false,
            show_index: true,
            active_labels: None,
            filter: HashMap::new(),
            focus_outside_fallback: false,
            fps: None,
            default_fps: default_fps(),
            surface_width: default_surface_width(),
            mask_alpha: default_mask_alpha(),
            palette_seed: None,
            rotate_key: default_rotate_key(),
        }
    }
}

impl PlayerOptions {
    /// Returns true if `name` is in the active set (or no set is configured)
    pub fn is_active(&self, name: &str) -> bool {
        match &self.active_labels {
            Some(active) => active.iter().any(|l| l == name),
            None => true,
        }
    }

    /// Returns true if `name` is active and its filter accepts the value
    pub fn is_visible(&self, name: &str, value: &str, confidence: Option<f32>) -> bool {
        if !self.is_active(name) {
            return false;
        }
        self.filter
            .get(name)
            .is_none_or(|f| f.accepts(value, confidence))
    }
}

fn default_true() -> bool {
    true
}
fn default_fps() -> f64 {
    30.0
}
fn default_surface_width() -> u32 {
    1280
}
fn default_mask_alpha() -> u8 {
    178
}
fn default_rotate_key() -> String {
    "r".to_string()
}
