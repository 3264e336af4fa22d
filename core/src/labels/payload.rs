//! Raw label payload schema
//!
//! Two top-level shapes are accepted:
//!
//! - a flat `objects` list, each record carrying its own `frame_number`
//! - a `frames` map from frame-number string to a per-frame record
//!
//! plus top-level `attrs`/`mask`/`classifications` for frame-less media and
//! an optional `mask_index` visibility map.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::PayloadError;

/// Normalized bounding-box corner, both coordinates in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top_left: NormalizedPoint,
    pub bottom_right: NormalizedPoint,
}

/// One named attribute with an arbitrary scalar value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl Attribute {
    /// Display form of the value (strings unquoted)
    pub fn value_text(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// `{"attrs": [...]}` container, or a bare list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeContainer {
    Wrapped { attrs: Vec<Attribute> },
    List(Vec<Attribute>),
}

impl AttributeContainer {
    pub fn attrs(&self) -> &[Attribute] {
        match self {
            AttributeContainer::Wrapped { attrs } => attrs,
            AttributeContainer::List(attrs) => attrs,
        }
    }

    pub fn into_attrs(self) -> Vec<Attribute> {
        match self {
            AttributeContainer::Wrapped { attrs } => attrs,
            AttributeContainer::List(attrs) => attrs,
        }
    }
}

/// One detected object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_number: Option<i64>,
    pub bounding_box: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<AttributeContainer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
}

/// `{"objects": [...]}` container, or a bare list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectContainer {
    Wrapped { objects: Vec<ObjectRecord> },
    List(Vec<ObjectRecord>),
}

impl ObjectContainer {
    pub fn objects(&self) -> &[ObjectRecord] {
        match self {
            ObjectContainer::Wrapped { objects } => objects,
            ObjectContainer::List(objects) => objects,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// Classifications produced for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationGroup {
    pub field: String,
    #[serde(default)]
    pub classifications: Vec<Classification>,
}

/// Per-frame record inside a `frames` map
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects: Option<ObjectContainer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<AttributeContainer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classifications: Vec<ClassificationGroup>,
}

/// Mask-index entry: explicit visibility or a label name (visible)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaskIndexEntry {
    Visible(bool),
    Name(String),
}

/// Label-id → visibility map consulted during mask colorization
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaskIndex {
    entries: HashMap<i64, MaskIndexEntry>,
}

impl MaskIndex {
    /// Unlisted ids are visible
    pub fn is_visible(&self, label: i64) -> bool {
        !matches!(self.entries.get(&label), Some(MaskIndexEntry::Visible(false)))
    }

    pub fn name(&self, label: i64) -> Option<&str> {
        match self.entries.get(&label) {
            Some(MaskIndexEntry::Name(name)) => Some(name),
            _ => None,
        }
    }

    /// Named labels in ascending id order
    pub fn names(&self) -> Vec<(i64, &str)> {
        let mut names: Vec<_> = self
            .entries
            .keys()
            .filter_map(|&label| self.name(label).map(|name| (label, name)))
            .collect();
        names.sort_by_key(|(label, _)| *label);
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The label payload as received from the host. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawLabelPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects: Option<ObjectContainer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames: Option<BTreeMap<String, FrameRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<AttributeContainer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_index: Option<HashMap<String, MaskIndexEntry>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classifications: Vec<ClassificationGroup>,
}

impl RawLabelPayload {
    pub fn from_json(text: &str) -> Result<Self, PayloadError> {
        serde_json::from_str(text).map_err(PayloadError::Json)
    }

    pub fn from_file(path: &Path) -> Result<Self, PayloadError> {
        let text = std::fs::read_to_string(path).map_err(|source| PayloadError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Frames keyed by integer frame number, in ascending order.
    ///
    /// Fails on keys that are not integers.
    pub fn numbered_frames(&self) -> Result<Vec<(i64, &FrameRecord)>, PayloadError> {
        let Some(frames) = &self.frames else {
            return Ok(Vec::new());
        };

        let mut numbered = frames
            .iter()
            .map(|(key, record)| {
                key.trim()
                    .parse::<i64>()
                    .map(|n| (n, record))
                    .map_err(|_| PayloadError::InvalidFrameKey { key: key.clone() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        numbered.sort_by_key(|(n, _)| *n);
        Ok(numbered)
    }

    /// The parsed `mask_index`, with non-integer keys dropped
    pub fn mask_index(&self) -> MaskIndex {
        let entries = self
            .mask_index
            .iter()
            .flatten()
            .filter_map(|(key, entry)| key.trim().parse::<i64>().ok().map(|id| (id, entry.clone())))
            .collect();
        MaskIndex { entries }
    }
}
