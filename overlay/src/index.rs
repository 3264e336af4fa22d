//! Frame-number → overlay bucket index
//!
//! Built once per player from the raw label payload. Bucket order is draw
//! order: the first overlay in a bucket is drawn at the bottom.

use std::collections::{BTreeMap, BTreeSet};

use labelplay_core::labels::{
    AttributeContainer, ClassificationGroup, MaskIndex, ObjectRecord, RawLabelPayload,
};
use labelplay_core::mask::{MaskArray, decode_mask};
use labelplay_core::SENTINEL_FRAME;
use labelplay_types::PlayerOptions;

use crate::error::PlayerError;
use crate::overlays::{
    ClassificationEntry, ClassificationsOverlay, FrameAttributesOverlay, FrameMaskOverlay,
    Overlay, OverlayContext, OverlayKind, RegionOverlay,
};
use crate::palette::Palette;
use crate::surface::RenderSurface;

/// Counts reported after a successful build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrepareSummary {
    /// Buckets keyed by a real frame number
    pub buckets: usize,
    pub overlays: usize,
}

/// Overlays grouped by frame number
#[derive(Debug, Default)]
pub struct OverlayIndex {
    buckets: BTreeMap<i64, Vec<OverlayKind>>,
    mask_index: MaskIndex,
    prepared: bool,
    preparing: bool,
}

impl OverlayIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn is_preparing(&self) -> bool {
        self.preparing
    }

    /// Build the index from `payload`.
    ///
    /// Returns `Ok(None)` without touching anything if the index is already
    /// prepared, a build is in progress, or there is no payload. Flat object
    /// records without a frame number go to `frame_context`, or the sentinel
    /// bucket if none is given.
    ///
    /// On failure the index is left empty but marked prepared.
    pub fn prepare(
        &mut self,
        payload: Option<&RawLabelPayload>,
        frame_context: Option<i64>,
    ) -> Result<Option<PrepareSummary>, PlayerError> {
        if self.prepared || self.preparing {
            return Ok(None);
        }
        let Some(payload) = payload else {
            return Ok(None);
        };

        self.preparing = true;
        let built = build_buckets(payload, frame_context);
        self.preparing = false;
        self.prepared = true;

        let buckets = built?;
        self.buckets = buckets;
        self.mask_index = payload.mask_index();

        let summary = PrepareSummary {
            buckets: self.bucket_count(),
            overlays: self.overlay_count(),
        };
        tracing::info!(
            buckets = summary.buckets,
            overlays = summary.overlays,
            "overlay index built"
        );
        Ok(Some(summary))
    }

    pub fn mask_index(&self) -> &MaskIndex {
        &self.mask_index
    }

    /// Key of the bucket that serves `frame`, falling back to the sentinel
    pub fn resolve_bucket(&self, frame: i64) -> Option<i64> {
        if self.buckets.contains_key(&frame) {
            Some(frame)
        } else if self.buckets.contains_key(&SENTINEL_FRAME) {
            Some(SENTINEL_FRAME)
        } else {
            None
        }
    }

    pub fn bucket(&self, key: i64) -> Option<&[OverlayKind]> {
        self.buckets.get(&key).map(Vec::as_slice)
    }

    /// A bucket together with the mask visibility map, borrowed disjointly
    pub fn bucket_mut(&mut self, key: i64) -> Option<(&mut Vec<OverlayKind>, &MaskIndex)> {
        let mask_index = &self.mask_index;
        self.buckets.get_mut(&key).map(|b| (b, mask_index))
    }

    pub fn frame_numbers(&self) -> impl Iterator<Item = i64> + '_ {
        self.buckets.keys().copied().filter(|k| *k != SENTINEL_FRAME)
    }

    /// Number of buckets keyed by a real frame number
    pub fn bucket_count(&self) -> usize {
        self.frame_numbers().count()
    }

    pub fn overlay_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Run `setup` on every overlay for the surface's current size
    pub fn setup_all(
        &mut self,
        surface: &mut dyn RenderSurface,
        options: &PlayerOptions,
        palette: &mut Palette,
    ) {
        let width = surface.width() as f32;
        let height = surface.height() as f32;
        let mut ctx = OverlayContext {
            options,
            palette,
            mask_index: &self.mask_index,
        };
        for overlay in self.buckets.values_mut().flatten() {
            overlay.setup(surface, &mut ctx, width, height);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Building
// ─────────────────────────────────────────────────────────────────────────────

type Buckets = BTreeMap<i64, Vec<OverlayKind>>;

fn insert(buckets: &mut Buckets, frame: i64, overlay: OverlayKind) {
    buckets.entry(frame).or_default().push(overlay);
}

fn decode(mask: &str, frame: i64) -> Result<MaskArray, PlayerError> {
    decode_mask(mask)
        .map(MaskArray::from)
        .map_err(|source| PlayerError::Mask { frame, source })
}

fn region(record: &ObjectRecord, frame: i64) -> Result<OverlayKind, PlayerError> {
    let mask = record.mask.as_deref().map(|m| decode(m, frame)).transpose()?;
    let frame_number = (frame != SENTINEL_FRAME).then_some(frame);
    Ok(OverlayKind::Region(RegionOverlay::new(record, frame_number, mask)))
}

fn attributes(container: &AttributeContainer) -> Option<OverlayKind> {
    let attrs = container.attrs();
    if attrs.is_empty() {
        return None;
    }
    Some(OverlayKind::FrameAttributes(FrameAttributesOverlay::new(
        attrs.to_vec(),
    )))
}

fn build_buckets(
    payload: &RawLabelPayload,
    frame_context: Option<i64>,
) -> Result<Buckets, PlayerError> {
    let mut buckets = Buckets::new();
    let mut frame_groups: BTreeMap<i64, &[ClassificationGroup]> = BTreeMap::new();

    if let Some(objects) = &payload.objects {
        for record in objects.objects() {
            let frame = record
                .frame_number
                .or(frame_context)
                .unwrap_or(SENTINEL_FRAME);
            insert(&mut buckets, frame, region(record, frame)?);
        }
    }

    for (frame, record) in payload.numbered_frames()? {
        if let Some(mask) = &record.mask {
            let mask = decode(mask, frame)?;
            insert(
                &mut buckets,
                frame,
                OverlayKind::FrameMask(FrameMaskOverlay::new(mask, Some(frame))),
            );
        }
        if let Some(objects) = &record.objects {
            for object in objects.objects() {
                insert(&mut buckets, frame, region(object, frame)?);
            }
        }
        if let Some(overlay) = record.attrs.as_ref().and_then(attributes) {
            insert(&mut buckets, frame, overlay);
        }
        if !record.classifications.is_empty() {
            frame_groups.insert(frame, record.classifications.as_slice());
        }
    }

    if payload.frames.is_none() {
        if let Some(mask) = &payload.mask {
            let mask = decode(mask, SENTINEL_FRAME)?;
            insert(
                &mut buckets,
                SENTINEL_FRAME,
                OverlayKind::FrameMask(FrameMaskOverlay::new(mask, None)),
            );
        }
        if let Some(overlay) = payload.attrs.as_ref().and_then(attributes) {
            insert(&mut buckets, SENTINEL_FRAME, overlay);
        }
    }

    add_classifications(&mut buckets, &payload.classifications, &frame_groups);
    Ok(buckets)
}

/// Append one classification overlay per bucket: global groups first, then
/// the bucket's own frame groups.
fn add_classifications(
    buckets: &mut Buckets,
    global: &[ClassificationGroup],
    frame_groups: &BTreeMap<i64, &[ClassificationGroup]>,
) {
    let mut keys: BTreeSet<i64> = buckets.keys().copied().collect();
    keys.extend(frame_groups.keys().copied());
    if keys.is_empty() && !global.is_empty() {
        keys.insert(SENTINEL_FRAME);
    }

    for key in keys {
        let mut entries: Vec<ClassificationEntry> = global
            .iter()
            .map(|group| ClassificationEntry {
                frame_number: None,
                group: group.clone(),
            })
            .collect();
        if let Some(groups) = frame_groups.get(&key) {
            entries.extend(groups.iter().map(|group| ClassificationEntry {
                frame_number: Some(key),
                group: group.clone(),
            }));
        }
        if !entries.is_empty() {
            insert(
                buckets,
                key,
                OverlayKind::Classifications(ClassificationsOverlay::new(entries)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelplay_core::mask::{compress_and_encode, encode_u8_mask};

    fn payload(text: &str) -> RawLabelPayload {
        RawLabelPayload::from_json(text).unwrap()
    }

    fn mask_string() -> String {
        encode_u8_mask(&[2, 2], &[1, 0, 0, 1]).unwrap()
    }

    #[test]
    fn test_frames_map_counts() {
        let text = format!(
            r#"{{"frames": {{
                "1": {{"objects": {{"objects": [
                        {{"label": "car", "index": 1, "bounding_box": {{"top_left": {{"x": 0, "y": 0}}, "bottom_right": {{"x": 0.5, "y": 0.5}}}}}},
                        {{"label": "dog", "bounding_box": {{"top_left": {{"x": 0.5, "y": 0.5}}, "bottom_right": {{"x": 1, "y": 1}}}}}}
                    ]}},
                    "attrs": {{"attrs": [{{"name": "weather", "value": "sun"}}]}}}},
                "2": {{"mask": "{mask}"}},
                "10": {{"attrs": [{{"name": "scene", "value": "night"}}]}}
            }}}}"#,
            mask = mask_string()
        );
        let mut index = OverlayIndex::new();
        let summary = index.prepare(Some(&payload(&text)), None).unwrap().unwrap();
        assert_eq!(summary.buckets, 3);
        assert_eq!(summary.overlays, 5);
        assert_eq!(index.frame_numbers().collect::<Vec<_>>(), vec![1, 2, 10]);

        let first = index.bucket(1).unwrap();
        assert_eq!(first[0].name(), "region");
        assert_eq!(first[1].name(), "region");
        assert_eq!(first[2].name(), "frame_attributes");
    }

    #[test]
    fn test_mask_before_objects_within_frame() {
        let text = format!(
            r#"{{"frames": {{"3": {{
                "objects": [{{"label": "a", "bounding_box": {{"top_left": {{"x": 0, "y": 0}}, "bottom_right": {{"x": 1, "y": 1}}}}}}],
                "mask": "{mask}"
            }}}}}}"#,
            mask = mask_string()
        );
        let mut index = OverlayIndex::new();
        index.prepare(Some(&payload(&text)), None).unwrap();
        let names: Vec<_> = index.bucket(3).unwrap().iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["frame_mask", "region"]);
    }

    #[test]
    fn test_flat_objects_use_record_frame_or_context() {
        let text = r#"{"objects": [
            {"label": "a", "frame_number": 4, "bounding_box": {"top_left": {"x": 0, "y": 0}, "bottom_right": {"x": 1, "y": 1}}},
            {"label": "b", "bounding_box": {"top_left": {"x": 0, "y": 0}, "bottom_right": {"x": 1, "y": 1}}}
        ]}"#;
        let mut index = OverlayIndex::new();
        index.prepare(Some(&payload(text)), None).unwrap();
        assert_eq!(index.bucket(4).map(|b| b.len()), Some(1));
        assert_eq!(index.bucket(SENTINEL_FRAME).map(|b| b.len()), Some(1));

        let mut index = OverlayIndex::new();
        index.prepare(Some(&payload(text)), Some(7)).unwrap();
        assert_eq!(index.bucket(7).map(|b| b.len()), Some(1));
        assert!(index.bucket(SENTINEL_FRAME).is_none());
    }

    #[test]
    fn test_top_level_attrs_and_mask_go_to_sentinel() {
        let text = format!(
            r#"{{"attrs": {{"attrs": [{{"name": "k", "value": 1}}]}}, "mask": "{mask}"}}"#,
            mask = mask_string()
        );
        let mut index = OverlayIndex::new();
        index.prepare(Some(&payload(&text)), None).unwrap();
        assert_eq!(index.bucket_count(), 0);
        assert_eq!(index.resolve_bucket(12), Some(SENTINEL_FRAME));
        assert_eq!(index.bucket(SENTINEL_FRAME).unwrap().len(), 2);
    }

    #[test]
    fn test_prepare_twice_builds_once() {
        let text = r#"{"frames": {"1": {"attrs": [{"name": "k", "value": 1}]}}}"#;
        let payload = payload(text);
        let mut index = OverlayIndex::new();
        assert!(index.prepare(Some(&payload), None).unwrap().is_some());
        assert!(index.prepare(Some(&payload), None).unwrap().is_none());
        assert_eq!(index.overlay_count(), 1);
    }

    #[test]
    fn test_absent_payload_is_noop() {
        let mut index = OverlayIndex::new();
        assert!(index.prepare(None, None).unwrap().is_none());
        assert!(!index.is_prepared());
    }

    #[test]
    fn test_bad_mask_fails_and_leaves_index_empty() {
        let bad = compress_and_encode(b"not an array").unwrap();
        let text = format!(r#"{{"frames": {{"5": {{"mask": "{bad}"}}}}}}"#);
        let mut index = OverlayIndex::new();
        let err = index.prepare(Some(&payload(&text)), None).unwrap_err();
        assert!(matches!(err, PlayerError::Mask { frame: 5, .. }));
        assert!(index.is_prepared());
        assert_eq!(index.overlay_count(), 0);
    }

    #[test]
    fn test_classifications_per_bucket() {
        let text = r#"{
            "classifications": [{"field": "scene", "classifications": [{"label": "indoor"}]}],
            "frames": {
                "1": {"attrs": [{"name": "k", "value": 1}]},
                "2": {"classifications": [{"field": "motion", "classifications": [{"label": "fast"}]}]}
            }
        }"#;
        let mut index = OverlayIndex::new();
        index.prepare(Some(&payload(text)), None).unwrap();

        let first = index.bucket(1).unwrap();
        assert_eq!(first.last().map(|o| o.name()), Some("classifications"));
        let OverlayKind::Classifications(second) = &index.bucket(2).unwrap()[0] else {
            panic!("expected classifications");
        };
        assert_eq!(second.entries().len(), 2);
        assert_eq!(second.entries()[1].frame_number, Some(2));
    }

    #[test]
    fn test_mask_index_retained() {
        let text = r#"{"attrs": [], "mask_index": {"3": false}}"#;
        let mut index = OverlayIndex::new();
        index.prepare(Some(&payload(text)), None).unwrap();
        assert!(!index.mask_index().is_visible(3));
        assert_eq!(index.overlay_count(), 0);
    }
}
