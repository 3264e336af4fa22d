//! Attribute text formatting shared by regions and frame attributes

use labelplay_core::labels::Attribute;
use labelplay_types::PlayerOptions;

use crate::utils::format_confidence;

/// The option fields attribute text depends on.
///
/// Overlays cache one of these and re-run layout when it no longer matches
/// the live options.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrLayout {
    pub show_attrs: bool,
    pub attrs_as_pairs: bool,
    pub show_confidence: bool,
    pub show_index: bool,
    pub active_labels: Option<Vec<String>>,
    pub filter: Vec<(String, labelplay_types::LabelFilter)>,
}

impl AttrLayout {
    pub fn snapshot(options: &PlayerOptions) -> Self {
        let mut filter: Vec<_> = options
            .filter
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        filter.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            show_attrs: options.show_attrs,
            attrs_as_pairs: options.attrs_as_pairs,
            show_confidence: options.show_confidence,
            show_index: options.show_index,
            active_labels: options.active_labels.clone(),
            filter,
        }
    }
}

/// Visible attribute lines, sorted by name.
///
/// Pairs mode yields one `name: value` line per attribute; otherwise the
/// values are comma-joined onto a single line.
pub fn attribute_lines(attrs: &[Attribute], options: &PlayerOptions) -> Vec<String> {
    if !options.show_attrs {
        return Vec::new();
    }

    let mut visible: Vec<&Attribute> = attrs
        .iter()
        .filter(|a| options.is_visible(&a.name, &a.value_text(), a.confidence))
        .collect();
    visible.sort_by(|a, b| a.name.cmp(&b.name));

    let render = |attr: &Attribute, text: String| match (options.show_confidence, attr.confidence)
    {
        (true, Some(conf)) => format!("{} ({})", text, format_confidence(conf)),
        _ => text,
    };

    if options.attrs_as_pairs {
        visible
            .into_iter()
            .map(|a| render(a, format!("{}: {}", a.name, a.value_text())))
            .collect()
    } else if visible.is_empty() {
        Vec::new()
    } else {
        let joined = visible
            .into_iter()
            .map(|a| render(a, a.value_text()))
            .collect::<Vec<_>>()
            .join(", ");
        vec![joined]
    }
}
