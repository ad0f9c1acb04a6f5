//! Slide layouts discovered in a template.

use super::{PlaceholderFormat, Rect, SlidePlaceholders};
use serde::{Deserialize, Serialize};

/// A placeholder defined on a slide layout or slide master.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlaceholder {
    /// Type and index
    pub format: PlaceholderFormat,
    /// Shape name as shown in the Selection Pane
    pub name: String,
    /// Frame, when the layout overrides the inherited one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Rect>,
}

/// A slide layout, the template a new slide is built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideLayout {
    /// Position among the template's layouts
    pub index: usize,
    /// Layout name from `<p:cSld name="...">`
    pub name: String,
    /// Package path of the layout part
    pub part_name: String,
    /// Placeholders in document order
    pub placeholders: Vec<LayoutPlaceholder>,
}

impl SlideLayout {
    /// Find a placeholder by idx.
    pub fn placeholder(&self, idx: u32) -> Option<&LayoutPlaceholder> {
        self.placeholders.iter().find(|p| p.format.idx == idx)
    }

    /// Placeholders a slide created from this layout receives.
    pub fn cloneable_placeholders(&self) -> impl Iterator<Item = &LayoutPlaceholder> {
        self.placeholders
            .iter()
            .filter(|p| p.format.kind.is_cloned_onto_slides())
    }

    /// Placeholder breakdown of a fresh slide created from this layout.
    pub fn slide_placeholders(&self) -> SlidePlaceholders {
        SlidePlaceholders::from_formats(self.cloneable_placeholders().map(|p| &p.format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlaceholderType;

    fn layout() -> SlideLayout {
        let ph = |kind: PlaceholderType, idx: u32| LayoutPlaceholder {
            format: PlaceholderFormat::new(kind, idx),
            name: format!("{} {}", kind, idx),
            geometry: None,
        };
        SlideLayout {
            index: 2,
            name: "title_2txt".to_string(),
            part_name: "ppt/slideLayouts/slideLayout3.xml".to_string(),
            placeholders: vec![
                ph(PlaceholderType::Title, 0),
                ph(PlaceholderType::Body, 1),
                ph(PlaceholderType::Body, 2),
                ph(PlaceholderType::Date, 10),
                ph(PlaceholderType::SlideNumber, 12),
            ],
        }
    }

    #[test]
    fn test_slide_placeholders_skip_footer_family() {
        let placeholders = layout().slide_placeholders();
        assert_eq!(placeholders.title, Some(0));
        assert_eq!(placeholders.body, vec![2, 1]);
        assert!(placeholders.other.is_empty());
    }

    #[test]
    fn test_placeholder_lookup() {
        let layout = layout();
        assert!(layout.placeholder(10).is_some());
        assert!(layout.placeholder(99).is_none());
        assert_eq!(layout.cloneable_placeholders().count(), 3);
    }
}
