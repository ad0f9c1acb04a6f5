//! Shapes on a slide.

use super::{Crop, PlaceholderFormat, Rect};
use serde::{Deserialize, Serialize};

/// Identifier of a slide within its presentation.
///
/// This is the `id` attribute of `<p:sldId>`. It stays stable when slides
/// are added, so callers can keep it for contents pages and the like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideId(pub u32);

impl SlideId {
    /// Smallest id PowerPoint allows for a slide.
    pub const MIN: SlideId = SlideId(256);
}

impl std::fmt::Display for SlideId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of shape-tree element a shape is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeKind {
    /// `<p:sp>`; `text` is `None` when it has no text body
    AutoShape { text: Option<String> },
    /// `<p:pic>` referencing an image part through `rel_id`
    Picture {
        rel_id: String,
        description: String,
        crop: Crop,
    },
    /// Any other element (group, graphic frame, connector)
    Other { element: String },
}

/// One element of a slide's shape tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// `id` of `<p:cNvPr>`, unique within the slide
    pub id: u32,
    /// `name` of `<p:cNvPr>`
    pub name: String,
    /// Placeholder format, when the shape is a placeholder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<PlaceholderFormat>,
    /// Frame set on the shape itself; placeholders usually inherit theirs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Rect>,
    /// Element kind and kind-specific content
    pub kind: ShapeKind,
}

impl Shape {
    /// Whether this shape is a placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }

    /// Whether this shape is a picture, placeholder or not.
    pub fn is_picture(&self) -> bool {
        matches!(self.kind, ShapeKind::Picture { .. })
    }

    /// Placeholder idx, when the shape is a placeholder.
    pub fn placeholder_idx(&self) -> Option<u32> {
        self.placeholder.as_ref().map(|p| p.idx)
    }
}
