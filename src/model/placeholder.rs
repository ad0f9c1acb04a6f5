//! Placeholder types and the per-slide placeholder breakdown.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder type, the `type` attribute of `<p:ph>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderType {
    Title,
    CenterTitle,
    Subtitle,
    Body,
    Object,
    Picture,
    Chart,
    Table,
    ClipArt,
    Diagram,
    Media,
    SlideImage,
    Date,
    Footer,
    SlideNumber,
    Header,
}

impl PlaceholderType {
    /// Parse the `type` attribute. A missing attribute means `obj`.
    pub fn from_attr(value: Option<&str>) -> Self {
        match value.unwrap_or("obj") {
            "title" => PlaceholderType::Title,
            "ctrTitle" => PlaceholderType::CenterTitle,
            "subTitle" => PlaceholderType::Subtitle,
            "body" => PlaceholderType::Body,
            "pic" => PlaceholderType::Picture,
            "chart" => PlaceholderType::Chart,
            "tbl" => PlaceholderType::Table,
            "clipArt" => PlaceholderType::ClipArt,
            "dgm" => PlaceholderType::Diagram,
            "media" => PlaceholderType::Media,
            "sldImg" => PlaceholderType::SlideImage,
            "dt" => PlaceholderType::Date,
            "ftr" => PlaceholderType::Footer,
            "sldNum" => PlaceholderType::SlideNumber,
            "hdr" => PlaceholderType::Header,
            _ => PlaceholderType::Object,
        }
    }

    /// The `type` attribute value, `None` for the default `obj`.
    pub fn as_attr(&self) -> Option<&'static str> {
        match self {
            PlaceholderType::Title => Some("title"),
            PlaceholderType::CenterTitle => Some("ctrTitle"),
            PlaceholderType::Subtitle => Some("subTitle"),
            PlaceholderType::Body => Some("body"),
            PlaceholderType::Object => None,
            PlaceholderType::Picture => Some("pic"),
            PlaceholderType::Chart => Some("chart"),
            PlaceholderType::Table => Some("tbl"),
            PlaceholderType::ClipArt => Some("clipArt"),
            PlaceholderType::Diagram => Some("dgm"),
            PlaceholderType::Media => Some("media"),
            PlaceholderType::SlideImage => Some("sldImg"),
            PlaceholderType::Date => Some("dt"),
            PlaceholderType::Footer => Some("ftr"),
            PlaceholderType::SlideNumber => Some("sldNum"),
            PlaceholderType::Header => Some("hdr"),
        }
    }

    /// Human-readable type name.
    pub fn name(&self) -> &'static str {
        match self {
            PlaceholderType::Title => "Title",
            PlaceholderType::CenterTitle => "Center Title",
            PlaceholderType::Subtitle => "Subtitle",
            PlaceholderType::Body => "Body",
            PlaceholderType::Object => "Object",
            PlaceholderType::Picture => "Picture",
            PlaceholderType::Chart => "Chart",
            PlaceholderType::Table => "Table",
            PlaceholderType::ClipArt => "Clip Art",
            PlaceholderType::Diagram => "Diagram",
            PlaceholderType::Media => "Media Clip",
            PlaceholderType::SlideImage => "Slide Image",
            PlaceholderType::Date => "Date",
            PlaceholderType::Footer => "Footer",
            PlaceholderType::SlideNumber => "Slide Number",
            PlaceholderType::Header => "Header",
        }
    }

    /// Base of the shape name given to a new placeholder of this type.
    pub fn shape_name_base(&self) -> &'static str {
        match self {
            PlaceholderType::Title | PlaceholderType::CenterTitle => "Title",
            PlaceholderType::Subtitle => "Subtitle",
            PlaceholderType::Body => "Text Placeholder",
            PlaceholderType::Object => "Content Placeholder",
            PlaceholderType::Picture => "Picture Placeholder",
            PlaceholderType::Chart => "Chart Placeholder",
            PlaceholderType::Table => "Table Placeholder",
            PlaceholderType::ClipArt => "Clip Art Placeholder",
            PlaceholderType::Diagram => "SmartArt Placeholder",
            PlaceholderType::Media => "Media Placeholder",
            PlaceholderType::SlideImage => "Slide Image Placeholder",
            PlaceholderType::Date => "Date Placeholder",
            PlaceholderType::Footer => "Footer Placeholder",
            PlaceholderType::SlideNumber => "Slide Number Placeholder",
            PlaceholderType::Header => "Header Placeholder",
        }
    }

    /// Master placeholder type that a layout placeholder inherits from.
    pub fn base_type(&self) -> PlaceholderType {
        match self {
            PlaceholderType::Title | PlaceholderType::CenterTitle => PlaceholderType::Title,
            PlaceholderType::Date => PlaceholderType::Date,
            PlaceholderType::Footer => PlaceholderType::Footer,
            PlaceholderType::SlideNumber => PlaceholderType::SlideNumber,
            PlaceholderType::Header => PlaceholderType::Header,
            _ => PlaceholderType::Body,
        }
    }

    /// Whether a slide created from a layout gets a copy of this placeholder.
    ///
    /// Date, footer and slide number are left on the layout.
    pub fn is_cloned_onto_slides(&self) -> bool {
        !matches!(
            self,
            PlaceholderType::Date | PlaceholderType::Footer | PlaceholderType::SlideNumber
        )
    }

    /// Whether a fresh copy of this placeholder starts with an empty text body.
    pub fn has_text_frame(&self) -> bool {
        matches!(
            self,
            PlaceholderType::Title
                | PlaceholderType::CenterTitle
                | PlaceholderType::Subtitle
                | PlaceholderType::Body
                | PlaceholderType::Object
        )
    }

    /// Whether this counts as the slide title.
    pub fn is_title(&self) -> bool {
        matches!(self, PlaceholderType::Title | PlaceholderType::CenterTitle)
    }
}

impl std::fmt::Display for PlaceholderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Contents of a `<p:ph>` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderFormat {
    /// Placeholder type
    pub kind: PlaceholderType,
    /// Placeholder index, unique within a slide. Defaults to 0.
    pub idx: u32,
    /// `orient` attribute, kept verbatim when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orient: Option<String>,
    /// `sz` attribute, kept verbatim when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl PlaceholderFormat {
    /// Placeholder of the given type and index with default orientation and size.
    pub fn new(kind: PlaceholderType, idx: u32) -> Self {
        Self {
            kind,
            idx,
            orient: None,
            size: None,
        }
    }
}

/// Placeholder indices on a slide, grouped the way content is filled in.
///
/// Body and picture indices follow the Selection Pane order, top to bottom,
/// which is the reverse of the order shapes appear in the slide XML.
///
/// Serialized, a layout with a title and two pictures looks like
/// `{"title":0,"body":[],"picture":[13,14],"other":{}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidePlaceholders {
    /// Index of the title placeholder, if any
    pub title: Option<u32>,
    /// Indices of body text placeholders
    pub body: Vec<u32>,
    /// Indices of picture placeholders
    pub picture: Vec<u32>,
    /// Any other placeholder, index mapped to its type name
    pub other: BTreeMap<u32, String>,
}

impl SlidePlaceholders {
    /// Group placeholders given in document order.
    pub fn from_formats<'a>(formats: impl IntoIterator<Item = &'a PlaceholderFormat>) -> Self {
        let mut placeholders = SlidePlaceholders::default();

        for format in formats {
            match format.kind {
                kind if kind.is_title() => placeholders.title = Some(format.idx),
                PlaceholderType::Body => placeholders.body.push(format.idx),
                PlaceholderType::Picture => placeholders.picture.push(format.idx),
                kind => {
                    placeholders.other.insert(format.idx, kind.name().to_string());
                }
            }
        }

        placeholders.body.reverse();
        placeholders.picture.reverse();
        placeholders
    }

    /// Whether the slide has no placeholders at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_empty()
            && self.picture.is_empty()
            && self.other.is_empty()
    }
}
