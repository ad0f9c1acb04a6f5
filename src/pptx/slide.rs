//! Slides: inspection of template slides, editing and serialization of
//! generated ones.

use super::shapes::parse_shape_tree;
use super::xml::{escape_xml, NS_A, NS_P, NS_R};
use crate::container::{Relationships, XML_DECLARATION};
use crate::error::{Error, Result};
use crate::model::{
    Crop, PlaceholderFormat, Rect, Shape, ShapeKind, SlideId, SlidePlaceholders,
};
use std::fmt::Write as FmtWrite;
use tracing::debug;

/// A slide of a presentation.
///
/// Slides that came with the template are read-only; slides added through
/// [`crate::Presentation::add_slide_from_layout`] can be edited and are
/// written out on save.
#[derive(Debug, Clone)]
pub struct Slide {
    pub(crate) id: SlideId,
    pub(crate) part_name: String,
    pub(crate) layout_index: Option<usize>,
    pub(crate) shapes: Vec<Shape>,
    pub(crate) rels: Relationships,
    pub(crate) generated: bool,
}

impl Slide {
    /// Parse a slide that already exists in the template.
    pub(crate) fn parse_existing(
        id: SlideId,
        part_name: String,
        xml: &str,
        rels: Relationships,
        layout_index: Option<usize>,
    ) -> Result<Self> {
        let tree = parse_shape_tree(xml)?;
        Ok(Self {
            id,
            part_name,
            layout_index,
            shapes: tree.shapes,
            rels,
            generated: false,
        })
    }

    /// Identifier returned when the slide was added.
    pub fn id(&self) -> SlideId {
        self.id
    }

    /// Package path of the slide part.
    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    /// Position of the layout this slide was built from, when known.
    pub fn layout_index(&self) -> Option<usize> {
        self.layout_index
    }

    /// Shapes in document order (back to front).
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Relationships of the slide part.
    pub fn relationships(&self) -> &Relationships {
        &self.rels
    }

    /// Whether the slide was added in this session.
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Placeholder breakdown of the slide.
    pub fn placeholders(&self) -> SlidePlaceholders {
        SlidePlaceholders::from_formats(self.shapes.iter().filter_map(|s| s.placeholder.as_ref()))
    }

    /// Find a placeholder shape by idx.
    pub fn placeholder(&self, idx: u32) -> Option<&Shape> {
        self.shapes
            .iter()
            .find(|s| s.placeholder_idx() == Some(idx))
    }

    /// Text of the title placeholder, if the slide has one with text.
    pub fn title_text(&self) -> Option<&str> {
        self.shapes
            .iter()
            .filter(|s| s.placeholder.as_ref().is_some_and(|p| p.kind.is_title()))
            .find_map(|s| match &s.kind {
                ShapeKind::AutoShape { text: Some(text) } if !text.is_empty() => {
                    Some(text.as_str())
                }
                _ => None,
            })
    }

    /// Replace the text of a placeholder.
    ///
    /// `\n` starts a new paragraph; `\v` becomes a line break within one.
    /// Other characters XML 1.0 cannot carry are dropped.
    pub fn set_text(&mut self, idx: u32, text: &str) -> Result<()> {
        let shape = self.placeholder_mut(idx)?;
        match &mut shape.kind {
            ShapeKind::AutoShape { text: body } => {
                *body = Some(text.chars().filter(|&c| is_text_char(c)).collect());
                debug!(idx, chars = text.chars().count(), "Placeholder text set");
                Ok(())
            }
            _ => Err(Error::InvalidData(format!(
                "placeholder {} has no text frame",
                idx
            ))),
        }
    }

    /// Remove a placeholder shape from the slide.
    pub fn remove_placeholder(&mut self, idx: u32) -> Result<()> {
        self.ensure_generated()?;
        let pos = self
            .shapes
            .iter()
            .position(|s| s.placeholder_idx() == Some(idx))
            .ok_or(Error::PlaceholderNotFound(idx))?;
        let removed = self.shapes.remove(pos);
        debug!(idx, name = %removed.name, "Placeholder removed");
        Ok(())
    }

    /// Turn a placeholder into a placeholder picture, keeping its position
    /// in the shape tree and its inherited frame.
    pub(crate) fn fill_placeholder_with_picture(
        &mut self,
        idx: u32,
        rel_id: String,
        description: String,
        crop: Crop,
    ) -> Result<()> {
        let shape = self.placeholder_mut(idx)?;
        if let Some(format) = shape.placeholder.as_mut() {
            // A filled placeholder no longer carries orientation or size hints.
            format.orient = None;
            format.size = None;
        }
        shape.kind = ShapeKind::Picture {
            rel_id,
            description,
            crop,
        };
        Ok(())
    }

    /// Append a free-standing picture on top of all other shapes.
    pub(crate) fn add_picture(
        &mut self,
        rel_id: String,
        description: String,
        frame: Rect,
    ) -> Result<u32> {
        self.ensure_generated()?;
        let id = self.next_shape_id();
        self.shapes.push(Shape {
            id,
            name: format!("Picture {}", id - 1),
            placeholder: None,
            geometry: Some(frame),
            kind: ShapeKind::Picture {
                rel_id,
                description,
                crop: Crop::default(),
            },
        });
        Ok(id)
    }

    /// Next unused shape id. Id 1 belongs to the shape tree itself.
    pub(crate) fn next_shape_id(&self) -> u32 {
        self.shapes.iter().map(|s| s.id).max().unwrap_or(1).max(1) + 1
    }

    fn placeholder_mut(&mut self, idx: u32) -> Result<&mut Shape> {
        self.ensure_generated()?;
        self.shapes
            .iter_mut()
            .find(|s| s.placeholder_idx() == Some(idx))
            .ok_or(Error::PlaceholderNotFound(idx))
    }

    fn ensure_generated(&self) -> Result<()> {
        if self.generated {
            Ok(())
        } else {
            Err(Error::InvalidData(format!(
                "slide {} came with the template and cannot be edited",
                self.id
            )))
        }
    }

    /// Serialize a generated slide part.
    pub(crate) fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(1024 + self.shapes.len() * 512);
        xml.push_str(XML_DECLARATION);
        xml.push('\n');
        write!(
            xml,
            r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
            NS_A, NS_R, NS_P
        )?;
        xml.push_str("<p:cSld><p:spTree>");
        xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
        xml.push_str("<p:grpSpPr/>");
        for shape in &self.shapes {
            write_shape(&mut xml, shape)?;
        }
        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");
        Ok(xml)
    }
}

/// Placeholder breakdown of a slide.
///
/// Title is a `title` or centered-title placeholder. Body and picture
/// indices are listed in Selection Pane order, top to bottom.
pub fn get_slide_placeholders(slide: &Slide) -> SlidePlaceholders {
    slide.placeholders()
}

fn write_shape(xml: &mut String, shape: &Shape) -> Result<()> {
    match &shape.kind {
        ShapeKind::AutoShape { text } => {
            xml.push_str("<p:sp><p:nvSpPr>");
            write_cnvpr(xml, shape, None)?;
            if shape.placeholder.is_some() {
                xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
            } else {
                xml.push_str("<p:cNvSpPr/>");
            }
            write_nvpr(xml, shape.placeholder.as_ref())?;
            xml.push_str("</p:nvSpPr>");
            write_sppr(xml, shape.geometry, false)?;
            if let Some(text) = text {
                xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
                write_paragraphs(xml, text);
                xml.push_str("</p:txBody>");
            }
            xml.push_str("</p:sp>");
        }
        ShapeKind::Picture {
            rel_id,
            description,
            crop,
        } => {
            xml.push_str("<p:pic><p:nvPicPr>");
            write_cnvpr(xml, shape, Some(description))?;
            if shape.placeholder.is_some() {
                xml.push_str(
                    r#"<p:cNvPicPr><a:picLocks noGrp="1" noChangeAspect="1"/></p:cNvPicPr>"#,
                );
            } else {
                xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>"#);
            }
            write_nvpr(xml, shape.placeholder.as_ref())?;
            xml.push_str("</p:nvPicPr>");

            xml.push_str("<p:blipFill>");
            write!(xml, r#"<a:blip r:embed="{}"/>"#, escape_xml(rel_id))?;
            if !crop.is_empty() {
                xml.push_str("<a:srcRect");
                for (name, value) in [
                    ("l", crop.left),
                    ("t", crop.top),
                    ("r", crop.right),
                    ("b", crop.bottom),
                ] {
                    if value != 0 {
                        write!(xml, r#" {}="{}""#, name, value)?;
                    }
                }
                xml.push_str("/>");
            }
            xml.push_str("<a:stretch><a:fillRect/></a:stretch></p:blipFill>");
            write_sppr(xml, shape.geometry, shape.placeholder.is_none())?;
            xml.push_str("</p:pic>");
        }
        ShapeKind::Other { element } => {
            return Err(Error::InvalidData(format!(
                "cannot serialize <{}> shape {}",
                element, shape.id
            )));
        }
    }
    Ok(())
}

fn write_cnvpr(xml: &mut String, shape: &Shape, description: Option<&String>) -> Result<()> {
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="{}""#,
        shape.id,
        escape_xml(&shape.name)
    )?;
    if let Some(descr) = description.filter(|d| !d.is_empty()) {
        write!(xml, r#" descr="{}""#, escape_xml(descr))?;
    }
    xml.push_str("/>");
    Ok(())
}

fn write_nvpr(xml: &mut String, placeholder: Option<&PlaceholderFormat>) -> Result<()> {
    let Some(format) = placeholder else {
        xml.push_str("<p:nvPr/>");
        return Ok(());
    };

    xml.push_str("<p:nvPr><p:ph");
    if let Some(kind) = format.kind.as_attr() {
        write!(xml, r#" type="{}""#, kind)?;
    }
    if let Some(orient) = &format.orient {
        write!(xml, r#" orient="{}""#, escape_xml(orient))?;
    }
    if let Some(size) = &format.size {
        write!(xml, r#" sz="{}""#, escape_xml(size))?;
    }
    if format.idx != 0 {
        write!(xml, r#" idx="{}""#, format.idx)?;
    }
    xml.push_str("/></p:nvPr>");
    Ok(())
}

fn write_sppr(xml: &mut String, geometry: Option<Rect>, rect_geometry: bool) -> Result<()> {
    if geometry.is_none() && !rect_geometry {
        xml.push_str("<p:spPr/>");
        return Ok(());
    }

    xml.push_str("<p:spPr>");
    if let Some(frame) = geometry {
        write!(
            xml,
            r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
            frame.left, frame.top, frame.width, frame.height
        )?;
    }
    if rect_geometry {
        xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    }
    xml.push_str("</p:spPr>");
    Ok(())
}

/// Characters allowed in `<a:t>`, plus `\v` which is written as `<a:br/>`.
fn is_text_char(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' | '\u{b}' => true,
        '\u{0}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}' => false,
        _ => true,
    }
}

fn write_paragraphs(xml: &mut String, text: &str) {
    for paragraph in text.split('\n') {
        if paragraph.is_empty() {
            xml.push_str("<a:p/>");
            continue;
        }
        xml.push_str("<a:p>");
        for (i, line) in paragraph.split('\u{b}').enumerate() {
            if i > 0 {
                xml.push_str("<a:br/>");
            }
            if !line.is_empty() {
                xml.push_str("<a:r><a:t>");
                xml.push_str(&escape_xml(line));
                xml.push_str("</a:t></a:r>");
            }
        }
        xml.push_str("</a:p>");
    }
}
