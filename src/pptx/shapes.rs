//! Shape tree parsing shared by slides, layouts and masters.
//!
//! All three part types keep their content in `<p:cSld><p:spTree>`; only the
//! direct children of the tree are reported as shapes. Nested group members
//! are folded into their group.

use super::xml::{attr_value, int_attr, rel_attr_value};
use crate::error::{Error, Result};
use crate::model::{Crop, PlaceholderFormat, PlaceholderType, Rect, Shape, ShapeKind};
use quick_xml::events::{BytesStart, Event};

/// Parsed `<p:cSld>` content.
#[derive(Debug, Clone, Default)]
pub struct ShapeTree {
    /// `name` attribute of `<p:cSld>`
    pub name: Option<String>,
    /// Direct children of `<p:spTree>`, in document order
    pub shapes: Vec<Shape>,
}

/// Elements that count as shapes when they sit directly in the tree.
const SHAPE_ELEMENTS: &[&[u8]] = &[
    b"sp",
    b"pic",
    b"grpSp",
    b"graphicFrame",
    b"cxnSp",
    b"contentPart",
    b"AlternateContent",
];

/// Parse the shape tree of a slide, layout or master part.
pub fn parse_shape_tree(xml: &str) -> Result<ShapeTree> {
    let mut reader = quick_xml::Reader::from_str(xml);

    let mut tree = ShapeTree::default();
    let mut depth = 0usize;
    let mut tree_depth: Option<usize> = None;
    let mut tree_closed = false;
    let mut current: Option<ShapeBuilder> = None;

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                let local = e.local_name();
                let local = local.as_ref();

                if let Some(builder) = current.as_mut() {
                    builder.open(&e, local, false);
                } else if local == b"cSld" {
                    tree.name = attr_value(&e, b"name");
                } else if local == b"spTree" && tree_depth.is_none() && !tree_closed {
                    tree_depth = Some(depth);
                } else if tree_depth == Some(depth - 1) && SHAPE_ELEMENTS.contains(&local) {
                    current = Some(ShapeBuilder::new(local, depth));
                }
            }
            Ok(Event::Empty(e)) => {
                if let Some(builder) = current.as_mut() {
                    let local = e.local_name();
                    builder.open(&e, local.as_ref(), true);
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(builder) = current.as_mut() {
                    if builder.in_text {
                        let text = t.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                        builder.push_text(&text);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let finished = match current.as_mut() {
                    Some(builder) if builder.depth == depth => true,
                    Some(builder) => {
                        builder.close(e.local_name().as_ref());
                        false
                    }
                    None => {
                        if tree_depth == Some(depth) {
                            tree_depth = None;
                            tree_closed = true;
                        }
                        false
                    }
                };
                if finished {
                    if let Some(builder) = current.take() {
                        tree.shapes.push(builder.finish());
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(tree)
}

/// Accumulates one top-level shape while its subtree streams past.
struct ShapeBuilder {
    element: String,
    depth: usize,
    id: Option<u32>,
    name: String,
    description: String,
    placeholder: Option<PlaceholderFormat>,
    in_xfrm: bool,
    xfrm_done: bool,
    offset: Option<(i64, i64)>,
    extent: Option<(i64, i64)>,
    rel_id: Option<String>,
    crop: Crop,
    paragraphs: Option<Vec<String>>,
    in_text_body: bool,
    in_text: bool,
}

impl ShapeBuilder {
    fn new(element: &[u8], depth: usize) -> Self {
        Self {
            element: String::from_utf8_lossy(element).into_owned(),
            depth,
            id: None,
            name: String::new(),
            description: String::new(),
            placeholder: None,
            in_xfrm: false,
            xfrm_done: false,
            offset: None,
            extent: None,
            rel_id: None,
            crop: Crop::default(),
            paragraphs: None,
            in_text_body: false,
            in_text: false,
        }
    }

    fn open(&mut self, e: &BytesStart<'_>, local: &[u8], empty: bool) {
        match local {
            b"cNvPr" if self.id.is_none() => {
                self.id = int_attr(e, b"id");
                self.name = attr_value(e, b"name").unwrap_or_default();
                self.description = attr_value(e, b"descr").unwrap_or_default();
            }
            b"ph" if self.placeholder.is_none() => {
                self.placeholder = Some(PlaceholderFormat {
                    kind: PlaceholderType::from_attr(attr_value(e, b"type").as_deref()),
                    idx: int_attr(e, b"idx").unwrap_or(0),
                    orient: attr_value(e, b"orient"),
                    size: attr_value(e, b"sz"),
                });
            }
            b"xfrm" if !self.xfrm_done => {
                if empty {
                    self.xfrm_done = true;
                } else {
                    self.in_xfrm = true;
                }
            }
            b"off" if self.in_xfrm => {
                self.offset = Some((int_attr(e, b"x").unwrap_or(0), int_attr(e, b"y").unwrap_or(0)));
            }
            b"ext" if self.in_xfrm => {
                self.extent = Some((
                    int_attr(e, b"cx").unwrap_or(0),
                    int_attr(e, b"cy").unwrap_or(0),
                ));
            }
            b"blip" if self.rel_id.is_none() => {
                self.rel_id = rel_attr_value(e, b"embed");
            }
            b"srcRect" => {
                self.crop = Crop {
                    left: int_attr(e, b"l").unwrap_or(0),
                    top: int_attr(e, b"t").unwrap_or(0),
                    right: int_attr(e, b"r").unwrap_or(0),
                    bottom: int_attr(e, b"b").unwrap_or(0),
                };
            }
            b"txBody" if self.paragraphs.is_none() => {
                self.paragraphs = Some(Vec::new());
                self.in_text_body = !empty;
            }
            b"p" if self.in_text_body => {
                if let Some(paragraphs) = self.paragraphs.as_mut() {
                    paragraphs.push(String::new());
                }
            }
            b"t" if self.in_text_body && !empty => self.in_text = true,
            b"br" if self.in_text_body => self.push_text("\u{b}"),
            _ => {}
        }
    }

    fn close(&mut self, local: &[u8]) {
        match local {
            b"xfrm" if self.in_xfrm => {
                self.in_xfrm = false;
                self.xfrm_done = true;
            }
            b"t" => self.in_text = false,
            b"txBody" => self.in_text_body = false,
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(last) = self.paragraphs.as_mut().and_then(|p| p.last_mut()) {
            last.push_str(text);
        }
    }

    fn finish(self) -> Shape {
        let geometry = match (self.offset, self.extent) {
            (Some((left, top)), Some((width, height))) => Some(Rect::new(left, top, width, height)),
            _ => None,
        };

        let kind = match self.element.as_str() {
            "sp" => ShapeKind::AutoShape {
                text: self.paragraphs.map(|p| p.join("\n")),
            },
            "pic" => ShapeKind::Picture {
                rel_id: self.rel_id.unwrap_or_default(),
                description: self.description,
                crop: self.crop,
            },
            _ => ShapeKind::Other {
                element: self.element,
            },
        };

        Shape {
            id: self.id.unwrap_or(0),
            name: self.name,
            placeholder: self.placeholder,
            geometry,
            kind,
        }
    }
}
