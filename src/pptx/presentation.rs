//! The presentation object model: template discovery, slide creation,
//! picture embedding and saving.

use super::picture::{fill_crop, fit_within, ImageData, PictureScale};
use super::shapes::parse_shape_tree;
use super::slide::Slide;
use super::xml::{
    int_attr, rel_attr_value, CT_RELATIONSHIPS, CT_SLIDE, CT_XML, NS_R, REL_IMAGE,
    REL_OFFICE_DOCUMENT, REL_SLIDE, REL_SLIDE_LAYOUT, REL_SLIDE_MASTER,
};
use crate::container::{rels_path_for, ContentTypes, OoxmlContainer, PackageWriter, Relationships, CONTENT_TYPES_PART};
use crate::detect::{ensure_presentation, FormatType, PPTX_CONTENT_TYPE};
use crate::error::{Error, Result};
use crate::model::{
    LayoutPlaceholder, PlaceholderType, Rect, Shape, ShapeKind, SlideId, SlideLayout,
};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use tracing::{debug, info, instrument, warn};
use unicode_normalization::UnicodeNormalization;

/// Elements of `<p:presentation>` that must come after `<p:sldIdLst>`.
const AFTER_SLIDE_ID_LIST: &[&[u8]] = &[
    b"sldSz",
    b"notesSz",
    b"smartTags",
    b"embeddedFontLst",
    b"custShowLst",
    b"photoAlbum",
    b"custDataLst",
    b"kinsoku",
    b"defaultTextStyle",
    b"modifyVerifier",
    b"extLst",
];

/// A presentation opened from a template.
///
/// Slides added through [`Presentation::add_slide_from_layout`] live in
/// memory until [`Presentation::save`] or [`Presentation::to_bytes`] writes
/// the whole package back out. Template parts are copied through unchanged.
pub struct Presentation {
    container: OoxmlContainer,
    format: FormatType,
    content_types: ContentTypes,
    presentation_part: String,
    presentation_rels: Relationships,
    master_placeholders: Vec<LayoutPlaceholder>,
    layouts: Vec<SlideLayout>,
    slides: Vec<Slide>,
    /// Presentation relationship id of each generated slide
    slide_rel_ids: HashMap<SlideId, String>,
    /// Media added in this session, by digest
    media_by_digest: HashMap<String, String>,
    /// Media parts added in this session, by part name
    media_parts: BTreeMap<String, Vec<u8>>,
}

impl Presentation {
    /// Open a template presentation from a file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use slidepack::Presentation;
    ///
    /// let prs = Presentation::open("template.pptx")?;
    /// for layout in prs.layouts() {
    ///     println!("{}: {}", layout.index, layout.name);
    /// }
    /// # Ok::<(), slidepack::Error>(())
    /// ```
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(data)
    }

    /// Open a template presentation from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let format = ensure_presentation(&data)?;
        let container = OoxmlContainer::from_bytes(data)?;
        Self::from_container(container, format)
    }

    /// Open a template presentation without blocking the async runtime.
    #[cfg(feature = "async")]
    pub async fn open_async(path: impl AsRef<Path>) -> Result<Self> {
        let data = tokio::fs::read(path.as_ref()).await?;
        Self::from_bytes(data)
    }

    fn from_container(container: OoxmlContainer, format: FormatType) -> Result<Self> {
        let content_types = container.read_content_types()?;

        let package_rels = container.read_package_relationships()?;
        let presentation_part = package_rels
            .get_by_type(REL_OFFICE_DOCUMENT)
            .first()
            .map(|r| OoxmlContainer::resolve_path("", &r.target))
            .unwrap_or_else(|| "ppt/presentation.xml".to_string());

        let presentation_rels = container.read_relationships(&presentation_part)?;
        let presentation_xml = container.read_xml(&presentation_part)?;
        let ids = parse_presentation_ids(&presentation_xml)?;

        let master_part = ids
            .master_rel_ids
            .iter()
            .find_map(|rid| presentation_rels.get(rid))
            .or_else(|| presentation_rels.get_by_type(REL_SLIDE_MASTER).first().copied())
            .map(|r| OoxmlContainer::resolve_path(&presentation_part, &r.target))
            .ok_or_else(|| Error::MissingComponent("slide master".to_string()))?;

        if ids.master_rel_ids.len() > 1 {
            warn!(
                masters = ids.master_rel_ids.len(),
                "Template has several slide masters; only layouts of the first are indexed"
            );
        }

        let master_xml = container.read_xml(&master_part)?;
        let master_placeholders = parse_shape_tree(&master_xml)?
            .shapes
            .into_iter()
            .filter_map(into_layout_placeholder)
            .collect();

        let master_rels = container.read_relationships(&master_part)?;
        let layouts = Self::load_layouts(&container, &master_part, &master_xml, &master_rels)?;

        let mut prs = Self {
            container,
            format,
            content_types,
            presentation_part,
            presentation_rels,
            master_placeholders,
            layouts,
            slides: Vec::new(),
            slide_rel_ids: HashMap::new(),
            media_by_digest: HashMap::new(),
            media_parts: BTreeMap::new(),
        };
        prs.load_slides(&ids.slides)?;

        info!(
            layouts = prs.layouts.len(),
            slides = prs.slides.len(),
            "Presentation loaded"
        );
        Ok(prs)
    }

    fn load_layouts(
        container: &OoxmlContainer,
        master_part: &str,
        master_xml: &str,
        master_rels: &Relationships,
    ) -> Result<Vec<SlideLayout>> {
        let mut targets: Vec<String> = parse_layout_rel_ids(master_xml)?
            .iter()
            .filter_map(|rid| master_rels.get(rid))
            .map(|r| r.target.clone())
            .collect();
        if targets.is_empty() {
            targets = master_rels
                .get_by_type(REL_SLIDE_LAYOUT)
                .iter()
                .map(|r| r.target.clone())
                .collect();
        }

        let mut layouts = Vec::with_capacity(targets.len());
        for target in targets {
            let part_name = OoxmlContainer::resolve_path(master_part, &target);
            let xml = container.read_xml(&part_name)?;
            let tree = parse_shape_tree(&xml)?;
            let index = layouts.len();
            layouts.push(SlideLayout {
                index,
                name: tree.name.unwrap_or_default(),
                part_name,
                placeholders: tree
                    .shapes
                    .into_iter()
                    .filter_map(into_layout_placeholder)
                    .collect(),
            });
        }
        Ok(layouts)
    }

    fn load_slides(&mut self, entries: &[(SlideId, String)]) -> Result<()> {
        for (id, rid) in entries {
            let Some(rel) = self.presentation_rels.get(rid) else {
                warn!(slide_id = id.0, rel_id = %rid, "Slide relationship missing, skipping");
                continue;
            };
            let part_name = OoxmlContainer::resolve_path(&self.presentation_part, &rel.target);
            let xml = self.container.read_xml(&part_name)?;
            let rels = self.container.read_relationships(&part_name)?;

            let layout_index = rels.get_by_type(REL_SLIDE_LAYOUT).first().and_then(|r| {
                let layout_part = OoxmlContainer::resolve_path(&part_name, &r.target);
                self.layouts.iter().position(|l| l.part_name == layout_part)
            });

            self.slides
                .push(Slide::parse_existing(*id, part_name, &xml, rels, layout_index)?);
        }
        Ok(())
    }

    /// Format of the template package.
    pub fn format(&self) -> FormatType {
        self.format
    }

    /// Slide layouts of the first slide master, in order.
    pub fn layouts(&self) -> &[SlideLayout] {
        &self.layouts
    }

    /// Layout name mapped to its position among the layouts.
    ///
    /// When two layouts share a name the later one wins.
    pub fn get_all_slide_layouts(&self) -> HashMap<String, usize> {
        self.layouts
            .iter()
            .map(|l| (l.name.clone(), l.index))
            .collect()
    }

    /// Position of the layout with the given name.
    ///
    /// Names are compared after Unicode NFC normalization.
    pub fn layout_index(&self, layout_name: &str) -> Result<usize> {
        let wanted: String = layout_name.nfc().collect();
        self.layouts
            .iter()
            .rev()
            .find(|l| l.name.nfc().eq(wanted.chars()))
            .map(|l| l.index)
            .ok_or_else(|| Error::LayoutNotFound(layout_name.to_string()))
    }

    /// Layout by position.
    pub fn layout(&self, index: usize) -> Result<&SlideLayout> {
        self.layouts
            .get(index)
            .ok_or_else(|| Error::LayoutNotFound(format!("#{}", index)))
    }

    /// All slides: the template's first, then the generated ones.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Slide by id.
    pub fn slide(&self, id: SlideId) -> Result<&Slide> {
        self.slides
            .iter()
            .find(|s| s.id == id)
            .ok_or(Error::SlideNotFound(id.0))
    }

    /// Mutable slide by id.
    pub fn slide_mut(&mut self, id: SlideId) -> Result<&mut Slide> {
        self.slides
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(Error::SlideNotFound(id.0))
    }

    /// Append a slide built from the layout at `layout_index`.
    ///
    /// The slide receives a copy of every layout placeholder except date,
    /// footer and slide number. Copies inherit their frame from the layout.
    #[instrument(skip(self))]
    pub fn add_slide_from_layout(&mut self, layout_index: usize) -> Result<SlideId> {
        let layout = self.layout(layout_index)?;

        let mut shapes = Vec::new();
        for placeholder in layout.cloneable_placeholders() {
            let id = shapes.len() as u32 + 2;
            let kind = placeholder.format.kind;
            shapes.push(Shape {
                id,
                name: format!("{} {}", kind.shape_name_base(), id - 1),
                placeholder: Some(placeholder.format.clone()),
                geometry: None,
                kind: ShapeKind::AutoShape {
                    text: kind.has_text_frame().then(String::new),
                },
            });
        }
        let layout_part = layout.part_name.clone();
        let layout_name = layout.name.clone();

        let id = self.next_slide_id();
        let part_name = self.next_part_name("slides/slide", "xml");

        let mut rels = Relationships::new();
        rels.add_internal(
            REL_SLIDE_LAYOUT,
            &OoxmlContainer::relative_target(&part_name, &layout_part),
        );

        let rel_id = self.presentation_rels.add_internal(
            REL_SLIDE,
            &OoxmlContainer::relative_target(&self.presentation_part, &part_name),
        );
        self.content_types.add_override(&part_name, CT_SLIDE);
        self.slide_rel_ids.insert(id, rel_id);

        info!(
            slide_id = id.0,
            layout = %layout_name,
            part = %part_name,
            placeholders = shapes.len(),
            "Slide added"
        );

        self.slides.push(Slide {
            id,
            part_name,
            layout_index: Some(layout_index),
            shapes,
            rels,
            generated: true,
        });
        Ok(id)
    }

    /// Effective frame of a placeholder on a slide.
    ///
    /// Looks at the slide's own shape first, then the layout placeholder
    /// with the same idx, then the master placeholder the layout one
    /// inherits from.
    pub fn placeholder_geometry(&self, slide_id: SlideId, idx: u32) -> Result<Rect> {
        let slide = self.slide(slide_id)?;
        let shape = slide
            .placeholder(idx)
            .ok_or(Error::PlaceholderNotFound(idx))?;
        if let Some(frame) = shape.geometry {
            return Ok(frame);
        }

        let layout_placeholder = slide
            .layout_index
            .and_then(|i| self.layouts.get(i))
            .and_then(|l| l.placeholder(idx));
        let kind = layout_placeholder
            .map(|p| p.format.kind)
            .or_else(|| shape.placeholder.as_ref().map(|p| p.kind))
            .ok_or(Error::PlaceholderNotFound(idx))?;

        self.inherited_geometry(layout_placeholder, kind).ok_or_else(|| {
            Error::InvalidData(format!(
                "placeholder {} on slide {} has no position in slide, layout or master",
                idx, slide_id
            ))
        })
    }

    /// Frame a slide placeholder cloned from a layout placeholder starts
    /// with: the layout's own, else the master's.
    pub fn layout_placeholder_geometry(&self, layout_index: usize, idx: u32) -> Result<Rect> {
        let layout = self.layout(layout_index)?;
        let placeholder = layout
            .placeholder(idx)
            .ok_or(Error::PlaceholderNotFound(idx))?;
        self.inherited_geometry(Some(placeholder), placeholder.format.kind)
            .ok_or_else(|| {
                Error::InvalidData(format!(
                    "placeholder {} of layout '{}' has no position in layout or master",
                    idx, layout.name
                ))
            })
    }

    fn inherited_geometry(
        &self,
        layout_placeholder: Option<&LayoutPlaceholder>,
        kind: PlaceholderType,
    ) -> Option<Rect> {
        if let Some(frame) = layout_placeholder.and_then(|p| p.geometry) {
            return Some(frame);
        }
        let base = kind.base_type();
        self.master_placeholders
            .iter()
            .find(|p| p.format.kind == base)
            .and_then(|p| p.geometry)
    }

    /// Put a picture into a placeholder of a generated slide.
    ///
    /// See [`PictureScale`] for how the picture is sized.
    #[instrument(skip(self, image), fields(picture = %image.description()))]
    pub fn insert_picture(
        &mut self,
        slide_id: SlideId,
        idx: u32,
        image: &ImageData,
        scale: PictureScale,
    ) -> Result<()> {
        if !self.slide(slide_id)?.generated {
            return Err(Error::InvalidData(format!(
                "slide {} came with the template and cannot be edited",
                slide_id
            )));
        }
        let frame = self.placeholder_geometry(slide_id, idx)?;
        let media_part = self.add_media(image);

        let slide = self.slide_mut(slide_id)?;
        if slide.placeholder(idx).is_none() {
            return Err(Error::PlaceholderNotFound(idx));
        }
        let target = OoxmlContainer::relative_target(&slide.part_name, &media_part);
        let rel_id = slide.rels.add_internal(REL_IMAGE, &target);
        let description = image.description().to_string();

        match scale {
            PictureScale::FillPlaceholder => {
                let crop = fill_crop(image.size(), frame.size())?;
                slide.fill_placeholder_with_picture(idx, rel_id, description, crop)?;
            }
            PictureScale::WithinPlaceholder => {
                let (width, height) = fit_within(image.size(), frame.size())?;
                let picture = Rect::new(frame.left, frame.top, width, height);
                slide.add_picture(rel_id, description, picture)?;
                slide.remove_placeholder(idx)?;
            }
        }

        debug!(slide_id = slide_id.0, idx, %scale, media = %media_part, "Picture inserted");
        Ok(())
    }

    /// Register an image as a media part, reusing an identical one.
    fn add_media(&mut self, image: &ImageData) -> String {
        if let Some(part) = self.media_by_digest.get(image.digest()) {
            return part.clone();
        }

        let part_name = self.next_part_name("media/image", image.extension());
        self.content_types
            .add_default(image.extension(), image.content_type());
        self.media_parts
            .insert(part_name.clone(), image.bytes().to_vec());
        self.media_by_digest
            .insert(image.digest().to_string(), part_name.clone());
        part_name
    }

    fn next_slide_id(&self) -> SlideId {
        self.slides
            .iter()
            .map(|s| s.id)
            .max()
            .map(|SlideId(max)| SlideId(max + 1))
            .unwrap_or(SlideId::MIN)
            .max(SlideId::MIN)
    }

    /// First `{dir}/{stem}{N}.{ext}` next to the presentation part that is
    /// not taken by a template part or a part added in this session.
    fn next_part_name(&self, stem: &str, ext: &str) -> String {
        let base = match self.presentation_part.rfind('/') {
            Some(i) => &self.presentation_part[..i + 1],
            None => "",
        };
        (1..)
            .map(|n| format!("{}{}{}.{}", base, stem, n, ext))
            .find(|name| {
                !self.container.exists(name)
                    && !self.media_parts.contains_key(name)
                    && !self.slides.iter().any(|s| s.part_name == *name)
            })
            .unwrap_or_default()
    }

    /// Serialize the presentation into a package.
    ///
    /// A package opened from a template is written as a presentation.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.build_package()?.to_bytes()
    }

    /// Save the presentation to a file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let package = self.build_package()?;
        let file = File::create(path.as_ref())?;
        let mut writer = package.finish(BufWriter::new(file))?;
        writer.flush()?;
        info!(slides = self.slides.len(), "Presentation saved");
        Ok(())
    }

    /// Save the presentation without blocking the async runtime.
    #[cfg(feature = "async")]
    pub async fn save_async(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        tokio::fs::write(path.as_ref(), bytes).await?;
        info!(slides = self.slides.len(), "Presentation saved");
        Ok(())
    }

    fn build_package(&self) -> Result<PackageWriter> {
        let generated: Vec<&Slide> = self.slides.iter().filter(|s| s.generated).collect();

        let mut content_types = self.content_types.clone();
        content_types.add_default("rels", CT_RELATIONSHIPS);
        content_types.add_default("xml", CT_XML);
        if self.format == FormatType::Potx {
            // Saved decks are presentations, not templates
            content_types.add_override(&self.presentation_part, PPTX_CONTENT_TYPE);
        }

        let presentation_rels_part = rels_path_for(&self.presentation_part);
        let presentation_xml = if generated.is_empty() {
            None
        } else {
            let entries: Vec<(SlideId, &str)> = generated
                .iter()
                .filter_map(|s| self.slide_rel_ids.get(&s.id).map(|rid| (s.id, rid.as_str())))
                .collect();
            let xml = self.container.read_xml(&self.presentation_part)?;
            Some(insert_slide_ids(&xml, &entries)?)
        };

        let mut package = PackageWriter::new();
        package.add_part(CONTENT_TYPES_PART, content_types.to_xml());

        for name in self.container.list_files() {
            if name == CONTENT_TYPES_PART {
                continue;
            }
            if name == self.presentation_part {
                if let Some(xml) = &presentation_xml {
                    package.add_part(name, xml.clone());
                    continue;
                }
            }
            if name == presentation_rels_part && !generated.is_empty() {
                package.add_part(name, self.presentation_rels.to_xml());
                continue;
            }
            let data = self.container.read_binary(&name)?;
            package.add_part(name, data);
        }

        if !generated.is_empty() && !self.container.exists(&presentation_rels_part) {
            package.add_part(presentation_rels_part, self.presentation_rels.to_xml());
        }

        for slide in generated {
            package.add_part(slide.part_name.clone(), slide.to_xml()?);
            package.add_part(rels_path_for(&slide.part_name), slide.rels.to_xml());
        }
        for (name, data) in &self.media_parts {
            package.add_part(name.clone(), data.clone());
        }

        Ok(package)
    }
}

impl std::fmt::Debug for Presentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presentation")
            .field("format", &self.format)
            .field("layouts", &self.layouts.len())
            .field("slides", &self.slides.len())
            .finish()
    }
}

fn into_layout_placeholder(shape: Shape) -> Option<LayoutPlaceholder> {
    let format = shape.placeholder?;
    Some(LayoutPlaceholder {
        format,
        name: shape.name,
        geometry: shape.geometry,
    })
}

/// Slide masters and slides referenced from `presentation.xml`.
#[derive(Debug, Default)]
struct PresentationIds {
    master_rel_ids: Vec<String>,
    slides: Vec<(SlideId, String)>,
}

fn parse_presentation_ids(xml: &str) -> Result<PresentationIds> {
    let mut ids = PresentationIds::default();
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"sldMasterId" => {
                    if let Some(rid) = rel_attr_value(&e, b"id") {
                        ids.master_rel_ids.push(rid);
                    }
                }
                b"sldId" => {
                    let id = int_attr(&e, b"id").map(SlideId);
                    if let (Some(id), Some(rid)) = (id, rel_attr_value(&e, b"id")) {
                        ids.slides.push((id, rid));
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(ids)
}

fn parse_layout_rel_ids(master_xml: &str) -> Result<Vec<String>> {
    let mut rel_ids = Vec::new();
    let mut reader = quick_xml::Reader::from_str(master_xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if e.local_name().as_ref() == b"sldLayoutId" =>
            {
                if let Some(rid) = rel_attr_value(&e, b"id") {
                    rel_ids.push(rid);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(rel_ids)
}

/// Append `<p:sldId>` entries to the slide list of `presentation.xml`,
/// creating the list in schema position when the template has none.
fn insert_slide_ids(xml: &str, entries: &[(SlideId, &str)]) -> Result<String> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut writer = quick_xml::Writer::new(Cursor::new(Vec::new()));
    let mut inserted = false;
    // Open elements; children of <p:presentation> are seen at depth 1
    let mut depth = 0usize;
    let mut ids = SlideIdWriter {
        entries,
        rel_prefix: None,
    };

    loop {
        let event = reader.read_event()?;
        match event {
            Event::Start(ref e) => {
                if depth == 0 {
                    ids.rel_prefix = relationships_prefix(e);
                }
                depth += 1;
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }

        match event {
            Event::End(ref e)
                if !inserted && depth == 1 && e.local_name().as_ref() == b"sldIdLst" =>
            {
                let prefix = element_prefix(e.name().prefix());
                ids.write_ids(&mut writer, &prefix)?;
                inserted = true;
                writer.write_event(event.borrow())?;
            }
            Event::Empty(ref e)
                if !inserted && depth == 1 && e.local_name().as_ref() == b"sldIdLst" =>
            {
                let prefix = element_prefix(e.name().prefix());
                writer.write_event(Event::Start(e.borrow()))?;
                ids.write_ids(&mut writer, &prefix)?;
                writer.write_event(Event::End(e.to_end()))?;
                inserted = true;
            }
            Event::Start(ref e)
                if !inserted
                    && depth == 2
                    && AFTER_SLIDE_ID_LIST.contains(&e.local_name().as_ref()) =>
            {
                let prefix = element_prefix(e.name().prefix());
                ids.write_list(&mut writer, &prefix)?;
                inserted = true;
                writer.write_event(event.borrow())?;
            }
            Event::Empty(ref e)
                if !inserted
                    && depth == 1
                    && AFTER_SLIDE_ID_LIST.contains(&e.local_name().as_ref()) =>
            {
                let prefix = element_prefix(e.name().prefix());
                ids.write_list(&mut writer, &prefix)?;
                inserted = true;
                writer.write_event(event.borrow())?;
            }
            Event::End(ref e) if !inserted && depth == 0 => {
                let prefix = element_prefix(e.name().prefix());
                ids.write_list(&mut writer, &prefix)?;
                inserted = true;
                writer.write_event(event.borrow())?;
            }
            Event::Eof => break,
            _ => writer.write_event(event.borrow())?,
        }
    }

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| Error::XmlParse(e.to_string()))
}

fn element_prefix(prefix: Option<quick_xml::name::Prefix<'_>>) -> String {
    prefix
        .map(|p| format!("{}:", String::from_utf8_lossy(p.as_ref())))
        .unwrap_or_default()
}

/// Prefix the root element binds to the relationships namespace.
fn relationships_prefix(root: &BytesStart<'_>) -> Option<String> {
    root.attributes().flatten().find_map(|a| {
        let key = a.key.as_ref();
        let prefix = key.strip_prefix(b"xmlns:")?;
        (a.value.as_ref() == NS_R.as_bytes())
            .then(|| String::from_utf8_lossy(prefix).into_owned())
    })
}

/// Writes `<p:sldId>` entries for the generated slides.
struct SlideIdWriter<'a> {
    entries: &'a [(SlideId, &'a str)],
    /// `None` when the root does not bind the relationships namespace
    rel_prefix: Option<String>,
}

impl SlideIdWriter<'_> {
    fn write_list<W: Write>(&self, writer: &mut quick_xml::Writer<W>, prefix: &str) -> Result<()> {
        let list = format!("{}sldIdLst", prefix);
        writer.write_event(Event::Start(BytesStart::new(list.as_str())))?;
        self.write_ids(writer, prefix)?;
        writer.write_event(Event::End(BytesEnd::new(list.as_str())))?;
        Ok(())
    }

    fn write_ids<W: Write>(&self, writer: &mut quick_xml::Writer<W>, prefix: &str) -> Result<()> {
        let name = format!("{}sldId", prefix);
        let rel_id_attr = format!("{}:id", self.rel_prefix.as_deref().unwrap_or("r"));
        for (id, rid) in self.entries {
            let id = id.0.to_string();
            let mut element = BytesStart::new(name.as_str());
            if self.rel_prefix.is_none() {
                element.push_attribute(("xmlns:r", NS_R));
            }
            element.push_attribute(("id", id.as_str()));
            element.push_attribute((rel_id_attr.as_str(), *rid));
            writer.write_event(Event::Empty(element))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESENTATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="a" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="p"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#;

    #[test]
    fn test_parse_presentation_ids() {
        let xml = PRESENTATION.replace(
            "<p:sldSz",
            r#"<p:sldIdLst><p:sldId id="256" r:id="rId7"/><p:sldId id="300" r:id="rId8"/></p:sldIdLst><p:sldSz"#,
        );
        let ids = parse_presentation_ids(&xml).unwrap();
        assert_eq!(ids.master_rel_ids, vec!["rId1".to_string()]);
        assert_eq!(
            ids.slides,
            vec![
                (SlideId(256), "rId7".to_string()),
                (SlideId(300), "rId8".to_string())
            ]
        );
    }

    #[test]
    fn test_insert_slide_ids_creates_list() {
        let xml = insert_slide_ids(PRESENTATION, &[(SlideId(256), "rId5")]).unwrap();
        assert!(xml.contains(
            r#"</p:sldMasterIdLst><p:sldIdLst><p:sldId id="256" r:id="rId5"/></p:sldIdLst><p:sldSz"#
        ));
        let ids = parse_presentation_ids(&xml).unwrap();
        assert_eq!(ids.slides, vec![(SlideId(256), "rId5".to_string())]);
    }

    #[test]
    fn test_insert_slide_ids_appends_to_existing_list() {
        let xml = PRESENTATION.replace(
            "<p:sldSz",
            r#"<p:sldIdLst><p:sldId id="256" r:id="rId7"/></p:sldIdLst><p:sldSz"#,
        );
        let xml = insert_slide_ids(&xml, &[(SlideId(257), "rId9"), (SlideId(258), "rId10")]).unwrap();
        let ids = parse_presentation_ids(&xml).unwrap();
        let slide_ids: Vec<u32> = ids.slides.iter().map(|(id, _)| id.0).collect();
        assert_eq!(slide_ids, vec![256, 257, 258]);
        assert_eq!(xml.matches("sldIdLst>").count(), 2);
    }

    #[test]
    fn test_insert_slide_ids_expands_empty_list() {
        let xml = PRESENTATION.replace("<p:sldSz", "<p:sldIdLst/><p:sldSz");
        let xml = insert_slide_ids(&xml, &[(SlideId(256), "rId3")]).unwrap();
        assert!(xml.contains(r#"<p:sldIdLst><p:sldId id="256" r:id="rId3"/></p:sldIdLst>"#));
    }

    #[test]
    fn test_insert_slide_ids_ignores_nested_elements() {
        let xml = PRESENTATION.replace(
            r#"r:id="rId1"/>"#,
            r#"r:id="rId1"><p:extLst/></p:sldMasterId>"#,
        );
        let xml = insert_slide_ids(&xml, &[(SlideId(256), "rId5")]).unwrap();
        assert!(xml.contains(r#"<p:extLst/></p:sldMasterId></p:sldMasterIdLst><p:sldIdLst>"#));
    }

    #[test]
    fn test_insert_slide_ids_at_end_of_root() {
        let xml = r#"<p:presentation xmlns:p="p" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldMasterIdLst/></p:presentation>"#;
        let xml = insert_slide_ids(xml, &[(SlideId(256), "rId2")]).unwrap();
        assert!(xml.ends_with(
            r#"<p:sldMasterIdLst/><p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst></p:presentation>"#
        ));
    }

    #[test]
    fn test_insert_slide_ids_uses_declared_relationships_prefix() {
        let xml = PRESENTATION
            .replace("xmlns:r=", "xmlns:rel=")
            .replace("r:id=", "rel:id=");
        let xml = insert_slide_ids(&xml, &[(SlideId(256), "rId5")]).unwrap();
        assert!(xml.contains(r#"<p:sldId id="256" rel:id="rId5"/>"#));
        let ids = parse_presentation_ids(&xml).unwrap();
        assert_eq!(ids.slides, vec![(SlideId(256), "rId5".to_string())]);
    }

    #[test]
    fn test_insert_slide_ids_declares_missing_relationships_prefix() {
        let xml = r#"<presentation xmlns="p"><sldSz cx="1" cy="1"/></presentation>"#;
        let xml = insert_slide_ids(xml, &[(SlideId(256), "rId2")]).unwrap();
        assert!(xml.contains(&format!(
            r#"<sldIdLst><sldId xmlns:r="{}" id="256" r:id="rId2"/></sldIdLst><sldSz"#,
            NS_R
        )));
    }

    #[test]
    fn test_parse_layout_rel_ids() {
        let xml = r#"<p:sldMaster xmlns:p="p" xmlns:r="r"><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId2"/><p:sldLayoutId id="2147483650" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#;
        assert_eq!(
            parse_layout_rel_ids(xml).unwrap(),
            vec!["rId2".to_string(), "rId1".to_string()]
        );
    }
}
