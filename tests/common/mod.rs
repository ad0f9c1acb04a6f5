//! Synthetic template presentations for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const LAYOUT_NAMES: [&str; 5] = [
    "no_placeholders",
    "title_only",
    "title_2txt",
    "title_2pic_3txt",
    "other_placeholders",
];

const NAMESPACES: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

/// A placeholder `<p:sp>` with an optional frame.
pub fn placeholder(id: u32, name: &str, ph: &str, frame: Option<(i64, i64, i64, i64)>) -> String {
    let sppr = match frame {
        Some((x, y, cx, cy)) => format!(
            r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm></p:spPr>"#
        ),
        None => "<p:spPr/>".to_string(),
    };
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{ph}</p:nvPr></p:nvSpPr>{sppr}<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:t>{name}</a:t></a:r></a:p></p:txBody></p:sp>"#
    )
}

fn shape_tree(root: &str, extra_attrs: &str, name: Option<&str>, shapes: &[String]) -> String {
    let name_attr = name.map(|n| format!(r#" name="{n}""#)).unwrap_or_default();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:{root} {NAMESPACES}{extra_attrs}><p:cSld{name_attr}><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld>"#,
        shapes.concat()
    )
}

fn footers(first_id: u32) -> Vec<String> {
    vec![
        placeholder(first_id, "Date Placeholder", r#"<p:ph type="dt" sz="half" idx="10"/>"#, None),
        placeholder(first_id + 1, "Footer Placeholder", r#"<p:ph type="ftr" sz="quarter" idx="11"/>"#, None),
        placeholder(first_id + 2, "Slide Number Placeholder", r#"<p:ph type="sldNum" sz="quarter" idx="12"/>"#, None),
    ]
}

pub fn title() -> String {
    placeholder(2, "Title 1", r#"<p:ph type="title"/>"#, None)
}

fn builtin_layout_shapes(index: usize) -> Vec<String> {
    match index {
        0 => footers(2),
        1 => {
            let mut shapes = vec![title()];
            shapes.extend(footers(3));
            shapes
        }
        2 => vec![
            title(),
            placeholder(3, "Text Placeholder 2", r#"<p:ph type="body" idx="1"/>"#, Some((838200, 1825625, 5181600, 4351338))),
            // Inherits its frame from the master body placeholder
            placeholder(4, "Text Placeholder 3", r#"<p:ph type="body" sz="half" idx="2"/>"#, None),
        ],
        3 => vec![
            title(),
            placeholder(3, "Picture Placeholder 2", r#"<p:ph type="pic" idx="13"/>"#, Some((838200, 1825625, 4000000, 2000000))),
            placeholder(4, "Picture Placeholder 3", r#"<p:ph type="pic" idx="14"/>"#, Some((6000000, 1825625, 3000000, 3000000))),
            placeholder(5, "Text Placeholder 4", r#"<p:ph type="body" idx="1"/>"#, Some((838200, 4000000, 3000000, 1000000))),
            placeholder(6, "Text Placeholder 5", r#"<p:ph type="body" idx="2"/>"#, Some((4000000, 4000000, 3000000, 1000000))),
            placeholder(7, "Text Placeholder 6", r#"<p:ph type="body" idx="3"/>"#, Some((7200000, 4000000, 3000000, 1000000))),
        ],
        _ => vec![
            title(),
            placeholder(3, "Chart Placeholder 2", r#"<p:ph type="chart" idx="15"/>"#, Some((838200, 1825625, 10515600, 4351338))),
        ],
    }
}

fn layout_xml(name: &str, shapes: &[String]) -> String {
    let mut xml = shape_tree("sldLayout", r#" preserve="1""#, Some(name), shapes);
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>");
    xml
}

fn master_xml(layout_count: usize, body: bool) -> String {
    // Without the body placeholder the header one takes its place
    let body_ph = if body { "body" } else { "hdr" };
    let shapes = vec![
        placeholder(2, "Title Placeholder 1", r#"<p:ph type="title"/>"#, Some((838200, 365125, 10515600, 1325563))),
        placeholder(3, "Text Placeholder 2", &format!(r#"<p:ph type="{body_ph}" idx="1"/>"#), Some((838200, 1825625, 10515600, 4351338))),
        placeholder(4, "Date Placeholder 3", r#"<p:ph type="dt" sz="half" idx="2"/>"#, Some((838200, 6356350, 2743200, 365125))),
        placeholder(5, "Footer Placeholder 4", r#"<p:ph type="ftr" sz="quarter" idx="3"/>"#, Some((4038600, 6356350, 4114800, 365125))),
        placeholder(6, "Slide Number Placeholder 5", r#"<p:ph type="sldNum" sz="quarter" idx="4"/>"#, Some((8610600, 6356350, 2743200, 365125))),
    ];
    let mut xml = shape_tree("sldMaster", "", None, &shapes);
    xml.push_str(r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst>"#);
    for i in 0..layout_count {
        xml.push_str(&format!(
            r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#,
            2147483649 + i as u64,
            i + 1
        ));
    }
    xml.push_str("</p:sldLayoutIdLst></p:sldMaster>");
    xml
}

fn front_slide_xml() -> String {
    let shapes = vec![String::from(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:t>Front page</a:t></a:r></a:p></p:txBody></p:sp>"#
    )];
    let mut xml = shape_tree("sld", "", None, &shapes);
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
    xml
}

fn rels(entries: &[(String, &str, String)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, rel_type, target) in entries {
        xml.push_str(&format!(
            r#"<Relationship Id="{id}" Type="{rel_type}" Target="{target}"/>"#
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// Build a template with the five layouts of [`LAYOUT_NAMES`].
///
/// With `front_page` the template also carries one existing slide (id 256)
/// made from `title_only`; without it `presentation.xml` has no slide list.
pub fn template_bytes(front_page: bool) -> Vec<u8> {
    Template {
        front_page,
        ..Template::default()
    }
    .to_bytes()
}

/// Variations on the synthetic template.
pub struct Template {
    pub front_page: bool,
    /// Layouts appended after the five of [`LAYOUT_NAMES`]
    pub extra_layouts: Vec<(String, Vec<String>)>,
    /// Whether the master has a body placeholder
    pub master_body: bool,
    /// Content type of `presentation.xml`
    pub main_content_type: &'static str,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            front_page: true,
            extra_layouts: Vec::new(),
            master_body: true,
            main_content_type: slidepack::detect::PPTX_CONTENT_TYPE,
        }
    }
}

impl Template {
    pub fn with_layout(mut self, name: &str, shapes: Vec<String>) -> Self {
        self.extra_layouts.push((name.to_string(), shapes));
        self
    }

    fn layouts(&self) -> Vec<(String, Vec<String>)> {
        LAYOUT_NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), builtin_layout_shapes(i)))
            .chain(self.extra_layouts.iter().cloned())
            .collect()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        build_template(self)
    }
}

fn build_template(template: &Template) -> Vec<u8> {
    let front_page = template.front_page;
    let layouts = template.layouts();
    let mut buffer = Vec::new();
    let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut parts: Vec<(String, String)> = Vec::new();

    let mut overrides = String::new();
    overrides.push_str(&format!(
        r#"<Override PartName="/ppt/presentation.xml" ContentType="{}"/>"#,
        template.main_content_type
    ));
    overrides.push_str(r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#);
    for i in 1..=layouts.len() {
        overrides.push_str(&format!(
            r#"<Override PartName="/ppt/slideLayouts/slideLayout{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#
        ));
    }
    if front_page {
        overrides.push_str(r#"<Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#);
    }
    parts.push((
        "[Content_Types].xml".to_string(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>{overrides}</Types>"#
        ),
    ));

    parts.push((
        "_rels/.rels".to_string(),
        rels(&[(
            "rId1".to_string(),
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
            "ppt/presentation.xml".to_string(),
        )]),
    ));

    let slide_list = if front_page {
        r#"<p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst>"#
    } else {
        ""
    };
    parts.push((
        "ppt/presentation.xml".to_string(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation {NAMESPACES} saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>{slide_list}<p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/><p:defaultTextStyle/></p:presentation>"#
        ),
    ));

    let mut presentation_rels = vec![(
        "rId1".to_string(),
        REL_SLIDE_MASTER,
        "slideMasters/slideMaster1.xml".to_string(),
    )];
    if front_page {
        presentation_rels.push(("rId2".to_string(), REL_SLIDE, "slides/slide1.xml".to_string()));
    }
    parts.push(("ppt/_rels/presentation.xml.rels".to_string(), rels(&presentation_rels)));

    parts.push((
        "ppt/slideMasters/slideMaster1.xml".to_string(),
        master_xml(layouts.len(), template.master_body),
    ));
    let layout_rels: Vec<_> = (1..=layouts.len())
        .map(|i| {
            (
                format!("rId{i}"),
                REL_SLIDE_LAYOUT,
                format!("../slideLayouts/slideLayout{i}.xml"),
            )
        })
        .collect();
    parts.push((
        "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
        rels(&layout_rels),
    ));

    for (i, (name, shapes)) in layouts.iter().enumerate() {
        parts.push((format!("ppt/slideLayouts/slideLayout{}.xml", i + 1), layout_xml(name, shapes)));
        parts.push((
            format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", i + 1),
            rels(&[(
                "rId1".to_string(),
                REL_SLIDE_MASTER,
                "../slideMasters/slideMaster1.xml".to_string(),
            )]),
        ));
    }

    if front_page {
        parts.push(("ppt/slides/slide1.xml".to_string(), front_slide_xml()));
        parts.push((
            "ppt/slides/_rels/slide1.xml.rels".to_string(),
            rels(&[(
                "rId1".to_string(),
                REL_SLIDE_LAYOUT,
                "../slideLayouts/slideLayout2.xml".to_string(),
            )]),
        ));
    }

    for (name, content) in parts {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
    buffer
}

/// Encode a blank PNG of the given pixel size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([30, 90, 160]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Write a PNG into `dir` and return its path.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, png_bytes(width, height)).unwrap();
    path
}

/// Write the template into `dir` and return its path.
pub fn write_template(dir: &Path) -> PathBuf {
    let path = dir.join("template.pptx");
    std::fs::write(&path, template_bytes(true)).unwrap();
    path
}
