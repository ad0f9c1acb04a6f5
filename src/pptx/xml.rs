//! Namespaces, relationship types and small XML helpers shared by the
//! presentation parts.

use quick_xml::events::BytesStart;

pub const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

pub const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const REL_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

pub const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
pub const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
pub const CT_XML: &str = "application/xml";

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Value of the unprefixed attribute with the given name.
pub fn attr_value(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.prefix().is_none() && a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Value of a prefixed relationship attribute such as `r:id` or `r:embed`.
pub fn rel_attr_value(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.prefix().is_some() && a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Parse an integer attribute, `None` when absent or malformed.
pub fn int_attr<T: std::str::FromStr>(e: &BytesStart<'_>, local: &[u8]) -> Option<T> {
    attr_value(e, local).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_attr_helpers() {
        let mut reader = quick_xml::Reader::from_str(
            r#"<p:sldId id="256" r:id="rId7" cx=" 12 "/>"#,
        );
        let event = reader.read_event().unwrap();
        let quick_xml::events::Event::Empty(e) = event else {
            panic!("expected empty element");
        };
        assert_eq!(attr_value(&e, b"id").as_deref(), Some("256"));
        assert_eq!(rel_attr_value(&e, b"id").as_deref(), Some("rId7"));
        assert_eq!(int_attr::<i64>(&e, b"cx"), Some(12));
        assert_eq!(int_attr::<i64>(&e, b"cy"), None);
    }
}
