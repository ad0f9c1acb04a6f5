//! Slide-deck helpers.
//!
//! These functions are the short path through the object model: pick a
//! layout by name, create a slide from it and fill its title, body and
//! picture placeholders in Selection Pane order. Placeholders left without
//! content are removed so they do not show up as "Click to add text".

pub mod plan;

use crate::error::{Error, Result};
use crate::model::{Rect, SlideId, SlidePlaceholders};
use crate::pptx::{fill_crop, fit_within, ImageData, PictureScale, Presentation};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, instrument};

pub use crate::pptx::get_slide_placeholders;
pub use plan::{DeckPlan, PlannedSlide};

/// Content for one slide.
#[derive(Debug, Clone, Default)]
pub struct SlideContent {
    /// Title text. Empty means the slide has no title.
    pub title: String,

    /// One string per body placeholder, in Selection Pane order
    pub bodies: Vec<String>,

    /// One image file per picture placeholder, in Selection Pane order
    pub pictures: Vec<PathBuf>,

    /// How pictures are sized to their placeholders
    pub picture_scale: PictureScale,
}

impl SlideContent {
    /// Create empty slide content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Append a body text.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.bodies.push(body.into());
        self
    }

    /// Replace all body texts.
    pub fn with_bodies<I, S>(mut self, bodies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bodies = bodies.into_iter().map(Into::into).collect();
        self
    }

    /// Append a picture file.
    pub fn with_picture(mut self, path: impl Into<PathBuf>) -> Self {
        self.pictures.push(path.into());
        self
    }

    /// Replace all picture files.
    pub fn with_pictures<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.pictures = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set the picture scale method.
    pub fn with_picture_scale(mut self, scale: PictureScale) -> Self {
        self.picture_scale = scale;
        self
    }
}

/// Layout name mapped to its number.
///
/// Layout names are set in PowerPoint's Slide Master view. When two layouts
/// share a name the later one wins.
pub fn get_all_slide_layouts(prs: &Presentation) -> HashMap<String, usize> {
    prs.get_all_slide_layouts()
}

/// Add a slide built from the named layout and fill it with `content`.
///
/// The content is checked against the layout before anything changes: a
/// non-empty title needs a title placeholder, and there must be at least as
/// many body and picture placeholders as bodies and pictures. Pictures are
/// loaded and sized against their placeholders up front too, so an
/// unreadable file or a placeholder without a position leaves the
/// presentation as it was.
///
/// A center title (`ctrTitle`) placeholder takes the title like a plain
/// title placeholder does. This differs from matching `title` placeholders
/// only, which files `ctrTitle` under other placeholders and rejects a
/// title for those layouts.
///
/// Returns the id of the new slide. Keep it to build a contents page.
///
/// # Example
///
/// ```no_run
/// use slidepack::{add_slide, Presentation, SlideContent};
///
/// let mut prs = Presentation::open("template.pptx")?;
/// let content = SlideContent::new()
///     .with_title("Quarterly results")
///     .with_body("Revenue grew")
///     .with_picture("chart.png");
/// let slide_id = add_slide(&mut prs, "Title, 2 Pictures and 3 Text", &content)?;
/// prs.save("report.pptx")?;
/// # let _ = slide_id;
/// # Ok::<(), slidepack::Error>(())
/// ```
#[instrument(skip(prs, content), fields(title = %content.title))]
pub fn add_slide(
    prs: &mut Presentation,
    layout_name: &str,
    content: &SlideContent,
) -> Result<SlideId> {
    let layout_index = prs.layout_index(layout_name)?;
    let placeholders = prs.layout(layout_index)?.slide_placeholders();
    check_content(&placeholders, content)?;

    let images = content
        .pictures
        .iter()
        .map(ImageData::open)
        .collect::<Result<Vec<_>>>()?;
    for (&idx, image) in placeholders.picture.iter().zip(&images) {
        let frame = prs.layout_placeholder_geometry(layout_index, idx)?;
        check_picture_fits(image, frame, content.picture_scale)?;
    }

    let slide_id = prs.add_slide_from_layout(layout_index)?;
    let placeholders = prs.slide(slide_id)?.placeholders();

    if let Some(idx) = placeholders.title {
        let slide = prs.slide_mut(slide_id)?;
        if content.title.is_empty() {
            slide.remove_placeholder(idx)?;
        } else {
            slide.set_text(idx, &content.title)?;
        }
    }

    for (i, &idx) in placeholders.body.iter().enumerate() {
        let slide = prs.slide_mut(slide_id)?;
        match content.bodies.get(i) {
            Some(body) => slide.set_text(idx, body)?,
            None => slide.remove_placeholder(idx)?,
        }
    }

    for (i, &idx) in placeholders.picture.iter().enumerate() {
        match images.get(i) {
            Some(image) => prs.insert_picture(slide_id, idx, image, content.picture_scale)?,
            None => prs.slide_mut(slide_id)?.remove_placeholder(idx)?,
        }
    }

    debug!(
        slide_id = slide_id.0,
        bodies = content.bodies.len(),
        pictures = images.len(),
        "Slide filled"
    );
    Ok(slide_id)
}

/// Check that `content` fits the placeholders a layout offers.
fn check_content(placeholders: &SlidePlaceholders, content: &SlideContent) -> Result<()> {
    if placeholders.title.is_none() && !content.title.is_empty() {
        return Err(Error::TitleWithoutPlaceholder);
    }
    if content.bodies.len() > placeholders.body.len() {
        return Err(Error::TooManyBodies {
            provided: content.bodies.len(),
            available: placeholders.body.len(),
        });
    }
    if content.pictures.len() > placeholders.picture.len() {
        return Err(Error::TooManyPictures {
            provided: content.pictures.len(),
            available: placeholders.picture.len(),
        });
    }
    Ok(())
}

/// Check that `image` can be sized to `frame` the way `scale` asks.
fn check_picture_fits(image: &ImageData, frame: Rect, scale: PictureScale) -> Result<()> {
    match scale {
        PictureScale::FillPlaceholder => fill_crop(image.size(), frame.size()).map(|_| ()),
        PictureScale::WithinPlaceholder => fit_within(image.size(), frame.size()).map(|_| ()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholders(title: bool, bodies: usize, pictures: usize) -> SlidePlaceholders {
        SlidePlaceholders {
            title: title.then_some(0),
            body: (0..bodies as u32).map(|i| 10 + i).collect(),
            picture: (0..pictures as u32).map(|i| 20 + i).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_slide_content_builder() {
        let content = SlideContent::new()
            .with_title("Title")
            .with_body("one")
            .with_body("two")
            .with_picture("a.png")
            .with_picture_scale(PictureScale::WithinPlaceholder);

        assert_eq!(content.title, "Title");
        assert_eq!(content.bodies, vec!["one", "two"]);
        assert_eq!(content.pictures, vec![PathBuf::from("a.png")]);
        assert_eq!(content.picture_scale, PictureScale::WithinPlaceholder);

        let content = content.with_bodies(["x"]);
        assert_eq!(content.bodies, vec!["x"]);
    }

    #[test]
    fn test_check_content_accepts_fewer_items() {
        let content = SlideContent::new().with_title("T").with_body("b");
        assert!(check_content(&placeholders(true, 3, 2), &content).is_ok());
        assert!(check_content(&placeholders(false, 0, 0), &SlideContent::new()).is_ok());
    }

    #[test]
    fn test_check_content_title_without_placeholder() {
        let content = SlideContent::new().with_title("Title");
        assert!(matches!(
            check_content(&placeholders(false, 1, 0), &content),
            Err(Error::TitleWithoutPlaceholder)
        ));
    }

    #[test]
    fn test_check_content_too_many_bodies() {
        let content = SlideContent::new().with_bodies(["a", "b", "c"]);
        let err = check_content(&placeholders(true, 2, 0), &content).unwrap_err();
        assert!(matches!(
            err,
            Error::TooManyBodies {
                provided: 3,
                available: 2
            }
        ));
        assert!(err.to_string().contains("3 strings provided, 2 placeholders exist"));
    }

    #[test]
    fn test_check_content_too_many_pictures() {
        let content = SlideContent::new().with_picture("a.png");
        assert!(matches!(
            check_content(&placeholders(true, 2, 0), &content),
            Err(Error::TooManyPictures {
                provided: 1,
                available: 0
            })
        ));
    }
}
