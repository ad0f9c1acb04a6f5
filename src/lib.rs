//! # slidepack
//!
//! Build PowerPoint decks from a template's slide layouts.
//!
//! Design the layouts once in PowerPoint's Slide Master view, giving them
//! title, body and picture placeholders. This library then creates slides
//! from those layouts by name and fills the placeholders with text and
//! pictures.
//!
//! ## Quick Start
//!
//! ```no_run
//! use slidepack::{add_slide, get_all_slide_layouts, PictureScale, Presentation, SlideContent};
//!
//! let mut prs = Presentation::open("template.pptx")?;
//! println!("{:?}", get_all_slide_layouts(&prs));
//!
//! let contents = add_slide(
//!     &mut prs,
//!     "Title Only",
//!     &SlideContent::new().with_title("Contents"),
//! )?;
//! let results = add_slide(
//!     &mut prs,
//!     "Title, 2 Pictures and 3 Text",
//!     &SlideContent::new()
//!         .with_title("Results")
//!         .with_bodies(["Revenue", "Costs"])
//!         .with_picture("chart.png")
//!         .with_picture_scale(PictureScale::WithinPlaceholder),
//! )?;
//!
//! prs.save("report.pptx")?;
//! println!("slides {} and {}", contents, results);
//! # Ok::<(), slidepack::Error>(())
//! ```
//!
//! ## Object Model
//!
//! ```no_run
//! use slidepack::Presentation;
//!
//! let mut prs = Presentation::open("template.pptx")?;
//! let layout = prs.layout_index("Title Only")?;
//! let slide_id = prs.add_slide_from_layout(layout)?;
//!
//! let slide = prs.slide_mut(slide_id)?;
//! if let Some(idx) = slide.placeholders().title {
//!     slide.set_text(idx, "Hello")?;
//! }
//! let bytes = prs.to_bytes()?;
//! # let _ = bytes;
//! # Ok::<(), slidepack::Error>(())
//! ```
//!
//! ## Features
//!
//! - `async`: `Presentation::open_async` and `Presentation::save_async` with Tokio

pub mod container;
pub mod deck;
pub mod detect;
pub mod error;
pub mod model;
pub mod pptx;

// Re-exports
pub use container::{OoxmlContainer, Relationship, Relationships};
pub use deck::{add_slide, get_all_slide_layouts, get_slide_placeholders, DeckPlan, SlideContent};
pub use detect::{detect_format_from_bytes, detect_format_from_path, FormatType};
pub use error::{Error, Result};
pub use model::{
    Crop, LayoutPlaceholder, PlaceholderFormat, PlaceholderType, Rect, Shape, ShapeKind, SlideId,
    SlideLayout, SlidePlaceholders,
};
pub use pptx::{ImageData, PictureScale, Presentation, Slide};

use std::path::Path;

/// List the slide layouts of a template, in order.
///
/// # Example
///
/// ```no_run
/// let layouts = slidepack::list_layouts("template.pptx")?;
/// for layout in &layouts {
///     println!("{} {}", layout.index, layout.name);
/// }
/// # Ok::<(), slidepack::Error>(())
/// ```
pub fn list_layouts(path: impl AsRef<Path>) -> Result<Vec<SlideLayout>> {
    let prs = Presentation::open(path)?;
    Ok(prs.layouts().to_vec())
}

/// Build and save the deck described by a JSON plan file.
///
/// Returns the ids of the slides that were added.
pub fn build_deck(plan_path: impl AsRef<Path>) -> Result<Vec<SlideId>> {
    DeckPlan::from_path(plan_path)?.run()
}
