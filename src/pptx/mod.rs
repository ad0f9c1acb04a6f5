//! PresentationML (.pptx) object model.
//!
//! [`Presentation`] opens a template, indexes its slide layouts and
//! placeholders, and writes generated slides back into the package on save.

mod picture;
mod presentation;
mod shapes;
mod slide;
pub(crate) mod xml;

pub use picture::{fill_crop, fit_within, ImageData, PictureScale};
pub use presentation::Presentation;
pub use shapes::{parse_shape_tree, ShapeTree};
pub use slide::{get_slide_placeholders, Slide};
