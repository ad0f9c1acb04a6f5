//! Slide-level model for presentations.
//!
//! These types describe what a template offers (layouts and their
//! placeholders) and what a slide contains (shapes). The `pptx` module parses
//! package XML into them and serializes generated slides back out.

mod geometry;
mod layout;
mod placeholder;
mod shape;

pub use geometry::*;
pub use layout::*;
pub use placeholder::*;
pub use shape::*;
