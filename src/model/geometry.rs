//! Positions, sizes and crops in English Metric Units.

use serde::{Deserialize, Serialize};

/// A shape's frame in EMUs, as given by `<a:off>` and `<a:ext>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Distance from the left edge of the slide
    pub left: i64,
    /// Distance from the top edge of the slide
    pub top: i64,
    /// Width of the frame
    pub width: i64,
    /// Height of the frame
    pub height: i64,
}

impl Rect {
    /// Create a frame from position and size.
    pub fn new(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Frame size as `(width, height)`.
    pub fn size(&self) -> (i64, i64) {
        (self.width, self.height)
    }
}

/// Picture crop in `<a:srcRect>` units, thousandths of a percent.
///
/// `left: 25_000` hides the leftmost quarter of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Crop {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Crop {
    /// Whether nothing is cropped.
    pub fn is_empty(&self) -> bool {
        self.left == 0 && self.top == 0 && self.right == 0 && self.bottom == 0
    }
}
