//! Picture loading and the two ways of sizing a picture to a placeholder.

use crate::error::{Error, Result};
use crate::model::Crop;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, instrument};

/// `<a:srcRect>` value for the whole image, 100%.
const CROP_FULL: f64 = 100_000.0;

/// How a picture is sized to its placeholder. Aspect ratio is kept either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PictureScale {
    /// Enlarge until the placeholder is covered, cropping the overflow.
    #[default]
    FillPlaceholder,
    /// Make the picture as large as possible while staying inside the
    /// placeholder. The placeholder is replaced by a plain picture.
    WithinPlaceholder,
}

impl PictureScale {
    /// Name used in plans and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            PictureScale::FillPlaceholder => "fill_placeholder",
            PictureScale::WithinPlaceholder => "within_placeholder",
        }
    }
}

impl std::fmt::Display for PictureScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PictureScale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fill_placeholder" | "fill" => Ok(PictureScale::FillPlaceholder),
            "within_placeholder" | "within" => Ok(PictureScale::WithinPlaceholder),
            other => Err(Error::InvalidData(format!(
                "unknown picture scale method '{}', expected fill_placeholder or within_placeholder",
                other
            ))),
        }
    }
}

/// Largest `(width, height)` that keeps the image's aspect ratio and fits
/// inside the placeholder.
///
/// Sizes may be in any unit as long as both use the same one for each axis;
/// the result is in the placeholder's unit, truncated.
///
/// ```
/// use slidepack::pptx::fit_within;
///
/// assert_eq!(fit_within((10, 40), (40, 80)).unwrap(), (20, 80));
/// assert_eq!(fit_within((10, 40), (40, 400)).unwrap(), (40, 160));
/// ```
pub fn fit_within(image: (i64, i64), placeholder: (i64, i64)) -> Result<(i64, i64)> {
    let (img_width, img_height) = image;
    if img_width <= 0 || img_height <= 0 {
        return Err(Error::InvalidData(format!(
            "image size {}x{} has no area",
            img_width, img_height
        )));
    }

    let width_scale = placeholder.0 as f64 / img_width as f64;
    let height_scale = placeholder.1 as f64 / img_height as f64;
    let scale = width_scale.min(height_scale);

    Ok((
        (img_width as f64 * scale) as i64,
        (img_height as f64 * scale) as i64,
    ))
}

/// Crop that makes an image cover a placeholder of a different shape.
///
/// The image is centered; the axis on which it overflows is cropped equally
/// on both sides.
pub fn fill_crop(image: (i64, i64), placeholder: (i64, i64)) -> Result<Crop> {
    let (img_width, img_height) = image;
    let (ph_width, ph_height) = placeholder;
    if img_width <= 0 || img_height <= 0 || ph_width <= 0 || ph_height <= 0 {
        return Ok(Crop::default());
    }

    let image_aspect = img_width as f64 / img_height as f64;
    let placeholder_aspect = ph_width as f64 / ph_height as f64;

    let mut crop = Crop::default();
    if placeholder_aspect > image_aspect {
        // Image is too tall
        let each = ((1.0 - image_aspect / placeholder_aspect) / 2.0 * CROP_FULL) as i32;
        crop.top = each;
        crop.bottom = each;
    } else if placeholder_aspect < image_aspect {
        let each = ((1.0 - placeholder_aspect / image_aspect) / 2.0 * CROP_FULL) as i32;
        crop.left = each;
        crop.right = each;
    }
    Ok(crop)
}

/// An image ready to be embedded in a slide.
#[derive(Clone)]
pub struct ImageData {
    bytes: Vec<u8>,
    format: ImageFormat,
    width: u32,
    height: u32,
    description: String,
    digest: String,
}

impl ImageData {
    /// Load and measure an image file. The file name becomes the picture's
    /// description.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|err| {
            Error::Image(format!("failed to read {}: {}", path.display(), err))
        })?;
        let description = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_bytes(bytes, description)
    }

    /// Measure an encoded image (PNG, JPEG, GIF, BMP, TIFF).
    pub fn from_bytes(bytes: Vec<u8>, description: impl Into<String>) -> Result<Self> {
        let reader = image::ImageReader::new(Cursor::new(&bytes)).with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| Error::Image("unrecognized image format".to_string()))?;
        let (width, height) = reader.into_dimensions()?;
        if width == 0 || height == 0 {
            return Err(Error::Image(format!("image is {}x{}", width, height)));
        }

        let digest = hex::encode(Sha256::digest(&bytes));
        debug!(width, height, ?format, "Image measured");

        Ok(Self {
            bytes,
            format,
            width,
            height,
            description: description.into(),
            digest,
        })
    }

    /// Encoded image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Pixel size as `(width, height)`.
    pub fn size(&self) -> (i64, i64) {
        (i64::from(self.width), i64::from(self.height))
    }

    /// Description stored with the picture shape.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// SHA-256 of the encoded bytes, hex encoded.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// File extension used for the media part.
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("bin")
    }

    /// MIME type registered for the media part.
    pub fn content_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageData")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .field("description", &self.description)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::new(width, height);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_fit_within() {
        let image = (1000, 500);
        assert_eq!(fit_within(image, (1200, 2000)).unwrap(), (1200, 600));
        assert_eq!(fit_within(image, (3000, 1000)).unwrap(), (2000, 1000));
        assert_eq!(fit_within(image, (4000, 2000)).unwrap(), (4000, 2000));
    }

    #[test]
    fn test_fit_within_narrow_image() {
        assert_eq!(fit_within((10, 40), (40, 80)).unwrap(), (20, 80));
        assert_eq!(fit_within((10, 40), (40, 400)).unwrap(), (40, 160));
    }

    #[test]
    fn test_fit_within_rejects_empty_image() {
        assert!(matches!(
            fit_within((0, 10), (100, 100)),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_fill_crop() {
        // 2:1 image into a square: a quarter off each side
        let crop = fill_crop((1000, 500), (800, 800)).unwrap();
        assert_eq!(
            crop,
            Crop {
                left: 25_000,
                top: 0,
                right: 25_000,
                bottom: 0
            }
        );

        // 1:2 image into a square
        let crop = fill_crop((500, 1000), (800, 800)).unwrap();
        assert_eq!((crop.top, crop.bottom, crop.left), (25_000, 25_000, 0));

        assert!(fill_crop((400, 300), (800, 600)).unwrap().is_empty());
    }

    #[test]
    fn test_picture_scale_parse() {
        assert_eq!(
            "within_placeholder".parse::<PictureScale>().unwrap(),
            PictureScale::WithinPlaceholder
        );
        assert_eq!("fill".parse::<PictureScale>().unwrap(), PictureScale::FillPlaceholder);
        assert_eq!(
            "Fill-Placeholder".parse::<PictureScale>().unwrap(),
            PictureScale::FillPlaceholder
        );
        assert!("stretch".parse::<PictureScale>().is_err());
        assert_eq!(PictureScale::default(), PictureScale::FillPlaceholder);
        assert_eq!(
            serde_json::to_string(&PictureScale::WithinPlaceholder).unwrap(),
            r#""within_placeholder""#
        );
    }

    #[test]
    fn test_image_data_from_png() {
        let bytes = png(40, 10);
        let image = ImageData::from_bytes(bytes.clone(), "strip.png").unwrap();
        assert_eq!(image.size(), (40, 10));
        assert_eq!(image.extension(), "png");
        assert_eq!(image.content_type(), "image/png");
        assert_eq!(image.description(), "strip.png");
        assert_eq!(image.digest().len(), 64);

        let same = ImageData::from_bytes(bytes, "copy.png").unwrap();
        assert_eq!(image.digest(), same.digest());
    }

    #[test]
    fn test_image_data_rejects_garbage() {
        let result = ImageData::from_bytes(b"not an image".to_vec(), "x");
        assert!(matches!(result, Err(Error::Image(_))));
    }
}
