//! Deck plans: a whole deck described in JSON.
//!
//! ```json
//! {
//!   "template": "template.pptx",
//!   "output": "report.pptx",
//!   "picture_scale": "within_placeholder",
//!   "slides": [
//!     { "layout": "Title Only", "title": "Contents" },
//!     { "layout": "Title, 2 Pictures and 3 Text", "title": "Results",
//!       "bodies": ["Revenue", "Costs"], "pictures": ["chart.png"] }
//!   ]
//! }
//! ```
//!
//! Relative paths are resolved against the directory of the plan file.

use super::{add_slide, SlideContent};
use crate::error::{Error, Result};
use crate::model::SlideId;
use crate::pptx::{PictureScale, Presentation};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// A deck to build from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckPlan {
    /// Template presentation to start from
    pub template: PathBuf,

    /// Where [`DeckPlan::run`] saves the result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Scale method for slides that do not set their own
    #[serde(default)]
    pub picture_scale: PictureScale,

    /// Slides to append, in order
    #[serde(default)]
    pub slides: Vec<PlannedSlide>,
}

/// One slide of a [`DeckPlan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedSlide {
    /// Layout name
    pub layout: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub bodies: Vec<String>,

    #[serde(default)]
    pub pictures: Vec<PathBuf>,

    /// Overrides the plan's scale method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_scale: Option<PictureScale>,
}

impl DeckPlan {
    /// Read a plan from a JSON file, resolving relative paths against the
    /// file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Plan(format!("failed to read {}: {}", path.display(), e)))?;
        let mut plan = Self::from_json(&json)?;
        if let Some(dir) = path.parent() {
            plan.resolve_paths(dir);
        }
        Ok(plan)
    }

    /// Parse a plan from JSON. Paths are kept as written.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Plan(e.to_string()))
    }

    /// Make every relative path in the plan relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.template);
        if let Some(output) = self.output.as_mut() {
            resolve(output);
        }
        for slide in &mut self.slides {
            slide.pictures.iter_mut().for_each(resolve);
        }
    }

    /// Slide content for a planned slide.
    pub fn content_for(&self, slide: &PlannedSlide) -> SlideContent {
        SlideContent::new()
            .with_title(slide.title.clone())
            .with_bodies(slide.bodies.iter().cloned())
            .with_picture_scale(slide.picture_scale.unwrap_or(self.picture_scale))
            .with_pictures(slide.pictures.iter().cloned())
    }

    /// Open the template and add every planned slide.
    ///
    /// Stops at the first slide that fails; the error names its position.
    #[instrument(skip(self), fields(template = %self.template.display(), slides = self.slides.len()))]
    pub fn build(&self) -> Result<(Presentation, Vec<SlideId>)> {
        let mut prs = Presentation::open(&self.template)?;
        let mut ids = Vec::with_capacity(self.slides.len());

        for (n, slide) in self.slides.iter().enumerate() {
            let content = self.content_for(slide);
            let id = add_slide(&mut prs, &slide.layout, &content).map_err(|e| {
                Error::Plan(format!("slide {} ('{}'): {}", n + 1, slide.layout, e))
            })?;
            ids.push(id);
        }

        Ok((prs, ids))
    }

    /// Build the deck and save it to `output`.
    pub fn run(&self) -> Result<Vec<SlideId>> {
        let output = self
            .output
            .as_ref()
            .ok_or_else(|| Error::Plan("no output path".to_string()))?;
        let (prs, ids) = self.build()?;
        prs.save(output)?;
        info!(output = %output.display(), slides = ids.len(), "Deck written");
        Ok(ids)
    }
}
