// Analysis session
// Holds the subject photo, the chosen control sample and the latest result
// between caller actions. Failed actions leave all three untouched.

use crate::analysis::{analyze, AnalysisResult};
use crate::error::{Result, RobodocError};
use crate::export::{export_composite, export_masked_region, load_image};
use crate::segmentation::ensure_non_empty;
use crate::selection::{crop_control, display_to_original};
use image::DynamicImage;
use log::info;
use robodoc_common::{AnalysisParams, CropRect, DisplayRect, ImageSize};
use std::path::Path;
use std::thread::{self, JoinHandle};

#[derive(Default)]
pub struct InjurySession {
    subject: Option<DynamicImage>,
    control: Option<DynamicImage>,
    control_rect: Option<CropRect>,
    params: AnalysisParams,
    result: Option<AnalysisResult>,
}

impl InjurySession {
    pub fn new(params: AnalysisParams) -> Self {
        Self {
            params: params.clamped(),
            ..Default::default()
        }
    }

    /// Replace the subject photo, discarding the control and any result.
    ///
    /// Only colour photos are accepted.
    pub fn load_subject(&mut self, subject: DynamicImage) -> Result<()> {
        ensure_non_empty(&subject, "subject")?;
        if !subject.color().has_color() {
            return Err(RobodocError::InvalidImage(format!(
                "subject must be a colour image, got {:?}",
                subject.color()
            )));
        }
        self.subject = Some(subject);
        self.control = None;
        self.control_rect = None;
        self.result = None;
        Ok(())
    }

    pub fn load_subject_from_path(&mut self, path: &Path) -> Result<()> {
        let subject = load_image(path)?;
        self.load_subject(subject)
    }

    /// Cut the control sample out of the subject at `rect` (original pixels)
    pub fn select_control(&mut self, rect: CropRect) -> Result<()> {
        let subject = self.require_subject()?;
        let control = crop_control(subject, rect)?;
        info!("Control region selected: {}", rect);
        self.control = Some(control);
        self.control_rect = Some(rect);
        Ok(())
    }

    /// Select the control from a rubber band drawn on a `display`-sized preview.
    ///
    /// Returns `Ok(false)` and keeps the current state when the selection has
    /// no area.
    pub fn select_control_from_display(
        &mut self,
        rect: DisplayRect,
        display: ImageSize,
    ) -> Result<bool> {
        let subject = self.require_subject()?;
        let original = ImageSize::new(subject.width(), subject.height());
        match display_to_original(rect, display, original)? {
            Some(crop) => {
                self.select_control(crop)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn set_params(&mut self, params: AnalysisParams) {
        self.params = params.clamped();
    }

    pub fn params(&self) -> AnalysisParams {
        self.params
    }

    pub fn subject(&self) -> Option<&DynamicImage> {
        self.subject.as_ref()
    }

    pub fn control_rect(&self) -> Option<CropRect> {
        self.control_rect
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// Run the difference engine and keep its output as the current result
    pub fn analyze(&mut self) -> Result<&AnalysisResult> {
        let subject = self.require_subject()?;
        let control = self.control.as_ref().ok_or_else(|| {
            RobodocError::InvalidImage("no control region selected".to_string())
        })?;
        let result = analyze(subject, control, &self.params)?;
        Ok(&*self.result.insert(result))
    }

    /// Write the current composite to `path`
    pub fn save_result(&self, path: &Path) -> Result<()> {
        let result = self.require_result()?;
        export_composite(&result.composite, path)
    }

    /// Write the current contour-masked subject to `path` as PNG
    pub fn save_contours(&self, path: &Path) -> Result<()> {
        let result = self.require_result()?;
        let subject = self.require_subject()?;
        export_masked_region(subject, &result.contours, path)
    }

    fn require_subject(&self) -> Result<&DynamicImage> {
        self.subject
            .as_ref()
            .ok_or_else(|| RobodocError::InvalidImage("no subject image loaded".to_string()))
    }

    fn require_result(&self) -> Result<&AnalysisResult> {
        self.result
            .as_ref()
            .ok_or_else(|| RobodocError::Export("no analysis result to export".to_string()))
    }
}

/// Run one analysis on a worker thread so an interactive caller stays responsive
pub fn spawn_analysis(
    subject: DynamicImage,
    control: DynamicImage,
    params: AnalysisParams,
) -> JoinHandle<Result<AnalysisResult>> {
    thread::spawn(move || analyze(&subject, &control, &params))
}
