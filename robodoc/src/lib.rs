//! Injury highlighting by image differencing.
//!
//! A subject photo is compared against a healthy control region cut from the
//! same photo. The smoothed luminance difference is thresholded, its external
//! contours are traced and the result is rendered as a three-panel composite:
//! the subject, the subject with contour outlines, and the outlines with
//! vertical scan lines cross-hatching the injured area.
//!
//! ```no_run
//! use robodoc::{compute_difference, export_masked_region, load_image, crop_control};
//! use robodoc_common::CropRect;
//! use std::path::Path;
//!
//! # fn main() -> robodoc::Result<()> {
//! let subject = load_image(Path::new("injury.jpg"))?;
//! let control = crop_control(&subject, CropRect::new(10, 10, 80, 60))?;
//! let result = compute_difference(&subject, &control, 50, 10)?;
//! println!("{} region(s)", result.contour_count());
//! export_masked_region(&subject, &result.contours, Path::new("injury_mask.png"))?;
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod error;
pub mod export;
pub mod render;
pub mod scan_lines;
pub mod segmentation;
pub mod selection;
pub mod session;
pub mod tracing;

pub use crate::analysis::{analyze, compute_difference, AnalysisResult};
pub use crate::error::{Result, RobodocError};
pub use crate::export::{export_composite, export_masked_region, load_image};
pub use crate::selection::{crop_control, display_to_original, fit_to_display};
pub use crate::session::{spawn_analysis, InjurySession};
