#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod diagnostics;
pub mod image;
pub mod segmenter;
pub mod types;

// “Expert” modules – still public, but considered unstable internals.
pub mod filters;
pub mod labeling;
pub mod orientation;

// --- High-level re-exports -------------------------------------------------

// Main entry points: segmenter + results.
pub use crate::segmenter::{Segmenter, SegmenterParams, StageSnapshots};
pub use crate::types::{SegmentInfo, SegmentationResult};

// Structured diagnostics returned by the segmenter.
pub use crate::diagnostics::{PipelineTrace, SegmentationReport};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```
/// use print_segmenter::prelude::*;
///
/// let mut seg = Segmenter::new(640, 480, SegmenterParams::default());
/// let gray = vec![255u8; seg.working_width() * seg.working_height()];
/// let result = seg.extract(&gray);
/// assert!(result.ok);
/// ```
pub mod prelude {
    pub use crate::image::GrayBuffer;
    pub use crate::{SegmentInfo, SegmentationResult, Segmenter, SegmenterParams};
}
