//! Segmenter orchestrating the fingerprint extraction pipeline.
//!
//! Overview
//! - Resolves the working geometry (scale, dimensions, min-filter radius)
//!   once at construction and allocates the reusable workspace.
//! - Chains the filter passes: min-filter erosion, iterated 8-neighbor
//!   smoothing against a white border, and biased Otsu binarization.
//! - Labels the binarized ink with the two-scan 8-connectivity labeler and
//!   filters components by relative size.
//! - Estimates a refined oriented bounding box per surviving component and
//!   back-scales it to source coordinates.
//!
//! Failure handling follows one rule: the pipeline never raises. Label
//! overflow, malformed input, and estimation failure on every candidate all
//! collapse into `ok = false` with an empty segment list, leaving the
//! workspace ready for the next call.
//!
//! Modules
//! - `pipeline` – the [`Segmenter`] implementation.
//! - `options` – [`SegmenterParams`] with the historical defaults.
//! - `workspace` – reusable buffers that amortize allocations across calls.

pub mod options;
mod pipeline;
mod workspace;

pub use options::SegmenterParams;
pub use pipeline::{Segmenter, StageSnapshots};
