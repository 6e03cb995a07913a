//! Structured per-stage diagnostics for one extraction.
//!
//! Everything here is serializable so a caller (or the demo binary) can dump
//! a full pipeline trace as JSON next to the segmentation result.
use crate::types::SegmentationResult;
use serde::Serialize;

/// Geometry resolved at segmenter construction.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct InputDescriptor {
    pub source_width: usize,
    pub source_height: usize,
    pub working_width: usize,
    pub working_height: usize,
    pub scale: usize,
    pub min_filter_radius: usize,
}

/// Wall-clock duration of a single named stage.
#[derive(Clone, Debug, Serialize)]
pub struct StageTiming {
    pub name: &'static str,
    pub elapsed_ms: f64,
}

/// Per-stage timings plus the end-to-end total.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn push(&mut self, name: &'static str, elapsed_ms: f64) {
        self.stages.push(StageTiming { name, elapsed_ms });
    }
}

/// Threshold selection summary.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct BinarizeStage {
    pub otsu_level: usize,
    pub threshold: f64,
    pub foreground_pixels: usize,
}

/// Labeling summary. `overflow` marks an aborted scan.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct LabelingStage {
    pub provisional_labels: usize,
    pub merged_components: usize,
    pub overflow: bool,
}

/// Component filtering summary.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct CollectStage {
    pub candidates: usize,
    pub kept: usize,
    pub max_area: u64,
    pub max_width: usize,
    pub max_height: usize,
}

/// Orientation estimation summary. `dropped` counts eigensolver failures.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct OrientationStage {
    pub estimated: usize,
    pub dropped: usize,
}

/// Full trace of one extraction.
#[derive(Clone, Debug, Serialize)]
pub struct PipelineTrace {
    pub input: InputDescriptor,
    pub timings: TimingBreakdown,
    pub binarize: Option<BinarizeStage>,
    pub labeling: Option<LabelingStage>,
    pub collect: Option<CollectStage>,
    pub orientation: Option<OrientationStage>,
}

/// Extraction result paired with its pipeline trace.
#[derive(Clone, Debug, Serialize)]
pub struct SegmentationReport {
    pub result: SegmentationResult,
    pub trace: PipelineTrace,
}
