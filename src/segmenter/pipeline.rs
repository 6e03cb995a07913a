//! Segmenter driving the extraction pipeline end-to-end.
//!
//! The [`Segmenter`] exposes a simple API: construct it once for a source
//! geometry, feed working-resolution grayscale buffers, and get oriented
//! bounding boxes back. Internally it chains the filter passes over the
//! reusable workspace, labels the binarized ink, filters components by
//! relative size, and estimates a refined oriented box per survivor.
//!
//! Typical usage:
//! ```
//! use print_segmenter::{Segmenter, SegmenterParams};
//!
//! let mut seg = Segmenter::new(400, 400, SegmenterParams::default());
//! let gray = vec![255u8; seg.working_width() * seg.working_height()];
//! let result = seg.extract(&gray);
//! assert!(result.ok);
//! assert!(result.segments.is_empty());
//! ```
use super::options::SegmenterParams;
use super::workspace::Workspace;
use crate::diagnostics::{
    BinarizeStage, CollectStage, InputDescriptor, LabelingStage, OrientationStage, PipelineTrace,
    SegmentationReport, TimingBreakdown,
};
use crate::filters::{binarize, denoise_step, histogram, min_filter, otsu_level};
use crate::labeling::{collect_components, filter_components, label_components, ComponentStats};
use crate::orientation::estimate_component;
use crate::types::{SegmentInfo, SegmentationResult};
use log::{debug, warn};
use std::time::Instant;

/// Fingerprint region segmenter bound to one source geometry.
///
/// One extraction is strictly single-threaded and must not be entered
/// re-entrantly on the same instance; callers wanting parallelism create one
/// segmenter per thread.
pub struct Segmenter {
    params: SegmenterParams,
    source_width: usize,
    source_height: usize,
    scale: usize,
    width: usize,
    height: usize,
    radius: usize,
    workspace: Workspace,
}

struct BinarizeComputation {
    stage: BinarizeStage,
    elapsed_ms: f64,
}

struct LabelComputation {
    stage: LabelingStage,
    elapsed_ms: f64,
}

struct CollectComputation {
    stage: CollectStage,
    stats: Vec<ComponentStats>,
    kept: Vec<usize>,
    elapsed_ms: f64,
}

/// Copies of the working buffer after each filter pass plus the final label
/// map, captured on request so callers can dump intermediate images. A stage
/// that never ran (for example anything past a label-overflow abort) leaves
/// its snapshot empty.
#[derive(Clone, Debug, Default)]
pub struct StageSnapshots {
    pub min_filtered: Vec<u8>,
    pub denoised: Vec<u8>,
    pub binarized: Vec<u8>,
    pub labels: Vec<u16>,
}

impl Segmenter {
    /// Create a segmenter for images of `source_width × source_height`.
    ///
    /// Resolves the working geometry: scale `s = max(1, min(W, H) / hint)`,
    /// working dimensions `(W / s, H / s)`, and the min-filter radius
    /// `max(1, ceil(0.005 · hint))`. All extraction buffers are allocated
    /// here and reused across calls.
    pub fn new(source_width: usize, source_height: usize, params: SegmenterParams) -> Self {
        let hint = params.working_size_hint.max(1);
        let scale = (source_width.min(source_height) / hint).max(1);
        let width = source_width / scale;
        let height = source_height / scale;
        let radius = ((0.005 * hint as f64).ceil() as usize).max(1);
        Self {
            params,
            source_width,
            source_height,
            scale,
            width,
            height,
            radius,
            workspace: Workspace::new(width, height),
        }
    }

    /// Create a segmenter with default parameters.
    pub fn with_defaults(source_width: usize, source_height: usize) -> Self {
        Self::new(source_width, source_height, SegmenterParams::default())
    }

    /// Working-resolution width expected by [`Segmenter::extract`].
    pub fn working_width(&self) -> usize {
        self.width
    }

    /// Working-resolution height expected by [`Segmenter::extract`].
    pub fn working_height(&self) -> usize {
        self.height
    }

    /// Source-to-working scale factor.
    pub fn scale(&self) -> usize {
        self.scale
    }

    /// Min-filter radius in working pixels.
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Update the number of smoothing iterations for subsequent extractions.
    pub fn set_denoise_steps(&mut self, steps: u32) {
        self.params.denoise_steps = steps;
    }

    /// Update the relative-area filter; values below 0 clamp to 0.
    pub fn set_area_threshold(&mut self, threshold: f64) {
        self.params.area_threshold = threshold.max(0.0);
    }

    /// Update the relative-extent filter; values below 0 clamp to 0.
    pub fn set_size_threshold(&mut self, threshold: f64) {
        self.params.size_threshold = threshold.max(0.0);
    }

    /// Run the pipeline on a working-resolution grayscale buffer.
    pub fn extract(&mut self, gray: &[u8]) -> SegmentationResult {
        self.extract_with_diagnostics(gray).result
    }

    /// Run the pipeline and capture a per-stage trace alongside the result.
    pub fn extract_with_diagnostics(&mut self, gray: &[u8]) -> SegmentationReport {
        self.extract_impl(gray, None)
    }

    /// Run the pipeline and additionally copy out the intermediate buffers
    /// of every stage, for debug image dumps.
    pub fn extract_with_snapshots(&mut self, gray: &[u8]) -> (SegmentationReport, StageSnapshots) {
        let mut snapshots = StageSnapshots::default();
        let report = self.extract_impl(gray, Some(&mut snapshots));
        (report, snapshots)
    }

    fn extract_impl(
        &mut self,
        gray: &[u8],
        mut snapshots: Option<&mut StageSnapshots>,
    ) -> SegmentationReport {
        let total_start = Instant::now();
        debug!(
            "Segmenter::extract start working={}x{} scale={} radius={} denoise_steps={}",
            self.width, self.height, self.scale, self.radius, self.params.denoise_steps
        );

        let mut timings = TimingBreakdown::default();

        if gray.len() != self.workspace.len() {
            debug!(
                "Segmenter::extract malformed input: {} bytes, expected {}",
                gray.len(),
                self.workspace.len()
            );
            return self.report(false, Vec::new(), timings, None, None, None, None, total_start);
        }

        self.run_filters(gray, &mut timings, snapshots.as_deref_mut());

        let BinarizeComputation {
            stage: binarize_stage,
            elapsed_ms,
        } = self.run_binarize();
        timings.push("binarize", elapsed_ms);
        if let Some(s) = snapshots.as_deref_mut() {
            s.binarized = self.workspace.work().to_vec();
        }

        let LabelComputation {
            stage: label_stage,
            elapsed_ms,
        } = match self.run_labeling() {
            Ok(computation) => computation,
            Err(computation) => {
                warn!("Segmenter::extract label overflow -> aborting");
                timings.push("labeling", computation.elapsed_ms);
                return self.report(
                    false,
                    Vec::new(),
                    timings,
                    Some(binarize_stage),
                    Some(computation.stage),
                    None,
                    None,
                    total_start,
                );
            }
        };
        timings.push("labeling", elapsed_ms);
        if let Some(s) = snapshots.as_deref_mut() {
            s.labels = self.workspace.labels().to_vec();
        }

        let CollectComputation {
            stage: collect_stage,
            stats,
            kept,
            elapsed_ms,
        } = self.run_collect(label_stage.merged_components);
        timings.push("collect", elapsed_ms);

        let orientation_start = Instant::now();
        let mut segments = Vec::with_capacity(kept.len());
        let mut dropped = 0usize;
        for &index in &kept {
            let label = (index + 1) as u16;
            match estimate_component(
                self.workspace.labels(),
                self.width,
                label,
                &stats[index],
                self.params.angle_step_deg,
                self.params.angle_sweep_deg,
            ) {
                Some(oriented) => segments.push(self.to_source_coords(
                    oriented.center,
                    oriented.width,
                    oriented.height,
                    oriented.theta,
                )),
                None => {
                    warn!("Segmenter::extract component {label} dropped: eigensolver stalled");
                    dropped += 1;
                }
            }
        }
        timings.push(
            "orientation",
            orientation_start.elapsed().as_secs_f64() * 1000.0,
        );
        let orientation_stage = OrientationStage {
            estimated: segments.len(),
            dropped,
        };

        // A candidate set that entirely failed estimation is an internal
        // failure; an empty candidate set (blank page) is not.
        let ok = kept.is_empty() || !segments.is_empty();
        self.report(
            ok,
            segments,
            timings,
            Some(binarize_stage),
            Some(label_stage),
            Some(collect_stage),
            Some(orientation_stage),
            total_start,
        )
    }

    fn run_filters(
        &mut self,
        gray: &[u8],
        timings: &mut TimingBreakdown,
        mut snapshots: Option<&mut StageSnapshots>,
    ) {
        self.workspace.load(gray);

        let filter_start = Instant::now();
        let (width, height, radius) = (self.width, self.height, self.radius);
        if width > 0 && height > 0 {
            let (scratch, work) = self.workspace.split();
            min_filter(scratch, work, width, height, radius);
            self.workspace.sync();
        }
        timings.push("min_filter", filter_start.elapsed().as_secs_f64() * 1000.0);
        if let Some(s) = snapshots.as_deref_mut() {
            s.min_filtered = self.workspace.work().to_vec();
        }

        let denoise_start = Instant::now();
        if width > 0 && height > 0 {
            for _ in 0..self.params.denoise_steps {
                let (scratch, work) = self.workspace.split();
                denoise_step(scratch, work, width, height);
                self.workspace.sync();
            }
        }
        timings.push("denoise", denoise_start.elapsed().as_secs_f64() * 1000.0);
        if let Some(s) = snapshots {
            s.denoised = self.workspace.work().to_vec();
        }
    }

    fn run_binarize(&mut self) -> BinarizeComputation {
        let start = Instant::now();
        let hist = histogram(self.workspace.work());
        let level = otsu_level(&hist);
        let threshold = self.params.otsu_bias * level as f64;
        binarize(self.workspace.work_mut(), threshold);
        let foreground_pixels = self.workspace.work().iter().filter(|&&v| v == 0).count();
        debug!(
            "Segmenter::binarize otsu_level={level} threshold={threshold:.1} foreground={foreground_pixels}"
        );
        BinarizeComputation {
            stage: BinarizeStage {
                otsu_level: level,
                threshold,
                foreground_pixels,
            },
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        }
    }

    fn run_labeling(&mut self) -> Result<LabelComputation, LabelComputation> {
        let start = Instant::now();
        let (width, height) = (self.width, self.height);
        let (binary, labels) = self.workspace.split_labels();
        match label_components(binary, labels, width, height) {
            Some(outcome) => {
                debug!(
                    "Segmenter::labeling provisional={} components={}",
                    outcome.provisional, outcome.components
                );
                Ok(LabelComputation {
                    stage: LabelingStage {
                        provisional_labels: outcome.provisional,
                        merged_components: outcome.components,
                        overflow: false,
                    },
                    elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
                })
            }
            None => Err(LabelComputation {
                stage: LabelingStage {
                    provisional_labels: crate::labeling::MAX_LABELS,
                    merged_components: 0,
                    overflow: true,
                },
                elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
            }),
        }
    }

    fn run_collect(&mut self, components: usize) -> CollectComputation {
        let start = Instant::now();
        let stats = collect_components(self.workspace.labels(), self.width, self.height, components);
        let kept = filter_components(
            &stats,
            self.params.area_threshold.max(0.0),
            self.params.size_threshold.max(0.0),
        );
        let stage = CollectStage {
            candidates: stats.len(),
            kept: kept.len(),
            max_area: stats.iter().map(|s| s.area).max().unwrap_or(0),
            max_width: stats.iter().map(|s| s.width()).max().unwrap_or(0),
            max_height: stats.iter().map(|s| s.height()).max().unwrap_or(0),
        };
        debug!(
            "Segmenter::collect candidates={} kept={}",
            stage.candidates, stage.kept
        );
        CollectComputation {
            stage,
            stats,
            kept,
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        }
    }

    /// Back-scale a working-frame oriented box into source coordinates,
    /// inflating the extents so eroded ridge borders stay inside the crop.
    fn to_source_coords(
        &self,
        center: (f64, f64),
        width: f64,
        height: f64,
        theta: f64,
    ) -> SegmentInfo {
        let s = self.scale as f64;
        let pad = self.params.box_inflation;
        SegmentInfo {
            size: (
                (pad * s * width).floor() as i32,
                (pad * s * height).floor() as i32,
            ),
            centroid: ((s * center.0).floor() as i32, (s * center.1).floor() as i32),
            rotation: theta.to_degrees() as f32,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn report(
        &self,
        ok: bool,
        segments: Vec<SegmentInfo>,
        mut timings: TimingBreakdown,
        binarize: Option<BinarizeStage>,
        labeling: Option<LabelingStage>,
        collect: Option<CollectStage>,
        orientation: Option<OrientationStage>,
        total_start: Instant,
    ) -> SegmentationReport {
        let latency_ms = total_start.elapsed().as_secs_f64() * 1000.0;
        timings.total_ms = latency_ms;
        debug!(
            "Segmenter::extract done ok={} segments={} latency_ms={:.3}",
            ok,
            segments.len(),
            latency_ms
        );
        SegmentationReport {
            result: SegmentationResult {
                ok,
                segments,
                latency_ms,
            },
            trace: PipelineTrace {
                input: InputDescriptor {
                    source_width: self.source_width,
                    source_height: self.source_height,
                    working_width: self.width,
                    working_height: self.height,
                    scale: self.scale,
                    min_filter_radius: self.radius,
                },
                timings,
                binarize,
                labeling,
                collect,
                orientation,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn working_geometry_follows_the_hint() {
        let seg = Segmenter::with_defaults(1600, 1200);
        assert_eq!(seg.scale(), 6);
        assert_eq!(seg.working_width(), 266);
        assert_eq!(seg.working_height(), 200);
        assert_eq!(seg.radius(), 1);
    }

    #[test]
    fn small_sources_keep_unit_scale() {
        let seg = Segmenter::with_defaults(120, 90);
        assert_eq!(seg.scale(), 1);
        assert_eq!(seg.working_width(), 120);
        assert_eq!(seg.working_height(), 90);
    }

    #[test]
    fn larger_hint_raises_the_filter_radius() {
        let seg = Segmenter::new(
            4000,
            4000,
            SegmenterParams {
                working_size_hint: 500,
                ..Default::default()
            },
        );
        assert_eq!(seg.scale(), 8);
        assert_eq!(seg.radius(), 3);
    }

    #[test]
    fn malformed_input_fails_without_panicking() {
        let mut seg = Segmenter::with_defaults(400, 400);
        let result = seg.extract(&[0u8; 16]);
        assert!(!result.ok);
        assert!(result.segments.is_empty());
    }

    #[test]
    fn threshold_setters_clamp_below_zero() {
        let mut seg = Segmenter::with_defaults(400, 400);
        seg.set_area_threshold(-1.0);
        seg.set_size_threshold(-0.5);
        assert_eq!(seg.params.area_threshold, 0.0);
        assert_eq!(seg.params.size_threshold, 0.0);
    }
}
