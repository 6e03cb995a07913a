//! Parameter types for the segmentation pipeline.
//!
//! Defaults reproduce the historical behavior of the pipeline; the empirical
//! constants (threshold bias, box inflation, angular search geometry) are
//! exposed so they can be tuned without touching the passes.

use serde::Deserialize;

/// Segmenter-wide parameters.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct SegmenterParams {
    /// Target for the shorter working dimension. The source-to-working scale
    /// is `max(1, min(source_w, source_h) / working_size_hint)`.
    pub working_size_hint: usize,
    /// Number of 8-neighbor smoothing iterations.
    pub denoise_steps: u32,
    /// Keep a component only when its area is at least this fraction of the
    /// largest candidate's area. Clamped below at 0.
    pub area_threshold: f64,
    /// Keep a component only when both bounding-box extents are at least this
    /// fraction of the largest candidate's extents. Clamped below at 0.
    pub size_threshold: f64,
    /// Multiplier applied to the selected Otsu level; values above 1 claim
    /// more pixels as foreground.
    pub otsu_bias: f64,
    /// Padding applied to the refined box so ridges truncated by the erosion
    /// and smoothing passes stay inside the crop.
    pub box_inflation: f64,
    /// Step of the angular box-area descent, degrees.
    pub angle_step_deg: f64,
    /// Half-width of the descent window, degrees.
    pub angle_sweep_deg: f64,
}

impl Default for SegmenterParams {
    fn default() -> Self {
        Self {
            working_size_hint: 200,
            denoise_steps: 3,
            area_threshold: 0.4,
            size_threshold: 0.4,
            otsu_bias: 1.2,
            box_inflation: 1.12,
            angle_step_deg: 5.0,
            angle_sweep_deg: 45.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_historical_constants() {
        let p = SegmenterParams::default();
        assert_eq!(p.working_size_hint, 200);
        assert_eq!(p.denoise_steps, 3);
        assert_eq!(p.area_threshold, 0.4);
        assert_eq!(p.size_threshold, 0.4);
        assert_eq!(p.otsu_bias, 1.2);
        assert_eq!(p.box_inflation, 1.12);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let p: SegmenterParams = serde_json::from_str(r#"{"denoise_steps": 0}"#).unwrap();
        assert_eq!(p.denoise_steps, 0);
        assert_eq!(p.working_size_hint, 200);
    }
}
