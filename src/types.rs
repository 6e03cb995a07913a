use serde::Serialize;

/// Oriented bounding box of one detected fingerprint, in source-image
/// coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SegmentInfo {
    /// (width, height) in source pixels, `width <= height`.
    pub size: (i32, i32),
    /// (x, y) of the region centroid in source pixels.
    pub centroid: (i32, i32),
    /// Angle of the long axis in degrees, in (−90, 90].
    pub rotation: f32,
}

/// Outcome of one extraction.
///
/// The segmenter never raises: internal failures (label overflow, malformed
/// input, eigendecomposition failure on every candidate) collapse into
/// `ok = false` with an empty segment list. An empty list with `ok = true` is
/// a valid outcome for a blank page.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SegmentationResult {
    pub ok: bool,
    pub segments: Vec<SegmentInfo>,
    pub latency_ms: f64,
}
