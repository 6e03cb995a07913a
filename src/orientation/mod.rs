//! Oriented bounding box estimation for labeled components.
//!
//! The estimator summarizes each component by the covariance of its row-wise
//! border points (leftmost and rightmost ink pixel per row), extracts the
//! principal axis with the Jacobi solver, then walks candidate rotations in
//! fixed angular steps, adopting any candidate whose axis-aligned box in the
//! rotated frame has a smaller area and restarting the sweep from that
//! orientation. The final box is canonicalized so the reported angle points
//! along the long axis and `width <= height`.
//!
//! A component whose eigendecomposition fails to converge is dropped; the
//! remaining components are unaffected.

pub mod jacobi;

use crate::labeling::ComponentStats;
use jacobi::jacobi_eigen;
use nalgebra::Matrix3;
use std::f64::consts::{FRAC_PI_2, PI};

/// Upper bound on descent restarts. Every adoption strictly shrinks the box
/// area, so the bound only guards against floating-point ties cycling.
const MAX_DESCENT_ROUNDS: usize = 64;

/// Oriented bounding box in working-image coordinates.
#[derive(Clone, Copy, Debug)]
pub struct OrientedBox {
    /// Component centroid (x, y).
    pub center: (f64, f64),
    /// Short extent of the refined box.
    pub width: f64,
    /// Long extent of the refined box.
    pub height: f64,
    /// Angle of the long axis in radians, in (−π/2, π/2].
    pub theta: f64,
}

/// Estimate the oriented box of one component of the dense label map.
///
/// Returns `None` when the eigendecomposition does not converge.
pub fn estimate_component(
    labels: &[u16],
    width: usize,
    label: u16,
    stats: &ComponentStats,
    angle_step_deg: f64,
    angle_sweep_deg: f64,
) -> Option<OrientedBox> {
    let (cx, cy) = stats.centroid();
    let cov = border_covariance(labels, width, label, stats, cx, cy);
    let (_, vecs) = jacobi_eigen(cov)?;

    // Principal axis, preferring the more horizontal descriptor of the two
    // equivalent representations and a right-pointing direction.
    let mut vx = vecs[(0, 0)];
    let mut vy = vecs[(1, 0)];
    if vx.abs() < vy.abs() {
        std::mem::swap(&mut vx, &mut vy);
    }
    if vx < 0.0 {
        vx = -vx;
        vy = -vy;
    }
    let mut theta = vy.atan2(vx);

    let step = angle_step_deg.to_radians();
    let sweep = angle_sweep_deg.to_radians();
    let (mut along, mut across) = rotated_spans(labels, width, label, stats, cx, cy, theta);

    if step > 0.0 {
        'descent: for _ in 0..MAX_DESCENT_ROUNDS {
            let mut beta = step;
            while beta < sweep {
                let candidate = theta + beta;
                let (ca, cc) = rotated_spans(labels, width, label, stats, cx, cy, candidate);
                if ca * cc < along * across {
                    theta = candidate;
                    along = ca;
                    across = cc;
                    continue 'descent;
                }
                beta += step;
            }
            break;
        }
    }

    // Canonicalize: theta names the direction of `along`; point it down the
    // long axis and order the extents.
    let (w, h, mut theta) = if along >= across {
        (across, along, theta)
    } else {
        (along, across, theta + FRAC_PI_2)
    };
    theta = normalize_half_open(theta);

    Some(OrientedBox {
        center: (cx, cy),
        width: w,
        height: h,
        theta,
    })
}

/// Covariance of the row-wise border points, embedded in a 3×3 matrix with a
/// zero third row and column for the general eigensolver.
fn border_covariance(
    labels: &[u16],
    width: usize,
    label: u16,
    stats: &ComponentStats,
    cx: f64,
    cy: f64,
) -> Matrix3<f64> {
    let mut m00 = 0.0f64;
    let mut m11 = 0.0f64;
    let mut m01 = 0.0f64;
    let mut samples = 0u32;

    for y in stats.min_y..=stats.max_y {
        let row = &labels[y * width..(y + 1) * width];
        let mut leftmost = None;
        let mut rightmost = None;
        for x in stats.min_x..=stats.max_x {
            if row[x] == label {
                if leftmost.is_none() {
                    leftmost = Some(x);
                }
                rightmost = Some(x);
            }
        }
        let Some(left) = leftmost else { continue };
        let right = rightmost.unwrap_or(left);
        let mut push = |x: usize| {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            m00 += dx * dx;
            m11 += dy * dy;
            m01 += dx * dy;
            samples += 1;
        };
        push(left);
        if right != left {
            push(right);
        }
    }

    let n = samples.max(1) as f64;
    Matrix3::new(
        m00 / n,
        m01 / n,
        0.0,
        m01 / n,
        m11 / n,
        0.0,
        0.0,
        0.0,
        0.0,
    )
}

/// Extent of the component along the direction `theta` and perpendicular to
/// it, from a scan of every pixel inside the component's bounding box.
fn rotated_spans(
    labels: &[u16],
    width: usize,
    label: u16,
    stats: &ComponentStats,
    cx: f64,
    cy: f64,
    theta: f64,
) -> (f64, f64) {
    let (sin, cos) = theta.sin_cos();
    let mut along_min = f64::INFINITY;
    let mut along_max = f64::NEG_INFINITY;
    let mut across_min = f64::INFINITY;
    let mut across_max = f64::NEG_INFINITY;

    for y in stats.min_y..=stats.max_y {
        let row = &labels[y * width..(y + 1) * width];
        let dy = y as f64 - cy;
        for x in stats.min_x..=stats.max_x {
            if row[x] != label {
                continue;
            }
            let dx = x as f64 - cx;
            let along = dx * cos + dy * sin;
            let across = -dx * sin + dy * cos;
            along_min = along_min.min(along);
            along_max = along_max.max(along);
            across_min = across_min.min(across);
            across_max = across_max.max(across);
        }
    }

    if along_min > along_max {
        (0.0, 0.0)
    } else {
        (along_max - along_min, across_max - across_min)
    }
}

/// Fold an angle into (−π/2, π/2].
fn normalize_half_open(mut theta: f64) -> f64 {
    while theta > FRAC_PI_2 {
        theta -= PI;
    }
    while theta <= -FRAC_PI_2 {
        theta += PI;
    }
    theta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labeling::collect_components;

    fn labeled_rect(
        width: usize,
        height: usize,
        cx: f64,
        cy: f64,
        short: f64,
        long: f64,
        axis_deg: f64,
    ) -> Vec<u16> {
        // Fill pixels whose rotated-frame offsets fall inside the half
        // extents; the long axis points along `axis_deg`.
        let mut labels = vec![0u16; width * height];
        let (sin, cos) = axis_deg.to_radians().sin_cos();
        for y in 0..height {
            for x in 0..width {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                let along = dx * cos + dy * sin;
                let across = -dx * sin + dy * cos;
                if along.abs() <= long / 2.0 && across.abs() <= short / 2.0 {
                    labels[y * width + x] = 1;
                }
            }
        }
        labels
    }

    fn estimate(labels: &[u16], width: usize, height: usize) -> OrientedBox {
        let stats = collect_components(labels, width, height, 1);
        estimate_component(labels, width, 1, &stats[0], 5.0, 45.0).expect("estimation succeeds")
    }

    #[test]
    fn vertical_rectangle_reports_90_degrees() {
        let labels = labeled_rect(100, 100, 50.0, 50.0, 20.0, 60.0, 90.0);
        let b = estimate(&labels, 100, 100);
        assert!((b.theta.to_degrees() - 90.0).abs() < 3.0, "theta={}", b.theta);
        assert!(b.width <= b.height);
        assert!((b.width - 20.0).abs() < 2.5, "width={}", b.width);
        assert!((b.height - 60.0).abs() < 2.5, "height={}", b.height);
    }

    #[test]
    fn horizontal_rectangle_reports_0_degrees() {
        let labels = labeled_rect(100, 100, 50.0, 50.0, 20.0, 60.0, 0.0);
        let b = estimate(&labels, 100, 100);
        assert!(b.theta.to_degrees().abs() < 3.0, "theta={}", b.theta);
        assert!(b.width <= b.height);
    }

    #[test]
    fn tilted_rectangle_recovers_its_axis() {
        for axis_deg in [-60.0f64, -30.0, 30.0, 60.0] {
            let labels = labeled_rect(120, 120, 60.0, 60.0, 18.0, 70.0, axis_deg);
            let b = estimate(&labels, 120, 120);
            let reported = b.theta.to_degrees();
            let mut diff = (reported - axis_deg).abs();
            if diff > 90.0 {
                diff = 180.0 - diff;
            }
            assert!(diff < 6.0, "axis {axis_deg}: reported {reported}");
        }
    }

    #[test]
    fn single_pixel_component_is_degenerate_but_valid() {
        let mut labels = vec![0u16; 25];
        labels[12] = 1;
        let b = estimate(&labels, 5, 5);
        assert_eq!(b.width, 0.0);
        assert_eq!(b.height, 0.0);
        assert!(b.theta.abs() < 1e-9);
    }

    #[test]
    fn normalize_folds_into_half_open_interval() {
        assert!((normalize_half_open(PI) - 0.0).abs() < 1e-12);
        assert!((normalize_half_open(-FRAC_PI_2) - FRAC_PI_2).abs() < 1e-12);
        assert!((normalize_half_open(FRAC_PI_2) - FRAC_PI_2).abs() < 1e-12);
        assert!((normalize_half_open(2.0) - (2.0 - PI)).abs() < 1e-12);
    }
}
