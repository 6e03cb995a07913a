//! Cyclic Jacobi eigendecomposition for symmetric 3×3 matrices.
//!
//! The covariance handed in by the orientation estimator embeds a 2×2 block
//! in a 3×3 matrix with a zero third row and column, so the solver is written
//! for the general symmetric 3×3 case. The floating-point equality tests
//! below are deliberate convergence shortcuts and require f64 to behave.

use nalgebra::{Matrix3, Vector3};

const MAX_SWEEPS: usize = 50;

/// Eigenvalues (descending) and the matching eigenvector columns of a
/// symmetric 3×3 matrix. Returns `None` when the off-diagonal mass has not
/// vanished after 50 sweeps.
pub fn jacobi_eigen(mut m: Matrix3<f64>) -> Option<(Vector3<f64>, Matrix3<f64>)> {
    let mut vecs = Matrix3::<f64>::identity();
    let mut vals = Vector3::new(m[(0, 0)], m[(1, 1)], m[(2, 2)]);

    let mut converged = false;
    for sweep in 0..MAX_SWEEPS {
        let sm = m[(0, 1)].abs() + m[(0, 2)].abs() + m[(1, 2)].abs();
        if sm == 0.0 {
            converged = true;
            break;
        }
        let tresh = if sweep < 3 { 0.2 * sm / 9.0 } else { 0.0 };

        for ip in 0..2 {
            for iq in (ip + 1)..3 {
                let g = 100.0 * m[(ip, iq)].abs();
                if sweep > 3
                    && (vals[ip].abs() + g) == vals[ip].abs()
                    && (vals[iq].abs() + g) == vals[iq].abs()
                {
                    m[(ip, iq)] = 0.0;
                    m[(iq, ip)] = 0.0;
                } else if m[(ip, iq)].abs() > tresh {
                    let h = vals[iq] - vals[ip];
                    let t = if h.abs() + g == h.abs() {
                        m[(ip, iq)] / h
                    } else {
                        let theta = 0.5 * h / m[(ip, iq)];
                        let t = 1.0 / (theta.abs() + (1.0 + theta * theta).sqrt());
                        if theta < 0.0 {
                            -t
                        } else {
                            t
                        }
                    };
                    let c = 1.0 / (1.0 + t * t).sqrt();
                    let s = t * c;
                    let tau = s / (1.0 + c);
                    let shift = t * m[(ip, iq)];

                    vals[ip] -= shift;
                    vals[iq] += shift;
                    m[(ip, iq)] = 0.0;
                    m[(iq, ip)] = 0.0;

                    // The single remaining off-diagonal partner of this pair.
                    let j = 3 - ip - iq;
                    let gj = m[(j, ip)];
                    let hj = m[(j, iq)];
                    let new_ip = gj - s * (hj + gj * tau);
                    let new_iq = hj + s * (gj - hj * tau);
                    m[(j, ip)] = new_ip;
                    m[(ip, j)] = new_ip;
                    m[(j, iq)] = new_iq;
                    m[(iq, j)] = new_iq;

                    for row in 0..3 {
                        let gv = vecs[(row, ip)];
                        let hv = vecs[(row, iq)];
                        vecs[(row, ip)] = gv - s * (hv + gv * tau);
                        vecs[(row, iq)] = hv + s * (gv - hv * tau);
                    }
                }
            }
        }
    }
    if !converged {
        let sm = m[(0, 1)].abs() + m[(0, 2)].abs() + m[(1, 2)].abs();
        if sm != 0.0 {
            return None;
        }
    }

    sort_descending(&mut vals, &mut vecs);
    canonicalize_signs(&mut vecs);
    Some((vals, vecs))
}

fn sort_descending(vals: &mut Vector3<f64>, vecs: &mut Matrix3<f64>) {
    for i in 0..2 {
        let mut k = i;
        for j in (i + 1)..3 {
            if vals[j] > vals[k] {
                k = j;
            }
        }
        if k != i {
            vals.swap_rows(i, k);
            vecs.swap_columns(i, k);
        }
    }
}

/// Flip any eigenvector column with fewer than two non-negative components.
fn canonicalize_signs(vecs: &mut Matrix3<f64>) {
    for col in 0..3 {
        let non_negative = (0..3).filter(|&row| vecs[(row, col)] >= 0.0).count();
        if non_negative < 2 {
            for row in 0..3 {
                vecs[(row, col)] = -vecs[(row, col)];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() < tol, "{a} vs {b}");
    }

    #[test]
    fn diagonal_matrix_is_already_solved() {
        let m = Matrix3::new(3.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0);
        let (vals, vecs) = jacobi_eigen(m).expect("converges");
        assert_close(vals[0], 3.0, 1e-12);
        assert_close(vals[1], 2.0, 1e-12);
        assert_close(vals[2], 1.0, 1e-12);
        assert_close(vecs[(0, 0)].abs(), 1.0, 1e-12);
        assert_close(vecs[(2, 1)].abs(), 1.0, 1e-12);
    }

    #[test]
    fn embedded_2x2_covariance() {
        // Covariance of points spread along the diagonal y = x.
        let m = Matrix3::new(2.0, 1.5, 0.0, 1.5, 2.0, 0.0, 0.0, 0.0, 0.0);
        let (vals, vecs) = jacobi_eigen(m).expect("converges");
        assert_close(vals[0], 3.5, 1e-12);
        assert_close(vals[1], 0.5, 1e-12);
        assert_close(vals[2], 0.0, 1e-12);
        let inv_sqrt2 = std::f64::consts::FRAC_1_SQRT_2;
        assert_close(vecs[(0, 0)].abs(), inv_sqrt2, 1e-9);
        assert_close(vecs[(1, 0)].abs(), inv_sqrt2, 1e-9);
        assert_close(vecs[(2, 0)].abs(), 0.0, 1e-9);
    }

    #[test]
    fn eigenvectors_reconstruct_the_matrix() {
        let m = Matrix3::new(4.0, 1.0, 0.5, 1.0, 3.0, 0.25, 0.5, 0.25, 2.0);
        let (vals, vecs) = jacobi_eigen(m).expect("converges");
        let d = Matrix3::from_diagonal(&vals);
        let rebuilt = vecs * d * vecs.transpose();
        for i in 0..3 {
            for j in 0..3 {
                assert_close(rebuilt[(i, j)], m[(i, j)], 1e-9);
            }
        }
    }

    #[test]
    fn sign_rule_prefers_non_negative_columns() {
        let m = Matrix3::new(2.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.5);
        let (_, vecs) = jacobi_eigen(m).expect("converges");
        for col in 0..3 {
            let non_negative = (0..3).filter(|&row| vecs[(row, col)] >= 0.0).count();
            assert!(non_negative >= 2);
        }
    }

    #[test]
    fn zero_matrix_converges_immediately() {
        let (vals, vecs) = jacobi_eigen(Matrix3::zeros()).expect("converges");
        assert_eq!(vals, Vector3::zeros());
        assert_eq!(vecs, Matrix3::identity());
    }
}
