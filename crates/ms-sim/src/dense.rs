//! Cubic Hermite dense output between accepted steps.

use nalgebra::DVector;

/// Evaluate the cubic Hermite interpolant through `(t0, x0, f0)` and
/// `(t1, x1, f1)` at `t`, where `f` are the derivatives already computed at
/// the endpoints.
///
/// Reproduces `x0` at `t0` and `x1` at `t1` exactly, and any cubic exactly.
pub fn hermite(
    t0: f64,
    x0: &DVector<f64>,
    f0: &DVector<f64>,
    t1: f64,
    x1: &DVector<f64>,
    f1: &DVector<f64>,
    t: f64,
) -> DVector<f64> {
    let h = t1 - t0;
    if h <= 0.0 {
        return x0.clone();
    }
    let s = (t - t0) / h;
    let s2 = s * s;
    let s3 = s2 * s;

    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;

    let mut out = x0 * h00;
    out.axpy(h10 * h, f0, 1.0);
    out.axpy(h01, x1, 1.0);
    out.axpy(h11 * h, f1, 1.0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64) -> DVector<f64> {
        DVector::from_row_slice(&[x])
    }

    #[test]
    fn endpoints_are_exact() {
        let (x0, f0, x1, f1) = (v(1.25), v(-3.0), v(0.75), v(2.0));
        assert_eq!(hermite(2.0, &x0, &f0, 2.5, &x1, &f1, 2.0)[0], 1.25);
        assert_eq!(hermite(2.0, &x0, &f0, 2.5, &x1, &f1, 2.5)[0], 0.75);
    }

    #[test]
    fn cubic_is_reproduced() {
        // x = t^3 - t on [1, 3]
        let x = |t: f64| t * t * t - t;
        let dx = |t: f64| 3.0 * t * t - 1.0;
        for t in [1.2, 1.9, 2.0, 2.71] {
            let y = hermite(1.0, &v(x(1.0)), &v(dx(1.0)), 3.0, &v(x(3.0)), &v(dx(3.0)), t);
            assert!((y[0] - x(t)).abs() < 1e-12, "t = {t}");
        }
    }

    #[test]
    fn degenerate_interval_returns_left_state() {
        let y = hermite(1.0, &v(4.0), &v(1.0), 1.0, &v(5.0), &v(1.0), 1.0);
        assert_eq!(y[0], 4.0);
    }
}
