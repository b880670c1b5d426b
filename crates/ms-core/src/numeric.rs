use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Finite and strictly positive.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, CoreError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(CoreError::OutOfRange {
            what,
            value: v,
            expected: "> 0",
        })
    }
}

/// Finite and >= 0.
pub fn ensure_non_negative(v: Real, what: &'static str) -> Result<Real, CoreError> {
    let v = ensure_finite(v, what)?;
    if v >= 0.0 {
        Ok(v)
    } else {
        Err(CoreError::OutOfRange {
            what,
            value: v,
            expected: ">= 0",
        })
    }
}

/// `n` evenly spaced points over `[start, end]`, endpoints included.
pub fn linspace(start: Real, end: Real, n: usize) -> Vec<Real> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as Real;
            let mut out: Vec<Real> = (0..n).map(|i| start + step * i as Real).collect();
            // land exactly on the endpoint
            out[n - 1] = end;
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_positive_rejects_zero() {
        assert!(ensure_positive(0.0, "inertia").is_err());
        assert!(ensure_positive(1e-9, "inertia").is_ok());
        assert!(ensure_positive(Real::INFINITY, "inertia").is_err());
    }

    #[test]
    fn ensure_non_negative_allows_zero() {
        assert!(ensure_non_negative(0.0, "friction").is_ok());
        assert!(ensure_non_negative(-1e-12, "friction").is_err());
    }

    #[test]
    fn linspace_matches_endpoints() {
        let pts = linspace(0.0, 60.0, 1200);
        assert_eq!(pts.len(), 1200);
        assert_eq!(pts[0], 0.0);
        assert_eq!(pts[1199], 60.0);
        assert!(pts.windows(2).all(|w| w[1] > w[0]));

        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(2.0, 5.0, 1), vec![2.0]);
    }
}
