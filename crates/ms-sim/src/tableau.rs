//! Butcher tableaus for embedded explicit Runge-Kutta pairs.

/// Coefficients of an embedded explicit RK pair with the FSAL property.
///
/// `a`, `b` and `c` describe the propagating solution over `stages()` stages.
/// `e` has one extra entry multiplying the derivative at the new point (the
/// FSAL stage), and `h · Σ e_i k_i` is the difference between the two
/// embedded solutions.
#[derive(Debug)]
pub struct Tableau {
    pub name: &'static str,
    /// Order of the propagated solution.
    pub order: u32,
    /// Order of the embedded solution used for error estimation.
    pub error_order: u32,
    pub c: &'static [f64],
    pub a: &'static [&'static [f64]],
    pub b: &'static [f64],
    pub e: &'static [f64],
}

impl Tableau {
    pub fn stages(&self) -> usize {
        self.b.len()
    }

    /// Right-hand side evaluations per attempted step (FSAL stage included,
    /// first stage reused from the previous accepted step).
    pub fn evals_per_step(&self) -> usize {
        self.stages()
    }

    /// Exponent applied to the error norm in step-size control.
    pub fn control_exponent(&self) -> f64 {
        -1.0 / (self.error_order as f64 + 1.0)
    }
}

/// Dormand-Prince 5(4), seven stages with FSAL.
pub static DORMAND_PRINCE_54: Tableau = Tableau {
    name: "dormand-prince-5(4)",
    order: 5,
    error_order: 4,
    c: &[0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0],
    a: &[
        &[],
        &[1.0 / 5.0],
        &[3.0 / 40.0, 9.0 / 40.0],
        &[44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0],
        &[
            19372.0 / 6561.0,
            -25360.0 / 2187.0,
            64448.0 / 6561.0,
            -212.0 / 729.0,
        ],
        &[
            9017.0 / 3168.0,
            -355.0 / 33.0,
            46732.0 / 5247.0,
            49.0 / 176.0,
            -5103.0 / 18656.0,
        ],
    ],
    b: &[
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
    e: &[
        -71.0 / 57600.0,
        0.0,
        71.0 / 16695.0,
        -71.0 / 1920.0,
        17253.0 / 339200.0,
        -22.0 / 525.0,
        1.0 / 40.0,
    ],
};

/// Bogacki-Shampine 3(2), four stages with FSAL.
pub static BOGACKI_SHAMPINE_32: Tableau = Tableau {
    name: "bogacki-shampine-3(2)",
    order: 3,
    error_order: 2,
    c: &[0.0, 1.0 / 2.0, 3.0 / 4.0],
    a: &[&[], &[1.0 / 2.0], &[0.0, 3.0 / 4.0]],
    b: &[2.0 / 9.0, 1.0 / 3.0, 4.0 / 9.0],
    e: &[5.0 / 72.0, -1.0 / 12.0, -1.0 / 9.0, 1.0 / 8.0],
};

#[cfg(test)]
mod tests {
    use super::*;

    fn check_consistency(tab: &Tableau) {
        assert_eq!(tab.c.len(), tab.stages());
        assert_eq!(tab.a.len(), tab.stages());
        assert_eq!(tab.e.len(), tab.stages() + 1);

        for (i, row) in tab.a.iter().enumerate() {
            assert_eq!(row.len(), i, "{}: row {i} is not strictly lower", tab.name);
            let sum: f64 = row.iter().sum();
            assert!((sum - tab.c[i]).abs() < 1e-14, "{}: row {i}", tab.name);
        }

        let b_sum: f64 = tab.b.iter().sum();
        assert!((b_sum - 1.0).abs() < 1e-14, "{}: weights", tab.name);

        // Both embedded solutions are consistent, so their difference has zero weight sum
        let e_sum: f64 = tab.e.iter().sum();
        assert!(e_sum.abs() < 1e-14, "{}: error weights", tab.name);
    }

    #[test]
    fn dormand_prince_is_consistent() {
        check_consistency(&DORMAND_PRINCE_54);
        assert_eq!(DORMAND_PRINCE_54.evals_per_step(), 6);
        assert!((DORMAND_PRINCE_54.control_exponent() + 0.2).abs() < 1e-15);
    }

    #[test]
    fn bogacki_shampine_is_consistent() {
        check_consistency(&BOGACKI_SHAMPINE_32);
        assert!((BOGACKI_SHAMPINE_32.control_exponent() + 1.0 / 3.0).abs() < 1e-15);
    }

    #[test]
    fn dormand_prince_second_order_condition() {
        // Σ b_i c_i = 1/2
        let tab = &DORMAND_PRINCE_54;
        let s: f64 = tab.b.iter().zip(tab.c).map(|(b, c)| b * c).sum();
        assert!((s - 0.5).abs() < 1e-14);
    }
}
