//! External load torque profiles.

use ms_core::ensure_finite;

use crate::error::ModelResult;

/// Source of external torque on the rotor (N·m).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum LoadProfile {
    /// Free-running rotor.
    #[default]
    Zero,
    /// `amplitude · (bias + sin t)`; `bias = 1` keeps the torque non-negative.
    Sinusoidal { amplitude: f64, bias: f64 },
}

impl LoadProfile {
    /// External torque at time `t`.
    pub fn torque(&self, t: f64) -> f64 {
        match *self {
            LoadProfile::Zero => 0.0,
            LoadProfile::Sinusoidal { amplitude, bias } => amplitude * (bias + t.sin()),
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        if let LoadProfile::Sinusoidal { amplitude, bias } = *self {
            ensure_finite(amplitude, "load amplitude")?;
            ensure_finite(bias, "load bias")?;
        }
        Ok(())
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoadProfile::Zero => "no load",
            LoadProfile::Sinusoidal { .. } => "sinusoidal load",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn zero_is_always_zero() {
        let load = LoadProfile::Zero;
        for t in [0.0, 1.0, 42.0, -3.0] {
            assert_eq!(load.torque(t), 0.0);
        }
    }

    #[test]
    fn sinusoidal_matches_reference_torque() {
        let load = LoadProfile::Sinusoidal {
            amplitude: 0.05,
            bias: 1.0,
        };
        assert!((load.torque(0.0) - 0.05).abs() < 1e-15);
        assert!((load.torque(PI / 2.0) - 0.1).abs() < 1e-15);
        assert!(load.torque(3.0 * PI / 2.0).abs() < 1e-15);
    }

    #[test]
    fn sinusoidal_is_2pi_periodic() {
        let load = LoadProfile::Sinusoidal {
            amplitude: 0.05,
            bias: 1.0,
        };
        for t in [0.3, 1.7, 5.0] {
            assert!((load.torque(t) - load.torque(t + 2.0 * PI)).abs() < 1e-12);
        }
    }

    #[test]
    fn non_finite_amplitude_rejected() {
        let load = LoadProfile::Sinusoidal {
            amplitude: f64::INFINITY,
            bias: 1.0,
        };
        assert!(load.validate().is_err());
        assert!(LoadProfile::Zero.validate().is_ok());
    }
}
