//! Physical parameters of the battery and motor.

use ms_core::{ensure_non_negative, ensure_positive};

use crate::error::ModelResult;

/// Immutable parameter set shared by every derivative evaluation.
///
/// Battery: open-circuit source `v_oc` behind series resistance `r0` and one
/// RC polarization branch (`r1` ‖ `c1`). Motor: armature `rm` + `lm` with
/// back-EMF `k·ω`, driving a rotor of inertia `j` against viscous friction `b`.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelConstants {
    /// Open-circuit voltage (V)
    pub v_oc: f64,
    /// Series internal resistance (Ω)
    pub r0: f64,
    /// Polarization resistance (Ω)
    pub r1: f64,
    /// Polarization capacitance (F)
    pub c1: f64,
    /// Nominal capacity (C)
    pub capacity: f64,
    /// Rotor inertia (kg·m²)
    pub j: f64,
    /// Viscous friction coefficient (N·m·s/rad)
    pub b: f64,
    /// Torque / back-EMF constant (N·m/A = V·s/rad)
    pub k: f64,
    /// Armature resistance (Ω)
    pub rm: f64,
    /// Armature inductance (H)
    pub lm: f64,
}

impl ModelConstants {
    /// Reference cell and motor: 3.7 V, 1 Ah pack driving a small motor.
    pub fn reference() -> Self {
        Self {
            v_oc: 3.7,
            r0: 0.005,
            r1: 0.005,
            c1: 100.0,
            capacity: ms_core::in_coulombs(ms_core::amp_hours(1.0)),
            j: 0.1,
            b: 0.05,
            k: 0.01,
            rm: 0.01,
            lm: 0.05,
        }
    }

    /// Check every parameter is finite and physically meaningful.
    ///
    /// Divisors (`lm`, `j`, `c1`, `r1`, `capacity`) must be strictly positive;
    /// resistances, friction and the motor constant may be zero.
    pub fn validate(&self) -> ModelResult<()> {
        ensure_non_negative(self.v_oc, "open-circuit voltage")?;
        ensure_non_negative(self.r0, "series resistance r0")?;
        ensure_positive(self.r1, "polarization resistance r1")?;
        ensure_positive(self.c1, "polarization capacitance c1")?;
        ensure_positive(self.capacity, "battery capacity")?;
        ensure_positive(self.j, "rotor inertia")?;
        ensure_non_negative(self.b, "viscous friction")?;
        ensure_non_negative(self.k, "motor constant")?;
        ensure_non_negative(self.rm, "armature resistance")?;
        ensure_positive(self.lm, "armature inductance")?;
        Ok(())
    }

    /// Steady-state armature current with no external load.
    ///
    /// ```text
    /// V_oc = I·(R0 + R1 + Rm) + K·ω,   ω = K·I / b
    /// ```
    ///
    /// Returns `None` when the rotor has no friction (no finite steady state).
    pub fn no_load_steady_current(&self) -> Option<f64> {
        if self.b <= 0.0 {
            return None;
        }
        let r_total = self.r0 + self.r1 + self.rm + self.k * self.k / self.b;
        if r_total <= 0.0 {
            return None;
        }
        Some(self.v_oc / r_total)
    }

    /// Steady-state angular velocity with no external load.
    pub fn no_load_steady_speed(&self) -> Option<f64> {
        self.no_load_steady_current().map(|i| self.k * i / self.b)
    }
}
