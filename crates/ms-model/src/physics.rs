//! Coupled battery / DC motor vector field.

use crate::constants::ModelConstants;
use crate::error::ModelResult;
use crate::state::MotorState;

/// Battery with RC polarization driving a DC motor.
///
/// ```text
/// Lm · dI_L/dt = V_oc − I_L·R0 − V1 − Rm·I_L − K·ω
/// J  · dω/dt   = K·I_L − b·ω − τ_ext
/// dV1/dt       = −V1/(C1·R1) + I_L/C1
/// dz/dt        = −I_L/Cn        (0 once z ≤ 0)
/// ```
///
/// The state-of-charge clamp is part of the vector field: it is decided from
/// the `z` passed into each call, including intermediate stage states, so the
/// field is piecewise smooth with a switching surface at `z = 0`.
#[derive(Clone, Debug)]
pub struct PhysicalModel {
    constants: ModelConstants,
}

impl PhysicalModel {
    /// Create a model from validated constants.
    ///
    /// # Errors
    /// Returns error if any constant is non-finite or non-physical.
    pub fn new(constants: ModelConstants) -> ModelResult<Self> {
        constants.validate()?;
        Ok(Self { constants })
    }

    pub fn constants(&self) -> &ModelConstants {
        &self.constants
    }

    /// Time derivative of `state` under external torque `torque_ext` (N·m).
    ///
    /// Pure: no caching, no side effects, safe to call for any stage state.
    pub fn derivative(&self, _t: f64, state: &MotorState, torque_ext: f64) -> MotorState {
        let c = &self.constants;
        let MotorState { i_l, omega, v1, soc } = *state;

        let di_l = (c.v_oc - i_l * c.r0 - v1 - c.rm * i_l - c.k * omega) / c.lm;
        let domega = (self.motor_torque(state) - c.b * omega - torque_ext) / c.j;
        let dv1 = -v1 / (c.c1 * c.r1) + i_l / c.c1;
        // depleted cells stop tracking charge; no regeneration
        let dsoc = if soc <= 0.0 { 0.0 } else { -i_l / c.capacity };

        MotorState {
            i_l: di_l,
            omega: domega,
            v1: dv1,
            soc: dsoc,
        }
    }

    /// Battery terminal voltage `V_t = V_oc − I_L·R0 − V1`.
    pub fn terminal_voltage(&self, state: &MotorState) -> f64 {
        self.constants.v_oc - state.i_l * self.constants.r0 - state.v1
    }

    /// Electromagnetic torque `K·I_L` (N·m).
    fn motor_torque(&self, state: &MotorState) -> f64 {
        self.constants.k * state.i_l
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn charge_never_regenerates(
            i_l in 0.0_f64..500.0,
            omega in -100.0_f64..100.0,
            v1 in -2.0_f64..2.0,
            soc in -0.5_f64..1.0,
            torque in -1.0_f64..1.0,
        ) {
            let m = PhysicalModel::new(ModelConstants::reference()).unwrap();
            let d = m.derivative(0.0, &MotorState { i_l, omega, v1, soc }, torque);
            prop_assert!(d.soc <= 0.0);
            if soc <= 0.0 {
                prop_assert_eq!(d.soc, 0.0);
            }
        }

        #[test]
        fn derivative_is_pure(
            i_l in -50.0_f64..500.0,
            omega in -100.0_f64..100.0,
            soc in -0.1_f64..1.0,
            t in 0.0_f64..100.0,
        ) {
            let m = PhysicalModel::new(ModelConstants::reference()).unwrap();
            let s = MotorState { i_l, omega, v1: 0.1, soc };
            let a = m.derivative(t, &s, 0.02);
            let b = m.derivative(t, &s, 0.02);
            prop_assert_eq!(a, b);
        }
    }
}
