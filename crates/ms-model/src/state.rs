//! Dynamic state of the battery/motor assembly.

/// Number of dynamic states.
pub const STATE_DIM: usize = 4;

/// Instantaneous state of the coupled system.
///
/// The same type carries time derivatives: `PhysicalModel::derivative`
/// returns a `MotorState` whose fields are d/dt of each state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotorState {
    /// Inductor (armature) current (A)
    pub i_l: f64,
    /// Rotor angular velocity (rad/s)
    pub omega: f64,
    /// Polarization branch voltage (V)
    pub v1: f64,
    /// State of charge [0, 1]
    pub soc: f64,
}

impl MotorState {
    /// Fully charged battery, motor at rest.
    pub fn at_rest() -> Self {
        Self {
            i_l: 0.0,
            omega: 0.0,
            v1: 0.0,
            soc: 1.0,
        }
    }

    pub fn to_array(&self) -> [f64; STATE_DIM] {
        [self.i_l, self.omega, self.v1, self.soc]
    }

    fn from_array(x: [f64; STATE_DIM]) -> Self {
        Self {
            i_l: x[0],
            omega: x[1],
            v1: x[2],
            soc: x[3],
        }
    }

    /// Build from a slice of length `STATE_DIM`; `None` on length mismatch.
    pub fn from_slice(x: &[f64]) -> Option<Self> {
        let arr: [f64; STATE_DIM] = x.try_into().ok()?;
        Some(Self::from_array(arr))
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}
