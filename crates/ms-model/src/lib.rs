//! Battery and DC motor physics for motorsim.
//!
//! Provides:
//! - `ModelConstants`: immutable battery + motor parameters
//! - `MotorState`: the four dynamic states (I_L, ω, V1, z)
//! - `PhysicalModel`: pure vector field with the state-of-charge clamp
//! - `LoadProfile`: external shaft torque as a function of time

pub mod constants;
pub mod error;
pub mod load;
pub mod physics;
pub mod state;

pub use constants::ModelConstants;
pub use error::{ModelError, ModelResult};
pub use load::LoadProfile;
pub use physics::PhysicalModel;
pub use state::MotorState;
