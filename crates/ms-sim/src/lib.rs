//! Adaptive time integration for motorsim.
//!
//! Provides:
//! - `OdeSystem` trait for any smooth right-hand side `dx/dt = f(t, x)`
//! - Embedded explicit Runge-Kutta pairs (Dormand-Prince 5(4), Bogacki-Shampine 3(2))
//!   with mixed absolute/relative local error control
//! - Simulation loop recording accepted steps, with cubic Hermite dense output
//! - Battery/motor drive adapter and sampled report records

pub mod dense;
pub mod drive;
pub mod error;
pub mod integrator;
pub mod report;
pub mod sim;
pub mod system;
pub mod tableau;

// Re-exports for public API
pub use drive::{DriveRun, DriveSystem, run_drive, run_drive_with_progress};
pub use error::{SimError, SimResult};
pub use integrator::{BogackiShampine32, DormandPrince54, Integrator, StepControl, StepResult};
pub use report::SampleRecord;
pub use sim::{
    IntegrationStats, IntegratorType, SimOptions, SimProgress, TimeSpan, Trajectory, integrate,
    integrate_with_progress,
};
pub use system::{FnSystem, OdeSystem};
pub use tableau::Tableau;
