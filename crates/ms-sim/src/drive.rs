//! Battery/motor drive runs: model adapter, integration and resampling.

use nalgebra::DVector;
use tracing::{debug, warn};

use ms_model::state::STATE_DIM;
use ms_model::{LoadProfile, MotorState, PhysicalModel};

use crate::error::{SimError, SimResult};
use crate::report::SampleRecord;
use crate::sim::{SimOptions, SimProgress, TimeSpan, Trajectory, integrate_with_progress};
use crate::system::OdeSystem;

/// `OdeSystem` view of a physical model driven by a load profile.
pub struct DriveSystem<'a> {
    model: &'a PhysicalModel,
    load: &'a LoadProfile,
}

impl<'a> DriveSystem<'a> {
    pub fn new(model: &'a PhysicalModel, load: &'a LoadProfile) -> Self {
        Self { model, load }
    }
}

impl OdeSystem for DriveSystem<'_> {
    fn dim(&self) -> usize {
        STATE_DIM
    }

    fn rhs(&self, t: f64, x: &DVector<f64>) -> SimResult<DVector<f64>> {
        let state = MotorState::from_slice(x.as_slice()).ok_or(SimError::DimensionMismatch {
            expected: STATE_DIM,
            got: x.len(),
        })?;
        let d = self.model.derivative(t, &state, self.load.torque(t));
        Ok(DVector::from_row_slice(&d.to_array()))
    }
}

/// Result of a drive run: the accepted steps plus the grid samples.
#[derive(Clone, Debug)]
pub struct DriveRun {
    pub trajectory: Trajectory,
    pub samples: Vec<SampleRecord>,
}

impl DriveRun {
    /// Motor states at the accepted step times.
    pub fn accepted_states(&self) -> Vec<MotorState> {
        self.trajectory
            .x
            .iter()
            .filter_map(|x| MotorState::from_slice(x.as_slice()))
            .collect()
    }

    pub fn step_sizes(&self) -> Vec<f64> {
        self.trajectory.step_sizes()
    }
}

/// Integrate the drive over `span` and sample it on `grid`.
pub fn run_drive(
    model: &PhysicalModel,
    load: &LoadProfile,
    initial: &MotorState,
    span: TimeSpan,
    grid: &[f64],
    opts: &SimOptions,
) -> SimResult<DriveRun> {
    run_drive_with_progress(model, load, initial, span, grid, opts, None)
}

/// Like [`run_drive`], streaming a progress event per accepted step.
pub fn run_drive_with_progress(
    model: &PhysicalModel,
    load: &LoadProfile,
    initial: &MotorState,
    span: TimeSpan,
    grid: &[f64],
    opts: &SimOptions,
    progress_cb: Option<&mut dyn FnMut(&SimProgress)>,
) -> SimResult<DriveRun> {
    load.validate()?;
    if !initial.is_finite() {
        return Err(SimError::NonFiniteState {
            t: span.start,
            state: initial.to_array().to_vec(),
        });
    }
    if !(0.0..=1.0).contains(&initial.soc) {
        return Err(SimError::InvalidArg {
            what: "initial state of charge must be in [0, 1]",
        });
    }

    let system = DriveSystem::new(model, load);
    let x0 = DVector::from_row_slice(&initial.to_array());
    let trajectory = integrate_with_progress(&system, span, &x0, opts, progress_cb)?;

    let samples = trajectory
        .sample(grid)?
        .iter()
        .zip(grid)
        .map(|(x, &t)| {
            MotorState::from_slice(x.as_slice())
                .map(|s| SampleRecord::from_state(model, t, &s))
                .ok_or(SimError::DimensionMismatch {
                    expected: STATE_DIM,
                    got: x.len(),
                })
        })
        .collect::<SimResult<Vec<_>>>()?;

    if let Some(last) = samples.last()
        && last.soc <= 0.0
    {
        warn!(t = last.time, "battery depleted during run");
    }
    debug!(
        load = load.label(),
        samples = samples.len(),
        accepted = trajectory.stats.accepted,
        rejected = trajectory.stats.rejected,
        "drive run complete"
    );

    Ok(DriveRun {
        trajectory,
        samples,
    })
}
