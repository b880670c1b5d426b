//! Per-sample output rows for drive runs.

use ms_model::{MotorState, PhysicalModel};

use crate::sim::Trajectory;

/// One resampled point of a drive run, with the derived terminal voltage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleRecord {
    /// Time (s)
    pub time: f64,
    /// Motor current (A)
    pub i_l: f64,
    /// Shaft speed (rad/s)
    pub omega: f64,
    /// Polarization voltage (V)
    pub v1: f64,
    /// State of charge, 1 = full
    pub soc: f64,
    /// Battery terminal voltage (V)
    pub v_t: f64,
}

impl SampleRecord {
    pub fn from_state(model: &PhysicalModel, time: f64, state: &MotorState) -> Self {
        Self {
            time,
            i_l: state.i_l,
            omega: state.omega,
            v1: state.v1,
            soc: state.soc,
            v_t: model.terminal_voltage(state),
        }
    }

    pub fn state(&self) -> MotorState {
        MotorState {
            i_l: self.i_l,
            omega: self.omega,
            v1: self.v1,
            soc: self.soc,
        }
    }
}

/// Records at the accepted step times, without interpolation.
pub fn accepted_records(model: &PhysicalModel, traj: &Trajectory) -> Vec<SampleRecord> {
    traj.t
        .iter()
        .zip(&traj.x)
        .filter_map(|(&t, x)| {
            MotorState::from_slice(x.as_slice()).map(|s| SampleRecord::from_state(model, t, &s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_model::ModelConstants;

    #[test]
    fn terminal_voltage_matches_model() {
        let model = PhysicalModel::new(ModelConstants::reference()).unwrap();
        let state = MotorState {
            i_l: 10.0,
            omega: 3.0,
            v1: 0.2,
            soc: 0.9,
        };
        let rec = SampleRecord::from_state(&model, 1.5, &state);
        assert_eq!(rec.time, 1.5);
        assert_eq!(rec.state(), state);
        assert_eq!(rec.v_t, model.terminal_voltage(&state));
    }

    #[test]
    fn accepted_records_follow_trajectory() {
        use crate::{SimOptions, TimeSpan, run_drive};
        use ms_model::LoadProfile;

        let model = PhysicalModel::new(ModelConstants::reference()).unwrap();
        let run = run_drive(
            &model,
            &LoadProfile::Zero,
            &MotorState::at_rest(),
            TimeSpan::new(0.0, 2.0).unwrap(),
            &[],
            &SimOptions::default(),
        )
        .unwrap();

        let records = accepted_records(&model, &run.trajectory);
        assert_eq!(records.len(), run.trajectory.len());
        assert_eq!(records.last().unwrap().time, 2.0);
        assert!(records.iter().zip(&run.trajectory.t).all(|(r, &t)| r.time == t));
    }
}
