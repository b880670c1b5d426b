//! Adaptive simulation runner and trajectory recording.

use nalgebra::DVector;
use tracing::{debug, trace};

use crate::dense;
use crate::error::{SimError, SimResult};
use crate::integrator::{BogackiShampine32, DormandPrince54, Integrator, StepControl};
use crate::system::OdeSystem;

/// Integrator selection for simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegratorType {
    /// Dormand-Prince 5(4) (default, 6 rhs calls per attempted step).
    #[default]
    DormandPrince54,
    /// Bogacki-Shampine 3(2) (3 rhs calls per attempted step).
    BogackiShampine32,
}

impl IntegratorType {
    pub fn name(&self) -> &'static str {
        match self {
            IntegratorType::DormandPrince54 => DormandPrince54.tableau().name,
            IntegratorType::BogackiShampine32 => BogackiShampine32.tableau().name,
        }
    }
}

/// Closed integration interval `[start, end]` in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

impl TimeSpan {
    pub fn new(start: f64, end: f64) -> SimResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(SimError::InvalidArg {
                what: "time span must be finite",
            });
        }
        if end < start {
            return Err(SimError::InvalidArg {
                what: "time span end must not precede start",
            });
        }
        Ok(Self { start, end })
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Options for adaptive simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Integrator type (default: Dormand-Prince 5(4))
    pub integrator: IntegratorType,
    /// Absolute tolerance
    pub atol: f64,
    /// Relative tolerance
    pub rtol: f64,
    /// First step (seconds); `None` selects it from the initial derivative
    pub first_step: Option<f64>,
    /// Upper bound on any step (seconds)
    pub max_step: f64,
    /// Step floor as a fraction of the span duration
    pub min_step_fraction: f64,
    /// Maximum number of attempted steps, accepted plus rejected (safety limit)
    pub max_steps: usize,
    /// Safety factor on the optimal step
    pub safety: f64,
    /// Smallest per-attempt step scale
    pub min_scale: f64,
    /// Largest per-attempt step scale
    pub max_scale: f64,
}

impl Default for SimOptions {
    fn default() -> Self {
        let control = StepControl::default();
        Self {
            integrator: IntegratorType::default(),
            atol: control.atol,
            rtol: control.rtol,
            first_step: None,
            max_step: f64::INFINITY,
            min_step_fraction: 1e-12,
            max_steps: 100_000,
            safety: control.safety,
            min_scale: control.min_scale,
            max_scale: control.max_scale,
        }
    }
}

impl SimOptions {
    pub fn validate(&self) -> SimResult<()> {
        if !self.atol.is_finite() || self.atol < 0.0 {
            return Err(SimError::InvalidArg {
                what: "atol must be finite and non-negative",
            });
        }
        if !self.rtol.is_finite() || self.rtol < 0.0 {
            return Err(SimError::InvalidArg {
                what: "rtol must be finite and non-negative",
            });
        }
        if let Some(h) = self.first_step
            && (!h.is_finite() || h <= 0.0)
        {
            return Err(SimError::InvalidArg {
                what: "first_step must be positive",
            });
        }
        if self.max_step.is_nan() || self.max_step <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "max_step must be positive",
            });
        }
        if !self.min_step_fraction.is_finite() || self.min_step_fraction <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "min_step_fraction must be positive",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        if !(self.safety > 0.0 && self.safety <= 1.0) {
            return Err(SimError::InvalidArg {
                what: "safety factor must be in (0, 1]",
            });
        }
        if !(self.min_scale > 0.0 && self.min_scale < 1.0 && self.max_scale > 1.0) {
            return Err(SimError::InvalidArg {
                what: "step scale bounds must satisfy 0 < min_scale < 1 < max_scale",
            });
        }
        Ok(())
    }

    pub fn control(&self) -> StepControl {
        StepControl {
            atol: self.atol,
            rtol: self.rtol,
            safety: self.safety,
            min_scale: self.min_scale,
            max_scale: self.max_scale,
        }
    }
}

/// Counters describing how a run went.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntegrationStats {
    pub accepted: usize,
    pub rejected: usize,
    pub rhs_evals: usize,
}

/// Progress snapshot emitted after every accepted step.
#[derive(Clone, Debug)]
pub struct SimProgress {
    pub t: f64,
    pub t_end: f64,
    pub fraction_complete: f64,
    pub accepted: usize,
    pub rejected: usize,
    /// Size of the step just accepted
    pub h: f64,
}

/// Accepted-step record of an adaptive run.
///
/// Times are strictly increasing and the last time equals the span end.
/// `dxdt[i]` is `f(t[i], x[i])`, kept for dense output.
#[derive(Clone, Debug)]
pub struct Trajectory {
    pub t: Vec<f64>,
    pub x: Vec<DVector<f64>>,
    pub dxdt: Vec<DVector<f64>>,
    pub stats: IntegrationStats,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Sizes of the accepted steps (`diff` of the accepted times).
    pub fn step_sizes(&self) -> Vec<f64> {
        self.t.windows(2).map(|w| w[1] - w[0]).collect()
    }

    pub fn final_state(&self) -> Option<&DVector<f64>> {
        self.x.last()
    }

    /// Resample onto `grid` with cubic Hermite interpolation.
    ///
    /// `grid` must be finite, non-decreasing and inside the integrated span.
    pub fn sample(&self, grid: &[f64]) -> SimResult<Vec<DVector<f64>>> {
        let (Some(&t_first), Some(&t_last)) = (self.t.first(), self.t.last()) else {
            return Err(SimError::InvalidArg {
                what: "cannot sample an empty trajectory",
            });
        };
        if grid.iter().any(|t| !t.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "evaluation grid must be finite",
            });
        }
        if grid.windows(2).any(|w| w[1] < w[0]) {
            return Err(SimError::InvalidArg {
                what: "evaluation grid must be non-decreasing",
            });
        }

        let slack = 1e-9 * (t_last - t_first);
        let mut out = Vec::with_capacity(grid.len());
        let mut seg = 0;
        for &tq in grid {
            if tq < t_first - slack || tq > t_last + slack {
                return Err(SimError::EvaluationOutOfRange {
                    t: tq,
                    start: t_first,
                    end: t_last,
                });
            }
            if self.t.len() == 1 {
                out.push(self.x[0].clone());
                continue;
            }
            let tq = tq.clamp(t_first, t_last);
            while seg + 2 < self.t.len() && self.t[seg + 1] <= tq {
                seg += 1;
            }
            out.push(dense::hermite(
                self.t[seg],
                &self.x[seg],
                &self.dxdt[seg],
                self.t[seg + 1],
                &self.x[seg + 1],
                &self.dxdt[seg + 1],
                tq,
            ));
        }
        Ok(out)
    }
}

/// Integrate `system` from `x0` over `span`.
pub fn integrate<S: OdeSystem + ?Sized>(
    system: &S,
    span: TimeSpan,
    x0: &DVector<f64>,
    opts: &SimOptions,
) -> SimResult<Trajectory> {
    integrate_with_progress(system, span, x0, opts, None)
}

/// Integrate `system` and stream a progress event after each accepted step.
pub fn integrate_with_progress<S: OdeSystem + ?Sized>(
    system: &S,
    span: TimeSpan,
    x0: &DVector<f64>,
    opts: &SimOptions,
    progress_cb: Option<&mut dyn FnMut(&SimProgress)>,
) -> SimResult<Trajectory> {
    match opts.integrator {
        IntegratorType::DormandPrince54 => {
            run_adaptive(&DormandPrince54, system, span, x0, opts, progress_cb)
        }
        IntegratorType::BogackiShampine32 => {
            run_adaptive(&BogackiShampine32, system, span, x0, opts, progress_cb)
        }
    }
}

fn run_adaptive<I: Integrator, S: OdeSystem + ?Sized>(
    integrator: &I,
    system: &S,
    span: TimeSpan,
    x0: &DVector<f64>,
    opts: &SimOptions,
    mut progress_cb: Option<&mut dyn FnMut(&SimProgress)>,
) -> SimResult<Trajectory> {
    opts.validate()?;
    let span = TimeSpan::new(span.start, span.end)?;
    if x0.len() != system.dim() {
        return Err(SimError::DimensionMismatch {
            expected: system.dim(),
            got: x0.len(),
        });
    }
    if x0.iter().any(|v| !v.is_finite()) {
        return Err(SimError::NonFiniteState {
            t: span.start,
            state: x0.as_slice().to_vec(),
        });
    }

    let control = opts.control();
    let duration = span.duration();
    let h_min = opts.min_step_fraction * duration;
    let evals_per_step = integrator.tableau().evals_per_step();

    let mut stats = IntegrationStats::default();
    let mut t = span.start;
    let mut x = x0.clone();
    let mut dxdt = system.rhs(t, &x)?;
    stats.rhs_evals += 1;
    if dxdt.len() != x.len() {
        return Err(SimError::DimensionMismatch {
            expected: x.len(),
            got: dxdt.len(),
        });
    }

    let mut t_record = vec![t];
    let mut x_record = vec![x.clone()];
    let mut dxdt_record = vec![dxdt.clone()];

    let mut h = match opts.first_step {
        Some(h) => h,
        None => {
            stats.rhs_evals += 1;
            integrator.initial_step(system, t, &x, &dxdt, duration, &control)?
        }
    }
    .min(opts.max_step);

    let mut attempts = 0usize;
    while t < span.end {
        if attempts >= opts.max_steps {
            return Err(SimError::StepBudgetExceeded {
                max_steps: opts.max_steps,
                t,
            });
        }
        attempts += 1;

        let remaining = span.end - t;
        let last = h >= remaining;
        let h_try = if last { remaining } else { h };

        let step = integrator.step(system, t, &x, &dxdt, h_try, &control)?;
        stats.rhs_evals += evals_per_step;

        if step.accepted {
            if !last && step.t <= t {
                return Err(SimError::StepSizeUnderflow {
                    t,
                    h: h_try,
                    h_min,
                    state: x.as_slice().to_vec(),
                });
            }
            t = if last { span.end } else { step.t };
            x = step.x;
            dxdt = step.dxdt;
            t_record.push(t);
            x_record.push(x.clone());
            dxdt_record.push(dxdt.clone());
            stats.accepted += 1;
            h = step.next_h.min(opts.max_step);

            if let Some(cb) = progress_cb.as_deref_mut() {
                cb(&SimProgress {
                    t,
                    t_end: span.end,
                    fraction_complete: if duration > 0.0 {
                        (t - span.start) / duration
                    } else {
                        1.0
                    },
                    accepted: stats.accepted,
                    rejected: stats.rejected,
                    h: h_try,
                });
            }
        } else {
            stats.rejected += 1;
            trace!(t, h = h_try, error_norm = step.error_norm, "step rejected");
            h = step.next_h;
            if h < h_min {
                return Err(SimError::StepSizeUnderflow {
                    t,
                    h,
                    h_min,
                    state: x.as_slice().to_vec(),
                });
            }
        }
    }

    debug!(
        method = integrator.tableau().name,
        accepted = stats.accepted,
        rejected = stats.rejected,
        rhs_evals = stats.rhs_evals,
        "integration complete"
    );

    Ok(Trajectory {
        t: t_record,
        x: x_record,
        dxdt: dxdt_record,
        stats,
    })
}
