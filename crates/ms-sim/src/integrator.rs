//! Embedded explicit Runge-Kutta steppers with local error control.

use nalgebra::DVector;

use crate::error::SimResult;
use crate::system::OdeSystem;
use crate::tableau::{BOGACKI_SHAMPINE_32, DORMAND_PRINCE_54, Tableau};

/// Fraction of the span used as first step when the weighted norms are unusable.
const FALLBACK_FIRST_STEP_FRACTION: f64 = 1e-6;

/// Local error tolerances and step-size controller parameters.
#[derive(Clone, Copy, Debug)]
pub struct StepControl {
    /// Absolute tolerance
    pub atol: f64,
    /// Relative tolerance
    pub rtol: f64,
    /// Safety factor applied to the optimal step
    pub safety: f64,
    /// Smallest step scale per attempt
    pub min_scale: f64,
    /// Largest step scale per attempt
    pub max_scale: f64,
}

impl Default for StepControl {
    fn default() -> Self {
        Self {
            atol: 1e-6,
            rtol: 1e-3,
            safety: 0.9,
            min_scale: 0.2,
            max_scale: 5.0,
        }
    }
}

impl StepControl {
    /// Weighted RMS norm of a local error estimate.
    ///
    /// Component weights are `atol + rtol · max(|x|, |x_new|)`. A zero weight
    /// contributes nothing when the error component is exactly zero and makes
    /// the norm infinite otherwise.
    pub fn error_norm(&self, err: &DVector<f64>, x: &DVector<f64>, x_new: &DVector<f64>) -> f64 {
        if err.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = err
            .iter()
            .zip(x.iter().zip(x_new.iter()))
            .map(|(e, (a, b))| {
                let r = scaled(*e, self.atol + self.rtol * a.abs().max(b.abs()));
                r * r
            })
            .sum();
        (sum_sq / err.len() as f64).sqrt()
    }

    /// Step scale `clamp(safety · err^p, min_scale, max_scale)`; `p` is the
    /// tableau's control exponent.
    pub fn step_factor(&self, error_norm: f64, exponent: f64) -> f64 {
        if error_norm == 0.0 {
            return self.max_scale;
        }
        (self.safety * error_norm.powf(exponent)).clamp(self.min_scale, self.max_scale)
    }
}

fn scaled(value: f64, weight: f64) -> f64 {
    if weight > 0.0 {
        value / weight
    } else if value == 0.0 {
        0.0
    } else {
        f64::INFINITY
    }
}

fn weighted_rms(v: &DVector<f64>, weights: &DVector<f64>) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = v
        .iter()
        .zip(weights.iter())
        .map(|(a, w)| scaled(*a, *w).powi(2))
        .sum();
    (sum_sq / v.len() as f64).sqrt()
}

/// Outcome of one attempted step.
#[derive(Clone, Debug)]
pub struct StepResult {
    /// Candidate time `t + h`
    pub t: f64,
    /// Candidate state (propagated, higher-order solution)
    pub x: DVector<f64>,
    /// Derivative at the candidate point; first stage of the next step
    pub dxdt: DVector<f64>,
    /// Step size used
    pub h: f64,
    /// Weighted RMS local error estimate
    pub error_norm: f64,
    /// Proposed size for the next attempt (accepted or not)
    pub next_h: f64,
    /// `error_norm <= 1`
    pub accepted: bool,
}

/// Trait for adaptive one-step integrators.
pub trait Integrator {
    /// Coefficients driving the step.
    fn tableau(&self) -> &'static Tableau;

    /// Attempt one step of size `h` from `(t, x)`.
    ///
    /// `dxdt` must be `f(t, x)`; it is reused as the first stage.
    fn step<S: OdeSystem + ?Sized>(
        &self,
        system: &S,
        t: f64,
        x: &DVector<f64>,
        dxdt: &DVector<f64>,
        h: f64,
        control: &StepControl,
    ) -> SimResult<StepResult> {
        embedded_step(self.tableau(), system, t, x, dxdt, h, control)
    }

    /// Starting step from the derivative magnitude at `t0`.
    fn initial_step<S: OdeSystem + ?Sized>(
        &self,
        system: &S,
        t0: f64,
        x0: &DVector<f64>,
        dxdt0: &DVector<f64>,
        span: f64,
        control: &StepControl,
    ) -> SimResult<f64> {
        select_initial_step(self.tableau(), system, t0, x0, dxdt0, span, control)
    }
}

/// Dormand-Prince 5(4) (default).
#[derive(Clone, Copy, Debug, Default)]
pub struct DormandPrince54;

impl Integrator for DormandPrince54 {
    fn tableau(&self) -> &'static Tableau {
        &DORMAND_PRINCE_54
    }
}

/// Bogacki-Shampine 3(2), cheaper per step at loose tolerances.
#[derive(Clone, Copy, Debug, Default)]
pub struct BogackiShampine32;

impl Integrator for BogackiShampine32 {
    fn tableau(&self) -> &'static Tableau {
        &BOGACKI_SHAMPINE_32
    }
}

fn embedded_step<S: OdeSystem + ?Sized>(
    tab: &Tableau,
    system: &S,
    t: f64,
    x: &DVector<f64>,
    dxdt: &DVector<f64>,
    h: f64,
    control: &StepControl,
) -> SimResult<StepResult> {
    let stages = tab.stages();
    let mut k: Vec<DVector<f64>> = Vec::with_capacity(stages + 1);
    k.push(dxdt.clone());

    for s in 1..stages {
        let mut xs = x.clone();
        for (a, kj) in tab.a[s].iter().zip(&k) {
            if *a != 0.0 {
                xs.axpy(h * a, kj, 1.0);
            }
        }
        k.push(system.rhs(t + tab.c[s] * h, &xs)?);
    }

    let mut x_new = x.clone();
    for (b, kj) in tab.b.iter().zip(&k) {
        if *b != 0.0 {
            x_new.axpy(h * b, kj, 1.0);
        }
    }

    let t_new = t + h;
    // An overflowing candidate is rejected like any other oversized step.
    if x_new.iter().any(|v| !v.is_finite()) {
        return Ok(rejected_non_finite(t_new, x_new, dxdt, h, control));
    }

    // FSAL stage
    k.push(system.rhs(t_new, &x_new)?);

    let mut err = DVector::zeros(x.len());
    for (e, kj) in tab.e.iter().zip(&k) {
        if *e != 0.0 {
            err.axpy(h * e, kj, 1.0);
        }
    }

    let error_norm = control.error_norm(&err, x, &x_new);
    if !error_norm.is_finite() {
        return Ok(rejected_non_finite(t_new, x_new, dxdt, h, control));
    }

    let accepted = error_norm <= 1.0;
    let next_h = h * control.step_factor(error_norm, tab.control_exponent());
    let dxdt_new = k.pop().unwrap_or_else(|| DVector::zeros(x.len()));

    Ok(StepResult {
        t: t_new,
        x: x_new,
        dxdt: dxdt_new,
        h,
        error_norm,
        next_h,
        accepted,
    })
}

fn rejected_non_finite(
    t_new: f64,
    x_new: DVector<f64>,
    dxdt: &DVector<f64>,
    h: f64,
    control: &StepControl,
) -> StepResult {
    StepResult {
        t: t_new,
        x: x_new,
        dxdt: dxdt.clone(),
        h,
        error_norm: f64::INFINITY,
        next_h: h * control.min_scale,
        accepted: false,
    }
}

/// Hairer-Wanner starting step: balance a forward Euler probe against the
/// change in derivative over that probe.
fn select_initial_step<S: OdeSystem + ?Sized>(
    tab: &Tableau,
    system: &S,
    t0: f64,
    x0: &DVector<f64>,
    dxdt0: &DVector<f64>,
    span: f64,
    control: &StepControl,
) -> SimResult<f64> {
    if span <= 0.0 {
        return Ok(0.0);
    }

    let weights = x0.map(|v| control.atol + control.rtol * v.abs());
    let d0 = weighted_rms(x0, &weights);
    let d1 = weighted_rms(dxdt0, &weights);
    if !d0.is_finite() || !d1.is_finite() {
        return Ok(FALLBACK_FIRST_STEP_FRACTION * span);
    }

    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    }
    .min(span);

    let mut x1 = x0.clone();
    x1.axpy(h0, dxdt0, 1.0);
    let f1 = system.rhs(t0 + h0, &x1)?;
    let d2 = weighted_rms(&(f1 - dxdt0), &weights) / h0;
    if !d2.is_finite() {
        return Ok(FALLBACK_FIRST_STEP_FRACTION * span);
    }

    let d_max = d1.max(d2);
    let h1 = if d_max <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / d_max).powf(1.0 / (tab.error_order as f64 + 1.0))
    };

    Ok((100.0 * h0).min(h1).min(span))
}
