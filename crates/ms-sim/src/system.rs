//! Right-hand side abstraction for explicit integrators.

use nalgebra::DVector;

use crate::error::SimResult;

/// A first-order ODE system `dx/dt = f(t, x)`.
///
/// Implementations must be pure: integrators evaluate `rhs` at trial stage
/// states that are never accepted, in any order.
pub trait OdeSystem {
    /// Number of state variables.
    fn dim(&self) -> usize;

    /// Compute the state derivative at `(t, x)`.
    fn rhs(&self, t: f64, x: &DVector<f64>) -> SimResult<DVector<f64>>;
}

/// Adapter turning a plain closure into an `OdeSystem`.
pub struct FnSystem<F> {
    dim: usize,
    f: F,
}

impl<F> FnSystem<F>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    pub fn new(dim: usize, f: F) -> Self {
        Self { dim, f }
    }
}

impl<F> OdeSystem for FnSystem<F>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    fn dim(&self) -> usize {
        self.dim
    }

    fn rhs(&self, t: f64, x: &DVector<f64>) -> SimResult<DVector<f64>> {
        Ok((self.f)(t, x))
    }
}
