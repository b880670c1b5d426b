//! Accuracy scaling and step-sequence invariants on problems with known solutions.

use nalgebra::DVector;
use proptest::prelude::*;

use ms_core::linspace;
use ms_sim::{FnSystem, IntegratorType, SimOptions, TimeSpan, integrate};

/// x' = -x coupled with a harmonic oscillator (sin, cos).
fn decay_and_oscillator() -> FnSystem<impl Fn(f64, &DVector<f64>) -> DVector<f64>> {
    FnSystem::new(3, |_t, x: &DVector<f64>| {
        DVector::from_row_slice(&[-x[0], x[2], -x[1]])
    })
}

fn max_grid_error(tol: f64, integrator: IntegratorType) -> f64 {
    let sys = decay_and_oscillator();
    let opts = SimOptions {
        integrator,
        atol: tol,
        rtol: tol,
        ..SimOptions::default()
    };
    let traj = integrate(
        &sys,
        TimeSpan::new(0.0, 10.0).unwrap(),
        &DVector::from_row_slice(&[1.0, 0.0, 1.0]),
        &opts,
    )
    .unwrap();

    let grid = linspace(0.0, 10.0, 101);
    let samples = traj.sample(&grid).unwrap();
    grid.iter()
        .zip(&samples)
        .map(|(&t, x)| {
            let exact = [(-t).exp(), t.sin(), t.cos()];
            x.iter()
                .zip(exact)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max)
        })
        .fold(0.0, f64::max)
}

#[test]
fn error_shrinks_with_tolerance() {
    let e4 = max_grid_error(1e-4, IntegratorType::DormandPrince54);
    let e6 = max_grid_error(1e-6, IntegratorType::DormandPrince54);
    let e8 = max_grid_error(1e-8, IntegratorType::DormandPrince54);

    assert!(e6 * 10.0 < e4, "e4={e4} e6={e6}");
    assert!(e8 * 10.0 < e6, "e6={e6} e8={e8}");
    assert!(e8 < 1e-5, "e8={e8}");
}

#[test]
fn halving_tolerance_reduces_error() {
    let e_full = max_grid_error(1e-6, IntegratorType::DormandPrince54);
    let e_half = max_grid_error(5e-7, IntegratorType::DormandPrince54);

    let ratio = e_full / e_half;
    assert!(ratio > 1.0 && ratio < 8.0, "e_full={e_full} e_half={e_half}");
}

#[test]
fn bogacki_shampine_converges() {
    let e4 = max_grid_error(1e-4, IntegratorType::BogackiShampine32);
    let e7 = max_grid_error(1e-7, IntegratorType::BogackiShampine32);
    assert!(e7 * 10.0 < e4, "e4={e4} e7={e7}");
}

proptest! {
    #[test]
    fn accepted_times_cover_span(
        rate in 0.1f64..5.0,
        start in -10.0f64..10.0,
        len in 0.01f64..20.0,
    ) {
        let sys = FnSystem::new(1, move |_t, x: &DVector<f64>| x * -rate);
        let span = TimeSpan::new(start, start + len).unwrap();
        let traj = integrate(&sys, span, &DVector::from_row_slice(&[1.0]), &SimOptions::default())
            .unwrap();

        prop_assert_eq!(traj.t[0], span.start);
        prop_assert_eq!(*traj.t.last().unwrap(), span.end);
        prop_assert!(traj.t.windows(2).all(|w| w[1] > w[0]));
        prop_assert_eq!(traj.len(), traj.stats.accepted + 1);

        let exact = (-rate * len).exp();
        let got = traj.final_state().unwrap()[0];
        prop_assert!((got - exact).abs() < 1e-2, "got {} exact {}", got, exact);
    }
}
