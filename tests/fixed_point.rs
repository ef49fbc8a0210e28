//! Core controller contract: convergence, iteration budgets, residual
//! aggregation, and init/reset semantics.

use approx::assert_abs_diff_eq;
use fixate::{Element, ElementGroup, FixError, FixedPoint, IterConfig, TimeSlab};

/// Test that a simple contraction converges on a single element.
///
/// RHS `f(x) = 0.5 x + 1` has fixed point `x* = 2`; starting from 0 the
/// iteration must reach it well inside the budget.
#[test]
fn contraction_converges_on_single_element() {
    let f = |u: &[f64], _t: f64, _i: usize| 0.5 * u[0] + 1.0;
    let u: Vec<f64> = Vec::new();
    let cfg = IterConfig::default().with_tol(1e-10).with_maxiter(20);
    let mut fp = FixedPoint::new(&u, &f, cfg).unwrap();
    let mut e = Element::new(0, 0.0, 1.0, 0.0);
    assert!(fp.iterate_element(&mut e));
    assert_abs_diff_eq!(e.value(), 2.0, epsilon = 1e-10);
    assert!(fp.stats().converged);
    assert!(fp.stats().element_passes < 20);
    // Convergence implies tolerance immediately after return.
    assert!(fp.residual_element(&e) < 1e-10);
}

/// Budget exhaustion on an expansive map is reported as `false`, never as an
/// error, and the level performs exactly `maxiter` outer passes.
#[test]
fn budget_is_monotone_and_nonconvergence_is_a_normal_outcome() {
    let f = |u: &[f64], _t: f64, _i: usize| 2.0 * u[0] + 1.0;
    let u: Vec<f64> = Vec::new();
    let cfg = IterConfig::default().with_tol(1e-10).with_maxiter(30);
    let mut count = 0usize;
    let mut fp = FixedPoint::new(&u, &f, cfg)
        .unwrap()
        .with_monitor(|_n, _r| count += 1);
    let mut e = Element::new(0, 0.0, 1.0, 0.0);
    assert!(!fp.iterate_element(&mut e));
    assert!(!fp.stats().converged);
    assert_eq!(fp.stats().element_passes, 30);
    drop(fp);
    assert_eq!(count, 30);
}

/// Group residual equals the L2 norm of its children's residuals, also at
/// mid-iteration snapshots.
#[test]
fn aggregate_residual_is_l2_of_children() {
    let f = |u: &[f64], _t: f64, i: usize| 0.5 * u[(i + 1) % 3] + i as f64;
    let u: Vec<f64> = Vec::new();
    let mut fp = FixedPoint::new(&u, &f, IterConfig::default()).unwrap();

    let mut group = ElementGroup::from_elements(vec![
        Element::new(0, 0.0, 1.0, 1.0),
        Element::new(1, 0.0, 1.0, -2.0),
        Element::new(2, 0.0, 1.0, 0.5),
    ]);
    let rg = fp.residual_group(&group);
    let mut sum = 0.0;
    for k in 0..3 {
        let re = fp.residual_element(&group.elements()[k]);
        sum += re * re;
    }
    assert_abs_diff_eq!(rg, sum.sqrt(), epsilon = 1e-12);

    // Stop mid-way and check the invariant again on the partial state.
    let cfg = IterConfig::default().with_tol(1e-14).with_maxiter(2);
    let mut fp = FixedPoint::new(&u, &f, cfg).unwrap();
    let _ = fp.iterate_group(&mut group);
    let rg = fp.residual_group(&group);
    let mut sum = 0.0;
    for k in 0..3 {
        let re = fp.residual_element(&group.elements()[k]);
        sum += re * re;
    }
    assert_abs_diff_eq!(rg, sum.sqrt(), epsilon = 1e-12);
}

/// Full hierarchy: a slab with two groups coupled through the RHS.
#[test]
fn slab_iteration_solves_a_coupled_system() {
    // f_i = 0.3 u_i + 0.2 u_{i+1 mod 3} + 1 has the fixed point u_i = 2.
    let f = |u: &[f64], _t: f64, i: usize| 0.3 * u[i] + 0.2 * u[(i + 1) % 3] + 1.0;
    let u: Vec<f64> = Vec::new();
    let mut fp = FixedPoint::new(&u, &f, IterConfig::default()).unwrap();

    let mut slab = TimeSlab::new(0.0, 0.1);
    slab.push(ElementGroup::from_elements(vec![
        Element::new(0, 0.0, 0.1, 0.0),
        Element::new(1, 0.0, 0.1, 0.0),
    ]));
    slab.push(ElementGroup::from_elements(vec![Element::new(2, 0.0, 0.1, 0.0)]));

    assert!(fp.iterate_slab(&mut slab));
    assert!(fp.residual_slab(&slab) < 1e-8);
    for g in slab.groups() {
        for e in g.elements() {
            assert_abs_diff_eq!(e.value(), 2.0, epsilon = 1e-6);
        }
    }
    fp.report();
}

/// An empty slab converges trivially.
#[test]
fn empty_slab_is_trivially_converged() {
    let f = |_u: &[f64], _t: f64, _i: usize| 0.0;
    let u: Vec<f64> = Vec::new();
    let mut fp = FixedPoint::new(&u, &f, IterConfig::default()).unwrap();
    let mut slab = TimeSlab::new(0.0, 1.0);
    assert!(fp.iterate_slab(&mut slab));
}

/// An RHS coupling to a component outside the iterated node reads that
/// component's zero-initialized workspace value once the extent is
/// configured; with `u[1] = 0` the map below is constant at 1.
#[test]
fn foreign_component_reads_zero_with_configured_extent() {
    let f = |u: &[f64], _t: f64, _i: usize| 0.5 * u[1] + 1.0;
    let u: Vec<f64> = Vec::new();
    let cfg = IterConfig::default().with_tol(1e-10).with_components(2);
    let mut fp = FixedPoint::new(&u, &f, cfg).unwrap();
    let mut e = Element::new(0, 0.0, 1.0, 0.0);
    assert!(fp.iterate_element(&mut e));
    assert_abs_diff_eq!(e.value(), 1.0, epsilon = 1e-10);
    // The foreign component stays untouched by the element update.
    assert!(fp.residual_element(&e) < 1e-10);
}

/// `init_*` seeds elements from the previous slab's end values and `reset_*`
/// restores them idempotently.
#[test]
fn init_seeds_from_solution_and_reset_is_idempotent() {
    let f = |u: &[f64], _t: f64, i: usize| 0.5 * u[i] + 1.0;
    let u = vec![4.0, 5.0];
    let mut fp = FixedPoint::new(&u, &f, IterConfig::default()).unwrap();

    let mut group = ElementGroup::from_elements(vec![
        Element::new(0, 0.0, 1.0, 0.0),
        Element::new(1, 0.0, 1.0, 0.0),
    ]);
    fp.init_group(&mut group);
    assert_eq!(group.elements()[0].value(), 4.0);
    assert_eq!(group.elements()[1].value(), 5.0);

    assert!(fp.iterate_group(&mut group));
    assert!(group.elements()[0].value() != 4.0);

    fp.reset_group(&mut group);
    let once: Vec<f64> = group.elements().iter().map(|e| e.value()).collect();
    fp.reset_group(&mut group);
    let twice: Vec<f64> = group.elements().iter().map(|e| e.value()).collect();
    assert_eq!(once, twice);
    assert_eq!(once, vec![4.0, 5.0]);

    // Same contract at element granularity.
    let mut e = Element::new(1, 0.0, 1.0, 0.0);
    fp.init_element(&mut e);
    assert_eq!(e.value(), 5.0);
    assert!(fp.iterate_element(&mut e));
    fp.reset_element(&mut e);
    assert_eq!(e.value(), 5.0);
}

/// Randomized diagonally dominant contraction system.
#[test]
fn random_contraction_system_converges() {
    use rand::Rng;
    let n = 12;
    let mut rng = rand::thread_rng();
    let c: Vec<f64> = (0..n).map(|_| rng.r#gen()).collect();
    let f = move |u: &[f64], _t: f64, i: usize| 0.35 * u[i] + 0.1 * u[(i + 1) % 12] + c[i];
    let u: Vec<f64> = Vec::new();
    let mut fp = FixedPoint::new(&u, &f, IterConfig::default()).unwrap();

    let mut group = ElementGroup::new();
    for i in 0..n {
        group.push(Element::new(i, 0.0, 1.0, 0.0));
    }
    assert!(fp.iterate_group(&mut group));
    assert!(fp.residual_group(&group) < 1e-8);
    for e in group.elements() {
        assert!(fp.residual_element(e) < 1e-8);
    }
}

/// Invalid configuration is rejected at construction, not mid-iteration.
#[test]
fn invalid_configuration_fails_fast() {
    let f = |u: &[f64], _t: f64, _i: usize| u[0];
    let u: Vec<f64> = Vec::new();
    let bad = IterConfig::default().with_maxiter(0);
    match FixedPoint::new(&u, &f, bad) {
        Err(FixError::InvalidConfig(_)) => {}
        _ => panic!("expected configuration rejection"),
    }
    let bad = IterConfig::default().with_tol(-1.0);
    assert!(FixedPoint::new(&u, &f, bad).is_err());
}
