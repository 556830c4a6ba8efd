// ─────────────────────────────────────────────────────────────────────
// Rayflux — Power Iteration Scenarios
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! End-to-end power iterations on problems with analytic eigenvalues.
//!
//! Reflective, homogeneous lattices behave as infinite media, where
//! `k_inf` follows from the cross sections alone. The default dead zone is
//! long enough to wash out the zero starting flux of every ray, so these
//! runs keep the default ray distances.

use ndarray::{array, Array1, Array3};
use rayflux_core::eigenvalue::{run_simulation, PowerIteration};
use rayflux_core::geometry::Lattice;
use rayflux_types::config::{BoundaryCondition, BoundaryConditions, RunConfig, SimulationParameters};
use rayflux_types::state::CrossSections;

fn infinite_medium(groups: usize, inactive: usize, active: usize) -> SimulationParameters {
    RunConfig {
        length_per_dimension: 4.0,
        n_cells_per_dimension: Some(4),
        n_rays: Some(256),
        max_intersections_per_ray: Some(512),
        n_materials: 1,
        n_energy_groups: groups,
        n_inactive_iterations: inactive,
        n_active_iterations: active,
        seed: Some(2024),
        boundary_conditions: BoundaryConditions::uniform(BoundaryCondition::Reflective),
        ..RunConfig::default()
    }
    .to_parameters()
    .expect("valid parameters")
}

/// Fast group: Σt = 1, 0.5 self-scatter, 0.3 down-scatter, νΣf = 0.1.
/// Thermal group: Σt = 2, 1.0 self-scatter, νΣf = 1.5. All births fast.
/// Balance gives φ_th/φ_fast = 0.3 and k_inf = 0.55 / 0.5 = 1.1.
fn two_group_xs() -> CrossSections {
    CrossSections::new(
        array![[1.0, 2.0]],
        array![[0.04, 0.6]],
        array![[0.1, 1.5]],
        array![[1.0, 0.0]],
        Array3::from_shape_vec((1, 2, 2), vec![0.5, 0.3, 0.0, 1.0]).expect("shape"),
    )
    .expect("valid cross sections")
}

#[test]
fn critical_absorber_converges_to_unity() {
    let params = infinite_medium(1, 3, 5);
    let lattice = Lattice::from_parameters(&params, Array1::zeros(params.n_cells)).expect("lattice");
    let xs = CrossSections::single_group(1.0, 1.0, 0.0).expect("xs");

    let result = run_simulation(&params, &lattice, &xs).expect("run");
    assert!((result.k_eff - 1.0).abs() < 1e-5, "k-eff = {}", result.k_eff);
    assert!(result.k_eff_std_dev < 1e-5);
    assert_eq!(result.n_truncated_rays, 0);
    assert!(result.n_geometric_intersections > 0);
}

/// Only the problem itself is configured; ray distances, dead zone and
/// intersection cap all come from the defaults.
fn critical_lattice_on_defaults(n_rays: usize) -> RunConfig {
    RunConfig {
        length_per_dimension: 4.0,
        n_cells_per_dimension: Some(4),
        n_rays: Some(n_rays),
        n_materials: 1,
        n_energy_groups: 1,
        n_inactive_iterations: 3,
        n_active_iterations: 5,
        seed: Some(7),
        boundary_conditions: BoundaryConditions::uniform(BoundaryCondition::Reflective),
        ..RunConfig::default()
    }
}

#[test]
fn default_ray_settings_give_unbiased_critical_k() {
    let xs = CrossSections::single_group(1.0, 1.0, 0.0).expect("xs");
    for n_rays in [64, 256, 1024] {
        let params = critical_lattice_on_defaults(n_rays)
            .to_parameters()
            .expect("valid parameters");
        assert!(params.dead_zone_distance > 0.0);
        let lattice =
            Lattice::from_parameters(&params, Array1::zeros(params.n_cells)).expect("lattice");
        let result = run_simulation(&params, &lattice, &xs).expect("run");
        assert!(
            (result.k_eff - 1.0).abs() < 1e-6,
            "{n_rays} rays: k-eff = {}",
            result.k_eff
        );
        assert_eq!(result.n_truncated_rays, 0);
    }
}

#[test]
fn zero_dead_zone_biases_k_low() {
    // Rays start with no angular flux and tally at once; over a distance D
    // in a Σt = 1 medium the flux deficit is (1 - exp(-D)) / D.
    let params = RunConfig {
        dead_zone_distance: 0.0,
        ..critical_lattice_on_defaults(256)
    }
    .to_parameters()
    .expect("valid parameters");
    let lattice = Lattice::from_parameters(&params, Array1::zeros(params.n_cells)).expect("lattice");
    let xs = CrossSections::single_group(1.0, 1.0, 0.0).expect("xs");
    let d = params.distance_per_ray;
    let biased = 1.0 - (1.0 - (-d).exp()) / d;

    let mut driver = PowerIteration::new(&params, &lattice, &xs).expect("driver");
    let first = driver.step().expect("step").expect("report");
    assert!((first.k_eff - biased).abs() < 1e-9, "first k = {}", first.k_eff);

    let result = run_simulation(&params, &lattice, &xs).expect("run");
    assert!((result.k_eff - biased).abs() < 5e-3, "k-eff = {}", result.k_eff);
    assert!(result.k_eff < 0.95);
}

#[test]
fn two_group_infinite_medium_eigenvalue() {
    let params = infinite_medium(2, 40, 5);
    let lattice = Lattice::from_parameters(&params, Array1::zeros(params.n_cells)).expect("lattice");
    let xs = two_group_xs();

    let result = run_simulation(&params, &lattice, &xs).expect("run");
    assert!((result.k_eff - 1.1).abs() < 1e-3, "k-eff = {}", result.k_eff);

    // Spectrum is flat in space with the analytic group ratio.
    for row in result.mean_scalar_flux.rows() {
        let ratio = row[1] / row[0];
        assert!((ratio - 0.3).abs() < 1e-3, "thermal/fast = {ratio}");
    }
}

#[test]
fn k_history_covers_every_iteration() {
    let params = infinite_medium(1, 4, 6);
    let lattice = Lattice::from_parameters(&params, Array1::zeros(params.n_cells)).expect("lattice");
    let xs = CrossSections::single_group(1.0, 0.6, 0.5).expect("xs");

    let result = run_simulation(&params, &lattice, &xs).expect("run");
    assert_eq!(result.k_eff_history.len(), 10);
    assert_eq!(result.n_active_iterations, 6);
    let active = &result.k_eff_history[4..];
    let mean = active.iter().sum::<f64>() / active.len() as f64;
    assert!((mean - result.k_eff).abs() < 1e-12);
    assert!(result.runtime_transport_sweep <= result.runtime_total);
}

#[test]
fn heterogeneous_run_is_reproducible() {
    let params = RunConfig {
        length_per_dimension: 6.0,
        n_cells_per_dimension: Some(6),
        n_rays: Some(300),
        distance_per_ray: 8.0,
        dead_zone_distance: 2.0,
        max_intersections_per_ray: Some(128),
        n_materials: 2,
        n_energy_groups: 1,
        n_inactive_iterations: 3,
        n_active_iterations: 3,
        seed: Some(5),
        ..RunConfig::default()
    }
    .to_parameters()
    .expect("valid parameters");
    let map: Array1<usize> = (0..params.n_cells).map(|c| (c / 6 + c % 6) % 2).collect();
    let lattice = Lattice::from_parameters(&params, map).expect("lattice");
    let xs = CrossSections::new(
        array![[0.8], [1.2]],
        array![[0.2], [0.0]],
        array![[0.5], [0.0]],
        array![[1.0], [0.0]],
        Array3::from_shape_vec((2, 1, 1), vec![0.3, 1.0]).expect("shape"),
    )
    .expect("valid cross sections");

    let a = run_simulation(&params, &lattice, &xs).expect("first run");
    let b = run_simulation(&params, &lattice, &xs).expect("second run");
    assert_eq!(a.k_eff_history, b.k_eff_history);
    assert_eq!(a.mean_scalar_flux, b.mean_scalar_flux);
    assert_eq!(a.n_geometric_intersections, b.n_geometric_intersections);

    let mut driver = PowerIteration::new(&params, &lattice, &xs).expect("driver");
    let first = driver.step().expect("step").expect("report");
    assert_eq!(first.k_eff, a.k_eff_history[0]);
}
