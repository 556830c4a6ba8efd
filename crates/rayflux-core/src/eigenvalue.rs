// ─────────────────────────────────────────────────────────────────────
// Rayflux — Power Iteration
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! k-eigenvalue power iteration driver.
//!
//! Each iteration runs, in order:
//! 1. source update from the previous flux and the current k-eff
//! 2. transport sweep over all rays
//! 3. flux normalization (and accumulation when active)
//! 4. k-eff update `k ← k · F_new / F_old` from total fission production
//! 5. k-eff statistics (active iterations only)
//!
//! The first `n_inactive_iterations` iterations converge the fission source;
//! the remaining `n_active_iterations` collect statistics.

use crate::attenuation::SweepInputs;
use crate::geometry::Lattice;
use crate::normalization::normalize_scalar_flux;
use crate::sampler::iteration_seed;
use crate::source::{total_fission_source, update_isotropic_sources};
use crate::statistics::KeffStatistics;
use crate::sweep::{transport_sweep, RaySettings, SweepStats, SweepWorkspace};
use log::{debug, info, warn};
use ndarray::Array2;
use rayflux_types::config::SimulationParameters;
use rayflux_types::constants::MISS_RATE_WARNING_PERCENT;
use rayflux_types::error::{RayfluxError, RayfluxResult};
use rayflux_types::state::{CellFluxState, CrossSections};
use std::time::{Duration, Instant};

/// Initial eigenvalue guess.
const INITIAL_K_EFF: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Burn-in: flux is not accumulated, k is not averaged.
    Inactive,
    /// Statistics-collecting iterations.
    Active,
    /// Iteration budget exhausted.
    Finished,
}

/// Outcome of one power iteration.
#[derive(Debug, Clone, Copy)]
pub struct IterationReport {
    pub iteration: usize,
    pub phase: Phase,
    pub k_eff: f64,
    pub k_eff_mean: f64,
    pub k_eff_std_dev: f64,
    pub sweep: SweepStats,
}

/// Final products of a run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub k_eff: f64,
    pub k_eff_std_dev: f64,
    pub k_eff_history: Vec<f64>,
    pub runtime_total: Duration,
    pub runtime_transport_sweep: Duration,
    pub n_iterations: usize,
    pub n_active_iterations: usize,
    pub n_geometric_intersections: u64,
    pub n_truncated_rays: usize,
    /// Accumulated flux divided by the active iteration count, `[cell, group]`.
    pub mean_scalar_flux: Array2<f64>,
}

/// Power iteration state machine over one problem.
pub struct PowerIteration<'a> {
    params: &'a SimulationParameters,
    lattice: &'a Lattice,
    xs: &'a CrossSections,
    state: CellFluxState,
    workspace: SweepWorkspace,
    k_eff: f64,
    fission_source: f64,
    iteration: usize,
    statistics: KeffStatistics,
    k_eff_history: Vec<f64>,
    sweep_time: Duration,
    n_geometric_intersections: u64,
    n_truncated_rays: usize,
}

impl<'a> PowerIteration<'a> {
    /// Check that lattice, cross sections and parameters describe the same
    /// problem, and seed the iteration with a flat unit flux.
    pub fn new(
        params: &'a SimulationParameters,
        lattice: &'a Lattice,
        xs: &'a CrossSections,
    ) -> RayfluxResult<Self> {
        if lattice.n_cells() != params.n_cells {
            return Err(RayfluxError::DimensionMismatch {
                what: "lattice cells".to_string(),
                expected: params.n_cells,
                found: lattice.n_cells(),
            });
        }
        if xs.n_groups() != params.n_energy_groups {
            return Err(RayfluxError::DimensionMismatch {
                what: "energy groups".to_string(),
                expected: params.n_energy_groups,
                found: xs.n_groups(),
            });
        }
        if xs.n_materials() != params.n_materials {
            return Err(RayfluxError::DimensionMismatch {
                what: "materials".to_string(),
                expected: params.n_materials,
                found: xs.n_materials(),
            });
        }
        if let Some((cell, &material)) = lattice
            .material_ids()
            .iter()
            .enumerate()
            .find(|(_, &m)| m >= xs.n_materials())
        {
            return Err(RayfluxError::InvalidMaterial {
                cell,
                material,
                n_materials: xs.n_materials(),
            });
        }

        let state = CellFluxState::new(params.n_cells, params.n_energy_groups);
        let fission_source =
            total_fission_source(lattice, xs, &state.scalar_flux, params.cell_volume);
        if !(fission_source.is_finite() && fission_source > 0.0) {
            return Err(RayfluxError::PhysicsViolation(
                "lattice contains no fissile material; k-eff is undefined".to_string(),
            ));
        }

        if params.dead_zone_distance == 0.0 {
            warn!(
                "dead_zone_distance is 0: rays tally from zero angular flux and k-eff is \
                 biased low by up to 1/(sigma_t * {:.2} cm)",
                params.distance_per_ray
            );
        }
        let workspace = SweepWorkspace::for_current_pool(
            params.n_cells,
            params.n_energy_groups,
            params.max_intersections_per_ray,
        );
        debug!(
            "{} sweep blocks, {:.2} MB estimated",
            workspace.n_blocks(),
            params.estimate_memory_usage(workspace.n_blocks()) as f64 / 1024.0 / 1024.0
        );

        Ok(Self {
            params,
            lattice,
            xs,
            state,
            workspace,
            k_eff: INITIAL_K_EFF,
            fission_source,
            iteration: 0,
            statistics: KeffStatistics::new(),
            k_eff_history: Vec::with_capacity(params.n_iterations),
            sweep_time: Duration::ZERO,
            n_geometric_intersections: 0,
            n_truncated_rays: 0,
        })
    }

    /// Phase of the next iteration to run.
    pub fn phase(&self) -> Phase {
        if self.iteration >= self.params.n_iterations {
            Phase::Finished
        } else if self.iteration < self.params.n_inactive_iterations {
            Phase::Inactive
        } else {
            Phase::Active
        }
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn k_eff(&self) -> f64 {
        self.k_eff
    }

    pub fn statistics(&self) -> &KeffStatistics {
        &self.statistics
    }

    pub fn state(&self) -> &CellFluxState {
        &self.state
    }

    /// Run one iteration. Returns `None` once the budget is exhausted.
    pub fn step(&mut self) -> RayfluxResult<Option<IterationReport>> {
        let phase = self.phase();
        if phase == Phase::Finished {
            return Ok(None);
        }
        let active = phase == Phase::Active;
        let params = self.params;

        update_isotropic_sources(
            self.lattice,
            self.xs,
            &self.state.scalar_flux,
            &mut self.state.isotropic_source,
            self.k_eff,
        );

        let inputs = SweepInputs {
            lattice: self.lattice,
            xs: self.xs,
            isotropic_source: self.state.isotropic_source.view(),
            dead_zone_distance: params.dead_zone_distance,
        };
        let rays = RaySettings {
            n_rays: params.n_rays,
            seed: iteration_seed(params.seed, self.iteration),
            travel_distance: params.travel_distance_per_ray,
            max_intersections_per_ray: params.max_intersections_per_ray,
        };
        let sweep_start = Instant::now();
        let sweep = transport_sweep(
            &inputs,
            &rays,
            &mut self.workspace,
            &mut self.state.new_scalar_flux,
        );
        self.sweep_time += sweep_start.elapsed();
        self.n_geometric_intersections += sweep.n_intersections;
        self.n_truncated_rays += sweep.n_truncated;

        normalize_scalar_flux(
            self.lattice,
            self.xs,
            &mut self.state.new_scalar_flux,
            &self.state.isotropic_source,
            &mut self.state.scalar_flux_accumulator,
            params.cell_expected_track_length,
            active,
        );

        let new_fission_source = total_fission_source(
            self.lattice,
            self.xs,
            &self.state.new_scalar_flux,
            params.cell_volume,
        );
        let k_new = self.k_eff * new_fission_source / self.fission_source;
        if !(k_new.is_finite() && k_new > 0.0) {
            return Err(RayfluxError::PhysicsViolation(format!(
                "k-eff became {k_new} at iteration {} (fission source {} -> {})",
                self.iteration, self.fission_source, new_fission_source
            )));
        }
        debug!(
            "iteration {}: fission source {:.6e} -> {:.6e}, {} intersections, {} vacuum exits",
            self.iteration,
            self.fission_source,
            new_fission_source,
            sweep.n_intersections,
            sweep.n_vacuum_exits
        );

        self.k_eff = k_new;
        self.fission_source = new_fission_source;
        std::mem::swap(&mut self.state.scalar_flux, &mut self.state.new_scalar_flux);

        if active {
            self.statistics.push(k_new);
        }
        self.k_eff_history.push(k_new);

        let report = IterationReport {
            iteration: self.iteration,
            phase,
            k_eff: k_new,
            k_eff_mean: self.statistics.mean(),
            k_eff_std_dev: self.statistics.std_dev(),
            sweep,
        };
        log_status(&report);
        self.iteration += 1;
        Ok(Some(report))
    }

    /// Run all remaining iterations and collect the results.
    pub fn run(mut self) -> RayfluxResult<SimulationResult> {
        let start = Instant::now();
        while self.step()?.is_some() {}
        let runtime_total = start.elapsed();

        Ok(SimulationResult {
            k_eff: self.statistics.mean(),
            k_eff_std_dev: self.statistics.std_dev(),
            k_eff_history: self.k_eff_history,
            runtime_total,
            runtime_transport_sweep: self.sweep_time,
            n_iterations: self.params.n_iterations,
            n_active_iterations: self.params.n_active_iterations,
            n_geometric_intersections: self.n_geometric_intersections,
            n_truncated_rays: self.n_truncated_rays,
            mean_scalar_flux: self
                .state
                .mean_scalar_flux(self.params.n_active_iterations),
        })
    }
}

fn log_status(report: &IterationReport) {
    let miss_rate = report.sweep.miss_rate_percent();
    let active_info = match report.phase {
        Phase::Active => format!(
            "k-avg = {:.5} +/- {:.5}",
            report.k_eff_mean, report.k_eff_std_dev
        ),
        _ => "Inactive".to_string(),
    };
    info!(
        "Iter {:5}   k = {:.5}   Miss Rate = {:.2e}   {}",
        report.iteration,
        report.k_eff,
        miss_rate / 100.0,
        active_info
    );
    if miss_rate > MISS_RATE_WARNING_PERCENT {
        warn!(
            "{} of {} rays hit the intersection cap ({:.3}%); raise max_intersections_per_ray",
            report.sweep.n_truncated, report.sweep.n_rays, miss_rate
        );
    }
}

/// Build the driver and run it to completion.
pub fn run_simulation(
    params: &SimulationParameters,
    lattice: &Lattice,
    xs: &CrossSections,
) -> RayfluxResult<SimulationResult> {
    PowerIteration::new(params, lattice, xs)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayflux_types::config::{BoundaryCondition, BoundaryConditions, RunConfig};

    fn params(inactive: usize, active: usize) -> SimulationParameters {
        RunConfig {
            length_per_dimension: 4.0,
            n_cells_per_dimension: Some(4),
            n_rays: Some(200),
            distance_per_ray: 10.0,
            dead_zone_distance: 10.0,
            max_intersections_per_ray: Some(256),
            n_materials: 1,
            n_energy_groups: 1,
            n_inactive_iterations: inactive,
            n_active_iterations: active,
            seed: Some(11),
            boundary_conditions: BoundaryConditions::uniform(BoundaryCondition::Reflective),
            ..RunConfig::default()
        }
        .to_parameters()
        .expect("valid parameters")
    }

    fn lattice(p: &SimulationParameters) -> Lattice {
        Lattice::homogeneous(
            p.n_cells_per_dimension,
            p.length_per_dimension,
            p.boundary_conditions,
        )
        .expect("valid lattice")
    }

    #[test]
    fn test_phase_transitions() {
        let p = params(2, 3);
        let lat = lattice(&p);
        let xs = CrossSections::single_group(1.0, 1.0, 0.0).expect("valid");
        let mut driver = PowerIteration::new(&p, &lat, &xs).expect("driver");
        let mut phases = Vec::new();
        while let Some(report) = driver.step().expect("step") {
            phases.push(report.phase);
        }
        assert_eq!(
            phases,
            vec![
                Phase::Inactive,
                Phase::Inactive,
                Phase::Active,
                Phase::Active,
                Phase::Active
            ]
        );
        assert_eq!(driver.phase(), Phase::Finished);
        assert_eq!(driver.statistics().count(), 3);
    }

    #[test]
    fn test_accumulator_untouched_while_inactive() {
        let p = params(2, 2);
        let lat = lattice(&p);
        let xs = CrossSections::single_group(1.0, 1.0, 0.0).expect("valid");
        let mut driver = PowerIteration::new(&p, &lat, &xs).expect("driver");
        driver.step().expect("step");
        driver.step().expect("step");
        assert!(driver.state().scalar_flux_accumulator.iter().all(|&v| v == 0.0));

        driver.step().expect("step");
        let after_first = driver.state().scalar_flux_accumulator.clone();
        assert!(after_first.iter().all(|&v| v > 0.0));
        driver.step().expect("step");
        let after_second = &driver.state().scalar_flux_accumulator;
        assert!(after_second
            .iter()
            .zip(after_first.iter())
            .all(|(b, a)| b > a));
    }

    #[test]
    fn test_non_fissile_problem_rejected() {
        let p = params(1, 1);
        let lat = lattice(&p);
        let xs = CrossSections::single_group(1.0, 0.0, 0.5).expect("valid");
        assert!(matches!(
            PowerIteration::new(&p, &lat, &xs),
            Err(RayfluxError::PhysicsViolation(_))
        ));
    }

    #[test]
    fn test_group_mismatch_rejected() {
        let p = params(1, 1);
        let lat = lattice(&p);
        let xs = CrossSections::new(
            Array2::ones((1, 2)),
            Array2::ones((1, 2)),
            Array2::ones((1, 2)),
            Array2::ones((1, 2)),
            ndarray::Array3::zeros((1, 2, 2)),
        )
        .expect("valid");
        assert!(matches!(
            PowerIteration::new(&p, &lat, &xs),
            Err(RayfluxError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_scattering_half_gives_k_two() {
        // k_inf = νΣf / (Σt − Σs) = 1.0 / 0.5.
        let p = params(24, 4);
        let lat = lattice(&p);
        let xs = CrossSections::single_group(1.0, 1.0, 0.5).expect("valid");
        let result = run_simulation(&p, &lat, &xs).expect("run");
        assert!(
            (result.k_eff - 2.0).abs() < 1e-3,
            "k-eff = {} (expected 2.0)",
            result.k_eff
        );
        assert_eq!(result.k_eff_history.len(), 28);
        assert_eq!(result.mean_scalar_flux.dim(), (16, 1));
    }
}
