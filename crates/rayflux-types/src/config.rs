// ─────────────────────────────────────────────────────────────────────
// Rayflux — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::*;
use crate::error::{RayfluxError, RayfluxResult};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Condition applied when a ray reaches a lattice edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryCondition {
    Vacuum,
    Reflective,
    /// No boundary: only meaningful for interior cell faces.
    None,
}

/// One of the four domain edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    XNeg,
    XPos,
    YNeg,
    YPos,
}

/// Per-edge boundary conditions of the square domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryConditions {
    pub x_neg: BoundaryCondition,
    pub x_pos: BoundaryCondition,
    pub y_neg: BoundaryCondition,
    pub y_pos: BoundaryCondition,
}

impl BoundaryConditions {
    pub fn uniform(condition: BoundaryCondition) -> Self {
        Self {
            x_neg: condition,
            x_pos: condition,
            y_neg: condition,
            y_pos: condition,
        }
    }

    pub fn get(&self, edge: Edge) -> BoundaryCondition {
        match edge {
            Edge::XNeg => self.x_neg,
            Edge::XPos => self.x_pos,
            Edge::YNeg => self.y_neg,
            Edge::YPos => self.y_pos,
        }
    }

    fn validate(&self) -> RayfluxResult<()> {
        for (edge, bc) in [
            ("x-", self.x_neg),
            ("x+", self.x_pos),
            ("y-", self.y_neg),
            ("y+", self.y_pos),
        ] {
            if bc == BoundaryCondition::None {
                return Err(RayfluxError::ConfigError(format!(
                    "domain edge {edge} needs a vacuum or reflective condition"
                )));
            }
        }
        Ok(())
    }
}

/// C5G7 quarter-core layout: reflective along the symmetry planes.
impl Default for BoundaryConditions {
    fn default() -> Self {
        Self {
            x_neg: BoundaryCondition::Vacuum,
            x_pos: BoundaryCondition::Reflective,
            y_neg: BoundaryCondition::Reflective,
            y_pos: BoundaryCondition::Vacuum,
        }
    }
}

/// Canned problem sizes with fixed seeds for regression runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationProblem {
    Small,
    Medium,
    Large,
}

impl ValidationProblem {
    /// (problem size multiplier, inactive iterations, active iterations, seed)
    pub fn preset(self) -> (usize, usize, usize, u64) {
        match self {
            ValidationProblem::Small => (1, 10, 10, 42),
            ValidationProblem::Medium => (4, 100, 100, 2001),
            ValidationProblem::Large => (16, 1000, 1000, 123_456_789),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValidationProblem::Small => "small",
            ValidationProblem::Medium => "medium",
            ValidationProblem::Large => "large",
        }
    }
}

impl std::str::FromStr for ValidationProblem {
    type Err = RayfluxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(ValidationProblem::Small),
            "medium" => Ok(ValidationProblem::Medium),
            "large" => Ok(ValidationProblem::Large),
            other => Err(RayfluxError::ConfigError(format!(
                "unknown validation problem '{other}' (expected small, medium or large)"
            ))),
        }
    }
}

/// User-facing run configuration. Maps 1:1 to the JSON config schema;
/// every field is optional in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub length_per_dimension: f64,
    /// Tallied travel of each ray per sweep [cm].
    pub distance_per_ray: f64,
    /// Untallied travel ahead of `distance_per_ray` [cm]; the ray only
    /// attenuates its angular flux along it.
    pub dead_zone_distance: f64,
    pub n_inactive_iterations: usize,
    pub n_active_iterations: usize,
    pub n_materials: usize,
    pub n_energy_groups: usize,
    pub problem_size_multiplier: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_cells_per_dimension: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_intersections_per_ray: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_rays: Option<usize>,
    /// Falls back to wall-clock seconds when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub boundary_conditions: BoundaryConditions,
    pub plotting_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_problem: Option<ValidationProblem>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            length_per_dimension: DEFAULT_LENGTH_PER_DIMENSION,
            distance_per_ray: DEFAULT_DISTANCE_PER_RAY,
            dead_zone_distance: DEFAULT_DEAD_ZONE_DISTANCE,
            n_inactive_iterations: DEFAULT_INACTIVE_ITERATIONS,
            n_active_iterations: DEFAULT_ACTIVE_ITERATIONS,
            n_materials: DEFAULT_N_MATERIALS,
            n_energy_groups: DEFAULT_N_ENERGY_GROUPS,
            problem_size_multiplier: DEFAULT_PROBLEM_SIZE_MULTIPLIER,
            n_cells_per_dimension: None,
            max_intersections_per_ray: None,
            n_rays: None,
            seed: None,
            boundary_conditions: BoundaryConditions::default(),
            plotting_enabled: false,
            validation_problem: None,
        }
    }
}

impl RunConfig {
    /// Load from a JSON file.
    pub fn from_file(path: &str) -> RayfluxResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Overwrite size, iteration counts and seed with a validation preset.
    pub fn apply_validation_problem(&mut self, problem: ValidationProblem) {
        let (multiplier, inactive, active, seed) = problem.preset();
        self.validation_problem = Some(problem);
        self.problem_size_multiplier = multiplier;
        self.n_inactive_iterations = inactive;
        self.n_active_iterations = active;
        self.seed = Some(seed);
        self.n_cells_per_dimension = None;
        self.max_intersections_per_ray = None;
    }

    /// Validate and derive the immutable per-run parameters.
    pub fn to_parameters(&self) -> RayfluxResult<SimulationParameters> {
        let mut cfg = self.clone();
        if let Some(problem) = cfg.validation_problem {
            cfg.apply_validation_problem(problem);
        }

        if cfg.problem_size_multiplier == 0 {
            return Err(RayfluxError::ConfigError(
                "problem_size_multiplier must be >= 1".to_string(),
            ));
        }
        if !cfg.length_per_dimension.is_finite() || cfg.length_per_dimension <= 0.0 {
            return Err(RayfluxError::ConfigError(format!(
                "length_per_dimension must be finite > 0, got {}",
                cfg.length_per_dimension
            )));
        }
        if !cfg.distance_per_ray.is_finite() || cfg.distance_per_ray <= 0.0 {
            return Err(RayfluxError::ConfigError(format!(
                "distance_per_ray must be finite > 0, got {}",
                cfg.distance_per_ray
            )));
        }
        if !cfg.dead_zone_distance.is_finite() || cfg.dead_zone_distance < 0.0 {
            return Err(RayfluxError::ConfigError(format!(
                "dead_zone_distance must be finite >= 0, got {}",
                cfg.dead_zone_distance
            )));
        }
        if cfg.n_materials == 0 || cfg.n_energy_groups == 0 {
            return Err(RayfluxError::ConfigError(
                "n_materials and n_energy_groups must be >= 1".to_string(),
            ));
        }
        if cfg.n_inactive_iterations + cfg.n_active_iterations == 0 {
            return Err(RayfluxError::ConfigError(
                "at least one power iteration is required".to_string(),
            ));
        }
        cfg.boundary_conditions.validate()?;

        let m = cfg.problem_size_multiplier;
        let travel_distance_per_ray = cfg.dead_zone_distance + cfg.distance_per_ray;
        let n_cells_per_dimension = cfg
            .n_cells_per_dimension
            .unwrap_or(CELLS_PER_DIMENSION_PER_MULTIPLIER * m);
        // The default cap grows with the travel budget in whole reference rays.
        let travel_scale =
            (travel_distance_per_ray / DEFAULT_DISTANCE_PER_RAY).ceil().max(1.0) as usize;
        let max_intersections_per_ray = cfg
            .max_intersections_per_ray
            .unwrap_or(INTERSECTIONS_PER_MULTIPLIER * m * travel_scale);
        let n_rays = cfg.n_rays.unwrap_or(RAYS_PER_MULTIPLIER * m + RAYS_BASE);
        if n_cells_per_dimension == 0 || max_intersections_per_ray == 0 || n_rays == 0 {
            return Err(RayfluxError::ConfigError(format!(
                "cells per dimension ({n_cells_per_dimension}), intersection cap \
                 ({max_intersections_per_ray}) and ray count ({n_rays}) must all be >= 1"
            )));
        }

        let seed = cfg.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        });

        let n_cells = n_cells_per_dimension * n_cells_per_dimension;
        let cell_width = cfg.length_per_dimension / n_cells_per_dimension as f64;
        let total_track_length = cfg.distance_per_ray * n_rays as f64;

        Ok(SimulationParameters {
            n_cells_per_dimension,
            n_cells,
            length_per_dimension: cfg.length_per_dimension,
            cell_width,
            inverse_cell_width: 1.0 / cell_width,
            inverse_length_per_dimension: 1.0 / cfg.length_per_dimension,
            n_rays,
            distance_per_ray: cfg.distance_per_ray,
            dead_zone_distance: cfg.dead_zone_distance,
            travel_distance_per_ray,
            max_intersections_per_ray,
            n_materials: cfg.n_materials,
            n_energy_groups: cfg.n_energy_groups,
            n_inactive_iterations: cfg.n_inactive_iterations,
            n_active_iterations: cfg.n_active_iterations,
            n_iterations: cfg.n_inactive_iterations + cfg.n_active_iterations,
            seed,
            cell_expected_track_length: total_track_length / n_cells as f64,
            inverse_total_track_length: 1.0 / total_track_length,
            cell_volume: 1.0 / n_cells as f64,
            boundary_conditions: cfg.boundary_conditions,
            plotting_enabled: cfg.plotting_enabled,
            validation_problem: cfg.validation_problem,
        })
    }
}

/// Immutable run parameters, derived once by [`RunConfig::to_parameters`].
#[derive(Debug, Clone, Serialize)]
pub struct SimulationParameters {
    pub n_cells_per_dimension: usize,
    pub n_cells: usize,
    pub length_per_dimension: f64,
    pub cell_width: f64,
    pub inverse_cell_width: f64,
    pub inverse_length_per_dimension: f64,
    pub n_rays: usize,
    pub distance_per_ray: f64,
    pub dead_zone_distance: f64,
    /// Full travel budget of a ray: dead zone plus tallied distance [cm].
    pub travel_distance_per_ray: f64,
    pub max_intersections_per_ray: usize,
    pub n_materials: usize,
    pub n_energy_groups: usize,
    pub n_inactive_iterations: usize,
    pub n_active_iterations: usize,
    pub n_iterations: usize,
    pub seed: u64,
    /// Tallied track length each cell receives on average per sweep [cm].
    pub cell_expected_track_length: f64,
    pub inverse_total_track_length: f64,
    /// Fraction of the domain occupied by one cell.
    pub cell_volume: f64,
    pub boundary_conditions: BoundaryConditions,
    pub plotting_enabled: bool,
    pub validation_problem: Option<ValidationProblem>,
}

impl SimulationParameters {
    /// Approximate resident bytes of the run with `n_workers` sweep blocks.
    ///
    /// Shared state is the four `[cell, group]` flux and source arrays, the
    /// material map and the cross sections. Each sweep block adds a private
    /// `[cell, group]` partial tally, one reusable trace buffer of
    /// `max_intersections_per_ray` entries and one angular flux vector.
    pub fn estimate_memory_usage(&self, n_workers: usize) -> usize {
        let f = std::mem::size_of::<f64>();
        let cell_groups = self.n_cells * self.n_energy_groups;
        let flux_state = 4 * cell_groups * f;
        let material_map = self.n_cells * std::mem::size_of::<usize>();
        let xs = self.n_materials * self.n_energy_groups * (4 + self.n_energy_groups) * f;
        // Cell index, distance and the padded vacuum flag.
        let intersection = std::mem::size_of::<usize>() + f + std::mem::size_of::<u64>();
        let per_worker = cell_groups * f
            + self.max_intersections_per_ray * intersection
            + self.n_energy_groups * f;
        flux_state + material_map + xs + n_workers.max(1) * per_worker
    }
}
