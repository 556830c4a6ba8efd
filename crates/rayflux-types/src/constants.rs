// ─────────────────────────────────────────────────────────────────────
// Rayflux — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Isotropic angular-to-scalar flux normalization (4π).
pub const FOUR_PI: f64 = 4.0 * std::f64::consts::PI;

/// Direction components smaller than this are treated as parallel to the axis.
pub const DIRECTION_EPSILON: f64 = 1e-12;

/// Side length of the C5G7 2D benchmark domain [cm].
pub const DEFAULT_LENGTH_PER_DIMENSION: f64 = 64.26;

/// Tallied distance of each ray per sweep [cm].
pub const DEFAULT_DISTANCE_PER_RAY: f64 = 10.0;

/// Untallied lead-in travelled by each ray before it tallies [cm]. Rays
/// start with zero angular flux; after this distance the start-up error is
/// damped by `exp(-sigma_t * 20)`.
pub const DEFAULT_DEAD_ZONE_DISTANCE: f64 = 20.0;

pub const DEFAULT_INACTIVE_ITERATIONS: usize = 10;
pub const DEFAULT_ACTIVE_ITERATIONS: usize = 10;

/// C5G7: UO2, three MOX enrichments, fission chamber, guide tube, moderator, control rod.
pub const DEFAULT_N_MATERIALS: usize = 8;
pub const DEFAULT_N_ENERGY_GROUPS: usize = 7;

pub const DEFAULT_PROBLEM_SIZE_MULTIPLIER: usize = 16;

/// Cells per dimension at multiplier 1 (17x17 pins x 6 cells per pin).
pub const CELLS_PER_DIMENSION_PER_MULTIPLIER: usize = 102;

/// Intersection cap per ray at multiplier 1, per `DEFAULT_DISTANCE_PER_RAY`
/// of travel.
pub const INTERSECTIONS_PER_MULTIPLIER: usize = 30;

/// Default ray count is `RAYS_PER_MULTIPLIER * m + RAYS_BASE`.
pub const RAYS_PER_MULTIPLIER: usize = 6170;
pub const RAYS_BASE: usize = 1955;

/// Miss rates above this percentage are reported as warnings.
pub const MISS_RATE_WARNING_PERCENT: f64 = 0.01;

/// Iterations assumed for a fully converged production run.
pub const ITERATIONS_TO_CONVERGE: f64 = 2000.0;
