//! Flat-source exponential attenuation along a traced ray.
//!
//! Across a segment of length `s` in a cell with flat angular source `q`,
//! the carried angular flux relaxes towards `q`:
//!   Δψ = (ψ_in − q) · (1 − e^{−Σt·s}),   ψ_out = ψ_in − Δψ.
//! The cell tally accumulates `4π·Δψ`; together with the `4π·q` term added at
//! normalization this is the exact track-length average of ψ over the segment.

use crate::geometry::Lattice;
use crate::tracer::Intersection;
use ndarray::{ArrayView2, ArrayViewMut2};
use rayflux_types::constants::FOUR_PI;
use rayflux_types::state::CrossSections;

/// `1 − e^{−τ}` without cancellation for small optical thickness.
#[inline]
pub fn attenuation_factor(tau: f64) -> f64 {
    -(-tau).exp_m1()
}

/// Read-only inputs shared by every ray of a sweep.
#[derive(Clone, Copy)]
pub struct SweepInputs<'a> {
    pub lattice: &'a Lattice,
    pub xs: &'a CrossSections,
    pub isotropic_source: ArrayView2<'a, f64>,
    /// Leading travel distance that attenuates without tallying.
    pub dead_zone_distance: f64,
}

/// Attenuate `angular_flux` (one entry per group) along `intersections`,
/// adding each tallied segment's contribution into `tally[cell, group]`.
///
/// The carried flux is left at its outgoing value after the last segment.
pub fn attenuate_ray(
    inputs: &SweepInputs<'_>,
    intersections: &[Intersection],
    angular_flux: &mut [f64],
    tally: &mut ArrayViewMut2<'_, f64>,
) {
    let n_groups = angular_flux.len();
    let mut dead_remaining = inputs.dead_zone_distance.max(0.0);

    for segment in intersections {
        let cell = segment.cell;
        let material = inputs.lattice.material(cell);
        let dead = segment.distance.min(dead_remaining);
        let live = segment.distance - dead;
        dead_remaining -= dead;

        for g in 0..n_groups {
            let sigma_t = inputs.xs.sigma_t[[material, g]];
            let q = inputs.isotropic_source[[cell, g]];
            let mut psi = angular_flux[g];

            if dead > 0.0 {
                psi -= (psi - q) * attenuation_factor(sigma_t * dead);
            }
            if live > 0.0 {
                let delta_psi = (psi - q) * attenuation_factor(sigma_t * live);
                tally[[cell, g]] += FOUR_PI * delta_psi;
                psi -= delta_psi;
            }
            angular_flux[g] = psi;
        }
    }
}
