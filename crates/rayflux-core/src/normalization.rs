//! Conversion of the raw sweep tally into a scalar flux estimate.

use crate::geometry::Lattice;
use ndarray::{Array2, Axis};
use rayflux_types::constants::FOUR_PI;
use rayflux_types::state::CrossSections;
use rayon::prelude::*;

/// Normalize one tally entry.
///
/// The raw track-length tally is divided by `Σt·L_expected` (zeroed if that
/// is not finite), then the flat-source term `4π·q` is added.
#[inline]
pub fn normalize_entry(raw_tally: f64, sigma_t: f64, expected_track_length: f64, source: f64) -> f64 {
    let mut phi = raw_tally / (sigma_t * expected_track_length);
    if !phi.is_finite() {
        phi = 0.0;
    }
    phi + FOUR_PI * source
}

/// Normalize `new_scalar_flux` in place and, for an active iteration, fold
/// strictly positive results into `accumulator`.
pub fn normalize_scalar_flux(
    lattice: &Lattice,
    xs: &CrossSections,
    new_scalar_flux: &mut Array2<f64>,
    isotropic_source: &Array2<f64>,
    accumulator: &mut Array2<f64>,
    expected_track_length: f64,
    active: bool,
) {
    new_scalar_flux
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(isotropic_source.axis_iter(Axis(0)).into_par_iter())
        .zip(accumulator.axis_iter_mut(Axis(0)).into_par_iter())
        .enumerate()
        .for_each(|(cell, ((mut flux_row, source_row), mut acc_row))| {
            let material = lattice.material(cell);
            for g in 0..flux_row.len() {
                let phi = normalize_entry(
                    flux_row[g],
                    xs.sigma_t[[material, g]],
                    expected_track_length,
                    source_row[g],
                );
                flux_row[g] = phi;
                if active && phi > 0.0 {
                    acc_row[g] += phi;
                }
            }
        });
}
