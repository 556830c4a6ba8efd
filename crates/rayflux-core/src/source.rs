//! Per-cell isotropic emission source for the next sweep.
//!
//! The scattering plus k-scaled fission emission density is stored in flat
//! angular units, i.e. divided by `4π·Σt`, which is the level the carried
//! angular flux relaxes to inside the cell.

use crate::geometry::Lattice;
use ndarray::{Array2, ArrayView1, Axis};
use rayflux_types::constants::FOUR_PI;
use rayflux_types::state::CrossSections;
use rayon::prelude::*;

/// Fission neutron production `Σ_g νΣf[m, g]·φ[g]` for one cell's flux row.
pub fn fission_production(xs: &CrossSections, material: usize, flux: ArrayView1<'_, f64>) -> f64 {
    xs.nu_sigma_f
        .row(material)
        .iter()
        .zip(flux.iter())
        .map(|(nu_sigma_f, phi)| nu_sigma_f * phi)
        .sum()
}

/// Emission density of group `g`: in-scatter from every group plus the
/// fission spectrum share of `fission / k_eff`.
fn emission_density(
    xs: &CrossSections,
    material: usize,
    group: usize,
    flux: ArrayView1<'_, f64>,
    fission_over_k: f64,
) -> f64 {
    let scatter: f64 = xs
        .sigma_s
        .index_axis(Axis(0), material)
        .column(group)
        .iter()
        .zip(flux.iter())
        .map(|(sigma_s, phi)| sigma_s * phi)
        .sum();
    scatter + xs.chi[[material, group]] * fission_over_k
}

/// Recompute `isotropic_source` from the previous iteration's flux.
pub fn update_isotropic_sources(
    lattice: &Lattice,
    xs: &CrossSections,
    scalar_flux: &Array2<f64>,
    isotropic_source: &mut Array2<f64>,
    k_eff: f64,
) {
    let inverse_k_eff = 1.0 / k_eff;
    isotropic_source
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(scalar_flux.axis_iter(Axis(0)).into_par_iter())
        .enumerate()
        .for_each(|(cell, (mut source_row, flux_row))| {
            let material = lattice.material(cell);
            let fission_over_k = fission_production(xs, material, flux_row) * inverse_k_eff;
            for (g, q) in source_row.iter_mut().enumerate() {
                let emission = emission_density(xs, material, g, flux_row, fission_over_k);
                let value = emission / (FOUR_PI * xs.sigma_t[[material, g]]);
                *q = if value.is_finite() { value } else { 0.0 };
            }
        });
}

/// Domain-total fission production of a flux estimate (uniform cell volumes).
pub fn total_fission_source(
    lattice: &Lattice,
    xs: &CrossSections,
    scalar_flux: &Array2<f64>,
    cell_volume: f64,
) -> f64 {
    let total: f64 = scalar_flux
        .axis_iter(Axis(0))
        .into_par_iter()
        .enumerate()
        .map(|(cell, flux_row)| fission_production(xs, lattice.material(cell), flux_row))
        .sum();
    total * cell_volume
}
