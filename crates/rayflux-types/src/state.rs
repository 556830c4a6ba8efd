// ─────────────────────────────────────────────────────────────────────
// Rayflux — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{RayfluxError, RayfluxResult};
use ndarray::{Array2, Array3};

/// Multi-group macroscopic cross sections for every material.
///
/// Group arrays are `[material, group]`; the scattering matrix is
/// `[material, from_group, to_group]`.
#[derive(Debug, Clone)]
pub struct CrossSections {
    pub sigma_t: Array2<f64>,
    pub sigma_f: Array2<f64>,
    pub nu_sigma_f: Array2<f64>,
    pub chi: Array2<f64>,
    pub sigma_s: Array3<f64>,
}

impl CrossSections {
    /// Build a cross-section set, checking shapes and values.
    pub fn new(
        sigma_t: Array2<f64>,
        sigma_f: Array2<f64>,
        nu_sigma_f: Array2<f64>,
        chi: Array2<f64>,
        sigma_s: Array3<f64>,
    ) -> RayfluxResult<Self> {
        let (n_materials, n_groups) = sigma_t.dim();
        if n_materials == 0 || n_groups == 0 {
            return Err(RayfluxError::ConfigError(
                "cross sections need at least one material and one group".to_string(),
            ));
        }
        for (name, arr) in [("sigma_f", &sigma_f), ("nu_sigma_f", &nu_sigma_f), ("chi", &chi)] {
            if arr.dim() != (n_materials, n_groups) {
                return Err(RayfluxError::DimensionMismatch {
                    what: name.to_string(),
                    expected: n_materials * n_groups,
                    found: arr.len(),
                });
            }
        }
        if sigma_s.dim() != (n_materials, n_groups, n_groups) {
            return Err(RayfluxError::DimensionMismatch {
                what: "sigma_s".to_string(),
                expected: n_materials * n_groups * n_groups,
                found: sigma_s.len(),
            });
        }

        let all = sigma_t
            .iter()
            .chain(sigma_f.iter())
            .chain(nu_sigma_f.iter())
            .chain(chi.iter())
            .chain(sigma_s.iter());
        for &v in all {
            if !v.is_finite() || v < 0.0 {
                return Err(RayfluxError::PhysicsViolation(format!(
                    "cross sections must be finite and >= 0, got {v}"
                )));
            }
        }

        Ok(Self {
            sigma_t,
            sigma_f,
            nu_sigma_f,
            chi,
            sigma_s,
        })
    }

    /// One-group, one-material set with the given total, nu-fission and
    /// self-scatter cross sections (all fission neutrons born in the group).
    pub fn single_group(sigma_t: f64, nu_sigma_f: f64, sigma_s: f64) -> RayfluxResult<Self> {
        Self::new(
            Array2::from_elem((1, 1), sigma_t),
            Array2::from_elem((1, 1), nu_sigma_f),
            Array2::from_elem((1, 1), nu_sigma_f),
            Array2::from_elem((1, 1), 1.0),
            Array3::from_elem((1, 1, 1), sigma_s),
        )
    }

    pub fn n_materials(&self) -> usize {
        self.sigma_t.nrows()
    }

    pub fn n_groups(&self) -> usize {
        self.sigma_t.ncols()
    }

    pub fn is_fissile(&self, material: usize) -> bool {
        self.nu_sigma_f.row(material).iter().any(|&v| v > 0.0)
    }
}

/// Per-cell, per-group flux and source state. All arrays are `[cell, group]`.
#[derive(Debug, Clone)]
pub struct CellFluxState {
    /// Normalized flux of the previous iteration; feeds the source update.
    pub scalar_flux: Array2<f64>,
    /// Raw track-length tally of the current sweep, normalized in place.
    pub new_scalar_flux: Array2<f64>,
    /// Flat angular emission density of the current iteration.
    pub isotropic_source: Array2<f64>,
    /// Running sum of normalized flux over active iterations.
    pub scalar_flux_accumulator: Array2<f64>,
}

impl CellFluxState {
    /// Flat unit flux guess, zero tallies and sources.
    pub fn new(n_cells: usize, n_groups: usize) -> Self {
        Self {
            scalar_flux: Array2::ones((n_cells, n_groups)),
            new_scalar_flux: Array2::zeros((n_cells, n_groups)),
            isotropic_source: Array2::zeros((n_cells, n_groups)),
            scalar_flux_accumulator: Array2::zeros((n_cells, n_groups)),
        }
    }

    pub fn n_cells(&self) -> usize {
        self.scalar_flux.nrows()
    }

    pub fn n_groups(&self) -> usize {
        self.scalar_flux.ncols()
    }

    /// Mean flux over `n_active` active iterations.
    pub fn mean_scalar_flux(&self, n_active: usize) -> Array2<f64> {
        if n_active == 0 {
            return Array2::zeros(self.scalar_flux_accumulator.dim());
        }
        &self.scalar_flux_accumulator / n_active as f64
    }
}
