// ─────────────────────────────────────────────────────────────────────
// Rayflux — Cross-Section Loader
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! C5G7 multi-group cross-section directory loader.
//!
//! Each material `<MAT>` contributes `<MAT>_transport.txt` (G values) and
//! `<MAT>_scatter.txt` (G×G values, row = source group, column = target
//! group). Fissile materials add `<MAT>_nufission.txt`, `<MAT>_fission.txt`
//! and `<MAT>_chi.txt`; when these are absent the material does not fission.

use crate::text::read_values;
use log::{debug, info};
use ndarray::{Array1, Array2, Array3, Axis, ShapeError};
use rayflux_types::error::{RayfluxError, RayfluxResult};
use rayflux_types::state::CrossSections;
use std::path::Path;

/// Material order of the C5G7 benchmark; index = material id.
pub const C5G7_MATERIALS: [&str; 8] = ["UO2", "MOX_43", "MOX_70", "MOX_87", "FC", "GT", "Mod", "CR"];

/// Load `n_groups`-group cross sections for `materials` from `dir`.
pub fn load_cross_sections(
    dir: &Path,
    materials: &[&str],
    n_groups: usize,
) -> RayfluxResult<CrossSections> {
    let n_materials = materials.len();
    let mut sigma_t = Array2::zeros((n_materials, n_groups));
    let mut sigma_f = Array2::zeros((n_materials, n_groups));
    let mut nu_sigma_f = Array2::zeros((n_materials, n_groups));
    let mut chi = Array2::zeros((n_materials, n_groups));
    let mut sigma_s = Array3::zeros((n_materials, n_groups, n_groups));

    for (m, name) in materials.iter().enumerate() {
        let transport: Vec<f64> = read_values(&dir.join(format!("{name}_transport.txt")), n_groups)?;
        sigma_t.row_mut(m).assign(&Array1::from_vec(transport));

        let scatter: Vec<f64> =
            read_values(&dir.join(format!("{name}_scatter.txt")), n_groups * n_groups)?;
        sigma_s
            .index_axis_mut(Axis(0), m)
            .assign(&Array2::from_shape_vec((n_groups, n_groups), scatter).map_err(shape_error)?);

        let nufission_path = dir.join(format!("{name}_nufission.txt"));
        if !nufission_path.exists() {
            debug!("{name}: no fission data, treated as non-fissile");
            continue;
        }
        for (target, suffix) in [
            (&mut nu_sigma_f, "nufission"),
            (&mut sigma_f, "fission"),
            (&mut chi, "chi"),
        ] {
            let values: Vec<f64> = read_values(&dir.join(format!("{name}_{suffix}.txt")), n_groups)?;
            target.row_mut(m).assign(&Array1::from_vec(values));
        }
    }

    let xs = CrossSections::new(sigma_t, sigma_f, nu_sigma_f, chi, sigma_s)?;
    info!(
        "Loaded {n_groups}-group cross sections for {n_materials} materials from {}",
        dir.display()
    );
    Ok(xs)
}

/// Load the standard eight C5G7 materials.
pub fn load_c5g7(dir: &Path, n_groups: usize) -> RayfluxResult<CrossSections> {
    load_cross_sections(dir, &C5G7_MATERIALS, n_groups)
}

fn shape_error(e: ShapeError) -> RayfluxError {
    RayfluxError::ConfigError(format!("cross-section shape: {e}"))
}
