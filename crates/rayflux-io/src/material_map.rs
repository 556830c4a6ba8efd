//! Cell material maps, `material_ids_<N>.txt`: N² material ids, row by row
//! starting at `y = 0`, matching `cell = y·N + x`.

use crate::text::read_values;
use log::info;
use ndarray::Array1;
use rayflux_types::error::{RayfluxError, RayfluxResult};
use std::path::{Path, PathBuf};

/// Path of the material map for an `n × n` lattice under `dir`.
pub fn material_map_path(dir: &Path, n_cells_per_dimension: usize) -> PathBuf {
    dir.join(format!("material_ids_{n_cells_per_dimension}.txt"))
}

/// Load and validate the material map of an `n × n` lattice.
pub fn load_material_map(
    dir: &Path,
    n_cells_per_dimension: usize,
    n_materials: usize,
) -> RayfluxResult<Array1<usize>> {
    let path = material_map_path(dir, n_cells_per_dimension);
    info!("Searching for material data file {}", path.display());
    if !path.exists() {
        return Err(RayfluxError::ConfigError(format!(
            "material data file {} not found for {n_cells_per_dimension} cells per dimension; \
             use a problem size multiplier with an existing map",
            path.display()
        )));
    }
    let n_cells = n_cells_per_dimension * n_cells_per_dimension;
    let ids: Vec<usize> = read_values(&path, n_cells)?;
    if let Some((cell, &material)) = ids.iter().enumerate().find(|(_, &m)| m >= n_materials) {
        return Err(RayfluxError::InvalidMaterial {
            cell,
            material,
            n_materials,
        });
    }
    Ok(Array1::from_vec(ids))
}
