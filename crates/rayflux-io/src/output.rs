// ─────────────────────────────────────────────────────────────────────
// Rayflux — Result Output
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Flux and material output: legacy VTK plots, thermal flux text table and
//! an `.npz` archive of the run.
//!
//! All writers take the mean flux `[cell, group]` with `cell = y·N + x`.

use log::info;
use ndarray::{Array1, Array2};
use ndarray_npy::NpzWriter;
use rayflux_core::eigenvalue::SimulationResult;
use rayflux_types::error::{RayfluxError, RayfluxResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub fn vtk_path(dir: &Path, n_cells_per_dimension: usize) -> PathBuf {
    dir.join(format!("rayflux_plots_{n_cells_per_dimension}.vtk"))
}

fn check_shapes(
    n_cells_per_dimension: usize,
    mean_flux: &Array2<f64>,
    material_ids: &Array1<usize>,
) -> RayfluxResult<()> {
    let n_cells = n_cells_per_dimension * n_cells_per_dimension;
    if mean_flux.nrows() != n_cells || mean_flux.ncols() == 0 {
        return Err(RayfluxError::DimensionMismatch {
            what: "mean flux cells".to_string(),
            expected: n_cells,
            found: mean_flux.nrows(),
        });
    }
    if material_ids.len() != n_cells {
        return Err(RayfluxError::DimensionMismatch {
            what: "material map".to_string(),
            expected: n_cells,
            found: material_ids.len(),
        });
    }
    Ok(())
}

/// Write a binary legacy VTK `STRUCTURED_POINTS` file with `thermal_flux`
/// (last group), `fast_flux` (group 0) and `material_type` point scalars.
/// Values are big-endian as the format requires.
pub fn write_vtk(
    path: &Path,
    n_cells_per_dimension: usize,
    cell_width: f64,
    mean_flux: &Array2<f64>,
    material_ids: &Array1<usize>,
) -> RayfluxResult<()> {
    check_shapes(n_cells_per_dimension, mean_flux, material_ids)?;
    let n = n_cells_per_dimension;
    info!("Plotting 2D data {n} x {n} to file {}", path.display());

    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "# vtk DataFile Version 2.0")?;
    writeln!(out, "Dataset File")?;
    writeln!(out, "BINARY")?;
    writeln!(out, "DATASET STRUCTURED_POINTS")?;
    writeln!(out, "DIMENSIONS {n} {n} 1")?;
    writeln!(out, "ORIGIN 0 0 0")?;
    writeln!(out, "SPACING {cell_width:.6} {cell_width:.6} {cell_width:.6}")?;
    writeln!(out, "POINT_DATA {}", n * n)?;

    let thermal = mean_flux.ncols() - 1;
    for (name, group) in [("thermal_flux", thermal), ("fast_flux", 0)] {
        writeln!(out, "SCALARS {name} float")?;
        writeln!(out, "LOOKUP_TABLE default")?;
        for &phi in mean_flux.column(group).iter() {
            out.write_all(&(phi as f32).to_be_bytes())?;
        }
    }

    writeln!(out, "SCALARS material_type int")?;
    writeln!(out, "LOOKUP_TABLE default")?;
    for &m in material_ids.iter() {
        let id = i32::try_from(m).map_err(|_| {
            RayfluxError::ConfigError(format!("material id {m} does not fit a VTK int"))
        })?;
        out.write_all(&id.to_be_bytes())?;
    }
    out.flush()?;
    Ok(())
}

/// Write the thermal (last group) mean flux as an N×N text table, one lattice
/// row per line.
pub fn write_thermal_fluxes(
    path: &Path,
    n_cells_per_dimension: usize,
    mean_flux: &Array2<f64>,
) -> RayfluxResult<()> {
    let n = n_cells_per_dimension;
    if mean_flux.nrows() != n * n || mean_flux.ncols() == 0 {
        return Err(RayfluxError::DimensionMismatch {
            what: "mean flux cells".to_string(),
            expected: n * n,
            found: mean_flux.nrows(),
        });
    }
    info!("Writing thermal flux data to file {}", path.display());

    let thermal = mean_flux.column(mean_flux.ncols() - 1);
    let mut out = BufWriter::new(File::create(path)?);
    for y in 0..n {
        for x in 0..n {
            write!(out, "{:.3e} ", thermal[y * n + x])?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Archive the mean flux, k-eff history and material map as `.npz`.
pub fn write_npz(
    path: &Path,
    result: &SimulationResult,
    material_ids: &Array1<usize>,
) -> RayfluxResult<()> {
    info!("Writing run archive to {}", path.display());
    let npz_err = |e: ndarray_npy::WriteNpzError| RayfluxError::Npy(e.to_string());

    let materials: Array1<i64> = material_ids.mapv(|m| m as i64);
    let history = Array1::from_vec(result.k_eff_history.clone());
    let summary = Array1::from_vec(vec![result.k_eff, result.k_eff_std_dev]);

    let mut writer = NpzWriter::new(File::create(path)?);
    writer
        .add_array("mean_scalar_flux", &result.mean_scalar_flux)
        .map_err(npz_err)?;
    writer.add_array("k_eff_history", &history).map_err(npz_err)?;
    writer.add_array("k_eff", &summary).map_err(npz_err)?;
    writer.add_array("material_ids", &materials).map_err(npz_err)?;
    writer.finish().map_err(npz_err)?;
    Ok(())
}
