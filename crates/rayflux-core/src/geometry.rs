// ─────────────────────────────────────────────────────────────────────
// Rayflux — Geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Square lattice of flat-source cells and domain-edge boundary physics.
//!
//! Cells are indexed row-major, `cell = y * N + x`, and cover
//! `[0, length_per_dimension)` on both axes.

use ndarray::Array1;
use rayflux_types::config::{BoundaryCondition, BoundaryConditions, Edge, SimulationParameters};
use rayflux_types::error::{RayfluxError, RayfluxResult};

/// Physical extent of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// What happens to a ray that reaches a domain edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeOutcome {
    /// Ray continues with the mirrored direction.
    Reflect { dx: f64, dy: f64 },
    /// Ray leaves the domain and stops.
    Exit,
}

/// N x N lattice with one material per cell.
#[derive(Debug, Clone)]
pub struct Lattice {
    n_per_dim: usize,
    cell_width: f64,
    inverse_cell_width: f64,
    length: f64,
    boundary_conditions: BoundaryConditions,
    material_id: Array1<usize>,
}

impl Lattice {
    /// Build a lattice and check the material map against it.
    pub fn new(
        n_per_dim: usize,
        length: f64,
        boundary_conditions: BoundaryConditions,
        material_id: Array1<usize>,
        n_materials: usize,
    ) -> RayfluxResult<Self> {
        if n_per_dim == 0 || !length.is_finite() || length <= 0.0 {
            return Err(RayfluxError::ConfigError(format!(
                "lattice needs >= 1 cell and finite length > 0: n={n_per_dim}, length={length}"
            )));
        }
        let n_cells = n_per_dim * n_per_dim;
        if material_id.len() != n_cells {
            return Err(RayfluxError::DimensionMismatch {
                what: "material map".to_string(),
                expected: n_cells,
                found: material_id.len(),
            });
        }
        if let Some((cell, &material)) = material_id
            .iter()
            .enumerate()
            .find(|(_, &m)| m >= n_materials)
        {
            return Err(RayfluxError::InvalidMaterial {
                cell,
                material,
                n_materials,
            });
        }
        let cell_width = length / n_per_dim as f64;
        Ok(Self {
            n_per_dim,
            cell_width,
            inverse_cell_width: 1.0 / cell_width,
            length,
            boundary_conditions,
            material_id,
        })
    }

    /// Lattice described by the run parameters.
    pub fn from_parameters(
        params: &SimulationParameters,
        material_id: Array1<usize>,
    ) -> RayfluxResult<Self> {
        Self::new(
            params.n_cells_per_dimension,
            params.length_per_dimension,
            params.boundary_conditions,
            material_id,
            params.n_materials,
        )
    }

    /// Lattice filled with a single material.
    pub fn homogeneous(
        n_per_dim: usize,
        length: f64,
        boundary_conditions: BoundaryConditions,
    ) -> RayfluxResult<Self> {
        Self::new(
            n_per_dim,
            length,
            boundary_conditions,
            Array1::zeros(n_per_dim * n_per_dim),
            1,
        )
    }

    pub fn n_cells_per_dimension(&self) -> usize {
        self.n_per_dim
    }

    pub fn n_cells(&self) -> usize {
        self.n_per_dim * self.n_per_dim
    }

    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn boundary_conditions(&self) -> &BoundaryConditions {
        &self.boundary_conditions
    }

    pub fn material_ids(&self) -> &Array1<usize> {
        &self.material_id
    }

    pub fn material(&self, cell: usize) -> usize {
        self.material_id[cell]
    }

    pub fn cell_index(&self, x: usize, y: usize) -> usize {
        y * self.n_per_dim + x
    }

    pub fn cell_coords(&self, cell: usize) -> (usize, usize) {
        (cell % self.n_per_dim, cell / self.n_per_dim)
    }

    pub fn cell_bounds(&self, cell: usize) -> CellBounds {
        let (x, y) = self.cell_coords(cell);
        let w = self.cell_width;
        CellBounds {
            x_min: x as f64 * w,
            x_max: (x + 1) as f64 * w,
            y_min: y as f64 * w,
            y_max: (y + 1) as f64 * w,
        }
    }

    /// Integer cell column/row containing a coordinate, clamped to the lattice.
    pub fn locate_axis(&self, coordinate: f64) -> usize {
        let i = (coordinate * self.inverse_cell_width).floor();
        if i <= 0.0 {
            0
        } else {
            (i as usize).min(self.n_per_dim - 1)
        }
    }

    /// Cell containing the point `(x, y)`.
    pub fn locate(&self, x: f64, y: f64) -> usize {
        self.cell_index(self.locate_axis(x), self.locate_axis(y))
    }

    /// Resolve a crossing of `edge` by a ray travelling along `(dx, dy)`.
    pub fn cross_edge(&self, edge: Edge, dx: f64, dy: f64) -> EdgeOutcome {
        match self.boundary_conditions.get(edge) {
            BoundaryCondition::Reflective => match edge {
                Edge::XNeg | Edge::XPos => EdgeOutcome::Reflect { dx: -dx, dy },
                Edge::YNeg | Edge::YPos => EdgeOutcome::Reflect { dx, dy: -dy },
            },
            // Edges are validated at setup; an unset edge behaves like vacuum.
            BoundaryCondition::Vacuum | BoundaryCondition::None => EdgeOutcome::Exit,
        }
    }
}
