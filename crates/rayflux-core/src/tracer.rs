// ─────────────────────────────────────────────────────────────────────
// Rayflux — Ray Tracer
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Geometric ray tracing across the Cartesian lattice.
//!
//! A ray walks cell by cell, recording one intersection per traversed cell
//! segment of positive length, until its travel budget is spent, it leaves
//! through a vacuum edge, or the per-ray intersection cap is reached.
//!
//! The current cell is tracked by integer column/row rather than re-located
//! from the floating-point position, so a ray sitting exactly on a face is
//! never assigned to the wrong side of it.

use crate::geometry::{EdgeOutcome, Lattice};
use crate::sampler::RayStart;
use rayflux_types::config::Edge;
use rayflux_types::constants::DIRECTION_EPSILON;

/// One segment of a ray inside a single cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub cell: usize,
    pub distance: f64,
    /// Segment ended on a vacuum edge; no segments follow it.
    pub vacuum_exit: bool,
}

/// Why a trace stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceEnd {
    #[default]
    BudgetExhausted,
    VacuumExit,
    /// Intersection cap reached with travel budget left.
    Truncated,
}

/// Ordered intersections of one ray plus its final state.
#[derive(Debug, Clone, Default)]
pub struct RayTrace {
    pub intersections: Vec<Intersection>,
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub cell: usize,
    /// Travel budget left when tracing stopped.
    pub remaining: f64,
    pub end: TraceEnd,
}

impl RayTrace {
    pub fn with_capacity(max_intersections: usize) -> Self {
        Self {
            intersections: Vec::with_capacity(max_intersections),
            ..Self::default()
        }
    }

    pub fn n_intersections(&self) -> usize {
        self.intersections.len()
    }

    pub fn total_distance(&self) -> f64 {
        self.intersections.iter().map(|i| i.distance).sum()
    }

    pub fn is_truncated(&self) -> bool {
        self.end == TraceEnd::Truncated
    }
}

/// Distance along one axis to the far face of cell `index`; infinite when the
/// direction is (nearly) parallel to that face.
fn axis_distance(coordinate: f64, direction: f64, index: usize, cell_width: f64) -> f64 {
    let d = if direction > DIRECTION_EPSILON {
        ((index + 1) as f64 * cell_width - coordinate) / direction
    } else if direction < -DIRECTION_EPSILON {
        (index as f64 * cell_width - coordinate) / direction
    } else {
        f64::INFINITY
    };
    d.max(0.0)
}

/// Face crossing along one axis.
///
/// Moves `index` to the neighbour, or resolves the domain edge: reflection
/// flips `direction` in place, vacuum returns `true`. `coordinate` is snapped
/// onto the crossed face.
fn cross_face(
    lattice: &Lattice,
    edges: (Edge, Edge),
    index: &mut usize,
    coordinate: &mut f64,
    direction: &mut f64,
    other_direction: f64,
) -> bool {
    let n = lattice.n_cells_per_dimension();
    let w = lattice.cell_width();
    let (neg_edge, pos_edge) = edges;
    let positive = *direction > 0.0;

    if positive && *index + 1 < n {
        *index += 1;
        *coordinate = *index as f64 * w;
        return false;
    }
    if !positive && *index > 0 {
        *coordinate = *index as f64 * w;
        *index -= 1;
        return false;
    }

    let (edge, face) = if positive {
        (pos_edge, lattice.length())
    } else {
        (neg_edge, 0.0)
    };
    *coordinate = face;
    let (edge_dx, edge_dy) = match edge {
        Edge::XNeg | Edge::XPos => (*direction, other_direction),
        Edge::YNeg | Edge::YPos => (other_direction, *direction),
    };
    match lattice.cross_edge(edge, edge_dx, edge_dy) {
        EdgeOutcome::Reflect { dx, dy } => {
            *direction = match edge {
                Edge::XNeg | Edge::XPos => dx,
                Edge::YNeg | Edge::YPos => dy,
            };
            false
        }
        EdgeOutcome::Exit => true,
    }
}

/// Trace one ray into `trace`, reusing its buffer.
pub fn trace_ray_into(
    lattice: &Lattice,
    start: &RayStart,
    travel_budget: f64,
    max_intersections: usize,
    trace: &mut RayTrace,
) {
    trace.intersections.clear();
    let w = lattice.cell_width();

    let (mut x, mut y) = (start.x, start.y);
    let (mut dx, mut dy) = (start.dx, start.dy);
    let mut ix = lattice.locate_axis(x);
    let mut iy = lattice.locate_axis(y);
    let mut remaining = travel_budget.max(0.0);

    let end = loop {
        if trace.intersections.len() >= max_intersections {
            break TraceEnd::Truncated;
        }
        let cell = lattice.cell_index(ix, iy);
        let dist_x = axis_distance(x, dx, ix, w);
        let dist_y = axis_distance(y, dy, iy, w);
        let step = dist_x.min(dist_y);

        if step >= remaining {
            x += dx * remaining;
            y += dy * remaining;
            if remaining > 0.0 {
                trace.intersections.push(Intersection {
                    cell,
                    distance: remaining,
                    vacuum_exit: false,
                });
            }
            remaining = 0.0;
            break TraceEnd::BudgetExhausted;
        }

        x += dx * step;
        y += dy * step;
        remaining -= step;

        // Both faces are crossed together at a corner.
        let mut exited = false;
        if dist_x <= step {
            exited |= cross_face(
                lattice,
                (Edge::XNeg, Edge::XPos),
                &mut ix,
                &mut x,
                &mut dx,
                dy,
            );
        }
        if dist_y <= step {
            exited |= cross_face(
                lattice,
                (Edge::YNeg, Edge::YPos),
                &mut iy,
                &mut y,
                &mut dy,
                dx,
            );
        }

        // A ray sitting on a face it is moving away from crosses it in zero
        // distance; only the face crossing is kept.
        if step > 0.0 {
            trace.intersections.push(Intersection {
                cell,
                distance: step,
                vacuum_exit: exited,
            });
        } else if let Some(last) = trace.intersections.last_mut() {
            last.vacuum_exit |= exited;
        }
        if exited {
            break TraceEnd::VacuumExit;
        }
    };

    trace.x = x;
    trace.y = y;
    trace.dx = dx;
    trace.dy = dy;
    trace.cell = lattice.cell_index(ix, iy);
    trace.remaining = remaining;
    trace.end = end;
}

/// Trace one ray into a fresh buffer.
pub fn trace_ray(
    lattice: &Lattice,
    start: &RayStart,
    travel_budget: f64,
    max_intersections: usize,
) -> RayTrace {
    let mut trace = RayTrace::with_capacity(max_intersections);
    trace_ray_into(lattice, start, travel_budget, max_intersections, &mut trace);
    trace
}
