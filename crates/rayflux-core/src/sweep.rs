// ─────────────────────────────────────────────────────────────────────
// Rayflux — Transport Sweep
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! One transport sweep: sample, trace and attenuate every ray.
//!
//! Rays are split into one contiguous block per [`SweepWorkspace`] slot,
//! sized to the Rayon worker count. Each block owns a private partial tally,
//! trace buffer and angular flux vector, allocated once and reused by every
//! sweep. After all blocks finish, each tally entry is summed over the
//! partials in block order in one parallel pass, so no two rays ever write
//! the same entry concurrently and the result does not depend on scheduling.

use crate::attenuation::{attenuate_ray, SweepInputs};
use crate::sampler::sample_ray;
use crate::tracer::{trace_ray_into, RayTrace, TraceEnd};
use log::{log_enabled, trace, Level};
use ndarray::{Array2, Zip};
use rayon::prelude::*;
use std::ops::Range;

/// Ray population settings of one sweep.
#[derive(Debug, Clone, Copy)]
pub struct RaySettings {
    pub n_rays: usize,
    /// Seed of this sweep's ray population.
    pub seed: u64,
    /// Full travel budget of each ray, dead zone included [cm].
    pub travel_distance: f64,
    pub max_intersections_per_ray: usize,
}

/// Counters gathered while sweeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub n_rays: usize,
    pub n_intersections: u64,
    pub n_vacuum_exits: usize,
    /// Rays cut off by the intersection cap.
    pub n_truncated: usize,
}

impl SweepStats {
    fn merge(mut self, other: SweepStats) -> SweepStats {
        self.n_rays += other.n_rays;
        self.n_intersections += other.n_intersections;
        self.n_vacuum_exits += other.n_vacuum_exits;
        self.n_truncated += other.n_truncated;
        self
    }

    /// Percentage of rays that hit the intersection cap.
    pub fn miss_rate_percent(&self) -> f64 {
        if self.n_rays == 0 {
            return 0.0;
        }
        100.0 * self.n_truncated as f64 / self.n_rays as f64
    }
}

fn format_trace(ray: usize, t: &RayTrace) -> String {
    let mut out = format!(
        "Ray {ray} had {} intersections, ended at [{:.2}, {:.2}] ({:?})",
        t.n_intersections(),
        t.x,
        t.y,
        t.end
    );
    for (i, hit) in t.intersections.iter().enumerate() {
        out.push_str(&format!(
            "\n\tIntersection {i}: cell {} distance {:.2e} vacuum exit {}",
            hit.cell, hit.distance, hit.vacuum_exit
        ));
    }
    out
}

/// Scratch state of one ray block.
#[derive(Debug)]
struct SweepBlock {
    tally: Array2<f64>,
    trace: RayTrace,
    angular_flux: Vec<f64>,
}

/// Per-block buffers reused across sweeps.
///
/// Holds `n_blocks` partial tallies of `[cell, group]`, so its footprint is
/// `n_blocks * n_cells * n_groups` doubles plus one trace buffer per block.
#[derive(Debug)]
pub struct SweepWorkspace {
    blocks: Vec<SweepBlock>,
}

impl SweepWorkspace {
    pub fn new(
        n_blocks: usize,
        n_cells: usize,
        n_groups: usize,
        max_intersections_per_ray: usize,
    ) -> Self {
        let blocks = (0..n_blocks.max(1))
            .map(|_| SweepBlock {
                tally: Array2::zeros((n_cells, n_groups)),
                trace: RayTrace::with_capacity(max_intersections_per_ray),
                angular_flux: vec![0.0; n_groups],
            })
            .collect();
        Self { blocks }
    }

    /// One block per thread of the current Rayon pool.
    pub fn for_current_pool(
        n_cells: usize,
        n_groups: usize,
        max_intersections_per_ray: usize,
    ) -> Self {
        Self::new(
            rayon::current_num_threads(),
            n_cells,
            n_groups,
            max_intersections_per_ray,
        )
    }

    pub fn n_blocks(&self) -> usize {
        self.blocks.len()
    }
}

/// Sweep a contiguous block of rays into the block's private tally.
fn sweep_block(
    inputs: &SweepInputs<'_>,
    rays: &RaySettings,
    block: &mut SweepBlock,
    ray_range: Range<usize>,
) -> SweepStats {
    block.tally.fill(0.0);
    let mut stats = SweepStats::default();
    let log_traces = log_enabled!(Level::Trace);

    for ray in ray_range {
        let start = sample_ray(inputs.lattice.length(), rays.seed, ray);
        trace_ray_into(
            inputs.lattice,
            &start,
            rays.travel_distance,
            rays.max_intersections_per_ray,
            &mut block.trace,
        );

        stats.n_rays += 1;
        stats.n_intersections += block.trace.n_intersections() as u64;
        match block.trace.end {
            TraceEnd::VacuumExit => stats.n_vacuum_exits += 1,
            TraceEnd::Truncated => stats.n_truncated += 1,
            TraceEnd::BudgetExhausted => {}
        }
        if log_traces {
            trace!("{}", format_trace(ray, &block.trace));
        }

        // Rays enter every sweep with no angular flux.
        block.angular_flux.fill(0.0);
        attenuate_ray(
            inputs,
            &block.trace.intersections,
            &mut block.angular_flux,
            &mut block.tally.view_mut(),
        );
    }
    stats
}

/// Run a full sweep. `tally` is overwritten with the raw track-length
/// contributions of all rays.
pub fn transport_sweep(
    inputs: &SweepInputs<'_>,
    rays: &RaySettings,
    workspace: &mut SweepWorkspace,
    tally: &mut Array2<f64>,
) -> SweepStats {
    let n_blocks = workspace.n_blocks();
    let block_len = rays.n_rays.div_ceil(n_blocks);
    let stats = workspace
        .blocks
        .par_iter_mut()
        .enumerate()
        .map(|(b, block)| {
            let begin = (b * block_len).min(rays.n_rays);
            let end = ((b + 1) * block_len).min(rays.n_rays);
            sweep_block(inputs, rays, block, begin..end)
        })
        .reduce(SweepStats::default, SweepStats::merge);

    let blocks = &workspace.blocks;
    debug_assert!(blocks.iter().all(|block| block.tally.dim() == tally.dim()));
    Zip::indexed(&mut *tally).par_for_each(|idx, t| {
        *t = blocks.iter().map(|block| block.tally[idx]).sum();
    });
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Lattice;
    use rayflux_types::config::{BoundaryCondition, BoundaryConditions};
    use rayflux_types::state::CrossSections;

    fn settings(n_rays: usize, max: usize) -> RaySettings {
        RaySettings {
            n_rays,
            seed: 99,
            travel_distance: 5.0,
            max_intersections_per_ray: max,
        }
    }

    #[test]
    fn test_sweep_counts_every_ray() {
        let lat = Lattice::homogeneous(4, 4.0, BoundaryConditions::default()).expect("valid");
        let xs = CrossSections::single_group(1.0, 0.0, 0.0).expect("valid");
        let source = Array2::from_elem((16, 1), 0.1);
        let inputs = SweepInputs {
            lattice: &lat,
            xs: &xs,
            isotropic_source: source.view(),
            dead_zone_distance: 0.0,
        };
        let mut tally = Array2::from_elem((16, 1), 123.0);
        let mut workspace = SweepWorkspace::new(3, 16, 1, 64);
        let stats = transport_sweep(&inputs, &settings(257, 64), &mut workspace, &mut tally);
        assert_eq!(stats.n_rays, 257);
        assert!(stats.n_intersections >= 257);
        assert_eq!(stats.n_truncated, 0);
        // Rays start below the source level, so the correction is negative.
        assert!(tally.iter().all(|&v| v <= 0.0));
        assert!(tally.iter().any(|&v| v < 0.0));
    }

    #[test]
    fn test_sweep_is_reproducible() {
        let lat = Lattice::homogeneous(
            5,
            5.0,
            BoundaryConditions::uniform(BoundaryCondition::Reflective),
        )
        .expect("valid");
        let xs = CrossSections::single_group(0.7, 0.0, 0.0).expect("valid");
        let source = Array2::from_elem((25, 1), 0.3);
        let inputs = SweepInputs {
            lattice: &lat,
            xs: &xs,
            isotropic_source: source.view(),
            dead_zone_distance: 0.0,
        };
        let mut a = Array2::zeros((25, 1));
        let mut b = Array2::zeros((25, 1));
        let mut workspace = SweepWorkspace::for_current_pool(25, 1, 64);
        let sa = transport_sweep(&inputs, &settings(300, 64), &mut workspace, &mut a);
        let sb = transport_sweep(&inputs, &settings(300, 64), &mut workspace, &mut b);
        assert_eq!(sa, sb);
        assert_eq!(a, b);
    }

    #[test]
    fn test_tight_cap_reports_misses() {
        let lat = Lattice::homogeneous(
            16,
            16.0,
            BoundaryConditions::uniform(BoundaryCondition::Reflective),
        )
        .expect("valid");
        let xs = CrossSections::single_group(1.0, 0.0, 0.0).expect("valid");
        let source = Array2::zeros((256, 1));
        let inputs = SweepInputs {
            lattice: &lat,
            xs: &xs,
            isotropic_source: source.view(),
            dead_zone_distance: 0.0,
        };
        let mut tally = Array2::zeros((256, 1));
        let mut workspace = SweepWorkspace::new(2, 256, 1, 2);
        let stats = transport_sweep(&inputs, &settings(100, 2), &mut workspace, &mut tally);
        assert!(stats.n_truncated > 0);
        assert!(stats.miss_rate_percent() > 0.0);
        assert!(stats.n_intersections <= 200);
    }

    #[test]
    fn test_block_count_does_not_change_totals() {
        let lat = Lattice::homogeneous(
            6,
            6.0,
            BoundaryConditions::uniform(BoundaryCondition::Reflective),
        )
        .expect("valid");
        let xs = CrossSections::single_group(0.9, 0.0, 0.0).expect("valid");
        let source = Array2::from_elem((36, 1), 0.2);
        let inputs = SweepInputs {
            lattice: &lat,
            xs: &xs,
            isotropic_source: source.view(),
            dead_zone_distance: 0.0,
        };
        let rays = settings(401, 64);

        let mut single = Array2::zeros((36, 1));
        let stats_single =
            transport_sweep(&inputs, &rays, &mut SweepWorkspace::new(1, 36, 1, 64), &mut single);
        // More blocks than rays leaves some blocks empty.
        for n_blocks in [2, 7, 500] {
            let mut workspace = SweepWorkspace::new(n_blocks, 36, 1, 64);
            assert_eq!(workspace.n_blocks(), n_blocks);
            let mut tally = Array2::from_elem((36, 1), f64::NAN);
            let stats = transport_sweep(&inputs, &rays, &mut workspace, &mut tally);
            assert_eq!(stats, stats_single);
            for (a, b) in tally.iter().zip(single.iter()) {
                assert!((a - b).abs() <= 1e-12 * b.abs().max(1.0));
            }
        }
    }

    #[test]
    fn test_workspace_is_reset_between_sweeps() {
        let lat = Lattice::homogeneous(4, 4.0, BoundaryConditions::default()).expect("valid");
        let xs = CrossSections::single_group(1.0, 0.0, 0.0).expect("valid");
        let source = Array2::from_elem((16, 1), 0.5);
        let inputs = SweepInputs {
            lattice: &lat,
            xs: &xs,
            isotropic_source: source.view(),
            dead_zone_distance: 0.0,
        };
        let mut workspace = SweepWorkspace::new(4, 16, 1, 64);
        let mut first = Array2::zeros((16, 1));
        let mut second = Array2::zeros((16, 1));
        transport_sweep(&inputs, &settings(64, 64), &mut workspace, &mut first);
        transport_sweep(&inputs, &settings(64, 64), &mut workspace, &mut second);
        assert_eq!(first, second);
    }
}
