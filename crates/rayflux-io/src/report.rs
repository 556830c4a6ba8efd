//! Console input summary and results report.

use rayflux_core::eigenvalue::SimulationResult;
use rayflux_types::config::SimulationParameters;
use rayflux_types::constants::ITERATIONS_TO_CONVERGE;
use std::fmt::Write;

const WIDTH: usize = 79;

fn border(out: &mut String) {
    out.push_str(&"=".repeat(WIDTH));
    out.push('\n');
}

fn centered(out: &mut String, title: &str) {
    let _ = writeln!(out, "{title:^width$}", width = WIDTH);
}

/// Input summary block printed before the run.
pub fn format_input_summary(params: &SimulationParameters, n_threads: usize) -> String {
    let mut out = String::new();
    border(&mut out);
    centered(&mut out, "INPUT SUMMARY");
    border(&mut out);
    let mb = params.estimate_memory_usage(n_threads) as f64 / 1024.0 / 1024.0;
    let _ = writeln!(out, "Number of Cells per Dimension     = {}", params.n_cells_per_dimension);
    let _ = writeln!(out, "Total Number of Cells (FSRs)      = {}", params.n_cells);
    let _ = writeln!(out, "Number of Rays per Iteration      = {}", params.n_rays);
    let _ = writeln!(out, "Length of each ray [cm]           = {:.2}", params.distance_per_ray);
    let _ = writeln!(out, "Dead zone per ray [cm]            = {:.2}", params.dead_zone_distance);
    let _ = writeln!(out, "Energy Groups                     = {}", params.n_energy_groups);
    let _ = writeln!(out, "Number of Inactive Iterations     = {}", params.n_inactive_iterations);
    let _ = writeln!(out, "Number of Active Iterations       = {}", params.n_active_iterations);
    let _ = writeln!(out, "Pseudorandom Seed                 = {}", params.seed);
    let _ = writeln!(out, "Maximum Intersections per Ray     = {}", params.max_intersections_per_ray);
    let _ = writeln!(out, "Estimated Memory Usage            = {mb:.2} [MB]");
    let plotting = if params.plotting_enabled { "Enabled" } else { "Disabled" };
    let _ = writeln!(out, "Plotting                          = {plotting}");
    if let Some(problem) = params.validation_problem {
        let _ = writeln!(out, "Validation problem                = {}", problem.name());
    }
    let _ = writeln!(out, "Number of Threads                 = {n_threads}");
    out
}

/// Results block printed after the run.
pub fn format_results(params: &SimulationParameters, result: &SimulationResult) -> String {
    let total = result.runtime_total.as_secs_f64();
    let sweep = result.runtime_transport_sweep.as_secs_f64();
    let sweep_share = if total > 0.0 { sweep / total } else { 0.0 };
    let intersections = result.n_geometric_intersections as f64;
    let rays_traced = (params.n_rays * result.n_iterations) as f64;
    let integrations = intersections * params.n_energy_groups as f64;
    let per_ray = if rays_traced > 0.0 { intersections / rays_traced } else { 0.0 };
    let tpi_ns = if integrations > 0.0 { total * 1.0e9 / integrations } else { 0.0 };
    let per_iteration = if result.n_iterations > 0 {
        total / result.n_iterations as f64
    } else {
        0.0
    };

    let mut out = String::new();
    border(&mut out);
    centered(&mut out, "RESULTS");
    border(&mut out);
    let _ = writeln!(out, "k-effective                       = {:.5}", result.k_eff);
    let _ = writeln!(out, "k-effective std. dev.             = {:.5}", result.k_eff_std_dev);
    let _ = writeln!(out, "Simulation Runtime                = {total:.3e} [s]");
    let _ = writeln!(
        out,
        "    Transport Sweep Time          = {sweep:.3e} [s] ({:.2}%)",
        100.0 * sweep_share
    );
    let _ = writeln!(
        out,
        "    Iteration Time                = {:.3e} [s] ({:.2}%)",
        total - sweep,
        100.0 * (1.0 - sweep_share)
    );
    let _ = writeln!(out, "Number of Geometric Intersections = {intersections:.3e}");
    let _ = writeln!(out, "Avg. Geom. Intersections per Ray  = {per_ray:.1}");
    let _ = writeln!(out, "Number of Integrations            = {integrations:.3e}");
    let _ = writeln!(out, "Time per Integration (TPI)        = {tpi_ns:.3} [ns]");
    let _ = writeln!(
        out,
        "Est. Total Time Req. to Converge  = {:.3e} [s]",
        per_iteration * ITERATIONS_TO_CONVERGE
    );
    if result.n_truncated_rays > 0 {
        let _ = writeln!(out, "Rays Truncated by Intersection Cap = {}", result.n_truncated_rays);
    }
    if let Some(problem) = params.validation_problem {
        let _ = writeln!(
            out,
            "Validation problem                = {} (k-eff NOT checked against a reference value)",
            problem.name()
        );
    }
    border(&mut out);
    out
}

pub fn print_input_summary(params: &SimulationParameters, n_threads: usize) {
    print!("{}", format_input_summary(params, n_threads));
}

pub fn print_results(params: &SimulationParameters, result: &SimulationResult) {
    print!("{}", format_results(params, result));
}
