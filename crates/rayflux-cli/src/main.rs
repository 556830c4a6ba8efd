// ─────────────────────────────────────────────────────────────────────
// Rayflux — Command-Line Driver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};
use rayflux_core::eigenvalue::PowerIteration;
use rayflux_core::geometry::Lattice;
use rayflux_io::material_map::load_material_map;
use rayflux_io::output::{vtk_path, write_npz, write_thermal_fluxes, write_vtk};
use rayflux_io::report::{print_input_summary, print_results};
use rayflux_io::xs::load_c5g7;
use rayflux_types::config::{RunConfig, ValidationProblem};
use rayflux_types::error::{RayfluxError, RayfluxResult};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "rayflux")]
#[command(about = "2D random-ray neutron transport k-eigenvalue solver")]
#[command(version)]
struct Cli {
    /// Rays per iteration
    #[arg(short = 'r', long)]
    rays: Option<usize>,

    /// Tallied distance of each ray per iteration [cm]
    #[arg(short = 'd', long)]
    distance: Option<f64>,

    /// Inactive (burn-in) iterations
    #[arg(short = 'i', long)]
    inactive: Option<usize>,

    /// Active (statistics) iterations
    #[arg(short = 'a', long)]
    active: Option<usize>,

    /// Pseudorandom seed
    #[arg(short = 's', long)]
    seed: Option<u64>,

    /// Problem size multiplier (1, 2, 4, 8, 16, 32)
    #[arg(short = 'm', long)]
    multiplier: Option<usize>,

    /// Write VTK plots and the thermal flux table
    #[arg(short = 'p', long)]
    plot: bool,

    /// Validation problem: small, medium or large
    #[arg(short = 'v', long)]
    validation: Option<ValidationProblem>,

    /// JSON run configuration; command-line flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// C5G7 cross-section and material map directory
    #[arg(long, default_value = "data/C5G7_2D")]
    data: PathBuf,

    /// Untallied distance each ray travels before the tallied distance [cm]
    #[arg(long)]
    dead_zone: Option<f64>,

    /// Worker threads (default: all available cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Write an .npz archive of the results
    #[arg(long)]
    npz: Option<PathBuf>,

    /// Directory for plot files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Verbose output
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn run_config(&self) -> RayfluxResult<RunConfig> {
        let mut cfg = match &self.config {
            Some(path) => {
                let path = path.to_str().ok_or_else(|| {
                    RayfluxError::ConfigError(format!("non UTF-8 config path {}", path.display()))
                })?;
                RunConfig::from_file(path)?
            }
            None => RunConfig::default(),
        };
        if let Some(m) = self.multiplier {
            cfg.problem_size_multiplier = m;
            cfg.n_cells_per_dimension = None;
            cfg.max_intersections_per_ray = None;
            cfg.n_rays = None;
        }
        if let Some(n) = self.rays {
            cfg.n_rays = Some(n);
        }
        if let Some(d) = self.distance {
            cfg.distance_per_ray = d;
        }
        if let Some(n) = self.inactive {
            cfg.n_inactive_iterations = n;
        }
        if let Some(n) = self.active {
            cfg.n_active_iterations = n;
        }
        if let Some(seed) = self.seed {
            cfg.seed = Some(seed);
        }
        if let Some(d) = self.dead_zone {
            cfg.dead_zone_distance = d;
        }
        if self.plot {
            cfg.plotting_enabled = true;
        }
        if let Some(problem) = self.validation {
            cfg.validation_problem = Some(problem);
        }
        Ok(cfg)
    }
}

fn run(cli: &Cli) -> RayfluxResult<()> {
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| RayfluxError::ConfigError(format!("failed to set thread pool size: {e}")))?;
        info!("Using {threads} threads");
    }

    let params = cli.run_config()?.to_parameters()?;
    print_input_summary(&params, rayon::current_num_threads());

    info!("Initializing simulation data from {}", cli.data.display());
    let xs = load_c5g7(&cli.data, params.n_energy_groups)?;
    let material_ids = load_material_map(&cli.data, params.n_cells_per_dimension, params.n_materials)?;
    let lattice = Lattice::from_parameters(&params, material_ids)?;

    info!("Beginning power iteration");
    let result = PowerIteration::new(&params, &lattice, &xs)?.run()?;
    print_results(&params, &result);
    if let Some(problem) = params.validation_problem {
        warn!(
            "validation problem '{}' only fixes the run shape and seed; \
             k-eff {:.5} was not compared to a reference value",
            problem.name(),
            result.k_eff
        );
    }

    if params.plotting_enabled {
        std::fs::create_dir_all(&cli.output_dir)?;
        write_vtk(
            &vtk_path(&cli.output_dir, params.n_cells_per_dimension),
            params.n_cells_per_dimension,
            params.cell_width,
            &result.mean_scalar_flux,
            lattice.material_ids(),
        )?;
        write_thermal_fluxes(
            &cli.output_dir.join("thermal_fluxes.dat"),
            params.n_cells_per_dimension,
            &result.mean_scalar_flux,
        )?;
    }
    if let Some(path) = &cli.npz {
        write_npz(path, &result, lattice.material_ids())?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    info!("Starting rayflux v{}", env!("CARGO_PKG_VERSION"));
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "rayflux", "-r", "500", "-d", "20", "-i", "3", "-a", "4", "-s", "9", "-p",
            "--dead-zone", "5",
        ])
        .unwrap();
        let params = cli.run_config().unwrap().to_parameters().unwrap();
        assert_eq!(params.n_rays, 500);
        assert_eq!(params.distance_per_ray, 20.0);
        assert_eq!(params.dead_zone_distance, 5.0);
        assert_eq!(params.n_inactive_iterations, 3);
        assert_eq!(params.n_active_iterations, 4);
        assert_eq!(params.seed, 9);
        assert!(params.plotting_enabled);
    }

    #[test]
    fn test_multiplier_rescales_problem() {
        let cli = Cli::try_parse_from(["rayflux", "-m", "2", "-s", "1"]).unwrap();
        let params = cli.run_config().unwrap().to_parameters().unwrap();
        assert_eq!(params.n_cells_per_dimension, 204);
        assert_eq!(params.n_rays, 6170 * 2 + 1955);
    }

    #[test]
    fn test_validation_problem_flag() {
        let cli = Cli::try_parse_from(["rayflux", "-v", "medium", "-a", "1"]).unwrap();
        let params = cli.run_config().unwrap().to_parameters().unwrap();
        assert_eq!(params.n_cells_per_dimension, 408);
        assert_eq!(params.n_active_iterations, 100);
        assert_eq!(params.seed, 2001);
    }

    #[test]
    fn test_unknown_validation_problem_rejected() {
        assert!(Cli::try_parse_from(["rayflux", "-v", "huge"]).is_err());
    }
}
