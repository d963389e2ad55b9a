//! Projection detector
//!
//! Fits every candidate projection to the control points of a JSON
//! configuration and prints the candidates ranked by residual.
//!
//! Usage:
//!   cargo run --release --bin fit-projection -- --config configs/europe_conic.json
//!   RUST_LOG=debug cargo run --release --bin fit-projection -- --config fit.json --method de

use clap::{Parser, ValueEnum};
use math_carto_projection_fit::{AnalysisMethod, CandidateFit, FitConfig, analyze};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fit-projection")]
#[command(about = "Detect the map projection of a set of control points", long_about = None)]
struct Args {
    /// Path to JSON configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Override analysis method
    #[arg(short, long)]
    method: Option<MethodArg>,

    /// Override random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of parallel threads (default: all cores)
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Show only the best N candidates
    #[arg(long)]
    top: Option<usize>,

    /// Write the ranked fits as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    /// Differential Evolution only
    De,
    /// Gauss-Newton from the initial guess
    Ls,
    /// Differential Evolution polished by Gauss-Newton
    Hybrid,
    /// Nelder-Mead simplex from the initial guess
    Nm,
}

impl From<MethodArg> for AnalysisMethod {
    fn from(m: MethodArg) -> Self {
        match m {
            MethodArg::De => AnalysisMethod::DifferentialEvolution,
            MethodArg::Ls => AnalysisMethod::LeastSquares,
            MethodArg::Hybrid => AnalysisMethod::Hybrid,
            MethodArg::Nm => AnalysisMethod::NelderMead,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    let mut config = FitConfig::from_file(&args.config)?;
    if let Some(method) = args.method {
        config.settings.method = method.into();
    }
    if let Some(seed) = args.seed {
        config.settings.seed = Some(seed);
    }

    let candidates = config.candidate_projections()?;
    println!(
        "{} control points, {} candidate projections, method {:?}",
        config.points.len(),
        candidates.len(),
        config.settings.method
    );

    let mut fits = analyze(&config.points, &candidates, &config.settings)?;
    if let Some(top) = args.top {
        fits.truncate(top);
    }
    print_ranking(&fits);

    if let Some(path) = &args.output {
        fs::write(path, serde_json::to_string_pretty(&fits)?)?;
        println!("\nSaved results to: {}", path.display());
    }
    Ok(())
}

fn print_ranking(fits: &[CandidateFit]) {
    if fits.is_empty() {
        println!("No candidate could be fitted");
        return;
    }
    println!(
        "\n{:>4}  {:<20} {:>12} {:>10} {:>10} {:>9} {:>8} {:>8} {:>8}",
        "rank", "projection", "objective", "rms", "scale", "rotation", "lat1", "lat2", "lon0"
    );
    for (rank, fit) in fits.iter().enumerate() {
        println!(
            "{:>4}  {:<20} {:>12.4e} {:>10.3e} {:>10.4e} {:>9.3} {:>8.3} {:>8.3} {:>8.3}",
            rank + 1,
            fit.projection,
            fit.objective,
            fit.rms,
            fit.helmert.scale(),
            fit.helmert.rotation(),
            fit.params.lat1,
            fit.params.lat2,
            fit.params.lon0
        );
    }
}
