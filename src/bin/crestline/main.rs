//! Crestline CLI - principal curvature estimation and evaluation.
//!
//! Usage: crestline <COMMAND> [OPTIONS]
//!
//! Run `crestline --help` for available commands.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use crestline::algo::curvature::{
    principal_curvature, CurvatureMethod, CurvatureOptions, CurvatureRecord, SingularFitPolicy,
};
use crestline::io::json::{self, CurvatureDocument};
use crestline::mesh::{shapes, TriangleMesh};

#[derive(Parser)]
#[command(name = "crestline")]
#[command(author, version, about = "Principal curvature CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate curvature directions for a JSON mesh
    Estimate {
        /// Input mesh document (positions, triangles, optional normals)
        input: PathBuf,

        /// Output curvature document
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Estimation method
        #[arg(short, long, value_enum, default_value = "normal-cycle")]
        method: Method,

        /// Seed for random fallback directions
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,

        /// Fail on singular face fits instead of skipping them
        #[arg(long)]
        strict: bool,

        /// Center the mesh and scale it into the unit ball first
        #[arg(long)]
        center: bool,

        /// Write full-precision floats
        #[arg(long)]
        full_precision: bool,
    },

    /// Compare estimates on a torus against the closed-form curvature
    Torus {
        /// Distance from the torus center to the tube center
        #[arg(long, default_value = "1.0")]
        major: f64,

        /// Tube radius
        #[arg(long, default_value = "0.5")]
        minor: f64,

        /// Samples around the central circle
        #[arg(long, default_value = "90")]
        radial: usize,

        /// Samples around the tube
        #[arg(long, default_value = "60")]
        tubular: usize,

        /// Estimation method
        #[arg(short, long, value_enum, default_value = "face-fit")]
        method: Method,
    },

    /// Compare estimates on an icosphere against 1/r
    Sphere {
        /// Sphere radius
        #[arg(long, default_value = "1.0")]
        radius: f64,

        /// Icosahedron subdivision levels
        #[arg(short, long, default_value = "3")]
        subdivisions: usize,

        /// Estimation method
        #[arg(short, long, value_enum, default_value = "face-fit")]
        method: Method,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Method {
    /// Normal-cycle tensor from edge curvatures
    NormalCycle,
    /// Per-face second fundamental form fit
    FaceFit,
}

impl From<Method> for CurvatureMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::NormalCycle => CurvatureMethod::NormalCycle,
            Method::FaceFit => CurvatureMethod::FaceFit,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Estimate {
            input,
            output,
            method,
            seed,
            sequential,
            strict,
            center,
            full_precision,
        } => {
            let options = CurvatureOptions::default()
                .with_method(method.into())
                .with_seed(seed)
                .with_parallel(!sequential)
                .with_singular_fit(if strict {
                    SingularFitPolicy::Fail
                } else {
                    SingularFitPolicy::Skip
                });
            cmd_estimate(&input, output.as_deref(), &options, center, full_precision)?;
        }

        Commands::Torus {
            major,
            minor,
            radial,
            tubular,
            method,
        } => {
            cmd_torus(major, minor, radial, tubular, method.into())?;
        }

        Commands::Sphere {
            radius,
            subdivisions,
            method,
        } => {
            cmd_sphere(radius, subdivisions, method.into())?;
        }
    }

    Ok(())
}

fn cmd_estimate(
    input: &Path,
    output: Option<&Path>,
    options: &CurvatureOptions,
    center: bool,
    full_precision: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Loading mesh from: {}", input.display());
    let mut mesh: TriangleMesh = json::load_mesh(input)?;
    if center {
        mesh = mesh.centered();
    }
    println!("Loaded: {} vertices, {} faces", mesh.num_vertices(), mesh.num_faces());

    let mode = if options.parallel { "parallel" } else { "sequential" };
    println!("Estimating {} curvature ({})...", options.method.name(), mode);

    let start = Instant::now();
    let record = principal_curvature(&mesh, options)?;
    let elapsed = start.elapsed();
    println!("Done in {:.2?}", elapsed);

    print_statistics(&record);

    if let Some(output) = output {
        let document = CurvatureDocument::new(&mesh, &record);
        let document = if full_precision { document } else { document.rounded() };
        document.save(output)?;
        println!("Saved: {}", output.display());
    }

    Ok(())
}

fn cmd_torus(
    major: f64,
    minor: f64,
    radial: usize,
    tubular: usize,
    method: CurvatureMethod,
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: TriangleMesh = shapes::torus(major, minor, radial, tubular)?;
    log::info!(
        "Torus R={} r={} ({}x{}): {} vertices",
        major,
        minor,
        radial,
        tubular,
        mesh.num_vertices()
    );

    let options = CurvatureOptions::default().with_method(method);
    let record = principal_curvature(&mesh, &options)?;

    let mut gaussian_error = 0.0;
    let mut mean_error = 0.0;
    for v in mesh.vertex_ids() {
        let p = mesh.position(v);
        gaussian_error += (record.gaussian(v) - shapes::torus_gaussian_curvature(major, minor, p)).abs();
        mean_error += (record.mean(v) - shapes::torus_mean_curvature(major, minor, p)).abs();
    }
    let n = mesh.num_vertices() as f64;

    println!("Torus ({}, R={}, r={}, {}x{})", method.name(), major, minor, radial, tubular);
    println!("  Mean |K - K_exact|: {:.6}", gaussian_error / n);
    println!("  Mean |H - H_exact|: {:.6}", mean_error / n);
    print_statistics(&record);

    Ok(())
}

fn cmd_sphere(
    radius: f64,
    subdivisions: usize,
    method: CurvatureMethod,
) -> Result<(), Box<dyn std::error::Error>> {
    let sphere: TriangleMesh = shapes::icosphere(radius, subdivisions)?;
    // Averaged normals, so the estimate reflects the tessellation.
    let mesh: TriangleMesh = TriangleMesh::new(sphere.positions().to_vec(), sphere.triangles().to_vec())?;

    let options = CurvatureOptions::default().with_method(method);
    let record = principal_curvature(&mesh, &options)?;

    let exact = 1.0 / radius;
    let mut max_error = 0.0_f64;
    let mut total_error = 0.0;
    for v in mesh.vertex_ids() {
        let (k1, k2) = record.principal(v);
        for k in [k1, k2] {
            let error = (k - exact).abs();
            max_error = max_error.max(error);
            total_error += error;
        }
    }

    println!("Sphere ({}, r={}, level {})", method.name(), radius, subdivisions);
    println!("  Vertices: {}", mesh.num_vertices());
    println!("  Mean |k - 1/r|: {:.6}", total_error / (2.0 * mesh.num_vertices() as f64));
    println!("  Max  |k - 1/r|: {:.6}", max_error);

    Ok(())
}

fn print_statistics(record: &CurvatureRecord) {
    let gaussian = record.gaussian_values();
    let mean = record.mean_values();

    let g_min = gaussian.iter().cloned().fold(f64::INFINITY, f64::min);
    let g_max = gaussian.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let g_avg: f64 = gaussian.iter().sum::<f64>() / gaussian.len() as f64;

    let m_min = mean.iter().cloned().fold(f64::INFINITY, f64::min);
    let m_max = mean.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let m_avg: f64 = mean.iter().sum::<f64>() / mean.len() as f64;

    println!("Curvature:");
    println!("  Gaussian: min={:.4}, max={:.4}, avg={:.4}", g_min, g_max, g_avg);
    println!("  Mean:     min={:.4}, max={:.4}, avg={:.4}", m_min, m_max, m_avg);

    let d = record.diagnostics();
    println!(
        "  Unresolved vertices: {} / {}",
        d.unresolved_vertices,
        record.len()
    );
    if d.skipped_contributions + d.random_fallbacks + d.singular_fits > 0 {
        println!(
            "  Skipped contributions: {}, random fallbacks: {}, singular fits: {}",
            d.skipped_contributions, d.random_fallbacks, d.singular_fits
        );
    }
}
