use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use landscape_noise::NoiseField;
use landscape_river::{RiverChannel, RiverParams};
use landscape_terrain::{HeightfieldParams, ZOffset, generate_heightmap, generate_path_mask};
use landscape_world::{ExportBundle, Landscape, LandscapeConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "landscape-cli", about = "Procedural landscape generation")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Synthesize a heightmap and print its statistics
    Heightmap {
        /// Grid side length
        #[arg(short, long, default_value = "128")]
        resolution: usize,
        /// Vertical scale of the first octave
        #[arg(short, long, default_value = "10.0")]
        amplitude: f32,
        /// Seed selecting the noise slice (random if omitted)
        #[arg(short, long)]
        seed: Option<u64>,
        /// Write the heightmap as JSON
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Build the path blend mask
    PathMask {
        /// Mask side length in texels
        #[arg(short, long, default_value = "128")]
        resolution: usize,
        /// Write the raw RGBA8 texels
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Build the river channel mesh
    River {
        /// Number of curve segments sampled along the centerline
        #[arg(short, long, default_value = "50")]
        divisions: usize,
        /// Channel width
        #[arg(short, long, default_value = "4.0")]
        width: f32,
    },
    /// Generate a full landscape and optionally export it
    Generate {
        /// YAML scene config (defaults to the built-in scene)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Seed; overrides the config seed (random if neither is given)
        #[arg(short, long)]
        seed: Option<u64>,
        /// Write the generated landscape as JSON
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

/// Use the given seed, or draw and log a fresh one so the run can be repeated.
fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        let seed = rand::random::<u64>();
        tracing::info!(seed, "no seed given, drew a random one");
        seed
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("landscape-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", landscape_common::crate_info());
            println!("noise: {}", landscape_noise::crate_info());
            println!("terrain: {}", landscape_terrain::crate_info());
            println!("river: {}", landscape_river::crate_info());
            println!("world: {}", landscape_world::crate_info());
        }
        Commands::Heightmap {
            resolution,
            amplitude,
            seed,
            out,
        } => {
            let seed = resolve_seed(seed);
            let z = ZOffset::from_seed(seed);
            let params = HeightfieldParams {
                resolution,
                amplitude,
            };
            let heightmap = generate_heightmap(&NoiseField::new(), &params, z);

            println!(
                "Heightmap: resolution={resolution}, amplitude={amplitude}, seed={seed}, z={:.4}",
                z.0
            );
            match heightmap.min_max() {
                Some((lo, hi)) => println!("Heights: min={lo:.3}, max={hi:.3}"),
                None => println!("Heights: (empty)"),
            }
            let mid = resolution / 2;
            if let Some(h) = heightmap.get(mid, mid) {
                println!("Center ({mid}, {mid}): {h:.3}");
            }

            if let Some(path) = out {
                let file = std::fs::File::create(&path)
                    .with_context(|| format!("creating {}", path.display()))?;
                serde_json::to_writer(std::io::BufWriter::new(file), &heightmap)?;
                println!("Wrote {}", path.display());
            }
        }
        Commands::PathMask { resolution, out } => {
            let mask = generate_path_mask(resolution);
            let on_path = (0..resolution)
                .flat_map(|y| (0..resolution).map(move |x| (x, y)))
                .filter(|&(x, y)| mask.alpha(x, y).is_some_and(|a| a < 128))
                .count();
            println!(
                "Path mask: {resolution}x{resolution}, {} bytes, {on_path} texels on a path",
                mask.as_bytes().len()
            );

            if let Some(path) = out {
                std::fs::write(&path, mask.as_bytes())
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Wrote {}", path.display());
            }
        }
        Commands::River { divisions, width } => {
            let params = RiverParams {
                divisions,
                width,
                ..RiverParams::default()
            };
            let river = RiverChannel::new(&params);
            let mesh = river.build_mesh();
            println!(
                "River: {} control points, length {:.2}",
                params.control_points.len(),
                river.curve().approximate_length(divisions.max(1) * 4)
            );
            println!(
                "Mesh: {} vertices, {} triangles",
                mesh.vertex_count(),
                mesh.triangle_count()
            );
            if let Some((lo, hi)) = mesh.bounds() {
                println!("Bounds: {lo} .. {hi}");
            }
        }
        Commands::Generate { config, seed, out } => {
            let config = match config {
                Some(path) => LandscapeConfig::load(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => LandscapeConfig::default(),
            };
            let seed = resolve_seed(seed.or(config.seed));

            let landscape = Landscape::generate(&config, seed);
            println!("{}", landscape.summary());

            if let Some(path) = out {
                let digest = ExportBundle::from_landscape(&landscape)
                    .export_json(&path)
                    .with_context(|| format!("exporting to {}", path.display()))?;
                println!("Exported {} (sha256 {digest})", path.display());
            }
        }
    }

    Ok(())
}
