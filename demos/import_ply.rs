//! Import a binary PLY point cloud and report the adaptive point sizes
//!
//! Usage: `import_ply scan.ply --neighbors 8 --max-neighbor-work 50000000`
//! Set `RUST_LOG=debug` to see each pipeline stage.

use anyhow::{Context, Result};
use clap::Parser;
use pointsize::prelude::*;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "import_ply", about = "Import a binary PLY point cloud with adaptive point sizes")]
struct Args {
    /// PLY file (binary little-endian)
    path: PathBuf,

    /// Neighbors averaged per point; 0 disables adaptive sizing
    #[arg(short = 'k', long, default_value_t = 0, allow_negative_numbers = true)]
    neighbors: i32,

    /// Refuse imports whose neighbors x vertices exceeds this value
    #[arg(long)]
    max_neighbor_work: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let options = ImportOptions {
        neighbor_count: args.neighbors,
        max_neighbor_work: args.max_neighbor_work,
    };

    let set = import(&args.path, &options)
        .with_context(|| format!("failed importing {}", args.path.display()))?;

    let (min, max) = set.bounding_box();
    println!("Name:         {}", set.name.as_deref().unwrap_or("-"));
    println!("Vertices:     {}", set.len());
    println!("Topology:     {:?} ({:?} indices)", set.topology, set.index_format);
    println!("Bounds:       [{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}]", min.x, min.y, min.z, max.x, max.y, max.z);
    println!("Center:       {:?}", set.center());

    match set.size_uvs() {
        Some(uvs) => {
            let sizes: Vec<f32> = uvs.iter().map(|uv| uv[0]).collect();
            let smallest = sizes.iter().copied().fold(f32::INFINITY, f32::min);
            let largest = sizes.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let mean = sizes.iter().sum::<f32>() / sizes.len() as f32;
            println!("Point sizes:  min {:.5}, mean {:.5}, max {:.5}", smallest, mean, largest);
        }
        None => println!("Point sizes:  fixed (adaptive sizing disabled)"),
    }

    Ok(())
}
