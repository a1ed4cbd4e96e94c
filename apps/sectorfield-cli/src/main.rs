use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec2;
use sectorfield_common::{FieldConfig, Presentation, SectorCoord};
use sectorfield_kernel::World;
use sectorfield_stream::{SectorIndex, StreamingController, TickOutcome};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sectorfield-cli", about = "CLI tool for sectorfield asteroid fields")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML field configuration; defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the world seed from the configuration
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration and crate info
    Info,
    /// Print the generated contents of one sector
    #[command(allow_negative_numbers = true)]
    Sector {
        x: i32,
        y: i32,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Fly in a straight line from the origin and report every region shift
    #[command(allow_negative_numbers = true)]
    Walk {
        #[arg(long, default_value = "2500")]
        to_x: f32,
        #[arg(long, default_value = "0")]
        to_y: f32,
        /// Number of ticks to spread the walk over
        #[arg(long, default_value = "100")]
        steps: u32,
    },
    /// Walk, then rebuild the host world from its event log and compare
    #[command(allow_negative_numbers = true)]
    Replay {
        #[arg(long, default_value = "2500")]
        to_x: f32,
        #[arg(long, default_value = "0")]
        to_y: f32,
        #[arg(long, default_value = "100")]
        steps: u32,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<FieldConfig> {
    let mut config = match &cli.config {
        Some(path) => FieldConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => FieldConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.world_seed = seed;
    }
    config.validate()?;
    Ok(config)
}

/// Stand-in for a grid overlay: remembers where the region was last centred.
#[derive(Debug, Default, PartialEq)]
struct GridOverlay {
    recenters: usize,
    center: Option<(SectorCoord, Vec2)>,
}

impl Presentation for GridOverlay {
    fn recenter(&mut self, sector: SectorCoord, world_center: Vec2) {
        self.recenters += 1;
        self.center = Some((sector, world_center));
    }
}

/// Drive a controller along a straight line and return the host world and
/// overlay.
fn walk(
    config: FieldConfig,
    target: Vec2,
    steps: u32,
    report: bool,
) -> anyhow::Result<(World, GridOverlay)> {
    anyhow::ensure!(steps > 0, "steps must be at least 1");
    let mut controller = StreamingController::new(config, World::new(), GridOverlay::default())?;

    let mut shifts = 0;
    for i in 1..=steps {
        let pos = target * (i as f32 / steps as f32);
        if let TickOutcome::Shifted(shift) = controller.tick(pos) {
            shifts += 1;
            if report {
                println!(
                    "tick {i:>5} pos=({:.1}, {:.1}): {} -> {} (+{} / -{} sectors)",
                    pos.x,
                    pos.y,
                    shift.from,
                    shift.to,
                    shift.generated.len(),
                    shift.released.len()
                );
            }
        }
    }

    let stats = controller.stats();
    if report {
        println!(
            "Done: shifts={shifts}, current={}, sectors={}, asteroids={}",
            controller.current_sector(),
            stats.total_active_sectors,
            stats.total_entities
        );
    }
    tracing::info!(shifts, current = %controller.current_sector(), "walk complete");
    Ok(controller.into_parts())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Info => {
            println!("sectorfield-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("stream: {}", sectorfield_stream::crate_info());
            println!("sector_size: {}", config.sector_size);
            println!("asteroid_density: {}", config.asteroid_density);
            println!(
                "active_half_extent: {} ({} sectors)",
                config.active_half_extent,
                config.total_sector_count()
            );
            println!("world_seed: {}", config.world_seed);
            println!("shift_threshold: {}", config.shift_threshold());
        }
        Commands::Sector { x, y, json } => {
            let index: SectorIndex<()> = SectorIndex::new(&config);
            let sector = index.generate(SectorCoord::new(x, y));
            if json {
                println!("{}", serde_json::to_string_pretty(&sector.placements)?);
            } else {
                println!("Sector {}: seed={:#018x}", sector.coord, sector.seed);
                for (i, p) in sector.placements.iter().enumerate() {
                    println!(
                        "  #{i:<3} pos=({:>10.2}, {:>10.2}) rot={:>6.3} scale={:.3}",
                        p.position.x, p.position.y, p.rotation, p.scale
                    );
                }
            }
        }
        Commands::Walk { to_x, to_y, steps } => {
            println!("Walk to ({to_x}, {to_y}) over {steps} ticks, seed={}", config.world_seed);
            let (world, overlay) = walk(config, Vec2::new(to_x, to_y), steps, true)?;
            if let Some((sector, center)) = overlay.center {
                println!(
                    "Overlay: recentered {} times, now at {sector} ({:.1}, {:.1})",
                    overlay.recenters, center.x, center.y
                );
            }
            println!(
                "Asteroids spawned: {}, live: {}",
                world.spawned_total(),
                world.entity_count()
            );
            println!("State hash: {:#x}", world.state_hash());
        }
        Commands::Replay { to_x, to_y, steps } => {
            println!("Replay check: seed={}, steps={steps}", config.world_seed);

            let (first, first_overlay) = walk(config.clone(), Vec2::new(to_x, to_y), steps, false)?;
            let (second, second_overlay) = walk(config, Vec2::new(to_x, to_y), steps, false)?;
            let replayed = World::replay(first.events());

            println!(
                "Run 1:  asteroids={}, events={}, hash={:#x}",
                first.entity_count(),
                first.events().len(),
                first.state_hash()
            );
            println!("Run 2:  asteroids={}, hash={:#x}", second.entity_count(), second.state_hash());
            println!("Replay: asteroids={}, hash={:#x}", replayed.entity_count(), replayed.state_hash());

            println!(
                "Overlay: run 1 centre {:?}, run 2 centre {:?}",
                first_overlay.center.map(|(s, _)| s),
                second_overlay.center.map(|(s, _)| s)
            );

            let ok = first.state_hash() == second.state_hash()
                && first.state_hash() == replayed.state_hash()
                && first_overlay == second_overlay;
            println!("Match: {}", if ok { "OK" } else { "MISMATCH" });
            anyhow::ensure!(ok, "replay diverged");
        }
    }

    Ok(())
}
