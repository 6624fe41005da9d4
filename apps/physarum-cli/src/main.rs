use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use physarum_kernel::runner::{self, CancelToken, RunOptions};
use physarum_kernel::{Placement, SimConfig, Simulation};
use physarum_tools::{SimInspector, TickTimer, export};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "physarum-cli", about = "Headless runner for the physarum trail simulation")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the default configuration summary
    Info,
    /// Print the default configuration as JSON
    Config,
    /// Run a simulation and report field statistics
    Run {
        #[command(flatten)]
        setup: Setup,
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "200")]
        ticks: u64,
        /// Cap the tick rate (ticks per second)
        #[arg(long)]
        fps: Option<f64>,
        /// Write the final field as a PGM image
        #[arg(long)]
        export: Option<PathBuf>,
        /// Print a downsampled preview of the final field
        #[arg(long)]
        ascii: bool,
    },
    /// Run two identical simulations and compare every published field
    Verify {
        #[command(flatten)]
        setup: Setup,
        /// Number of ticks to compare
        #[arg(short, long, default_value = "100")]
        ticks: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PlacementKind {
    Uniform,
    Disk,
}

/// Configuration sources shared by every simulating command.
#[derive(clap::Args)]
struct Setup {
    /// JSON configuration file; missing fields take defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    width: Option<usize>,
    #[arg(long)]
    height: Option<usize>,
    #[arg(long)]
    agents: Option<usize>,
    /// Seed for reproducible runs
    #[arg(short, long)]
    seed: Option<u64>,
    #[arg(long, value_enum)]
    placement: Option<PlacementKind>,
}

impl Setup {
    fn resolve(&self) -> anyhow::Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => SimConfig::default(),
        };
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(agents) = self.agents {
            config.agent_count = agents;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        match self.placement {
            Some(PlacementKind::Uniform) => config.placement = Placement::Uniform,
            Some(PlacementKind::Disk) => config.placement = Placement::Disk { radius: None },
            None => {}
        }
        Ok(config)
    }
}

fn load_config(path: &Path) -> anyhow::Result<SimConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let config = SimConfig::default();
            println!("physarum-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("kernel: {}", physarum_kernel::crate_info());
            println!("tools: {}", physarum_tools::crate_info());
            println!(
                "defaults: grid={}x{} agents={} speed={} turn={} decay={} diffusion={}",
                config.width,
                config.height,
                config.agent_count,
                config.steering.speed,
                config.steering.turn_speed,
                config.steering.decay_rate,
                config.steering.diffusion_weight
            );
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&SimConfig::default())?);
        }
        Commands::Run {
            setup,
            ticks,
            fps,
            export: export_path,
            ascii,
        } => {
            let config = setup.resolve()?;
            let cap = config.cap;
            let mut sim = Simulation::new(config)?;
            let mut options = RunOptions::ticks(ticks);
            if let Some(fps) = fps {
                options = options.with_fps(fps);
            }

            let mut timer = TickTimer::new(120);
            let summary = runner::run(&mut sim, &options, &CancelToken::new(), |_, dt| {
                timer.record(dt);
                ControlFlow::Continue(())
            })?;
            sim.stop();

            println!(
                "Ran {} ticks in {:?} ({:?})",
                summary.ticks, summary.elapsed, summary.stop_reason
            );
            println!(
                "Tick time: avg={:?} min={:?} max={:?} ({:.1} ticks/s)",
                timer.average(),
                timer.min(),
                timer.max(),
                timer.ticks_per_second()
            );
            println!("{}", SimInspector::summary(&sim));

            let snapshot = sim.field_snapshot();
            if let Some(path) = export_path {
                let file = std::fs::File::create(&path)
                    .with_context(|| format!("creating {}", path.display()))?;
                export::write_pgm(&snapshot, cap, std::io::BufWriter::new(file))
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Exported field to {}", path.display());
            }
            if ascii {
                print!("{}", export::ascii_preview(&snapshot, cap, 80));
            }
        }
        Commands::Verify { setup, ticks } => {
            let config = setup.resolve()?;
            println!("Determinism check: seed={:?}, ticks={ticks}", config.seed);

            let mut a = Simulation::new(config.clone())?;
            let mut b = Simulation::new(config)?;
            let mut mismatch = None;
            for _ in 0..ticks {
                let sa = a.tick()?;
                let sb = b.tick()?;
                if sa.content_hash() != sb.content_hash() {
                    mismatch = Some(sa.tick);
                    break;
                }
            }

            println!("Run A: tick={}, hash={:#018x}", a.tick_count(), a.state_hash());
            println!("Run B: tick={}, hash={:#018x}", b.tick_count(), b.state_hash());
            match mismatch {
                None => println!("Match: OK"),
                Some(tick) => anyhow::bail!("fields diverged at tick {tick}"),
            }
        }
    }

    Ok(())
}
