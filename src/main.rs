use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rangeagg::script::{parse_script, Engine, Variant};
use rangeagg::{Preset, TreeConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rangeagg", about = "Range-aggregation trees with lazy propagation and persistence")]
struct Cli {
    /// Emit debug-level events (overridden by RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a command script against one tree variant.
    Run {
        /// Script file (`update`, `query`, `version` lines).
        script: PathBuf,
        /// Tree variant: static, iterative, persistent, partial.
        #[arg(long, default_value = "static")]
        variant: Variant,
        /// Operator preset: sum-add, sum-assign, min-add, min-assign, max-add, max-assign.
        #[arg(long, default_value = "sum-add")]
        ops: Preset,
        /// Number of positions.
        #[arg(long)]
        len: usize,
        /// Initial value of every position.
        #[arg(long, default_value_t = 0)]
        init: i64,
    },
    /// List the available variants and operator presets.
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            script,
            variant,
            ops,
            len,
            init,
        } => run_script(script, variant, ops, len, init, cli.verbose)?,
        Commands::List => list(),
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_script(
    path: PathBuf,
    variant: Variant,
    ops: Preset,
    len: usize,
    init: i64,
    verbose: bool,
) -> Result<()> {
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read script from {}", path.display()))?;
    let script = parse_script(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let config = TreeConfig::for_len(len)
        .with_context(|| format!("cannot build a tree over {len} positions"))?;
    // a persistent range update copies about four nodes per level
    let per_update = 4 * (config.height_bound() + 1);
    let config = config
        .with_verbose(verbose)
        .with_node_capacity(2 * len + script.len() * per_update);

    let mut engine = Engine::with_config(variant, vec![init; len], ops, config)
        .with_context(|| format!("failed to build {variant} tree over {len} positions"))?;
    tracing::debug!(
        %variant,
        %ops,
        len,
        slots = engine.config().slot_count(),
        commands = script.len(),
        "replaying script"
    );

    for line in &script {
        if let Some(output) = engine
            .execute(line)
            .with_context(|| format!("command on line {} failed", line.line))?
        {
            println!("{output}");
        }
    }

    Ok(())
}

fn list() {
    println!("variants:");
    for variant in Variant::ALL {
        println!("  {variant}");
    }
    println!("operator presets:");
    for preset in Preset::ALL {
        println!("  {preset}");
    }
}
