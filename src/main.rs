mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use console::style;
use directories::ProjectDirs;
use std::fs;
use std::time::Instant;
use tracing_subscriber::fmt::time;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};
use tripwire::errors::{TripwireError, TripwireResult};
use tripwire::patterns;
use tripwire::utils::Config;

fn init_tracing() {
    let fmt_layer = fmt::layer()
        .pretty()
        .with_writer(std::io::stderr)
        .with_thread_ids(true)
        .with_timer(time::UtcTime::rfc_3339());

    Registry::default()
        .with(EnvFilter::from_default_env())
        .with(fmt_layer)
        .init();
}

fn main() -> TripwireResult<()> {
    let now = Instant::now();
    init_tracing();

    tracing::debug!("CLI starting up");
    let cli = Cli::parse();

    let proj_dirs = ProjectDirs::from("dev", "tripwire", "tripwire")
        .ok_or_else(|| TripwireError::Other("Unable to determine project directories".into()))?;

    let config_dir = proj_dirs.config_dir();
    fs::create_dir_all(config_dir)?;

    let mut config = Config::load(config_dir)?;

    let mut pool = rayon::ThreadPoolBuilder::new()
        .stack_size(config.performance.rayon_thread_stack_size);
    if let Some(threads) = config.performance.worker_threads {
        pool = pool.num_threads(threads);
    }
    pool.build_global()?;

    let registry = patterns::Registry::builtin()?;
    let gate_tripped = commands::handle_command(cli.command, &registry, &mut config)?;

    eprintln!(
        "{} in {:.3}s.",
        style("Finished").green().bold(),
        now.elapsed().as_secs_f32()
    );
    if gate_tripped {
        std::process::exit(1);
    }
    Ok(())
}
