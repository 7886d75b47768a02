mod cli;
mod error_fmt;
mod watch;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::Result;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{format_error_json, humanize};

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn real_main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    init_tracing(&cli.log_level, cli.json);

    // A missing config file is not an error; the defaults encode the
    // reference device.
    let cfg = if cli.config.exists() {
        weigher_config::Config::load(&cli.config)?
    } else {
        tracing::debug!(path = %cli.config.display(), "no config file, using defaults");
        weigher_config::Config::default()
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            tracing::info!("interrupt received, finishing current tick");
            shutdown.store(true, Ordering::Relaxed);
        })?;
    }

    match &cli.cmd {
        Commands::Watch {
            port,
            replay,
            max_records,
            stats,
        } => watch::run_watch(
            &cfg,
            port.as_deref(),
            replay.as_deref(),
            *max_records,
            *stats,
            cli.json,
            shutdown,
        ),
        Commands::SelfCheck { port, replay } => {
            watch::self_check(&cfg, port.as_deref(), replay.as_deref())
        }
    }
}

fn main() {
    if let Err(err) = real_main() {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(1);
    }
}
