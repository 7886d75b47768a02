//! Source assembly and the watch/self-check commands.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use eyre::{Result, WrapErr};
use weigher_config::{Config, ParityCfg};
use weigher_core::reader::{ReaderParams, RunSummary};
use weigher_core::stabilize::WeightEvent;
use weigher_core::{FrameCfg, StabilizeCfg};
use weigher_io::{ReplayByteSource, ReplayTiming, SerialByteSource, SerialOptions};
use weigher_traits::ByteSource;
use weigher_traits::clock::MonotonicClock;

fn serial_options(cfg: &Config) -> SerialOptions {
    use weigher_io::serial::{DataBits, Parity, StopBits};
    SerialOptions {
        baud_rate: cfg.port.baud_rate,
        data_bits: match cfg.port.data_bits {
            5 => DataBits::Five,
            6 => DataBits::Six,
            7 => DataBits::Seven,
            _ => DataBits::Eight,
        },
        parity: match cfg.port.parity {
            ParityCfg::None => Parity::None,
            ParityCfg::Even => Parity::Even,
            ParityCfg::Odd => Parity::Odd,
        },
        stop_bits: match cfg.port.stop_bits {
            2 => StopBits::Two,
            _ => StopBits::One,
        },
        read_timeout: Duration::from_millis(cfg.port.read_timeout_ms),
    }
}

fn replay_timing(cfg: &Config) -> ReplayTiming {
    ReplayTiming {
        line_delay: Duration::from_millis(cfg.replay.line_delay_ms),
        jitter_min: Duration::from_millis(cfg.replay.jitter_min_ms),
        jitter_max: Duration::from_millis(cfg.replay.jitter_max_ms),
    }
}

/// Build the byte source: a replay file when given, otherwise the serial
/// device (CLI override beats config).
pub fn open_source(
    cfg: &Config,
    port: Option<&str>,
    replay: Option<&Path>,
) -> Result<Box<dyn ByteSource>> {
    if let Some(path) = replay {
        let src = ReplayByteSource::from_file(path, replay_timing(cfg))
            .wrap_err_with(|| format!("opening replay capture {}", path.display()))?;
        return Ok(Box::new(src));
    }
    let device = port.unwrap_or(&cfg.port.device);
    let src = SerialByteSource::open(device, &serial_options(cfg))
        .wrap_err_with(|| format!("opening serial device {device}"))?;
    Ok(Box::new(src))
}

fn reader_params(cfg: &Config, max_records: Option<u64>) -> ReaderParams {
    ReaderParams {
        frame: FrameCfg {
            max_line_len: cfg.framing.max_line_len,
            stall: Duration::from_millis(cfg.framing.stall_ms),
        },
        stabilize: StabilizeCfg {
            window: Duration::from_millis(cfg.stabilization.window_ms),
        },
        idle: Duration::from_millis(cfg.reader.idle_ms),
        max_records,
    }
}

fn print_event(event: &WeightEvent, record: &str, json: bool) {
    if json {
        let (kind, kg) = match event {
            WeightEvent::Changed(kg) => ("changed", *kg),
            WeightEvent::Stabilized(kg) => ("stabilized", *kg),
        };
        println!(
            "{}",
            serde_json::json!({ "event": kind, "weight_kg": kg, "record": record })
        );
        return;
    }
    match event {
        WeightEvent::Changed(kg) => println!("weight changed: {kg} kg"),
        WeightEvent::Stabilized(kg) => println!("weight stabilized: {kg} kg"),
    }
}

fn print_stats(summary: &RunSummary) {
    eprintln!("\n--- Reader Stats ---");
    eprintln!("Bytes read: {}", summary.bytes_read);
    eprintln!(
        "Records: {} ({} rejected)",
        summary.records, summary.rejected
    );
    eprintln!("Overflow clears: {}", summary.overflow_clears);
    eprintln!("Stall clears: {}", summary.stall_clears);
    eprintln!("--------------------\n");
}

#[allow(clippy::too_many_arguments)]
pub fn run_watch(
    cfg: &Config,
    port: Option<&str>,
    replay: Option<&Path>,
    max_records: Option<u64>,
    stats: bool,
    json: bool,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    let source = open_source(cfg, port, replay)?;
    let params = reader_params(cfg, max_records);
    let clock = MonotonicClock::new();

    tracing::info!("reading scale; press Ctrl+C to stop");
    let summary = weigher_core::reader::run(source, &params, &clock, &shutdown, |event, reading| {
        tracing::debug!(record = %reading.source_line, ?event, "pipeline event");
        print_event(event, &reading.source_line, json);
    })?;

    if stats {
        print_stats(&summary);
    }
    Ok(())
}

/// Open the source, poll it once, close it. Proves the channel can be
/// acquired without committing to a run.
pub fn self_check(cfg: &Config, port: Option<&str>, replay: Option<&Path>) -> Result<()> {
    let mut source = open_source(cfg, port, replay)?;
    let pending = source
        .available()
        .map_err(|e| eyre::eyre!("source not ready: {e}"))?;
    source.close();
    tracing::info!(pending, "self-check passed");
    println!("self-check ok");
    Ok(())
}
