#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the scale reader.
//!
//! Deserialized from TOML and validated. Every field has a default matching
//! the reference device (4800 baud 7E1, 50-char lines, 5 s stall watchdog,
//! 3 s stabilization window), so an absent or partial config file is fine.

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub port: PortCfg,
    pub framing: FramingCfg,
    pub stabilization: StabilizationCfg,
    pub reader: ReaderCfg,
    pub replay: ReplayCfg,
}

/// Serial port parameters. The scale's wire format is fixed at 7 data bits,
/// even parity, 1 stop bit; the knobs exist for bench variants.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortCfg {
    pub device: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: ParityCfg,
    pub stop_bits: u8,
    /// Max blocking wait per read on the device (ms).
    pub read_timeout_ms: u64,
}

impl Default for PortCfg {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".into(),
            baud_rate: 4800,
            data_bits: 7,
            parity: ParityCfg::Even,
            stop_bits: 1,
            read_timeout_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParityCfg {
    None,
    Even,
    Odd,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FramingCfg {
    /// Maximum plausible record length before the overflow guard clears.
    pub max_line_len: usize,
    /// Clear a non-empty buffer after this long without a terminator (ms).
    pub stall_ms: u64,
}

impl Default for FramingCfg {
    fn default() -> Self {
        Self {
            max_line_len: 50,
            stall_ms: 5000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StabilizationCfg {
    /// Weight unchanged for this long is announced stable (ms).
    pub window_ms: u64,
}

impl Default for StabilizationCfg {
    fn default() -> Self {
        Self { window_ms: 3000 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderCfg {
    /// Idle wait between loop ticks when no bytes are available (ms).
    pub idle_ms: u64,
}

impl Default for ReaderCfg {
    fn default() -> Self {
        Self { idle_ms: 5 }
    }
}

/// Pacing for the file-replay simulator.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplayCfg {
    pub line_delay_ms: u64,
    pub jitter_min_ms: u64,
    pub jitter_max_ms: u64,
}

impl Default for ReplayCfg {
    fn default() -> Self {
        Self {
            line_delay_ms: 200,
            jitter_min_ms: 5,
            jitter_max_ms: 10,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
        let cfg: Config =
            toml::from_str(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // Port
        if self.port.device.is_empty() {
            eyre::bail!("port.device must not be empty");
        }
        if self.port.baud_rate == 0 {
            eyre::bail!("port.baud_rate must be > 0");
        }
        if !(5..=8).contains(&self.port.data_bits) {
            eyre::bail!("port.data_bits must be in 5..=8");
        }
        if !(1..=2).contains(&self.port.stop_bits) {
            eyre::bail!("port.stop_bits must be 1 or 2");
        }
        if self.port.read_timeout_ms == 0 {
            eyre::bail!("port.read_timeout_ms must be >= 1");
        }

        // Framing: the shortest matchable record is `i` + id char + one
        // space + 11 digits = 14 characters.
        if self.framing.max_line_len < 14 {
            eyre::bail!("framing.max_line_len must be >= 14 (a full record)");
        }
        if self.framing.max_line_len > 1024 {
            eyre::bail!("framing.max_line_len is unreasonably large (>1024)");
        }
        if self.framing.stall_ms == 0 {
            eyre::bail!("framing.stall_ms must be >= 1");
        }

        // Stabilization
        if self.stabilization.window_ms == 0 {
            eyre::bail!("stabilization.window_ms must be >= 1");
        }
        if self.stabilization.window_ms > 5 * 60 * 1000 {
            eyre::bail!("stabilization.window_ms is unreasonably large (>5min)");
        }

        // Reader
        if self.reader.idle_ms > 1000 {
            eyre::bail!("reader.idle_ms must be <= 1000");
        }

        // Replay
        if self.replay.jitter_min_ms > self.replay.jitter_max_ms {
            eyre::bail!("replay.jitter_min_ms must be <= replay.jitter_max_ms");
        }

        Ok(())
    }
}
