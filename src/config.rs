//! Engine-wide configuration constants.
//!
//! The distilled specification treats RAM size and MMIO base as "configuration
//! constants, not runtime-variable" — this module honours that by giving
//! every field a [`Default`] that reproduces those constants exactly, while
//! still allowing a host (or a test) to override them by constructing an
//! [`EngineConfig`] directly or by loading one from TOML.

use serde::{Deserialize, Serialize};

/// RAM size used when no override is supplied: 16 MiB.
pub const DEFAULT_RAM_SIZE: u32 = 16 * 1024 * 1024;

/// MMIO window base: the top 1 MiB of the 32-bit address space.
pub const DEFAULT_MMIO_BASE: u32 = 0xFFF0_0000;

/// Representative primary-CPU clock, in Hz (used to derive cycle/sample ratios).
pub const DEFAULT_CPU_RATE: f64 = 8_000_000.0;

/// Representative 6502 coprocessor clock, in Hz.
pub const DEFAULT_COPROC_RATE: f64 = 1_000_000.0;

/// Default audio sample rate, in Hz.
pub const DEFAULT_SAMPLE_RATE: f64 = 44_100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// RAM size in bytes. Must be a power of two for the bus's masked indexing.
    pub ram_size: u32,
    /// First address of the MMIO window; everything below is RAM.
    pub mmio_base: u32,
    /// Primary CPU clock, in Hz.
    pub cpu_rate: f64,
    /// Coprocessor (6502) clock, in Hz.
    pub coproc_rate: f64,
    /// Audio sample rate, in Hz.
    pub sample_rate: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            ram_size: DEFAULT_RAM_SIZE,
            mmio_base: DEFAULT_MMIO_BASE,
            cpu_rate: DEFAULT_CPU_RATE,
            coproc_rate: DEFAULT_COPROC_RATE,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document into an `EngineConfig`, falling back to
    /// [`Default`] for any field the document omits.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn samples_per_cpu_cycle(&self) -> f64 {
        self.sample_rate / self.cpu_rate
    }

    pub fn coproc_cycles_per_primary_cycle(&self) -> f64 {
        self.coproc_rate / self.cpu_rate
    }
}
