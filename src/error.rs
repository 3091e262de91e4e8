//! Error taxonomy for fallible, non-hot-path operations.
//!
//! Per-instruction CPU faults are *not* represented here: they are recorded
//! in-band on the CPU as a [`crate::risc::Fault`] / 6502 equivalent, mirroring
//! `Signal` in the emulator this crate grew out of. This module only covers
//! the handful of operations that can fail once, at construction or load
//! time, where a `Result` is the natural idiom.

use thiserror::Error;

/// Errors raised while assembling a [`crate::memory::Bus`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BusError {
    #[error("MMIO range [{a_base:#x}, {a_end:#x}) overlaps [{b_base:#x}, {b_end:#x})")]
    Overlap { a_base: u32, a_end: u32, b_base: u32, b_end: u32 },
}

/// Errors raised while parsing a per-CPU container file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContainerError {
    #[error("container too short to contain a header ({len} bytes)")]
    Truncated { len: usize },
    #[error("unrecognised magic bytes {magic:?}")]
    BadMagic { magic: [u8; 4] },
    #[error("header declares {declared} program bytes but only {available} are present")]
    BodyTruncated { declared: u32, available: usize },
}

/// Top-level error type returned by fallible [`crate::Engine`] construction.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Bus(#[from] BusError),
    #[error(transparent)]
    Container(#[from] ContainerError),
    #[error("invalid device configuration: {0}")]
    DeviceConfig(String),
}
