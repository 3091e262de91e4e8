//! `ietool` — a headless runner for the Intuition Engine core. Loads a
//! container, optionally overrides `EngineConfig` from a TOML file, runs
//! the scheduler for a fixed number of cycles, and streams whatever audio
//! samples the ring produces to the default output device via `rodio`.
//!
//! Everything past the minimal container load — a GUI, a debugger, a video
//! back-end — belongs to a host this binary is not; it exists to prove the
//! library's contract (`reset()`, `step()`, read samples back) is enough.

use anyhow::{Context, Result};
use intuition_engine::config::EngineConfig;
use intuition_engine::Engine;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};
use std::fs;

struct Args {
    container_path: String,
    config_path: Option<String>,
    cycles: u64,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let container_path = args.next().context("usage: ietool <container> [--config <file>] [--cycles <n>]")?;
    let mut config_path = None;
    let mut cycles = 1_000_000u64;
    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--config" => config_path = Some(args.next().context("--config requires a path")?),
            "--cycles" => cycles = args.next().context("--cycles requires a number")?.parse()?,
            other => anyhow::bail!("unrecognised argument: {other}"),
        }
    }
    Ok(Args { container_path, config_path, cycles })
}

fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    match path {
        None => Ok(EngineConfig::default()),
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading config file {path}"))?;
            EngineConfig::from_toml_str(&text).with_context(|| format!("parsing config file {path}"))
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = parse_args()?;
    let config = load_config(args.config_path.as_deref())?;

    let mut engine = Engine::new(config).context("constructing engine")?;
    let bytes = fs::read(&args.container_path).with_context(|| format!("reading container {}", args.container_path))?;
    engine.load_container(&bytes).context("loading container")?;

    log::info!("running for {} cycles at {} Hz sample rate", args.cycles, config.sample_rate);
    engine.run_for_cycles(args.cycles);

    let mut samples = Vec::new();
    while let Some(sample) = engine.next_sample() {
        samples.push(sample);
    }
    log::info!("collected {} audio samples", samples.len());

    if !samples.is_empty() {
        let (_stream, handle) = OutputStream::try_default().context("opening default audio output")?;
        let sink = Sink::try_new(&handle).context("creating audio sink")?;
        sink.append(SamplesBuffer::new(1, config.sample_rate as u32, samples));
        sink.sleep_until_end();
    }

    Ok(())
}
