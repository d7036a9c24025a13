//! MHS-52xx Frequency Sweep Demo
//!
//! Configures channel 1 as a 50 % square wave and sweeps its frequency.
//!
//! Usage:
//!   cargo run --example sweep -- [OPTIONS] [PORT]
//!
//! Options:
//!   --port PORT       Serial port (default: from config, else /dev/ttyUSB0)
//!   --config FILE     Connection config JSON (default: user config dir)
//!   --demo            Use the simulated instrument instead of a serial port
//!   --no-sweep        Configure the channel and stop
//!
//! Logging is controlled with RUST_LOG (default: info).

use anyhow::Context;
use mhs_dds_core::prelude::*;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SWEEP_START_HZ: u32 = 1;
const SWEEP_END_HZ: u32 = 450_000;
const SWEEP_STEP_HZ: usize = 1000;

fn run<T: Transport>(dds: &mut Generator<T>, sweep: bool) -> anyhow::Result<()> {
    let version = dds.get_version()?;
    info!("Instrument version: {:?}", version.text());

    dds.chan_on(1)?;
    dds.set_waveform(1, Waveform::Square)?;
    dds.set_duty_cycle(1, 500)?;
    dds.set_amplitude(1, 500)?;
    dds.set_offset(1, 100)?;
    dds.set_frequency(1, 5000.0)?;
    info!("Channel 1 configured: square, 50% duty, 500 mV, 5000 Hz");

    if sweep {
        info!(
            "Sweeping {}..{} Hz in {} Hz steps",
            SWEEP_START_HZ, SWEEP_END_HZ, SWEEP_STEP_HZ
        );
        for hz in (SWEEP_START_HZ..SWEEP_END_HZ).step_by(SWEEP_STEP_HZ) {
            dds.set_frequency(1, f64::from(hz))?;
        }
    }

    let (tx, rx, transactions) = dds.connection().counters();
    info!(
        "Done: {} transactions, {} bytes sent, {} bytes received",
        transactions, tx, rx
    );
    Ok(())
}

fn print_help() {
    println!("Usage: sweep [--port PORT] [--config FILE] [--demo] [--no-sweep] [PORT]");
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut port_name: Option<String> = None;
    let mut config_path: Option<PathBuf> = ConnectionConfig::default_path();
    let mut demo = false;
    let mut sweep = true;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                i += 1;
                if i < args.len() {
                    port_name = Some(args[i].clone());
                }
            }
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    config_path = Some(PathBuf::from(&args[i]));
                }
            }
            "--demo" => {
                demo = true;
            }
            "--no-sweep" => {
                sweep = false;
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            arg if !arg.starts_with('-') => {
                port_name = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
            }
        }
        i += 1;
    }

    if demo {
        info!("Using simulated instrument");
        let mut dds = Generator::with_transport(SimulatedInstrument::new());
        return run(&mut dds, sweep);
    }

    let mut config = match config_path.filter(|p| p.exists()) {
        Some(path) => ConnectionConfig::load(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ConnectionConfig::new("/dev/ttyUSB0"),
    };
    if let Some(port) = port_name {
        config.port_name = port;
    }

    // A connection failure is the end of the road for this tool
    let mut dds = Generator::open(&config)
        .with_context(|| format!("opening {}", config.port_name))?;
    run(&mut dds, sweep)
}
