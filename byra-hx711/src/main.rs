//! The byra-hx711 binary reads weights from a load cell through a HX711 module.
//! It has only been tested on the raspberry pi zero (w).
//!
//! ## Calibrate
//! Tares the empty scale, then waits for a reference weight to be placed on it and prints the
//! resulting tare & scale factor so they can be copied into the settings file.
//!
//! ```bash
//! byra-hx711 --calibrate 100 # 100 of the configured calibration unit, grams by default
//! ```
//!
//! ## Run
//! Start a long lived process, readings are pushed to stdout or file (based on given settings).
//!
//! ```bash
//! byra-hx711 # Reads settings from `~/.config/byra/hx711.toml` by default.
//!
//! byra-hx711 --help
//! ```
//!
//! ## Example config
//! ```toml
//! # ~/.config/byra/hx711.toml
//! dout = 25
//! dt_sck = 24
//! gain = "x64"
//! tare = 521703
//! calibration_system = "metric"
//! calibration_metric_unit = "grams"
//! scale_factor = 236.48
//! ready_timeout_ms = 1000
//! backoff = 500
//! retry = 3
//!```

use std::error::Error;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use byra_lib::gpio::GpioController;
use byra_lib::hx711::Hx711;
use byra_lib::output_writer::write_sample;
use byra_lib::units::WeightSystem;
use clap::Parser;
use log::{debug, error, info};
use simple_logger::SimpleLogger;

mod cli_config;
mod init;

use crate::cli_config::{Args, ServiceConfig};
use crate::init::{bootstrap, read_settings};

static MODULE: &str = "HX711";

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    SimpleLogger::new()
        .with_level(match args.verbose {
            true => log::LevelFilter::Debug,
            false => log::LevelFilter::Info,
        })
        .init()?;

    let settings = read_settings(&args)?;
    info!("Starting byra-hx711, setting up gpio");
    let scale = bootstrap(&settings)?;
    info!("{MODULE} ready, gain={:?}", scale.gain()?);

    if !args.skip_tare {
        info!("Taring, remove any weight from the scale");
        info!("tare={}", scale.tare_with(settings.readings)?);
    }

    if let Some(weight) = args.calibrate {
        calibrate(&scale, &settings, weight)?;
    }

    let mut writer: Box<dyn Write> = match &settings.output_file {
        Some(path) => Box::new(OpenOptions::new().create(true).append(true).open(path)?),
        None => Box::new(io::stdout()),
    };

    stream_weight(&scale, &settings, writer.as_mut())
}

fn calibrate<G: GpioController>(
    scale: &Hx711<G>,
    settings: &ServiceConfig,
    weight: f64,
) -> Result<(), Box<dyn Error>> {
    let system = settings.calibration_system.unwrap_or(WeightSystem::Metric);
    let unit = match system {
        WeightSystem::Metric => settings.calibration_metric_unit.symbol(),
        WeightSystem::Imperial => settings.calibration_imperial_unit.symbol(),
    };

    info!("Place {weight}{unit} on the scale and press enter");
    io::stdin().read_line(&mut String::new())?;

    let scale_factor = scale.calibrate_with(
        system,
        weight,
        settings.calibration_imperial_unit,
        settings.calibration_metric_unit,
        settings.readings,
    )?;

    info!(
        "\rtare={}\nscale_factor={}",
        scale.tare_value()?,
        scale_factor
    );

    Ok(())
}

/// Reads the scale every `backoff` ms & writes each weight to `writer`. Gives up after `retry`
/// consecutive failed reads.
fn stream_weight<G: GpioController>(
    scale: &Hx711<G>,
    settings: &ServiceConfig,
    writer: &mut dyn Write,
) -> Result<(), Box<dyn Error>> {
    let mut retries = 0;

    loop {
        match scale.read_weight() {
            Ok(weight) => {
                retries = 0;
                debug!("{:.2} / {:.4}", weight.metric(), weight.imperial());
                write_sample(&weight, writer)?;
            }
            Err(e @ byra_lib::error::Error::Uncalibrated) => return Err(e.into()),
            Err(e) => {
                retries += 1;
                error!("Failed to update scale reading {}", e);

                if retries >= settings.retry {
                    error!("Reach maximum read retries");

                    return Err(e.into());
                }
            }
        }

        thread::sleep(Duration::from_millis(settings.backoff));
    }
}
