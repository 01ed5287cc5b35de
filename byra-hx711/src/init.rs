use std::time::Duration;
use std::{env, error::Error, io, path::PathBuf};

use byra_lib::gpio::RppalController;
use byra_lib::hx711::Hx711;
use byra_lib::settings::Hx711Settings;
use config::Config;
use log::debug;

use crate::cli_config::{Args, ServiceConfig};

/// Reads settings from given config path or default to `~/.config/byra/hx711.toml`.
pub fn read_settings(args: &Args) -> Result<ServiceConfig, Box<dyn Error>> {
    let settings_file = match args.settings_path.clone() {
        Some(file_path) => PathBuf::from(file_path),
        None => PathBuf::from(env::var("HOME")?).join(".config/byra/hx711.toml"),
    }
    .canonicalize()?;

    let settings = settings_file.to_str().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "Settings path is not valid utf-8")
    })?;

    debug!("Trying to read settings from {}", settings);

    let settings = Config::builder()
        .add_source(config::File::with_name(settings))
        .build()?
        .try_deserialize::<ServiceConfig>()?;

    Ok(settings)
}

pub fn hx711_settings(settings: &ServiceConfig) -> Hx711Settings {
    let mut hx = Hx711Settings::new(settings.dout, settings.dt_sck)
        .with_numbering(settings.numbering)
        .with_gain(settings.gain)
        .with_poll_interval(Duration::from_micros(settings.poll_interval_us));

    if let Some(system) = settings.calibration_system {
        hx = hx.with_calibration(
            system,
            settings.calibration_metric_unit,
            settings.calibration_imperial_unit,
            settings.scale_factor,
        );
    }

    if let Some(timeout) = settings.ready_timeout_ms {
        hx = hx.with_ready_timeout(Duration::from_millis(timeout));
    }

    hx
}

/// Initiates dout & dt_sck gpio and the driver on top of them.
pub fn bootstrap(settings: &ServiceConfig) -> Result<Hx711<RppalController>, Box<dyn Error>> {
    let gpio = RppalController::new(settings.numbering)?;
    let scale = Hx711::new(gpio, hx711_settings(settings), settings.tare)?;

    Ok(scale)
}

#[cfg(test)]
mod tests {
    use byra_lib::protocol::Gain;
    use byra_lib::units::{MetricUnit, WeightSystem};

    use super::*;

    fn service_config(toml: &str) -> ServiceConfig {
        Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn minimal_config_is_uncalibrated() {
        let cfg = service_config("dout = 25\ndt_sck = 24\nbackoff = 500\n");
        let hx = hx711_settings(&cfg);

        assert_eq!(hx.data_pin, 25);
        assert_eq!(hx.clock_pin, 24);
        assert_eq!(hx.gain, Gain::X128);
        assert_eq!(hx.calibration.system, None);
        assert_eq!(hx.poll.interval, Duration::from_micros(10));
        assert_eq!(hx.poll.ready_timeout, None);
        assert_eq!(cfg.readings, 10);
    }

    #[test]
    fn seeded_calibration_from_config() {
        let cfg = service_config(
            r#"
            dout = 5
            dt_sck = 6
            numbering = "board"
            gain = "x64"
            tare = 521703
            calibration_system = "metric"
            calibration_metric_unit = "kg"
            scale_factor = 23648.0
            ready_timeout_ms = 1000
            backoff = 3000
            "#,
        );
        let hx = hx711_settings(&cfg);

        assert_eq!(cfg.tare, 521_703);
        assert_eq!(hx.gain, Gain::X64);
        assert_eq!(hx.calibration.system, Some(WeightSystem::Metric));
        assert_eq!(hx.calibration.metric_unit, MetricUnit::Kilograms);
        assert_eq!(hx.calibration.scale_factor, 23_648.0);
        assert_eq!(hx.poll.ready_timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn unknown_unit_is_rejected() {
        let result = Config::builder()
            .add_source(config::File::from_str(
                "dout = 5\ndt_sck = 6\nbackoff = 1\ncalibration_metric_unit = \"stone\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize::<ServiceConfig>();

        assert!(result.is_err());
    }
}
