use byra_lib::gpio::PinNumberingScheme;
use byra_lib::protocol::Gain;
use byra_lib::units::{ImperialUnit, MetricUnit, WeightSystem};
use clap::Parser;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ServiceConfig {
    /// Data out pin (25)
    pub dout: u8,

    /// Clock pin (24)
    pub dt_sck: u8,

    /// `logical` (bcm) or `board` (header position) pin numbers.
    #[serde(default)]
    pub numbering: PinNumberingScheme,

    /// `x128`, `x64` or `x32`.
    #[serde(default)]
    pub gain: Gain,

    /// Raw sensor value when the scale is under no pressure. Replaced by a fresh tare on startup
    /// unless `--skip-tare` is given.
    #[serde(default)]
    pub tare: i32,

    /// Number of reads averaged when taring & calibrating.
    #[serde(default = "default_readings")]
    pub readings: usize,

    /// `metric` or `imperial`, leave unset if the scale hasn't been calibrated yet.
    pub calibration_system: Option<WeightSystem>,

    #[serde(default)]
    pub calibration_metric_unit: MetricUnit,

    #[serde(default)]
    pub calibration_imperial_unit: ImperialUnit,

    /// Raw points per calibration unit, printed by `--calibrate`.
    #[serde(default)]
    pub scale_factor: f64,

    /// Microseconds between data ready polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_us: u64,

    /// Gives up on a read if the module doesn't signal data ready in time, waits forever if unset.
    pub ready_timeout_ms: Option<u64>,

    /// Sets the read interval for the scale in milliseconds. Hence, how often a weight will be
    /// written to output.
    pub backoff: u64,

    /// Consecutive failed reads tolerated before the process gives up.
    #[serde(default = "default_retry")]
    pub retry: u32,

    /// This is the output file which the scale will stream samples to, stdout will be used if
    /// this setting is unset.
    pub output_file: Option<String>,
}

fn default_readings() -> usize {
    byra_lib::hx711::DEFAULT_READINGS
}

fn default_retry() -> u32 {
    3
}

fn default_poll_interval() -> u64 {
    10
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Calibrates against the given reference weight (in the configured calibration unit) before
    /// reading, the resulting scale factor is printed
    #[arg(short, long)]
    pub calibrate: Option<f64>,

    /// Keep the configured tare instead of taring on startup
    #[arg(long, default_value_t = false)]
    pub skip_tare: bool,

    /// Target configuration file, tries to read `~/.config/byra/hx711.toml` by default
    #[arg(short, long)]
    pub settings_path: Option<String>,

    /// Toggles verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
