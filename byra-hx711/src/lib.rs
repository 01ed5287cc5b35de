//! These are the components that are used in [byra-hx711](../byra_hx711/index.html) to read weights
//! from a load cell through the HX711 module. See, readme for usage & the binary for setup & settings.
//!
//! ```no_run
//! use byra_lib::gpio::{PinNumberingScheme, RppalController};
//! use byra_lib::hx711::Hx711;
//! use byra_lib::protocol::Gain;
//! use byra_lib::settings::Hx711Settings;
//! use byra_lib::units::WeightSystem;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let gpio = RppalController::new(PinNumberingScheme::Logical)?;
//! let scale = Hx711::new(gpio, Hx711Settings::new(25, 24), 0)?;
//!
//! scale.set_gain(Gain::X64)?;
//! scale.tare()?;
//! scale.calibrate(WeightSystem::Metric, 100.0)?;
//!
//! println!("{:.2}", scale.read_metric_weight()?);
//! # Ok(())
//! # }
//! ```
pub mod error;
pub mod gpio;
pub mod hx711;
pub mod output_writer;
pub mod protocol;
pub mod settings;
pub mod units;
pub mod weight;
