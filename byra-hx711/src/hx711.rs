//! This module includes the public HX711 driver. It owns the gpio pins & serialises every
//! operation on them, then turns raw reads into weights using the tare & calibration values.

use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::gpio::GpioController;
use crate::protocol::{Gain, SamplingProtocol};
use crate::settings::{CalibrationSettings, Hx711Settings};
use crate::units::{
    ImperialUnit, ImperialWeight, MetricUnit, MetricWeight, UnitWeight, WeightSystem,
};
use crate::weight::Weight;

/// Readings averaged by [Hx711::tare] & [Hx711::calibrate] unless told otherwise.
pub const DEFAULT_READINGS: usize = 10;

/// Output is garbage for roughly this long after the gain changes.
pub const GAIN_SETTLE_TIME: Duration = Duration::from_millis(50);

struct DriverState<G> {
    protocol: SamplingProtocol<G>,
    settings: Hx711Settings,
    tare: i32,
}

impl<G: GpioController> DriverState<G> {
    fn read_raw(&mut self) -> Result<i32> {
        self.protocol.read_raw_sample()
    }

    /// Reads one sample & expresses it in the calibrated reference unit.
    fn read_unit_weight(&mut self) -> Result<UnitWeight> {
        let calibration = self.settings.calibration;
        let system = calibration.system.ok_or(Error::Uncalibrated)?;
        let scale = calibration.scale_factor;

        if scale == 0.0 || !scale.is_finite() {
            return Err(Error::InvalidScaleFactor(scale));
        }

        let raw = self.read_raw()?;
        let value = (f64::from(raw) - f64::from(self.tare)) / scale;

        Ok(match system {
            WeightSystem::Metric => MetricWeight::new(value, calibration.metric_unit).into(),
            WeightSystem::Imperial => ImperialWeight::new(value, calibration.imperial_unit).into(),
        })
    }
}

/// A HX711 on two gpio pins. Every operation holds an exclusive lock on the pins for its whole
/// duration, so one driver can be shared between threads (e.g. in an `Arc`).
///
/// Only one driver may use a given pair of pins; two drivers on the same pins will race.
pub struct Hx711<G: GpioController> {
    state: Mutex<Option<DriverState<G>>>,
}

impl<G: GpioController> Hx711<G> {
    /// Opens the pins & performs one throwaway read so the configured gain is latched.
    /// The controller must number pins the way `settings` says, anything else fails with
    /// [Error::NumberingMismatch] before a pin is touched. If the first read fails the pins are
    /// released again.
    pub fn new(gpio: G, settings: Hx711Settings, tare: i32) -> Result<Self> {
        if gpio.numbering() != settings.numbering {
            return Err(Error::NumberingMismatch {
                settings: settings.numbering,
                controller: gpio.numbering(),
            });
        }

        let mut protocol = SamplingProtocol::new(gpio, &settings);

        if let Err(e) = Self::first_read(&mut protocol, &settings) {
            if let Err(close) = protocol.close() {
                warn!("Failed to release HX711 pins {close}");
            }

            return Err(e);
        }

        Ok(Self {
            state: Mutex::new(Some(DriverState {
                protocol,
                settings,
                tare,
            })),
        })
    }

    fn first_read(protocol: &mut SamplingProtocol<G>, settings: &Hx711Settings) -> Result<()> {
        protocol.open()?;
        debug!(
            "Opened dout={} pd_sck={}, waiting for first read",
            settings.data_pin, settings.clock_pin
        );
        protocol.read_raw_sample()?;

        Ok(())
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut DriverState<G>) -> Result<T>) -> Result<T> {
        let mut guard = self.lock()?;

        match guard.as_mut() {
            Some(state) => f(state),
            None => Err(Error::Disposed),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<DriverState<G>>>> {
        self.state.lock().map_err(|_| Error::LockPoisoned)
    }

    /// Sets gain level. Blocks for [GAIN_SETTLE_TIME] to skip the garbage data that follows.
    pub fn set_gain(&self, gain: Gain) -> Result<()> {
        self.with_state(|s| {
            s.protocol.set_gain(gain);
            s.settings.gain = gain;
            // Cycle one conversion so the new gain applies to the next reading.
            s.read_raw()?;
            thread::sleep(GAIN_SETTLE_TIME);
            debug!("Gain set to {gain:?}");

            Ok(())
        })
    }

    pub fn gain(&self) -> Result<Gain> {
        self.with_state(|s| Ok(s.protocol.gain()))
    }

    /// Sets the tare value to the average of [DEFAULT_READINGS] raw reads & returns it.
    pub fn tare(&self) -> Result<i32> {
        self.tare_with(DEFAULT_READINGS)
    }

    /// Sets the tare value to the average of `readings` raw reads & returns it.
    pub fn tare_with(&self, readings: usize) -> Result<i32> {
        if readings == 0 {
            return Err(Error::NoReadings);
        }

        self.with_state(|s| {
            let mut sum = 0_i64;
            for _ in 0..readings {
                sum += i64::from(s.read_raw()?);
            }

            // Raw reads are 24 bit, so the average always fits.
            s.tare = (sum / readings as i64) as i32;
            info!("Tare set to {} from n={readings} readings", s.tare);

            Ok(s.tare)
        })
    }

    /// Calibrates against `calibration_weight` given in pounds or grams, averaging
    /// [DEFAULT_READINGS] readings.
    pub fn calibrate(&self, system: WeightSystem, calibration_weight: f64) -> Result<f64> {
        self.calibrate_with(
            system,
            calibration_weight,
            ImperialUnit::Pounds,
            MetricUnit::Grams,
            DEFAULT_READINGS,
        )
    }

    /// Re-calibrates using the given weight system, unit & weight, returns the new scale factor.
    /// `imperial_unit` is only used for [WeightSystem::Imperial] and `metric_unit` only for
    /// [WeightSystem::Metric]. The previous calibration is kept if this fails.
    pub fn calibrate_with(
        &self,
        system: WeightSystem,
        calibration_weight: f64,
        imperial_unit: ImperialUnit,
        metric_unit: MetricUnit,
        readings: usize,
    ) -> Result<f64> {
        if calibration_weight == 0.0 || !calibration_weight.is_finite() {
            return Err(Error::InvalidCalibrationWeight(calibration_weight));
        }

        if readings == 0 {
            return Err(Error::NoReadings);
        }

        self.with_state(|s| {
            let tare = f64::from(s.tare);
            let mut mean = 0_f64;

            for n in 0..readings {
                let points = (f64::from(s.read_raw()?) - tare) / calibration_weight;
                mean += (points - mean) / (n + 1) as f64;
            }

            if mean == 0.0 || !mean.is_finite() {
                warn!("Rejected calibration, scale_factor={mean}");
                return Err(Error::InvalidScaleFactor(mean));
            }

            s.settings.calibration = CalibrationSettings {
                system: Some(system),
                metric_unit,
                imperial_unit,
                scale_factor: mean,
            };
            info!("Calibrated {system:?}, scale_factor={mean}");

            Ok(mean)
        })
    }

    /// Reads one raw value, without tare or calibration applied.
    pub fn read_raw(&self) -> Result<i32> {
        self.with_state(|s| s.read_raw())
    }

    /// Reads a weight in the system the scale was calibrated with, both views are filled in.
    pub fn read_weight(&self) -> Result<Weight> {
        self.with_state(|s| Ok(s.read_unit_weight()?.into()))
    }

    /// Converts from metric if the scale was calibrated with metric units.
    pub fn read_imperial_weight(&self) -> Result<ImperialWeight> {
        self.with_state(|s| Ok(s.read_unit_weight()?.to_imperial()))
    }

    /// Converts from imperial if the scale was calibrated with imperial units.
    pub fn read_metric_weight(&self) -> Result<MetricWeight> {
        self.with_state(|s| Ok(s.read_unit_weight()?.to_metric()))
    }

    pub fn tare_value(&self) -> Result<i32> {
        self.with_state(|s| Ok(s.tare))
    }

    pub fn set_tare_value(&self, tare: i32) -> Result<()> {
        self.with_state(|s| {
            s.tare = tare;
            Ok(())
        })
    }

    pub fn is_calibrated(&self) -> Result<bool> {
        self.with_state(|s| Ok(s.settings.calibration.system.is_some()))
    }

    pub fn calibration_value(&self) -> Result<f64> {
        self.with_state(|s| Ok(s.settings.calibration.scale_factor))
    }

    pub fn calibration_system(&self) -> Result<Option<WeightSystem>> {
        self.with_state(|s| Ok(s.settings.calibration.system))
    }

    pub fn calibration_metric_unit(&self) -> Result<MetricUnit> {
        self.with_state(|s| Ok(s.settings.calibration.metric_unit))
    }

    pub fn calibration_imperial_unit(&self) -> Result<ImperialUnit> {
        self.with_state(|s| Ok(s.settings.calibration.imperial_unit))
    }

    /// A copy of the current settings, including the latest calibration.
    pub fn settings(&self) -> Result<Hx711Settings> {
        self.with_state(|s| Ok(s.settings))
    }

    /// Releases both pins. Any later call fails with [Error::Disposed], disposing twice is a no-op.
    pub fn dispose(&self) -> Result<()> {
        let mut guard = self.lock()?;

        match guard.take() {
            Some(mut state) => {
                debug!("Releasing HX711 pins");
                state.protocol.close()
            }
            None => Ok(()),
        }
    }
}

impl<G: GpioController> Drop for Hx711<G> {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            warn!("Failed to release HX711 pins {e}");
        }
    }
}
