//! Pin & calibration configuration for one HX711.

use std::time::Duration;

use crate::gpio::PinNumberingScheme;
use crate::protocol::Gain;
use crate::units::{ImperialUnit, MetricUnit, WeightSystem};

/// Order in which the bits of each byte leave the HX711. The chip itself always sends MSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitOrder {
    #[default]
    MsbFirst,
    LsbFirst,
}

/// The reference unit & scale factor found during calibration. `system` is `None` until the
/// scale has been calibrated (or seeded with a known calibration).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalibrationSettings {
    pub system: Option<WeightSystem>,
    pub metric_unit: MetricUnit,
    pub imperial_unit: ImperialUnit,
    /// Raw points per reference unit.
    pub scale_factor: f64,
}

/// How the data-ready line is polled before each sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollSettings {
    pub interval: Duration,
    /// `None` waits for the device forever.
    pub ready_timeout: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_micros(10),
            ready_timeout: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hx711Settings {
    /// DOUT
    pub data_pin: u8,
    /// PD_SCK
    pub clock_pin: u8,
    pub bit_order: BitOrder,
    pub numbering: PinNumberingScheme,
    pub gain: Gain,
    pub calibration: CalibrationSettings,
    pub poll: PollSettings,
}

impl Hx711Settings {
    pub fn new(data_pin: u8, clock_pin: u8) -> Self {
        Self {
            data_pin,
            clock_pin,
            bit_order: BitOrder::default(),
            numbering: PinNumberingScheme::default(),
            gain: Gain::default(),
            calibration: CalibrationSettings::default(),
            poll: PollSettings::default(),
        }
    }

    pub fn with_bit_order(mut self, bit_order: BitOrder) -> Self {
        self.bit_order = bit_order;
        self
    }

    pub fn with_numbering(mut self, numbering: PinNumberingScheme) -> Self {
        self.numbering = numbering;
        self
    }

    pub fn with_gain(mut self, gain: Gain) -> Self {
        self.gain = gain;
        self
    }

    /// Seeds a previously found calibration, e.g. one read from a settings file.
    pub fn with_calibration(
        mut self,
        system: WeightSystem,
        metric_unit: MetricUnit,
        imperial_unit: ImperialUnit,
        scale_factor: f64,
    ) -> Self {
        self.calibration = CalibrationSettings {
            system: Some(system),
            metric_unit,
            imperial_unit,
            scale_factor,
        };
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll.interval = interval;
        self
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.poll.ready_timeout = Some(timeout);
        self
    }
}
