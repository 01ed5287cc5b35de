//! Errors that can occur while talking to the HX711 or while converting between units.

use std::time::Duration;

use crate::gpio::PinNumberingScheme;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything the driver can fail with. All of these are raised at the point of detection and
/// nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HX711 was not calibrated, can't convert a reading to a weight")]
    Uncalibrated,

    #[error("calibration weight must be a non-zero finite value, got {0}")]
    InvalidCalibrationWeight(f64),

    #[error("scale factor must be a non-zero finite value, got {0}")]
    InvalidScaleFactor(f64),

    #[error("at least one reading is required")]
    NoReadings,

    #[error("HX711 did not signal data ready within {waited:?}")]
    DeviceNotResponding { waited: Duration },

    #[error("settings number pins as {settings:?} but the gpio controller uses {controller:?}")]
    NumberingMismatch {
        settings: PinNumberingScheme,
        controller: PinNumberingScheme,
    },

    #[error("HX711 driver has been disposed")]
    Disposed,

    #[error("HX711 lock was poisoned by a panicking reader")]
    LockPoisoned,

    #[error(transparent)]
    Gpio(#[from] GpioError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

#[derive(Debug, thiserror::Error)]
pub enum GpioError {
    #[error("gpio err={0}")]
    Rppal(#[from] rppal::gpio::Error),

    #[error("pin {0} has not been opened")]
    PinNotOpen(u8),

    #[error("pin {0} is not opened as an output")]
    PinNotOutput(u8),

    #[error("board pin {0} is not a gpio pin")]
    InvalidBoardPin(u8),
}

/// Raised when a unit or weight system name can't be recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("unknown weight unit '{0}'")]
    UnknownUnit(String),

    #[error("unknown weight system '{0}'")]
    UnknownSystem(String),
}
