//! The GPIO capability the HX711 protocol is driven through, and its Raspberry Pi backend.

use std::collections::HashMap;

use log::debug;
use rppal::gpio::{Gpio, InputPin, OutputPin};

pub use rppal::gpio::Level;

use crate::error::GpioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
}

/// How pin numbers given to a [GpioController] are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinNumberingScheme {
    /// Broadcom GPIO numbers.
    #[default]
    Logical,
    /// Physical position on the 40 pin header.
    Board,
}

/// Minimal pin level access, enough to bit-bang a two wire protocol.
pub trait GpioController: Send {
    /// The scheme pin numbers given to this controller are interpreted with.
    fn numbering(&self) -> PinNumberingScheme;

    fn open_pin(&mut self, pin: u8, mode: PinMode) -> Result<(), GpioError>;

    fn write(&mut self, pin: u8, level: Level) -> Result<(), GpioError>;

    fn read(&mut self, pin: u8) -> Result<Level, GpioError>;

    /// Releases the pin, it has to be opened again before further use.
    fn close_pin(&mut self, pin: u8) -> Result<(), GpioError>;
}

/// Translates a 40 pin header position to its BCM number.
pub fn board_to_bcm(pin: u8) -> Option<u8> {
    let bcm = match pin {
        3 => 2,
        5 => 3,
        7 => 4,
        8 => 14,
        10 => 15,
        11 => 17,
        12 => 18,
        13 => 27,
        15 => 22,
        16 => 23,
        18 => 24,
        19 => 10,
        21 => 9,
        22 => 25,
        23 => 11,
        24 => 8,
        26 => 7,
        27 => 0,
        28 => 1,
        29 => 5,
        31 => 6,
        32 => 12,
        33 => 13,
        35 => 19,
        36 => 16,
        37 => 26,
        38 => 20,
        40 => 21,
        _ => return None,
    };

    Some(bcm)
}

/// [GpioController] backed by rppal, only tested on the raspberry pi zero (w).
pub struct RppalController {
    gpio: Gpio,
    numbering: PinNumberingScheme,
    inputs: HashMap<u8, InputPin>,
    outputs: HashMap<u8, OutputPin>,
}

impl RppalController {
    pub fn new(numbering: PinNumberingScheme) -> Result<Self, GpioError> {
        Ok(Self {
            gpio: Gpio::new()?,
            numbering,
            inputs: HashMap::new(),
            outputs: HashMap::new(),
        })
    }

    fn bcm(&self, pin: u8) -> Result<u8, GpioError> {
        match self.numbering {
            PinNumberingScheme::Logical => Ok(pin),
            PinNumberingScheme::Board => board_to_bcm(pin).ok_or(GpioError::InvalidBoardPin(pin)),
        }
    }
}

impl GpioController for RppalController {
    fn numbering(&self) -> PinNumberingScheme {
        self.numbering
    }

    fn open_pin(&mut self, pin: u8, mode: PinMode) -> Result<(), GpioError> {
        let bcm = self.bcm(pin)?;
        let handle = self.gpio.get(bcm)?;

        debug!("Opening pin={pin} (bcm={bcm}) as {mode:?}");

        match mode {
            PinMode::Input => {
                self.outputs.remove(&pin);
                self.inputs.insert(pin, handle.into_input());
            }
            PinMode::Output => {
                self.inputs.remove(&pin);
                self.outputs.insert(pin, handle.into_output());
            }
        }

        Ok(())
    }

    fn write(&mut self, pin: u8, level: Level) -> Result<(), GpioError> {
        match self.outputs.get_mut(&pin) {
            Some(out) => {
                out.write(level);
                Ok(())
            }
            None if self.inputs.contains_key(&pin) => Err(GpioError::PinNotOutput(pin)),
            None => Err(GpioError::PinNotOpen(pin)),
        }
    }

    fn read(&mut self, pin: u8) -> Result<Level, GpioError> {
        if let Some(input) = self.inputs.get(&pin) {
            return Ok(input.read());
        }

        match self.outputs.get(&pin) {
            Some(out) if out.is_set_high() => Ok(Level::High),
            Some(_) => Ok(Level::Low),
            None => Err(GpioError::PinNotOpen(pin)),
        }
    }

    fn close_pin(&mut self, pin: u8) -> Result<(), GpioError> {
        let was_open = self.inputs.remove(&pin).is_some() | self.outputs.remove(&pin).is_some();

        match was_open {
            true => Ok(()),
            false => Err(GpioError::PinNotOpen(pin)),
        }
    }
}
