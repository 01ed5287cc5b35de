//! This module includes the bit level HX711 handshake: waiting for data ready, clocking out the
//! 24 bit sample & selecting the gain for the following conversion.

use std::thread;
use std::time::Instant;

use log::trace;

use crate::error::{Error, Result};
use crate::gpio::{GpioController, Level, PinMode};
use crate::settings::{BitOrder, Hx711Settings, PollSettings};

/// Amplifier gain. Also selects the input channel, x32 reads channel B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
pub enum Gain {
    #[default]
    #[serde(rename = "x128")]
    X128,
    #[serde(rename = "x64")]
    X64,
    #[serde(rename = "x32")]
    X32,
}

impl Gain {
    /// Clock pulses sent after the 24 data bits to select this gain for the next conversion.
    pub fn pulses(&self) -> usize {
        match self {
            Gain::X128 => 1,
            Gain::X64 => 3,
            Gain::X32 => 2,
        }
    }
}

/// Turns the 24 bit twos complement value into an `i32`.
pub fn sign_extend(raw: u32) -> i32 {
    -((raw & 0x80_0000) as i32) + (raw & 0x7F_FFFF) as i32
}

pub struct SamplingProtocol<G> {
    gpio: G,
    data_pin: u8,
    clock_pin: u8,
    bit_order: BitOrder,
    poll: PollSettings,
    gain: Gain,
}

impl<G: GpioController> SamplingProtocol<G> {
    pub fn new(gpio: G, settings: &Hx711Settings) -> Self {
        Self {
            gpio,
            data_pin: settings.data_pin,
            clock_pin: settings.clock_pin,
            bit_order: settings.bit_order,
            poll: settings.poll,
            gain: settings.gain,
        }
    }

    /// Opens dout as input & pd_sck as output. The clock is left low, a high clock for more than
    /// 60us powers the chip down.
    pub fn open(&mut self) -> Result<()> {
        self.gpio.open_pin(self.data_pin, PinMode::Input)?;
        self.gpio.open_pin(self.clock_pin, PinMode::Output)?;
        self.gpio.write(self.clock_pin, Level::Low)?;

        Ok(())
    }

    pub fn close(&mut self) -> Result<()> {
        self.gpio.close_pin(self.data_pin)?;
        self.gpio.close_pin(self.clock_pin)?;

        Ok(())
    }

    pub fn gain(&self) -> Gain {
        self.gain
    }

    /// Takes effect on the conversion following the next read.
    pub fn set_gain(&mut self, gain: Gain) {
        self.gain = gain;
    }

    /// Returns true if dout is low, which indicates that data is ready for read.
    pub fn is_ready(&mut self) -> Result<bool> {
        Ok(self.gpio.read(self.data_pin)? == Level::Low)
    }

    /// Sends one pulse through pd_sck & samples dout.
    pub fn read_bit(&mut self) -> Result<bool> {
        self.gpio.write(self.clock_pin, Level::High)?;
        self.gpio.write(self.clock_pin, Level::Low)?;

        Ok(self.gpio.read(self.data_pin)? == Level::High)
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        let mut byte = 0_u8;

        for i in 0..8 {
            let bit = self.read_bit()? as u8;

            match self.bit_order {
                BitOrder::MsbFirst => byte = (byte << 1) | bit,
                BitOrder::LsbFirst => byte |= bit << i,
            }
        }

        Ok(byte)
    }

    /// Blocks until dout goes low. This is the only place the protocol waits on the device, with
    /// no ready timeout configured it waits forever.
    pub fn wait_ready(&mut self) -> Result<()> {
        let started = Instant::now();

        while !self.is_ready()? {
            if let Some(timeout) = self.poll.ready_timeout {
                let waited = started.elapsed();
                if waited >= timeout {
                    return Err(Error::DeviceNotResponding { waited });
                }
            }

            thread::sleep(self.poll.interval);
        }

        Ok(())
    }

    /// Reads 24 bits from the ADC & sets gain for the following read.
    pub fn read_raw_sample(&mut self) -> Result<i32> {
        self.wait_ready()?;

        let mut raw = 0_u32;
        for _ in 0..3 {
            raw = (raw << 8) | self.read_byte()? as u32;
        }

        for _ in 0..self.gain.pulses() {
            self.read_bit()?;
        }

        let value = sign_extend(raw);
        trace!("raw_digital_value={value} gain={:?}", self.gain);

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::gpio::mock::MockController;

    fn protocol(settings: Hx711Settings) -> (SamplingProtocol<MockController>, MockController) {
        let gpio = MockController::new(settings.data_pin, settings.clock_pin);
        let mut p = SamplingProtocol::new(gpio.clone(), &settings);
        p.open().unwrap();

        (p, gpio)
    }

    #[test]
    fn sign_extension() {
        assert_eq!(sign_extend(0x00_0000), 0);
        assert_eq!(sign_extend(0x00_0001), 1);
        assert_eq!(sign_extend(0x7F_FFFF), 8_388_607);
        assert_eq!(sign_extend(0x80_0000), -8_388_608);
        assert_eq!(sign_extend(0xFF_FFFF), -1);
        assert_eq!(sign_extend(0xFF_FFF3), -13);
    }

    #[test]
    fn sign_extension_matches_twos_complement_everywhere() {
        for raw in (0..=0xFF_FFFF_u32).step_by(4093).chain([0x80_0000, 0xFF_FFFF]) {
            let expected = match raw & 0x80_0000 {
                0 => raw as i32,
                _ => raw as i32 - 0x100_0000,
            };
            assert_eq!(sign_extend(raw), expected, "raw={raw:#x}");
        }
    }

    #[test]
    fn gain_pulses() {
        assert_eq!(Gain::X128.pulses(), 1);
        assert_eq!(Gain::X64.pulses(), 3);
        assert_eq!(Gain::X32.pulses(), 2);
    }

    #[test]
    fn open_configures_pin_directions() {
        let (_, gpio) = protocol(Hx711Settings::new(25, 24));

        assert_eq!(gpio.mode(25), Some(PinMode::Input));
        assert_eq!(gpio.mode(24), Some(PinMode::Output));
    }

    #[test]
    fn reads_samples_msb_first() {
        let (mut p, gpio) = protocol(Hx711Settings::new(25, 24));
        gpio.push_samples(&[0x12_3456, 8_388_607, -8_388_608, -1, 600]);

        assert_eq!(p.read_raw_sample().unwrap(), 0x12_3456);
        assert_eq!(p.read_raw_sample().unwrap(), 8_388_607);
        assert_eq!(p.read_raw_sample().unwrap(), -8_388_608);
        assert_eq!(p.read_raw_sample().unwrap(), -1);
        assert_eq!(p.read_raw_sample().unwrap(), 600);
        assert_eq!(gpio.remaining(), 0);
    }

    #[test]
    fn lsb_first_reverses_bits_within_bytes() {
        let (mut p, gpio) =
            protocol(Hx711Settings::new(25, 24).with_bit_order(BitOrder::LsbFirst));
        gpio.push_samples(&[0x01_0080]);

        assert_eq!(p.read_raw_sample().unwrap(), 0x80_0001_u32 as i32 - 0x100_0000);
    }

    #[test]
    fn read_byte_takes_eight_bits() {
        let (mut p, gpio) = protocol(Hx711Settings::new(25, 24));
        gpio.push_samples(&[0xA5_0000]);

        assert!(p.is_ready().unwrap());
        assert_eq!(p.read_byte().unwrap(), 0xA5);
        assert_eq!(p.read_byte().unwrap(), 0x00);
    }

    #[test]
    fn extra_pulses_follow_selected_gain() {
        let (mut p, gpio) = protocol(Hx711Settings::new(25, 24).with_gain(Gain::X32));
        gpio.push_repeated(7, 3);

        p.read_raw_sample().unwrap();
        p.set_gain(Gain::X64);
        p.read_raw_sample().unwrap();
        p.set_gain(Gain::X128);
        p.read_raw_sample().unwrap();

        assert_eq!(gpio.extra_pulses(), vec![2, 3, 1]);
    }

    #[test]
    fn unresponsive_device_times_out() {
        let settings = Hx711Settings::new(25, 24)
            .with_poll_interval(Duration::from_micros(100))
            .with_ready_timeout(Duration::from_millis(20));
        let (mut p, _gpio) = protocol(settings);

        match p.read_raw_sample() {
            Err(Error::DeviceNotResponding { waited }) => {
                assert!(waited >= Duration::from_millis(20))
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn close_releases_both_pins() {
        let (mut p, gpio) = protocol(Hx711Settings::new(25, 24));
        p.close().unwrap();

        assert_eq!(gpio.closed(), vec![25, 24]);
        assert_eq!(gpio.mode(25), None);
    }
}
