//! AHT10 temperature and humidity sensor.
//!
//! - Temperature: -40C..+85C, 0.01C resolution, +-0.3C accuracy
//! - Humidity: 0%..100%, 0.024% resolution, +-2% accuracy
//! - Measurements should be more than 2 seconds apart to keep self-heating
//!   below 0.1C
//!
//! Ref: <https://cdn-learn.adafruit.com/assets/assets/000/091/676/original/AHT20-datasheet-2020-4-16.pdf>

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::bus::Device;
use crate::Error;

pub const DEFAULT_ADDRESS: u8 = 0x38;

const REG_INIT: u8 = 0xBE;
const REG_STATUS: u8 = 0x71;
const REG_START_MEASUREMENT: u8 = 0xAC;
const REG_SOFT_RESET: u8 = 0xBA;

const MEASUREMENT_CMD: [u8; 2] = [0x33, 0x00];

/// Busy, bit[7]
pub const STATUS_BUSY: u8 = 0x80;
/// Calibration coefficients enabled, bit[3]
pub const STATUS_CAL_ON: u8 = 0x08;

/// Working mode, bits[6:5] of the init and status registers.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Normal = 0x00,
    Cycle = 0x20,
    Command = 0x40,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Normal
    }
}

const POLL_INTERVAL_MS: u32 = 10;
const POLL_ATTEMPTS: usize = 20;

/// Measurement data
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurements {
    /// temperature in degrees celsius
    pub temperature: f32,
    /// percent relative humidity
    pub humidity: f32,
}

impl Measurements {
    /// Decodes `{status, RH, RH, RH|T, T, T}`.
    fn parse(data: &[u8; 7]) -> Self {
        let humidity = ((data[1] as u32) << 12) | ((data[2] as u32) << 4) | ((data[3] as u32) >> 4);
        let temperature = (((data[3] as u32) & 0x0F) << 16) | ((data[4] as u32) << 8) | (data[5] as u32);

        Measurements {
            temperature: temperature as f32 * 200.0 / 1_048_576.0 - 50.0,
            humidity: humidity as f32 * 100.0 / 1_048_576.0,
        }
    }
}

/// CRC-8, polynomial 0x31, initial value 0xFF.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0xFFu8;
    for byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ 0x31 } else { crc << 1 };
        }
    }
    crc
}

pub struct AHT10<I2C> {
    device: Device<I2C>,
}

impl<I2C: I2c> AHT10<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        AHT10 {
            device: Device::new(i2c, address),
        }
    }

    pub fn release(self) -> I2C {
        self.device.release()
    }

    /// Soft reset, then load the calibration coefficients in normal mode.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), I2C::Error> {
        self.soft_reset()?;
        delay.delay_ms(100);
        self.set_init_register(STATUS_CAL_ON | Mode::Normal as u8)?;
        delay.delay_ms(100);
        Ok(())
    }

    pub fn soft_reset(&mut self) -> Result<(), I2C::Error> {
        self.device.write_u8(REG_SOFT_RESET)
    }

    pub fn set_init_register(&mut self, value: u8) -> Result<(), I2C::Error> {
        self.device.write_reg(REG_INIT, &[value, 0])
    }

    /// ```text
    ///   7    6    5    4   3    2   1   0
    ///   BSY, MOD, MOD, xx, CAL, xx, xx, xx
    /// ```
    pub fn status(&mut self) -> Result<u8, I2C::Error> {
        self.device.read_reg_u8(REG_STATUS)
    }

    /// Triggers a measurement and waits for it, at most 200ms.
    pub fn measure(&mut self, delay: &mut impl DelayNs) -> Result<Measurements, Error<I2C::Error>> {
        self.device
            .write_reg(REG_START_MEASUREMENT, &MEASUREMENT_CMD)
            .map_err(Error::I2c)?;

        let mut status = STATUS_BUSY;
        for _ in 0..POLL_ATTEMPTS {
            delay.delay_ms(POLL_INTERVAL_MS);
            status = self.status().map_err(Error::I2c)?;
            if status & STATUS_BUSY == 0 {
                break;
            }
        }
        if status & STATUS_BUSY != 0 {
            return Err(Error::Timeout);
        }

        let mut data = [0u8; 7];
        self.device.read_reg(REG_STATUS, &mut data).map_err(Error::I2c)?;
        // the trailing CRC byte makes the residue zero
        match crc8(&data) {
            0 => Ok(Measurements::parse(&data)),
            residue => Err(Error::Crc(residue)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = DEFAULT_ADDRESS;

    fn frame(payload: [u8; 6]) -> Vec<u8> {
        let mut data = payload.to_vec();
        data.push(crc8(&payload));
        data
    }

    #[test]
    fn crc_of_known_frame() {
        assert_eq!(crc8(&[]), 0xFF);
        assert_eq!(crc8(&[0x00]), 0xAC);
        let data = frame([0x1C, 0x80, 0x00, 0x08, 0x00, 0x00]);
        assert_eq!(crc8(&data), 0);
    }

    #[test]
    fn init_sequence() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0xBA]),
            I2cTransaction::write(ADDR, vec![0xBE, 0x08, 0x00]),
        ];
        let mut aht = AHT10::new(I2cMock::new(&expectations), ADDR);

        aht.init(&mut NoopDelay::new()).unwrap();

        aht.release().done();
    }

    #[test]
    fn measure_after_busy_poll() {
        // RH = 0x80000 (50%), T = 0x60000 (25C)
        let expectations = [
            I2cTransaction::write(ADDR, vec![0xAC, 0x33, 0x00]),
            I2cTransaction::write_read(ADDR, vec![0x71], vec![0x98]),
            I2cTransaction::write_read(ADDR, vec![0x71], vec![0x18]),
            I2cTransaction::write_read(ADDR, vec![0x71], frame([0x18, 0x80, 0x00, 0x06, 0x00, 0x00])),
        ];
        let mut aht = AHT10::new(I2cMock::new(&expectations), ADDR);

        let m = aht.measure(&mut NoopDelay::new()).unwrap();
        assert_eq!(m.humidity, 50.0);
        assert_eq!(m.temperature, 25.0);

        aht.release().done();
    }

    #[test]
    fn measure_times_out_when_always_busy() {
        let mut expectations = vec![I2cTransaction::write(ADDR, vec![0xAC, 0x33, 0x00])];
        for _ in 0..20 {
            expectations.push(I2cTransaction::write_read(ADDR, vec![0x71], vec![0x98]));
        }
        let mut aht = AHT10::new(I2cMock::new(&expectations), ADDR);

        assert_eq!(aht.measure(&mut NoopDelay::new()), Err(Error::Timeout));

        aht.release().done();
    }

    #[test]
    fn measure_rejects_bad_crc() {
        let mut data = frame([0x18, 0x80, 0x00, 0x06, 0x00, 0x00]);
        data[6] ^= 0x01;
        let expectations = [
            I2cTransaction::write(ADDR, vec![0xAC, 0x33, 0x00]),
            I2cTransaction::write_read(ADDR, vec![0x71], vec![0x18]),
            I2cTransaction::write_read(ADDR, vec![0x71], data),
        ];
        let mut aht = AHT10::new(I2cMock::new(&expectations), ADDR);

        assert!(matches!(aht.measure(&mut NoopDelay::new()), Err(Error::Crc(_))));

        aht.release().done();
    }
}
