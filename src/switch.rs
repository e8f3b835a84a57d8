//! PiicoDev Button.
//!
//! Debouncing, press counting and double press detection run in the module
//! firmware. Reading the press flags or the count clears them on the device.

use embedded_hal::i2c::I2c;

use crate::bus::Device;
use crate::error::check_id;
use crate::Error;

pub const DEFAULT_ADDRESS: u8 = 0x42;

const DEVICE_ID: u16 = 409;

const REG_WHOAMI: u8 = 0x01;
const REG_FIRMWARE_MAJOR: u8 = 0x02;
const REG_FIRMWARE_MINOR: u8 = 0x03;
const REG_LED: u8 = 0x05;
const REG_IS_PRESSED: u8 = 0x11;
const REG_WAS_PRESSED: u8 = 0x12;
const REG_DOUBLE_PRESS_DETECTED: u8 = 0x13;
const REG_PRESS_COUNT: u8 = 0x14;
const REG_DOUBLE_PRESS_DURATION: u8 = 0x21;
const REG_EMA_PARAMETER: u8 = 0x22;
const REG_EMA_PERIOD: u8 = 0x23;

const WRITE_FLAG: u8 = 0x80;

/// Exponential moving average used by the firmware to debounce.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceEma {
    pub parameter: u8,
    /// ms
    pub period: u8,
}

impl Default for DebounceEma {
    fn default() -> Self {
        DebounceEma {
            parameter: 63,
            period: 20,
        }
    }
}

pub struct Switch<I2C> {
    device: Device<I2C>,
}

impl<I2C: I2c> Switch<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Switch {
            device: Device::new(i2c, address),
        }
    }

    pub fn release(self) -> I2C {
        self.device.release()
    }

    pub fn init(&mut self) -> Result<(), Error<I2C::Error>> {
        let id = self.device.read_reg_u16_be(REG_WHOAMI).map_err(Error::I2c)?;
        check_id(DEVICE_ID, id)
    }

    pub fn firmware_version(&mut self) -> Result<(u8, u8), I2C::Error> {
        let major = self.device.read_reg_u8(REG_FIRMWARE_MAJOR)?;
        let minor = self.device.read_reg_u8(REG_FIRMWARE_MINOR)?;
        Ok((major, minor))
    }

    pub fn led(&mut self) -> Result<bool, I2C::Error> {
        Ok(self.device.read_reg_u8(REG_LED)? != 0)
    }

    pub fn set_led(&mut self, on: bool) -> Result<(), I2C::Error> {
        self.device.write_reg_u8(REG_LED | WRITE_FLAG, on as u8)
    }

    /// Presses since the last call.
    pub fn press_count(&mut self) -> Result<u16, I2C::Error> {
        self.device.read_reg_u16_be(REG_PRESS_COUNT)
    }

    pub fn is_pressed(&mut self) -> Result<bool, I2C::Error> {
        // active low
        Ok(self.device.read_reg_u8(REG_IS_PRESSED)? == 0)
    }

    pub fn was_pressed(&mut self) -> Result<bool, I2C::Error> {
        Ok(self.device.read_reg_u8(REG_WAS_PRESSED)? == 1)
    }

    pub fn was_double_pressed(&mut self) -> Result<bool, I2C::Error> {
        Ok(self.device.read_reg_u8(REG_DOUBLE_PRESS_DETECTED)? == 1)
    }

    /// Window in ms in which a second press counts as a double press.
    pub fn double_press_duration(&mut self) -> Result<u16, I2C::Error> {
        self.device.read_reg_u16_be(REG_DOUBLE_PRESS_DURATION)
    }

    pub fn set_double_press_duration(&mut self, millis: u16) -> Result<(), I2C::Error> {
        self.device
            .write_reg_u16_be(REG_DOUBLE_PRESS_DURATION | WRITE_FLAG, millis)
    }

    pub fn debounce_ema(&mut self) -> Result<DebounceEma, I2C::Error> {
        Ok(DebounceEma {
            parameter: self.device.read_reg_u8(REG_EMA_PARAMETER)?,
            period: self.device.read_reg_u8(REG_EMA_PERIOD)?,
        })
    }

    pub fn set_debounce_ema(&mut self, ema: DebounceEma) -> Result<(), I2C::Error> {
        self.device
            .write_reg_u8(REG_EMA_PARAMETER | WRITE_FLAG, ema.parameter)?;
        self.device.write_reg_u8(REG_EMA_PERIOD | WRITE_FLAG, ema.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = DEFAULT_ADDRESS;

    #[test]
    fn init_checks_whoami() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![0x01], vec![0x01, 0x99]),
            I2cTransaction::write_read(ADDR, vec![0x01], vec![0x01, 0x7B]),
        ];
        let mut button = Switch::new(I2cMock::new(&expectations), ADDR);

        assert_eq!(button.init(), Ok(()));
        assert_eq!(
            button.init(),
            Err(Error::UnexpectedId {
                expected: 409,
                found: 379
            })
        );

        button.release().done();
    }

    #[test]
    fn press_flags() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![0x11], vec![0x00]),
            I2cTransaction::write_read(ADDR, vec![0x11], vec![0x01]),
            I2cTransaction::write_read(ADDR, vec![0x12], vec![0x01]),
            I2cTransaction::write_read(ADDR, vec![0x13], vec![0x00]),
            I2cTransaction::write_read(ADDR, vec![0x14], vec![0x01, 0x02]),
        ];
        let mut button = Switch::new(I2cMock::new(&expectations), ADDR);

        assert_eq!(button.is_pressed(), Ok(true));
        assert_eq!(button.is_pressed(), Ok(false));
        assert_eq!(button.was_pressed(), Ok(true));
        assert_eq!(button.was_double_pressed(), Ok(false));
        assert_eq!(button.press_count(), Ok(258));

        button.release().done();
    }

    #[test]
    fn settings_are_written_with_write_flag() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0xA1, 0x01, 0x2C]),
            I2cTransaction::write(ADDR, vec![0xA2, 63]),
            I2cTransaction::write(ADDR, vec![0xA3, 20]),
            I2cTransaction::write(ADDR, vec![0x85, 0x00]),
            I2cTransaction::write_read(ADDR, vec![0x21], vec![0x01, 0x2C]),
            I2cTransaction::write_read(ADDR, vec![0x22], vec![63]),
            I2cTransaction::write_read(ADDR, vec![0x23], vec![20]),
        ];
        let mut button = Switch::new(I2cMock::new(&expectations), ADDR);

        button.set_double_press_duration(300).unwrap();
        button.set_debounce_ema(DebounceEma::default()).unwrap();
        button.set_led(false).unwrap();
        assert_eq!(button.double_press_duration(), Ok(300));
        assert_eq!(button.debounce_ema(), Ok(DebounceEma::default()));

        button.release().done();
    }
}
