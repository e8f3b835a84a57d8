//! PiicoDev Potentiometer, rotary and slide variants.
//!
//! The firmware reports a 10-bit wiper position which is scaled into a user
//! range, 0 to 100 unless changed with [`Potentiometer::set_range`].

use embedded_hal::i2c::I2c;

use crate::bus::Device;
use crate::Error;

pub const DEFAULT_ADDRESS: u8 = 0x35;

const DEVICE_ID_ROTARY: u16 = 379;
const DEVICE_ID_SLIDE: u16 = 411;

const REG_WHOAMI: u8 = 0x01;
const REG_FIRMWARE_MAJOR: u8 = 0x02;
const REG_FIRMWARE_MINOR: u8 = 0x03;
const REG_POT: u8 = 0x05;
const REG_LED: u8 = 0x07;
const REG_SELF_TEST: u8 = 0x09;

// set on the register address of a write
const WRITE_FLAG: u8 = 0x80;

const RAW_MAX: f32 = 1023.0;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Kind {
    Rotary,
    Slide,
}

pub struct Potentiometer<I2C> {
    device: Device<I2C>,
    kind: Option<Kind>,
    minimum: f32,
    maximum: f32,
}

impl<I2C: I2c> Potentiometer<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Potentiometer {
            device: Device::new(i2c, address),
            kind: None,
            minimum: 0.0,
            maximum: 100.0,
        }
    }

    pub fn release(self) -> I2C {
        self.device.release()
    }

    /// Identifies the variant, anything else at this address is an error.
    pub fn init(&mut self) -> Result<Kind, Error<I2C::Error>> {
        let id = self.device.read_reg_u16_be(REG_WHOAMI).map_err(Error::I2c)?;
        let kind = match id {
            DEVICE_ID_ROTARY => Kind::Rotary,
            DEVICE_ID_SLIDE => Kind::Slide,
            found => {
                #[cfg(feature = "defmt")]
                defmt::warn!("unknown potentiometer id {}", found);
                return Err(Error::UnexpectedId {
                    expected: DEVICE_ID_ROTARY,
                    found,
                });
            }
        };
        self.kind = Some(kind);
        Ok(kind)
    }

    /// `None` until [`Potentiometer::init`] succeeded.
    pub fn kind(&self) -> Option<Kind> {
        self.kind
    }

    pub fn firmware_version(&mut self) -> Result<(u8, u8), I2C::Error> {
        let major = self.device.read_reg_u8(REG_FIRMWARE_MAJOR)?;
        let minor = self.device.read_reg_u8(REG_FIRMWARE_MINOR)?;
        Ok((major, minor))
    }

    pub fn self_test(&mut self) -> Result<u8, I2C::Error> {
        self.device.read_reg_u8(REG_SELF_TEST)
    }

    pub fn led(&mut self) -> Result<bool, I2C::Error> {
        Ok(self.device.read_reg_u8(REG_LED)? != 0)
    }

    pub fn set_led(&mut self, on: bool) -> Result<(), I2C::Error> {
        self.device.write_reg_u8(REG_LED | WRITE_FLAG, on as u8)
    }

    /// Wiper position, 0..=1023.
    pub fn read_raw(&mut self) -> Result<u16, I2C::Error> {
        self.device.read_reg_u16_be(REG_POT)
    }

    pub fn set_range(&mut self, minimum: f32, maximum: f32) {
        self.minimum = minimum;
        self.maximum = maximum;
    }

    pub fn range(&self) -> (f32, f32) {
        (self.minimum, self.maximum)
    }

    /// Wiper position scaled into the configured range.
    pub fn read(&mut self) -> Result<f32, I2C::Error> {
        let raw = self.read_raw()?;
        Ok(self.minimum + (self.maximum - self.minimum) * raw as f32 / RAW_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = DEFAULT_ADDRESS;

    #[test]
    fn init_identifies_variant() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![0x01], vec![0x01, 0x7B]),
            I2cTransaction::write_read(ADDR, vec![0x01], vec![0x01, 0x9B]),
            I2cTransaction::write_read(ADDR, vec![0x01], vec![0x01, 0x99]),
        ];
        let mut pot = Potentiometer::new(I2cMock::new(&expectations), ADDR);

        assert_eq!(pot.kind(), None);
        assert_eq!(pot.init(), Ok(Kind::Rotary));
        assert_eq!(pot.init(), Ok(Kind::Slide));
        assert_eq!(pot.kind(), Some(Kind::Slide));
        assert_eq!(
            pot.init(),
            Err(Error::UnexpectedId {
                expected: 379,
                found: 409
            })
        );

        pot.release().done();
    }

    #[test]
    fn read_scales_into_range() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![0x05], vec![0x03, 0xFF]),
            I2cTransaction::write_read(ADDR, vec![0x05], vec![0x00, 0x00]),
            I2cTransaction::write_read(ADDR, vec![0x05], vec![0x03, 0xFF]),
        ];
        let mut pot = Potentiometer::new(I2cMock::new(&expectations), ADDR);

        assert_eq!(pot.read(), Ok(100.0));
        pot.set_range(-1.0, 1.0);
        assert_eq!(pot.read(), Ok(-1.0));
        assert_eq!(pot.read(), Ok(1.0));

        pot.release().done();
    }

    #[test]
    fn led_write_sets_write_flag() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0x87, 0x01]),
            I2cTransaction::write_read(ADDR, vec![0x07], vec![0x01]),
            I2cTransaction::write_read(ADDR, vec![0x02], vec![0x01]),
            I2cTransaction::write_read(ADDR, vec![0x03], vec![0x00]),
        ];
        let mut pot = Potentiometer::new(I2cMock::new(&expectations), ADDR);

        pot.set_led(true).unwrap();
        assert_eq!(pot.led(), Ok(true));
        assert_eq!(pot.firmware_version(), Ok((1, 0)));

        pot.release().done();
    }
}
