//! TMP117 high precision digital temperature sensor, PiicoDev P1.
//!
//! - Resolution: 7.8125 mC
//! - Accuracy: +-0.1C from -20C to 50C
//! - Adddress(7bit): 0x48, 0x49, 0x4A or 0x4B

use embedded_hal::i2c::I2c;

use crate::bus::Device;

pub const DEFAULT_ADDRESS: u8 = 0x48;

const REG_TEMP_RESULT: u8 = 0x00;

const RESOLUTION: f32 = 7.8125e-3;

pub struct TMP117<I2C> {
    device: Device<I2C>,
}

impl<I2C: I2c> TMP117<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        TMP117 {
            device: Device::new(i2c, address),
        }
    }

    pub fn release(self) -> I2C {
        self.device.release()
    }

    pub fn read_celsius(&mut self) -> Result<f32, I2C::Error> {
        let raw = self.device.read_reg_u16_be(REG_TEMP_RESULT)?;
        Ok(raw_to_celsius(raw))
    }

    pub fn read_fahrenheit(&mut self) -> Result<f32, I2C::Error> {
        Ok(self.read_celsius()? * 9.0 / 5.0 + 32.0)
    }

    pub fn read_kelvin(&mut self) -> Result<f32, I2C::Error> {
        Ok(self.read_celsius()? + 273.15)
    }
}

// two's complement, spelled out the way the datasheet does
fn raw_to_celsius(raw: u16) -> f32 {
    if raw >= 0x8000 {
        -256.0 + (raw - 0x8000) as f32 * RESOLUTION
    } else {
        raw as f32 * RESOLUTION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    #[test]
    fn read_celsius() {
        let expectations = [
            I2cTransaction::write_read(0x48, vec![0x00], vec![0x0B, 0x86]),
            I2cTransaction::write_read(0x48, vec![0x00], vec![0xF4, 0x7A]),
        ];
        let mut tmp = TMP117::new(I2cMock::new(&expectations), 0x48);

        assert_eq!(tmp.read_celsius(), Ok(23.046_875));
        assert_eq!(tmp.read_celsius(), Ok(-23.046_875));

        tmp.release().done();
    }

    #[test]
    fn other_units() {
        let expectations = [
            I2cTransaction::write_read(0x48, vec![0x00], vec![0x0C, 0x80]),
            I2cTransaction::write_read(0x48, vec![0x00], vec![0x00, 0x00]),
        ];
        let mut tmp = TMP117::new(I2cMock::new(&expectations), 0x48);

        assert_eq!(tmp.read_fahrenheit(), Ok(77.0));
        assert_eq!(tmp.read_kelvin(), Ok(273.15));

        tmp.release().done();
    }
}
