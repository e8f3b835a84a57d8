//! LM75A temperature sensor and thermal watchdog
//!
//! <https://www.nxp.com/docs/en/data-sheet/LM75A.pdf>

use embedded_hal::i2c::I2c;

use crate::bus::Device;

pub const DEFAULT_ADDRESS: u8 = 0x4F;

const REG_TEMPERATURE: u8 = 0x00;

pub struct LM75A<I2C> {
    device: Device<I2C>,
}

impl<I2C: I2c> LM75A<I2C> {
    /// Create device driver instance.
    pub fn new(i2c: I2C, address: u8) -> Self {
        LM75A {
            device: Device::new(i2c, address),
        }
    }

    /// Temperature in degrees Celsius, 0.125C resolution.
    pub fn read_celsius(&mut self) -> Result<f32, I2C::Error> {
        let raw = self.device.read_reg_i16_be(REG_TEMPERATURE)?;
        Ok(raw as f32 / 256.0)
    }

    pub fn release(self) -> I2C {
        self.device.release()
    }
}
