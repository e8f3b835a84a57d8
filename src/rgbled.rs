//! PiicoDev 3x RGB LED module.
//!
//! Pixels are buffered in the driver, [`RgbLed::show`] pushes all of them at
//! once.

use embedded_hal::i2c::I2c;

use crate::bus::Device;
use crate::Error;

pub const DEFAULT_ADDRESS: u8 = 0x08;

pub const NUM_PIXELS: usize = 3;

const REG_DEVICE_ID: u8 = 0x00;
const REG_FIRMWARE_VERSION: u8 = 0x01;
const REG_CONTROL: u8 = 0x03;
const REG_CLEAR: u8 = 0x04;
const REG_BRIGHTNESS: u8 = 0x06;
const REG_VALUES: u8 = 0x07;

pub struct RgbLed<I2C> {
    device: Device<I2C>,
    pixels: [u8; NUM_PIXELS * 3],
}

impl<I2C: I2c> RgbLed<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        RgbLed {
            device: Device::new(i2c, address),
            pixels: [0; NUM_PIXELS * 3],
        }
    }

    pub fn release(self) -> I2C {
        self.device.release()
    }

    /// Turns every LED off.
    pub fn init(&mut self) -> Result<(), I2C::Error> {
        self.clear()?;
        self.show()
    }

    pub fn device_id(&mut self) -> Result<u8, I2C::Error> {
        self.device.read_reg_u8(REG_DEVICE_ID)
    }

    pub fn firmware_version(&mut self) -> Result<u16, I2C::Error> {
        self.device.read_reg_u16_le(REG_FIRMWARE_VERSION)
    }

    pub fn set_power_led(&mut self, on: bool) -> Result<(), I2C::Error> {
        self.device.write_reg_u8(REG_CONTROL, on as u8)
    }

    pub fn set_brightness(&mut self, brightness: u8) -> Result<(), I2C::Error> {
        self.device.write_reg_u8(REG_BRIGHTNESS, brightness)
    }

    /// Blanks the LEDs on the device and in the local buffer.
    pub fn clear(&mut self) -> Result<(), I2C::Error> {
        self.device.write_reg_u8(REG_CLEAR, 1)?;
        self.clear_pixels();
        Ok(())
    }

    pub fn clear_pixels(&mut self) {
        self.fill(0, 0, 0);
    }

    pub fn fill(&mut self, red: u8, green: u8, blue: u8) {
        for pixel in self.pixels.chunks_exact_mut(3) {
            pixel.copy_from_slice(&[red, green, blue]);
        }
    }

    pub fn set_pixel(&mut self, index: usize, red: u8, green: u8, blue: u8) -> Result<(), Error<I2C::Error>> {
        if index >= NUM_PIXELS {
            return Err(Error::InvalidArgument);
        }
        self.pixels[index * 3..index * 3 + 3].copy_from_slice(&[red, green, blue]);
        Ok(())
    }

    pub fn pixels(&self) -> &[u8; NUM_PIXELS * 3] {
        &self.pixels
    }

    pub fn show(&mut self) -> Result<(), I2C::Error> {
        self.device.write_reg(REG_VALUES, &self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = DEFAULT_ADDRESS;

    #[test]
    fn init_clears_and_shows() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0x04, 0x01]),
            I2cTransaction::write(ADDR, vec![0x07, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        ];
        let mut led = RgbLed::new(I2cMock::new(&expectations), ADDR);

        led.init().unwrap();

        led.release().done();
    }

    #[test]
    fn pixels_are_buffered_until_show() {
        let expectations = [I2cTransaction::write(
            ADDR,
            vec![0x07, 10, 20, 30, 255, 0, 0, 10, 20, 30],
        )];
        let mut led = RgbLed::new(I2cMock::new(&expectations), ADDR);

        led.fill(10, 20, 30);
        led.set_pixel(1, 255, 0, 0).unwrap();
        led.show().unwrap();

        led.release().done();
    }

    #[test]
    fn out_of_range_pixel() {
        let mut led = RgbLed::new(I2cMock::new(&[]), ADDR);

        assert_eq!(led.set_pixel(3, 1, 2, 3), Err(Error::InvalidArgument));
        assert_eq!(led.pixels(), &[0; 9]);

        led.release().done();
    }

    #[test]
    fn settings() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![0x01], vec![0x02, 0x01]),
            I2cTransaction::write(ADDR, vec![0x06, 0x80]),
            I2cTransaction::write(ADDR, vec![0x03, 0x01]),
        ];
        let mut led = RgbLed::new(I2cMock::new(&expectations), ADDR);

        assert_eq!(led.firmware_version(), Ok(0x0102));
        led.set_brightness(0x80).unwrap();
        led.set_power_led(true).unwrap();

        led.release().done();
    }
}
