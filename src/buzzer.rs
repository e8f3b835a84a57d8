//! PiicoDev Buzzer, an ATtiny based piezo module.

use embedded_hal::i2c::I2c;

use crate::bus::Device;

pub const DEFAULT_ADDRESS: u8 = 0x5C;

/// Value of the device id register.
pub const DEVICE_ID: u8 = 0x51;

const REG_STATUS: u8 = 0x01;
const REG_FIRMWARE_MAJOR: u8 = 0x02;
const REG_FIRMWARE_MINOR: u8 = 0x03;
const REG_TONE: u8 = 0x05;
const REG_VOLUME: u8 = 0x06;
const REG_POWER_LED: u8 = 0x07;
const REG_DEVICE_ID: u8 = 0x11;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Volume {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl Default for Volume {
    fn default() -> Self {
        Volume::High
    }
}

pub struct Buzzer<I2C> {
    device: Device<I2C>,
}

impl<I2C: I2c> Buzzer<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Buzzer {
            device: Device::new(i2c, address),
        }
    }

    pub fn release(self) -> I2C {
        self.device.release()
    }

    pub fn device_id(&mut self) -> Result<u8, I2C::Error> {
        self.device.read_reg_u8(REG_DEVICE_ID)
    }

    /// (major, minor)
    pub fn firmware_version(&mut self) -> Result<(u8, u8), I2C::Error> {
        let major = self.device.read_reg_u8(REG_FIRMWARE_MAJOR)?;
        let minor = self.device.read_reg_u8(REG_FIRMWARE_MINOR)?;
        Ok((major, minor))
    }

    /// Bit 1: last command succeeded, bit 2: last command known.
    pub fn status(&mut self) -> Result<u8, I2C::Error> {
        self.device.read_reg_u8(REG_STATUS)
    }

    pub fn set_power_led(&mut self, on: bool) -> Result<(), I2C::Error> {
        self.device.write_reg_u8(REG_POWER_LED, on as u8)
    }

    pub fn set_volume(&mut self, volume: Volume) -> Result<(), I2C::Error> {
        self.device.write_reg_u8(REG_VOLUME, volume as u8)
    }

    /// Plays `freq` Hz for `duration_ms`, a zero duration plays until stopped.
    pub fn tone(&mut self, freq: u16, duration_ms: u16) -> Result<(), I2C::Error> {
        let [f0, f1] = freq.to_be_bytes();
        let [d0, d1] = duration_ms.to_be_bytes();
        self.device.write_reg(REG_TONE, &[f0, f1, d0, d1])
    }

    pub fn no_tone(&mut self) -> Result<(), I2C::Error> {
        self.tone(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = DEFAULT_ADDRESS;

    #[test]
    fn tone_is_big_endian() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0x05, 0x01, 0xB8, 0x03, 0xE8]),
            I2cTransaction::write(ADDR, vec![0x05, 0x00, 0x00, 0x00, 0x00]),
        ];
        let mut buzzer = Buzzer::new(I2cMock::new(&expectations), ADDR);

        buzzer.tone(440, 1000).unwrap();
        buzzer.no_tone().unwrap();

        buzzer.release().done();
    }

    #[test]
    fn no_tone_reports_bus_errors() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0x05, 0x00, 0x00, 0x00, 0x00])
                .with_error(ErrorKind::Other),
        ];
        let mut buzzer = Buzzer::new(I2cMock::new(&expectations), ADDR);

        assert_eq!(buzzer.no_tone(), Err(ErrorKind::Other));

        buzzer.release().done();
    }

    #[test]
    fn identification_and_settings() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![0x11], vec![0x51]),
            I2cTransaction::write_read(ADDR, vec![0x02], vec![0x01]),
            I2cTransaction::write_read(ADDR, vec![0x03], vec![0x01]),
            I2cTransaction::write_read(ADDR, vec![0x01], vec![0x06]),
            I2cTransaction::write(ADDR, vec![0x06, 0x01]),
            I2cTransaction::write(ADDR, vec![0x07, 0x00]),
        ];
        let mut buzzer = Buzzer::new(I2cMock::new(&expectations), ADDR);

        assert_eq!(buzzer.device_id(), Ok(DEVICE_ID));
        assert_eq!(buzzer.firmware_version(), Ok((1, 1)));
        assert_eq!(buzzer.status(), Ok(0x06));
        assert_eq!(Volume::default(), Volume::High);
        buzzer.set_volume(Volume::Medium).unwrap();
        buzzer.set_power_led(false).unwrap();

        buzzer.release().done();
    }
}
