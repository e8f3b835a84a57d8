//! VEML6030 ambient light sensor, PiicoDev P3.
//!
//! - Output: lux(lx)
//! - Range: 0 to 120000 lx depending on gain and integration time
//! - Adddress(7bit): 0x10 or 0x48
//!
//! Registers are 16 bits wide and little endian.
//! Ref: <https://www.vishay.com/docs/84367/designingveml6030.pdf>

use embedded_hal::i2c::I2c;

use crate::bus::Device;
use crate::Error;

pub const DEFAULT_ADDRESS: u8 = 0x10;

const REG_ALS_CONF: u8 = 0x00;
const REG_POWER_SAVING: u8 = 0x03;
const REG_ALS: u8 = 0x04;

const SD_MASK: u16 = 0x0001;
const SD_POS: u16 = 0;
const GAIN_MASK: u16 = 0x1800;
const GAIN_POS: u16 = 11;
const IT_MASK: u16 = 0x03C0;
const IT_POS: u16 = 6;
const PSM_EN_MASK: u16 = 0x0001;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    /// x1
    One,
    /// x2
    Two,
    /// x1/8
    OneEighth,
    /// x1/4
    OneQuarter,
}

impl Gain {
    fn bits(&self) -> u16 {
        match self {
            Gain::One => 0,
            Gain::Two => 1,
            Gain::OneEighth => 2,
            Gain::OneQuarter => 3,
        }
    }

    fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0 => Gain::One,
            1 => Gain::Two,
            2 => Gain::OneEighth,
            _ => Gain::OneQuarter,
        }
    }

    pub fn factor(&self) -> f32 {
        match self {
            Gain::One => 1.0,
            Gain::Two => 2.0,
            Gain::OneEighth => 0.125,
            Gain::OneQuarter => 0.25,
        }
    }

    // column of LUX_PER_COUNT
    fn column(&self) -> usize {
        match self {
            Gain::Two => 0,
            Gain::One => 1,
            Gain::OneQuarter => 2,
            Gain::OneEighth => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntegrationTime {
    Ms25,
    Ms50,
    Ms100,
    Ms200,
    Ms400,
    Ms800,
}

impl IntegrationTime {
    fn bits(&self) -> u16 {
        match self {
            IntegrationTime::Ms25 => 0b1100,
            IntegrationTime::Ms50 => 0b1000,
            IntegrationTime::Ms100 => 0b0000,
            IntegrationTime::Ms200 => 0b0001,
            IntegrationTime::Ms400 => 0b0010,
            IntegrationTime::Ms800 => 0b0011,
        }
    }

    fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            0b1100 => Some(IntegrationTime::Ms25),
            0b1000 => Some(IntegrationTime::Ms50),
            0b0000 => Some(IntegrationTime::Ms100),
            0b0001 => Some(IntegrationTime::Ms200),
            0b0010 => Some(IntegrationTime::Ms400),
            0b0011 => Some(IntegrationTime::Ms800),
            _ => None,
        }
    }

    pub fn millis(&self) -> u16 {
        match self {
            IntegrationTime::Ms25 => 25,
            IntegrationTime::Ms50 => 50,
            IntegrationTime::Ms100 => 100,
            IntegrationTime::Ms200 => 200,
            IntegrationTime::Ms400 => 400,
            IntegrationTime::Ms800 => 800,
        }
    }

    // row of LUX_PER_COUNT
    fn row(&self) -> usize {
        match self {
            IntegrationTime::Ms800 => 0,
            IntegrationTime::Ms400 => 1,
            IntegrationTime::Ms200 => 2,
            IntegrationTime::Ms100 => 3,
            IntegrationTime::Ms50 => 4,
            IntegrationTime::Ms25 => 5,
        }
    }
}

/// Resolution in lx per count, columns are gain x2, x1, x1/4, x1/8.
const LUX_PER_COUNT: [[f32; 4]; 6] = [
    [0.0036, 0.0072, 0.0288, 0.0576],
    [0.0072, 0.0144, 0.0576, 0.1152],
    [0.0144, 0.0288, 0.1152, 0.2304],
    [0.0288, 0.0576, 0.2304, 0.4608],
    [0.0576, 0.1152, 0.4608, 0.9216],
    [0.1152, 0.2304, 0.9216, 1.8432],
];

pub fn lux_per_count(gain: Gain, integration_time: IntegrationTime) -> f32 {
    LUX_PER_COUNT[integration_time.row()][gain.column()]
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    pub gain: Gain,
    pub integration_time: IntegrationTime,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gain: Gain::One,
            integration_time: IntegrationTime::Ms100,
        }
    }
}

pub struct VEML6030<I2C> {
    device: Device<I2C>,
}

impl<I2C: I2c> VEML6030<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        VEML6030 {
            device: Device::new(i2c, address),
        }
    }

    pub fn release(self) -> I2C {
        self.device.release()
    }

    /// Applies `config` and powers the sensor on.
    pub fn init(&mut self, config: Config) -> Result<(), I2C::Error> {
        self.set_gain(config.gain)?;
        self.set_integration_time(config.integration_time)?;
        self.power_on()
    }

    pub fn shutdown(&mut self) -> Result<(), I2C::Error> {
        self.update(REG_ALS_CONF, SD_MASK, SD_POS, 1)
    }

    pub fn power_on(&mut self) -> Result<(), I2C::Error> {
        self.update(REG_ALS_CONF, SD_MASK, SD_POS, 0)
    }

    pub fn enable_power_save(&mut self) -> Result<(), I2C::Error> {
        self.update(REG_POWER_SAVING, PSM_EN_MASK, 0, 1)
    }

    pub fn disable_power_save(&mut self) -> Result<(), I2C::Error> {
        self.update(REG_POWER_SAVING, PSM_EN_MASK, 0, 0)
    }

    pub fn power_save_enabled(&mut self) -> Result<bool, I2C::Error> {
        Ok(self.device.read_reg_u16_le(REG_POWER_SAVING)? & PSM_EN_MASK != 0)
    }

    pub fn gain(&mut self) -> Result<Gain, I2C::Error> {
        let conf = self.device.read_reg_u16_le(REG_ALS_CONF)?;
        Ok(Gain::from_bits((conf & GAIN_MASK) >> GAIN_POS))
    }

    pub fn set_gain(&mut self, gain: Gain) -> Result<(), I2C::Error> {
        self.update(REG_ALS_CONF, GAIN_MASK, GAIN_POS, gain.bits())
    }

    /// Fails with [`Error::InvalidData`] when the register holds a reserved
    /// setting.
    pub fn integration_time(&mut self) -> Result<IntegrationTime, Error<I2C::Error>> {
        let conf = self.device.read_reg_u16_le(REG_ALS_CONF).map_err(Error::I2c)?;
        IntegrationTime::from_bits((conf & IT_MASK) >> IT_POS).ok_or(Error::InvalidData)
    }

    pub fn set_integration_time(&mut self, integration_time: IntegrationTime) -> Result<(), I2C::Error> {
        self.update(REG_ALS_CONF, IT_MASK, IT_POS, integration_time.bits())
    }

    /// Raw ALS counts.
    pub fn read_raw(&mut self) -> Result<u16, I2C::Error> {
        self.device.read_reg_u16_le(REG_ALS)
    }

    /// Ambient light in lux at the currently configured gain and
    /// integration time.
    pub fn read_lux(&mut self) -> Result<f32, Error<I2C::Error>> {
        let raw = self.read_raw().map_err(Error::I2c)?;
        let conf = self.device.read_reg_u16_le(REG_ALS_CONF).map_err(Error::I2c)?;
        let gain = Gain::from_bits((conf & GAIN_MASK) >> GAIN_POS);
        let integration_time = IntegrationTime::from_bits((conf & IT_MASK) >> IT_POS).ok_or(Error::InvalidData)?;
        Ok(raw as f32 * lux_per_count(gain, integration_time))
    }

    fn update(&mut self, reg: u8, mask: u16, pos: u16, value: u16) -> Result<(), I2C::Error> {
        let current = self.device.read_reg_u16_le(reg)?;
        self.device.write_reg_u16_le(reg, set_bits!(current, mask, pos, value))
    }
}
