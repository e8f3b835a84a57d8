//! MPU-6050 six-axis motion sensor, PiicoDev P6.
//!
//! - Accelerometer: +-2g, +-4g, +-8g or +-16g
//! - Gyroscope: +-250, +-500, +-1000 or +-2000 deg/s
//! - Adddress(7bit): 0x68 or 0x69

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::bus::Device;

pub const DEFAULT_ADDRESS: u8 = 0x68;

pub const GRAVITY_MS2: f32 = 9.80665;

const REG_GYRO_CONFIG: u8 = 0x1B;
const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B;
const REG_TEMP_OUT_H: u8 = 0x41;
const REG_GYRO_XOUT_H: u8 = 0x43;
const REG_PWR_MGMT_1: u8 = 0x6B;

// FS_SEL / AFS_SEL, bits[4:3] of the config registers
const FULL_SCALE_POS: u8 = 3;
const FULL_SCALE_LEN: u8 = 2;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelRange {
    G2 = 0,
    G4,
    G8,
    G16,
}

impl AccelRange {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => AccelRange::G2,
            1 => AccelRange::G4,
            2 => AccelRange::G8,
            _ => AccelRange::G16,
        }
    }

    /// Full scale in g.
    pub fn g(&self) -> u8 {
        2 << (*self as u8)
    }

    /// LSB per g.
    pub fn scale(&self) -> f32 {
        match self {
            AccelRange::G2 => 16384.0,
            AccelRange::G4 => 8192.0,
            AccelRange::G8 => 4096.0,
            AccelRange::G16 => 2048.0,
        }
    }
}

impl Default for AccelRange {
    fn default() -> Self {
        AccelRange::G2
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroRange {
    Deg250 = 0,
    Deg500,
    Deg1000,
    Deg2000,
}

impl GyroRange {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => GyroRange::Deg250,
            1 => GyroRange::Deg500,
            2 => GyroRange::Deg1000,
            _ => GyroRange::Deg2000,
        }
    }

    /// Full scale in deg/s.
    pub fn degrees_per_second(&self) -> u16 {
        250 << (*self as u8)
    }

    /// LSB per deg/s.
    pub fn scale(&self) -> f32 {
        match self {
            GyroRange::Deg250 => 131.0,
            GyroRange::Deg500 => 65.5,
            GyroRange::Deg1000 => 32.8,
            GyroRange::Deg2000 => 16.4,
        }
    }
}

impl Default for GyroRange {
    fn default() -> Self {
        GyroRange::Deg250
    }
}

/// Three axis reading.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Axes {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Axes {
    fn from_raw(data: &[u8; 6], factor: f32) -> Self {
        let axis = |i: usize| i16::from_be_bytes([data[i], data[i + 1]]) as f32 * factor;
        Axes {
            x: axis(0),
            y: axis(2),
            z: axis(4),
        }
    }
}

pub struct MPU6050<I2C> {
    device: Device<I2C>,
}

impl<I2C: I2c> MPU6050<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        MPU6050 {
            device: Device::new(i2c, address),
        }
    }

    pub fn release(self) -> I2C {
        self.device.release()
    }

    /// The chip powers up asleep, clearing PWR_MGMT_1 wakes it.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), I2C::Error> {
        for _ in 0..3 {
            self.device.write_reg_u8(REG_PWR_MGMT_1, 0)?;
            delay.delay_ms(5);
        }
        Ok(())
    }

    /// Die temperature in degrees Celsius.
    pub fn read_temperature(&mut self) -> Result<f32, I2C::Error> {
        let raw = self.device.read_reg_i16_be(REG_TEMP_OUT_H)?;
        Ok(raw as f32 / 340.0 + 36.53)
    }

    pub fn set_accel_range(&mut self, range: AccelRange) -> Result<(), I2C::Error> {
        self.device
            .write_reg_bits(REG_ACCEL_CONFIG, FULL_SCALE_POS, FULL_SCALE_LEN, range as u8)
    }

    pub fn accel_range(&mut self) -> Result<AccelRange, I2C::Error> {
        let bits = self.device.read_reg_bits(REG_ACCEL_CONFIG, FULL_SCALE_POS, FULL_SCALE_LEN)?;
        Ok(AccelRange::from_bits(bits))
    }

    pub fn set_gyro_range(&mut self, range: GyroRange) -> Result<(), I2C::Error> {
        self.device
            .write_reg_bits(REG_GYRO_CONFIG, FULL_SCALE_POS, FULL_SCALE_LEN, range as u8)
    }

    pub fn gyro_range(&mut self) -> Result<GyroRange, I2C::Error> {
        let bits = self.device.read_reg_bits(REG_GYRO_CONFIG, FULL_SCALE_POS, FULL_SCALE_LEN)?;
        Ok(GyroRange::from_bits(bits))
    }

    /// Acceleration in m/s^2, scaled by the configured range.
    pub fn read_accel(&mut self) -> Result<Axes, I2C::Error> {
        let range = self.accel_range()?;
        let mut data = [0u8; 6];
        self.device.read_reg(REG_ACCEL_XOUT_H, &mut data)?;
        Ok(Axes::from_raw(&data, GRAVITY_MS2 / range.scale()))
    }

    /// Angular rate in deg/s, scaled by the configured range.
    pub fn read_gyro(&mut self) -> Result<Axes, I2C::Error> {
        let range = self.gyro_range()?;
        let mut data = [0u8; 6];
        self.device.read_reg(REG_GYRO_XOUT_H, &mut data)?;
        Ok(Axes::from_raw(&data, 1.0 / range.scale()))
    }
}
