//! MS5637 barometric pressure sensor, PiicoDev P12.
//!
//! - Pressure: 300..1200 mbar, 0.016 mbar resolution at OSR 8192
//! - Temperature: -40..+85C, 0.01C resolution
//!
//! Ref: <https://github.com/TEConnectivity/MS5637_Generic_C_Driver>

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use num_traits::Pow;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::bus::Device;

pub const DEFAULT_ADDRESS: u8 = 0x76;

const CMD_SOFT_RESET: u8 = 0x1E;
const CMD_START_PRESSURE_CONVERSION: u8 = 0x40;
const CMD_START_TEMPERATURE_CONVERSION: u8 = 0x50;
const CMD_ADC_READ: u8 = 0x00;
const CMD_PROM_READ: u8 = 0xA0;

const PROM_WORDS: usize = 7;

// PROM word indexes
const PRESSURE_SENSITIVITY: usize = 1;
const PRESSURE_OFFSET: usize = 2;
const TEMP_COEFF_OF_PRESSURE_SENSITIVITY: usize = 3;
const TEMP_COEFF_OF_PRESSURE_OFFSET: usize = 4;
const REFERENCE_TEMPERATURE: usize = 5;
const TEMP_COEFF_OF_TEMPERATURE: usize = 6;

/// ADC oversampling ratio.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    Osr256 = 0,
    Osr512,
    Osr1024,
    Osr2048,
    Osr4096,
    Osr8192,
}

impl Resolution {
    fn command(&self, conversion: u8) -> u8 {
        (*self as u8 * 2) | conversion
    }

    /// Maximum conversion time.
    pub fn conversion_time_ms(&self) -> u32 {
        match self {
            Resolution::Osr256 => 1,
            Resolution::Osr512 => 2,
            Resolution::Osr1024 => 3,
            Resolution::Osr2048 => 5,
            Resolution::Osr4096 => 9,
            Resolution::Osr8192 => 17,
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::Osr8192
    }
}

/// Measurement data
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurements {
    /// pressure in hectopascals (mbar)
    pub pressure: f32,
    /// temperature in degrees celsius
    pub temperature: f32,
}

pub struct MS5637<I2C> {
    device: Device<I2C>,
    resolution: Resolution,
    prom: [u16; PROM_WORDS],
}

impl<I2C: I2c> MS5637<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        MS5637 {
            device: Device::new(i2c, address),
            resolution: Resolution::default(),
            prom: [0; PROM_WORDS],
        }
    }

    pub fn release(self) -> I2C {
        self.device.release()
    }

    /// Resets the chip and loads the factory calibration.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), I2C::Error> {
        self.device.write_u8(CMD_SOFT_RESET)?;
        delay.delay_ms(15);
        self.prom = self.read_prom()?;
        self.resolution = Resolution::default();
        Ok(())
    }

    pub fn read_prom(&mut self) -> Result<[u16; PROM_WORDS], I2C::Error> {
        let mut prom = [0u16; PROM_WORDS];
        for (i, word) in prom.iter_mut().enumerate() {
            *word = self.device.read_reg_u16_be(CMD_PROM_READ + 2 * i as u8)?;
        }
        Ok(prom)
    }

    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.resolution = resolution;
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn read_adc(&mut self, conversion: u8, delay: &mut impl DelayNs) -> Result<u32, I2C::Error> {
        self.device.write_u8(self.resolution.command(conversion))?;
        delay.delay_ms(self.resolution.conversion_time_ms());
        self.device.read_reg_u24_be(CMD_ADC_READ)
    }

    /// Converts temperature then pressure and compensates both.
    pub fn read(&mut self, delay: &mut impl DelayNs) -> Result<Measurements, I2C::Error> {
        let d2 = self.read_adc(CMD_START_TEMPERATURE_CONVERSION, delay)?;
        let d1 = self.read_adc(CMD_START_PRESSURE_CONVERSION, delay)?;
        Ok(compensate(&self.prom, d1, d2))
    }

    /// Altitude in meters above the level where pressure equals `sealevel_hpa`.
    pub fn altitude(&mut self, delay: &mut impl DelayNs, sealevel_hpa: f32) -> Result<f32, I2C::Error> {
        let hpa = self.read(delay)?.pressure;
        Ok(altitude(hpa, sealevel_hpa))
    }
}

fn altitude(hpa: f32, sealevel_hpa: f32) -> f32 {
    44330.0 * (1.0 - (hpa / sealevel_hpa).pow(1.0f32 / 5.255))
}

/// First and second order compensation, `d1` raw pressure and `d2` raw
/// temperature.
fn compensate(prom: &[u16; PROM_WORDS], d1: u32, d2: u32) -> Measurements {
    let c = |i: usize| prom[i] as i64;

    let dt = d2 as i64 - (c(REFERENCE_TEMPERATURE) << 8);
    let temp = 2000 + ((dt * c(TEMP_COEFF_OF_TEMPERATURE)) >> 23);

    let (t2, off2, sens2) = if temp < 2000 {
        let low = (temp - 2000) * (temp - 2000);
        let mut off2 = 61 * low / 16;
        let mut sens2 = 29 * low / 16;
        if temp < -1500 {
            let very_low = (temp + 1500) * (temp + 1500);
            off2 += 17 * very_low;
            sens2 += 9 * very_low;
        }
        ((3 * (dt * dt)) >> 33, off2, sens2)
    } else {
        ((5 * (dt * dt)) >> 38, 0, 0)
    };

    let off = (c(PRESSURE_OFFSET) << 17) + ((c(TEMP_COEFF_OF_PRESSURE_OFFSET) * dt) >> 6) - off2;
    let sens = (c(PRESSURE_SENSITIVITY) << 16) + ((c(TEMP_COEFF_OF_PRESSURE_SENSITIVITY) * dt) >> 7) - sens2;
    let p = (((d1 as i64 * sens) >> 21) - off) >> 15;

    Measurements {
        pressure: p as f32 / 100.0,
        temperature: (temp - t2) as f32 / 100.0,
    }
}
