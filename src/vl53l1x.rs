//! VL53L1X time-of-flight distance sensor, PiicoDev P7.
//!
//! - Range: up to 4m
//! - 16-bit register addresses, big endian data
//!
//! The default configuration block is the one of ST's ultra lite driver.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::bus::Device;
use crate::error::check_id;
use crate::Error;

pub const DEFAULT_ADDRESS: u8 = 0x29;

const MODEL_ID: u16 = 0xEACC;

const REG_SOFT_RESET: u16 = 0x0000;
const REG_RANGE_CONFIG_VCSEL_PERIOD_A: u16 = 0x001E;
const REG_MM_CONFIG_OUTER_OFFSET_MM: u16 = 0x0022;
const REG_DEFAULT_CONFIG_START: u16 = 0x002D;
const REG_RESULT_RANGE_STATUS: u16 = 0x0089;
const REG_IDENTIFICATION_MODEL_ID: u16 = 0x010F;

/// Registers 0x2D..=0x87, prefixed with the start address.
#[rustfmt::skip]
const DEFAULT_CONFIGURATION: [u8; 93] = [
    (REG_DEFAULT_CONFIG_START >> 8) as u8, REG_DEFAULT_CONFIG_START as u8,
    0x00, // 0x2d : fast plus mode (1MHz I2C) on bits 2 and 5
    0x00, // 0x2e : I2C pulled up at 1.8V
    0x00, // 0x2f : GPIO pulled up at 1.8V
    0x01, // 0x30 : interrupt active high, bits 3:0 must be 0x1
    0x02, // 0x31 : interrupt depending on polarity
    0x00, 0x02, 0x08, 0x00, 0x08, 0x10, 0x01, 0x01, // 0x32..=0x39
    0x00, 0x00, 0x00, 0x00, 0xff, 0x00, 0x0F, 0x00, // 0x3a..=0x41
    0x00, 0x00, 0x00, 0x00, // 0x42..=0x45
    0x20, // 0x46 : interrupt on new sample ready
    0x0b, 0x00, 0x00, 0x02, 0x0a, 0x21, 0x00, 0x00, // 0x47..=0x4e
    0x05, 0x00, 0x00, 0x00, 0x00, 0xc8, 0x00, 0x00, // 0x4f..=0x56
    0x38, 0xff, 0x01, 0x00, 0x08, 0x00, 0x00, 0x01, // 0x57..=0x5e
    0xdb, 0x0f, 0x01, 0xf1, 0x0d, // 0x5f..=0x63
    0x01, 0x68, // 0x64, 0x65 : sigma threshold, 90mm in 14.2 format
    0x00, 0x80, // 0x66, 0x67 : min count rate, 9.7 format
    0x08, 0xb8, 0x00, 0x00, // 0x68..=0x6b
    0x00, 0x00, 0x0f, 0x89, // 0x6c..=0x6f : intermeasurement period
    0x00, 0x00, // 0x70, 0x71
    0x00, 0x00, // 0x72, 0x73 : distance threshold high
    0x00, 0x00, // 0x74, 0x75 : distance threshold low
    0x00, 0x01, 0x0f, 0x0d, 0x0e, 0x0e, 0x00, 0x00, 0x02, // 0x76..=0x7e
    0xc7, // 0x7f : ROI center
    0xff, // 0x80 : XY ROI
    0x9B, 0x00, 0x00, 0x00, 0x01, // 0x81..=0x85
    0x01, // 0x86 : clear interrupt
    0x40, // 0x87 : start ranging
];

/// Decoded `RESULT__RANGE_STATUS`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangeStatus {
    Ok,
    HardwareFail,
    MinRangeFail,
    SynchronizationInt,
    OutOfBoundsFail,
    SignalFail,
    WrapTargetFail,
    XtalkSignalFail,
    RangeValidMinRangeClipped,
    RangeValidNoWrapCheckFail,
    Unknown(u8),
}

impl RangeStatus {
    fn decode(range_status: u8, stream_count: u8) -> Self {
        match range_status & 0x1F {
            1 | 2 | 3 | 17 => RangeStatus::HardwareFail,
            13 => RangeStatus::MinRangeFail,
            18 => RangeStatus::SynchronizationInt,
            5 => RangeStatus::OutOfBoundsFail,
            4 | 6 => RangeStatus::SignalFail,
            7 => RangeStatus::WrapTargetFail,
            12 => RangeStatus::XtalkSignalFail,
            8 => RangeStatus::RangeValidMinRangeClipped,
            9 if stream_count == 0 => RangeStatus::RangeValidNoWrapCheckFail,
            9 => RangeStatus::Ok,
            other => RangeStatus::Unknown(other),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    pub distance_mm: u16,
    pub status: RangeStatus,
    pub stream_count: u8,
    /// MCPS in 9.7 fixed point
    pub peak_signal_count_rate: u16,
    /// MCPS in 9.7 fixed point
    pub ambient_count_rate: u16,
    /// mm in 14.2 fixed point
    pub sigma: u16,
}

impl Measurement {
    fn parse(data: &[u8; 17]) -> Self {
        let word = |i: usize| u16::from_be_bytes([data[i], data[i + 1]]);
        Measurement {
            distance_mm: word(13),
            status: RangeStatus::decode(data[0], data[2]),
            stream_count: data[2],
            peak_signal_count_rate: word(5),
            ambient_count_rate: word(7),
            sigma: word(9),
        }
    }
}

pub struct VL53L1X<I2C> {
    device: Device<I2C>,
}

impl<I2C: I2c> VL53L1X<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        VL53L1X {
            device: Device::new(i2c, address),
        }
    }

    pub fn release(self) -> I2C {
        self.device.release()
    }

    /// Resets, checks the model id, loads the default configuration and
    /// starts continuous ranging.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), Error<I2C::Error>> {
        self.reset(delay).map_err(Error::I2c)?;
        let model_id = self.model_id().map_err(Error::I2c)?;
        check_id(MODEL_ID, model_id)?;

        self.device.write(&DEFAULT_CONFIGURATION).map_err(Error::I2c)?;
        delay.delay_ms(100);

        // done by ST's init_and_start_range once ranging starts, MM1 and MM2
        // disabled
        let outer_offset = self
            .device
            .read_reg16_u16_be(REG_MM_CONFIG_OUTER_OFFSET_MM)
            .map_err(Error::I2c)?;
        self.device
            .write_reg16_u16_be(REG_RANGE_CONFIG_VCSEL_PERIOD_A, outer_offset.wrapping_mul(4))
            .map_err(Error::I2c)?;
        delay.delay_ms(200);

        #[cfg(feature = "defmt")]
        defmt::debug!("vl53l1x ready at 0x{:02x}", self.device.address());
        Ok(())
    }

    pub fn reset(&mut self, delay: &mut impl DelayNs) -> Result<(), I2C::Error> {
        for level in 0..=1 {
            self.device.write_reg16_u8(REG_SOFT_RESET, level)?;
            delay.delay_ms(100);
        }
        Ok(())
    }

    pub fn model_id(&mut self) -> Result<u16, I2C::Error> {
        self.device.read_reg16_u16_be(REG_IDENTIFICATION_MODEL_ID)
    }

    pub fn read(&mut self) -> Result<Measurement, I2C::Error> {
        let mut data = [0u8; 17];
        self.device.read_reg16(REG_RESULT_RANGE_STATUS, &mut data)?;
        Ok(Measurement::parse(&data))
    }

    /// Distance in millimeters, regardless of range status.
    pub fn read_distance(&mut self) -> Result<u16, I2C::Error> {
        Ok(self.read()?.distance_mm)
    }
}
