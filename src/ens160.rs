//! ENS160 digital metal-oxide multi-gas sensor, PiicoDev P26.
//!
//! - Output: AQI (UBA, 1..=5), TVOC (ppb), eCO2 (ppm)
//! - Address(7bit): 0x53 or 0x52
//!
//! The data registers only refresh when the device flags new data, so the
//! last valid sample is cached in the driver.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::bus::Device;
use crate::error::check_id;
use crate::Error;

pub const DEFAULT_ADDRESS: u8 = 0x53;

const PART_ID: u16 = 0x0160;

const REG_PART_ID: u8 = 0x00;
const REG_OPMODE: u8 = 0x10;
const REG_CONFIG: u8 = 0x11;
const REG_TEMP_IN: u8 = 0x13;
const REG_DEVICE_STATUS: u8 = 0x20;

// interrupt pin disabled
const CONFIG_DEFAULT: u8 = 0x00;

const STATUS_NEWDAT_BIT: u8 = 1;
const STATUS_VALIDITY_POS: u8 = 2;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    DeepSleep = 0x00,
    Idle = 0x01,
    Standard = 0x02,
    Reset = 0xF0,
}

/// Validity flag of `DEVICE_STATUS`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Validity {
    OperatingOk,
    WarmUp,
    InitialStartUp,
    NoValidOutput,
}

impl Validity {
    pub fn from_status(status: u8) -> Self {
        match (status >> STATUS_VALIDITY_POS) & 0b11 {
            0 => Validity::OperatingOk,
            1 => Validity::WarmUp,
            2 => Validity::InitialStartUp,
            _ => Validity::NoValidOutput,
        }
    }
}

/// UBA air quality index rating.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AqiRating {
    Excellent,
    Good,
    Moderate,
    Poor,
    Unhealthy,
    Invalid,
}

impl AqiRating {
    pub fn from_index(aqi: u8) -> Self {
        match aqi {
            1 => AqiRating::Excellent,
            2 => AqiRating::Good,
            3 => AqiRating::Moderate,
            4 => AqiRating::Poor,
            5 => AqiRating::Unhealthy,
            _ => AqiRating::Invalid,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Eco2Rating {
    Excellent,
    Good,
    Fair,
    Poor,
    Unhealthy,
    Invalid,
}

impl Eco2Rating {
    pub fn from_ppm(eco2: u16) -> Self {
        match eco2 {
            1501.. => Eco2Rating::Unhealthy,
            1001..=1500 => Eco2Rating::Poor,
            801..=1000 => Eco2Rating::Fair,
            601..=800 => Eco2Rating::Good,
            400..=600 => Eco2Rating::Excellent,
            _ => Eco2Rating::Invalid,
        }
    }
}

/// Last sample read from the data registers.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurements {
    pub status: u8,
    pub aqi: u8,
    /// ppb
    pub tvoc: u16,
    /// ppm
    pub eco2: u16,
}

impl Measurements {
    fn parse(data: &[u8; 6]) -> Self {
        Measurements {
            status: data[0],
            aqi: data[1],
            tvoc: u16::from_le_bytes([data[2], data[3]]),
            eco2: u16::from_le_bytes([data[4], data[5]]),
        }
    }
}

pub struct ENS160<I2C> {
    device: Device<I2C>,
    last: Measurements,
}

impl<I2C: I2c> ENS160<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        ENS160 {
            device: Device::new(i2c, address),
            last: Measurements::default(),
        }
    }

    pub fn release(self) -> I2C {
        self.device.release()
    }

    /// Checks the part id and switches to standard gas sensing.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), Error<I2C::Error>> {
        let part_id = self.device.read_reg_u16_le(REG_PART_ID).map_err(Error::I2c)?;
        check_id(PART_ID, part_id)?;

        self.set_operating_mode(OperatingMode::Standard).map_err(Error::I2c)?;
        delay.delay_ms(20);
        let _opmode = self.device.read_reg_u8(REG_OPMODE).map_err(Error::I2c)?;
        delay.delay_ms(20);
        self.device.write_reg_u8(REG_CONFIG, CONFIG_DEFAULT).map_err(Error::I2c)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("ens160 opmode 0x{:02x}", _opmode);
        Ok(())
    }

    pub fn set_operating_mode(&mut self, mode: OperatingMode) -> Result<(), I2C::Error> {
        self.device.write_reg_u8(REG_OPMODE, mode as u8)
    }

    /// Compensation temperature currently used by the sensor, in Celsius.
    pub fn temperature(&mut self) -> Result<f32, I2C::Error> {
        let raw = self.device.read_reg_u16_le(REG_TEMP_IN)?;
        Ok(raw as f32 / 64.0 - 273.15)
    }

    /// Refreshes the cached sample if the device has new data and returns it.
    pub fn read(&mut self) -> Result<Measurements, I2C::Error> {
        let status = self.device.read_reg_u8(REG_DEVICE_STATUS)?;
        if status & (1 << STATUS_NEWDAT_BIT) != 0 {
            let mut data = [0u8; 6];
            self.device.read_reg(REG_DEVICE_STATUS, &mut data)?;
            self.last = Measurements::parse(&data);
        }
        Ok(self.last)
    }

    pub fn status(&mut self) -> Result<u8, I2C::Error> {
        Ok(self.read()?.status)
    }

    pub fn operation(&mut self) -> Result<Validity, I2C::Error> {
        Ok(Validity::from_status(self.status()?))
    }

    pub fn read_aqi(&mut self) -> Result<(u8, AqiRating), I2C::Error> {
        let aqi = self.read()?.aqi;
        Ok((aqi, AqiRating::from_index(aqi)))
    }

    /// ppb
    pub fn read_tvoc(&mut self) -> Result<u16, I2C::Error> {
        Ok(self.read()?.tvoc)
    }

    /// ppm
    pub fn read_eco2(&mut self) -> Result<(u16, Eco2Rating), I2C::Error> {
        let eco2 = self.read()?.eco2;
        Ok((eco2, Eco2Rating::from_ppm(eco2)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = DEFAULT_ADDRESS;

    #[test]
    fn init_sequence() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![0x00], vec![0x60, 0x01]),
            I2cTransaction::write(ADDR, vec![0x10, 0x02]),
            I2cTransaction::write_read(ADDR, vec![0x10], vec![0x02]),
            I2cTransaction::write(ADDR, vec![0x11, 0x00]),
        ];
        let mut air = ENS160::new(I2cMock::new(&expectations), ADDR);

        air.init(&mut NoopDelay::new()).unwrap();

        air.release().done();
    }

    #[test]
    fn init_rejects_other_parts() {
        let expectations = [I2cTransaction::write_read(ADDR, vec![0x00], vec![0x61, 0x01])];
        let mut air = ENS160::new(I2cMock::new(&expectations), ADDR);

        assert_eq!(
            air.init(&mut NoopDelay::new()),
            Err(Error::UnexpectedId {
                expected: 0x0160,
                found: 0x0161
            })
        );

        air.release().done();
    }

    #[test]
    fn cached_sample_survives_stale_status() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![0x20], vec![0x82]),
            I2cTransaction::write_read(
                ADDR,
                vec![0x20],
                vec![0x82, 0x02, 0xF4, 0x01, 0xBC, 0x02],
            ),
            // no NEWDAT, cached values are returned
            I2cTransaction::write_read(ADDR, vec![0x20], vec![0x80]),
            I2cTransaction::write_read(ADDR, vec![0x20], vec![0x80]),
        ];
        let mut air = ENS160::new(I2cMock::new(&expectations), ADDR);

        assert_eq!(air.read_aqi(), Ok((2, AqiRating::Good)));
        assert_eq!(air.read_tvoc(), Ok(500));
        assert_eq!(air.read_eco2(), Ok((700, Eco2Rating::Good)));

        air.release().done();
    }

    #[test]
    fn operation_from_validity_bits() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![0x20], vec![0x06]),
            I2cTransaction::write_read(
                ADDR,
                vec![0x20],
                vec![0x06, 0x01, 0x00, 0x00, 0x90, 0x01],
            ),
        ];
        let mut air = ENS160::new(I2cMock::new(&expectations), ADDR);

        assert_eq!(air.operation(), Ok(Validity::WarmUp));

        air.release().done();
    }

    #[test]
    fn temperature_in_celsius() {
        // 298.15 K * 64
        let expectations = [I2cTransaction::write_read(ADDR, vec![0x13], vec![0x8A, 0x4A])];
        let mut air = ENS160::new(I2cMock::new(&expectations), ADDR);

        let t = air.temperature().unwrap();
        assert!((t - 25.0).abs() < 0.02, "{}", t);

        air.release().done();
    }

    #[test]
    fn ratings() {
        assert_eq!(AqiRating::from_index(0), AqiRating::Invalid);
        assert_eq!(AqiRating::from_index(5), AqiRating::Unhealthy);
        assert_eq!(Eco2Rating::from_ppm(399), Eco2Rating::Invalid);
        assert_eq!(Eco2Rating::from_ppm(400), Eco2Rating::Excellent);
        assert_eq!(Eco2Rating::from_ppm(600), Eco2Rating::Excellent);
        assert_eq!(Eco2Rating::from_ppm(1000), Eco2Rating::Fair);
        assert_eq!(Eco2Rating::from_ppm(1500), Eco2Rating::Poor);
        assert_eq!(Eco2Rating::from_ppm(1501), Eco2Rating::Unhealthy);
    }
}
