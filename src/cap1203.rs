//! CAP1203 three channel capacitive touch sensor, PiicoDev P11.
//!
//! Ref: <https://ww1.microchip.com/downloads/en/DeviceDoc/00001572B.pdf>

use embedded_hal::i2c::I2c;

use crate::bus::Device;
use crate::error::check_id;
use crate::Error;

pub const DEFAULT_ADDRESS: u8 = 0x28;

const PRODUCT_ID: u8 = 0x6D;

const REG_MAIN_CONTROL: u8 = 0x00;
const REG_GENERAL_STATUS: u8 = 0x02;
const REG_INPUT_STATUS: u8 = 0x03;
const REG_INPUT_1_DELTA_COUNT: u8 = 0x10;
const REG_SENSITIVITY_CONTROL: u8 = 0x1F;
const REG_MULTIPLE_TOUCH_CONFIG: u8 = 0x2A;
const REG_PRODUCT_ID: u8 = 0xFD;

const MAIN_CONTROL_INT_BIT: u8 = 0;
const GENERAL_STATUS_TOUCH_BIT: u8 = 0;
// DELTA_SENSE, bits[6:4]
const DELTA_SENSE_POS: u8 = 4;
const DELTA_SENSE_LEN: u8 = 3;
const MULTIPLE_TOUCH_BLOCK_BIT: u8 = 7;

/// 0 is the most sensitive (x128), 7 the least (x1).
pub const DEFAULT_SENSITIVITY: u8 = 3;
pub const MAX_SENSITIVITY: u8 = 7;

/// Touch state of the three pads.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pads {
    pub pad1: bool,
    pub pad2: bool,
    pub pad3: bool,
}

impl Pads {
    fn from_status(status: u8) -> Self {
        Pads {
            pad1: status & 0b001 != 0,
            pad2: status & 0b010 != 0,
            pad3: status & 0b100 != 0,
        }
    }

    pub fn any(&self) -> bool {
        self.pad1 || self.pad2 || self.pad3
    }
}

pub struct CAP1203<I2C> {
    device: Device<I2C>,
}

impl<I2C: I2c> CAP1203<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        CAP1203 {
            device: Device::new(i2c, address),
        }
    }

    pub fn release(self) -> I2C {
        self.device.release()
    }

    /// Checks the product id and applies the default sensitivity.
    pub fn init(&mut self) -> Result<(), Error<I2C::Error>> {
        let id = self.device.read_reg_u8(REG_PRODUCT_ID).map_err(Error::I2c)?;
        check_id(PRODUCT_ID as u16, id as u16)?;
        self.set_sensitivity(DEFAULT_SENSITIVITY)
    }

    pub fn sensitivity(&mut self) -> Result<u8, I2C::Error> {
        self.device
            .read_reg_bits(REG_SENSITIVITY_CONTROL, DELTA_SENSE_POS, DELTA_SENSE_LEN)
    }

    pub fn set_sensitivity(&mut self, sensitivity: u8) -> Result<(), Error<I2C::Error>> {
        if sensitivity > MAX_SENSITIVITY {
            return Err(Error::InvalidArgument);
        }
        self.device
            .write_reg_bits(REG_SENSITIVITY_CONTROL, DELTA_SENSE_POS, DELTA_SENSE_LEN, sensitivity)
            .map_err(Error::I2c)
    }

    /// Multiple touch is enabled while the blocking bit is set.
    pub fn multiple_touch_enabled(&mut self) -> Result<bool, I2C::Error> {
        self.device
            .read_reg_bit(REG_MULTIPLE_TOUCH_CONFIG, MULTIPLE_TOUCH_BLOCK_BIT)
    }

    pub fn set_multiple_touch_enabled(&mut self, enabled: bool) -> Result<(), I2C::Error> {
        self.device
            .write_reg_bit(REG_MULTIPLE_TOUCH_CONFIG, MULTIPLE_TOUCH_BLOCK_BIT, enabled)
    }

    /// Whether a touch was flagged since the interrupt was last cleared.
    pub fn is_touched(&mut self) -> Result<bool, I2C::Error> {
        self.device
            .read_reg_bit(REG_GENERAL_STATUS, GENERAL_STATUS_TOUCH_BIT)
    }

    /// Reads the pad flags, then clears the interrupt so they can latch again.
    pub fn read(&mut self) -> Result<Pads, I2C::Error> {
        let status = self.device.read_reg_u8(REG_INPUT_STATUS)?;
        self.clear_interrupt()?;
        Ok(Pads::from_status(status))
    }

    /// Raw delta counts of the three pads.
    pub fn read_delta_counts(&mut self) -> Result<[u8; 3], I2C::Error> {
        let mut counts = [0u8; 3];
        for (i, count) in counts.iter_mut().enumerate() {
            *count = self.device.read_reg_u8(REG_INPUT_1_DELTA_COUNT + i as u8)?;
        }
        Ok(counts)
    }

    fn clear_interrupt(&mut self) -> Result<(), I2C::Error> {
        self.device
            .write_reg_bit(REG_MAIN_CONTROL, MAIN_CONTROL_INT_BIT, false)
    }
}
