//! Platform-agnostic drivers for PiicoDev and Qwiic I²C breakout boards.
//!
//! Every driver is generic over [`embedded_hal::i2c::I2c`] and is built on
//! [`bus::Device`], which issues register reads as a single combined
//! write-then-read transaction. On Linux enable the `linux` feature and hand a
//! [`linux::LinuxI2c`] to any driver.
//!
//! ```ignore
//! let i2c = piicodev_drivers::linux::LinuxI2c::open(1)?;
//! let mut tmp = piicodev_drivers::tmp117::TMP117::new(i2c, piicodev_drivers::tmp117::DEFAULT_ADDRESS);
//! let celsius = tmp.read_celsius()?;
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

macro_rules! set_bits {
    ($reg_data:expr, $mask:expr, $pos:expr, $data:expr) => {
        ($reg_data & !$mask) | (($data << $pos) & $mask)
    };
}

pub mod bus;
pub mod error;
#[cfg(feature = "linux")]
pub mod linux;

pub mod aht10;
pub mod buzzer;
pub mod cap1203;
pub mod ens160;
pub mod lm75a;
pub mod mpu6050;
pub mod ms5637;
pub mod potentiometer;
pub mod qwiic_pir;
pub mod rgbled;
pub mod switch;
pub mod tmp117;
pub mod veml6030;
pub mod veml6040;
pub mod vl53l1x;

pub use bus::Device;
pub use error::Error;
