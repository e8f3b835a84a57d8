//! VEML6040 RGBW colour sensor, PiicoDev P4.
//!
//! Ref: <https://www.vishay.com/docs/84331/designingveml6040.pdf>

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::bus::Device;

pub const DEFAULT_ADDRESS: u8 = 0x10;

const REG_CONF: u8 = 0x00;
const REG_R_DATA: u8 = 0x08;
const REG_G_DATA: u8 = 0x09;
const REG_B_DATA: u8 = 0x0A;
const REG_W_DATA: u8 = 0x0B;

/// 40ms integration, auto mode, enabled. Green sensitivity 0.25168 lx/count.
const CONF_DEFAULT: u8 = 0x00;
const CONF_SHUTDOWN: u8 = 0x01;

/// Raw channel counts.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgbw {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    pub white: u16,
}

impl Rgbw {
    pub fn cct(&self) -> f32 {
        cct(self.red, self.green, self.blue)
    }

    pub fn hsv(&self) -> Hsv {
        hsv(self.red, self.green, self.blue)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hsv {
    /// 0..360 degrees
    pub hue: f32,
    /// 0..100
    pub saturation: f32,
    /// 0..100
    pub value: f32,
}

pub struct VEML6040<I2C> {
    device: Device<I2C>,
}

impl<I2C: I2c> VEML6040<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        VEML6040 {
            device: Device::new(i2c, address),
        }
    }

    pub fn release(self) -> I2C {
        self.device.release()
    }

    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), I2C::Error> {
        self.device.write_reg_u8(REG_CONF, CONF_SHUTDOWN)?;
        self.device.write_reg_u8(REG_CONF, CONF_DEFAULT)?;
        // first integration cycle
        delay.delay_ms(50);
        Ok(())
    }

    pub fn read_rgbw(&mut self) -> Result<Rgbw, I2C::Error> {
        Ok(Rgbw {
            red: self.device.read_reg_u16_le(REG_R_DATA)?,
            green: self.device.read_reg_u16_le(REG_G_DATA)?,
            blue: self.device.read_reg_u16_le(REG_B_DATA)?,
            white: self.device.read_reg_u16_le(REG_W_DATA)?,
        })
    }
}

/// Correlated colour temperature in kelvin, McCamy's approximation over the
/// Vishay RGB to XYZ matrix. Zero when there is no light.
pub fn cct(red: u16, green: u16, blue: u16) -> f32 {
    let (r, g, b) = (red as f32, green as f32, blue as f32);
    let x = -0.023249 * r + 0.291014 * g - 0.364880 * b;
    let y = -0.042799 * r + 0.272148 * g - 0.279591 * b;
    let z = -0.155901 * r + 0.251534 * g - 0.076240 * b;

    let total = x + y + z;
    if total == 0.0 {
        return 0.0;
    }
    let (cx, cy) = (x / total, y / total);

    let n = (cx - 0.3320) / (0.1858 - cy);
    449.0 * n * n * n + 3525.0 * n * n + 6823.3 * n + 5520.33
}

/// Full scale channels (65535) map to a value of 100.
pub fn hsv(red: u16, green: u16, blue: u16) -> Hsv {
    let r = red as f32 / 65535.0;
    let g = green as f32 / 65535.0;
    let b = blue as f32 / 65535.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    if delta == 0.0 {
        // grey
        return Hsv {
            hue: 0.0,
            saturation: 0.0,
            value: max * 100.0,
        };
    }

    let sector = if r == max {
        (g - b) / delta
    } else if g == max {
        2.0 + (b - r) / delta
    } else {
        4.0 + (r - g) / delta
    };
    let mut hue = sector * 60.0;
    if hue < 0.0 {
        hue += 360.0;
    }

    Hsv {
        hue,
        saturation: delta / max * 100.0,
        value: max * 100.0,
    }
}
