//! SparkFun Qwiic PIR motion sensor.
//!
//! The firmware debounces the raw PIR output and keeps two queues of event
//! timestamps, one for detections and one for removals. Queue entries are
//! milliseconds since the event.

use embedded_hal::i2c::I2c;

use crate::bus::Device;
use crate::error::check_id;
use crate::Error;

pub const DEFAULT_ADDRESS: u8 = 0x12;

const DEVICE_ID: u8 = 0x72;

const REG_DEVICE_ID: u8 = 0x00;
const REG_FIRMWARE_MAJOR: u8 = 0x01;
const REG_FIRMWARE_MINOR: u8 = 0x02;
const REG_EVENT_STATUS: u8 = 0x03;
const REG_EVENT_DEBOUNCE_TIME: u8 = 0x05;
const REG_DETECTED_QUEUE_STATUS: u8 = 0x07;
const REG_DETECTED_QUEUE_FRONT: u8 = 0x08;
const REG_DETECTED_QUEUE_BACK: u8 = 0x0C;
const REG_REMOVED_QUEUE_STATUS: u8 = 0x10;
const REG_REMOVED_QUEUE_FRONT: u8 = 0x11;
const REG_REMOVED_QUEUE_BACK: u8 = 0x15;

// event status
const RAW_BIT: u8 = 0;
const AVAILABLE_BIT: u8 = 1;
const REMOVED_BIT: u8 = 2;
const DETECTED_BIT: u8 = 3;
const EVENT_BITS_MASK: u8 = 0b1110;

// queue status
const POP_BIT: u8 = 0;
const EMPTY_BIT: u8 = 1;
const FULL_BIT: u8 = 2;

/// Debounced event flags.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Events {
    pub available: bool,
    pub detected: bool,
    pub removed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Queue {
    Detected,
    Removed,
}

impl Queue {
    fn status_reg(self) -> u8 {
        match self {
            Queue::Detected => REG_DETECTED_QUEUE_STATUS,
            Queue::Removed => REG_REMOVED_QUEUE_STATUS,
        }
    }

    // newest entry
    fn front_reg(self) -> u8 {
        match self {
            Queue::Detected => REG_DETECTED_QUEUE_FRONT,
            Queue::Removed => REG_REMOVED_QUEUE_FRONT,
        }
    }

    // oldest entry
    fn back_reg(self) -> u8 {
        match self {
            Queue::Detected => REG_DETECTED_QUEUE_BACK,
            Queue::Removed => REG_REMOVED_QUEUE_BACK,
        }
    }
}

pub struct QwiicPIR<I2C> {
    device: Device<I2C>,
}

impl<I2C: I2c> QwiicPIR<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        QwiicPIR {
            device: Device::new(i2c, address),
        }
    }

    pub fn release(self) -> I2C {
        self.device.release()
    }

    pub fn init(&mut self) -> Result<(), Error<I2C::Error>> {
        let id = self.device_id().map_err(Error::I2c)?;
        check_id(DEVICE_ID as u16, id as u16)
    }

    pub fn device_id(&mut self) -> Result<u8, I2C::Error> {
        self.device.read_reg_u8(REG_DEVICE_ID)
    }

    pub fn firmware_version(&mut self) -> Result<(u8, u8), I2C::Error> {
        let major = self.device.read_reg_u8(REG_FIRMWARE_MAJOR)?;
        let minor = self.device.read_reg_u8(REG_FIRMWARE_MINOR)?;
        Ok((major, minor))
    }

    /// Undebounced PIR output.
    pub fn raw_reading(&mut self) -> Result<bool, I2C::Error> {
        self.device.read_reg_bit(REG_EVENT_STATUS, RAW_BIT)
    }

    pub fn is_available(&mut self) -> Result<bool, I2C::Error> {
        self.device.read_reg_bit(REG_EVENT_STATUS, AVAILABLE_BIT)
    }

    pub fn is_object_removed(&mut self) -> Result<bool, I2C::Error> {
        self.device.read_reg_bit(REG_EVENT_STATUS, REMOVED_BIT)
    }

    pub fn is_object_detected(&mut self) -> Result<bool, I2C::Error> {
        self.device.read_reg_bit(REG_EVENT_STATUS, DETECTED_BIT)
    }

    /// Clears the available, removed and detected flags.
    pub fn clear_event_bits(&mut self) -> Result<(), I2C::Error> {
        self.device.write_reg_bits(REG_EVENT_STATUS, AVAILABLE_BIT, 3, 0)
    }

    /// Reads the debounced flags and clears them in the same pass.
    pub fn debounce_events(&mut self) -> Result<Events, I2C::Error> {
        let status = self.device.read_reg_u8(REG_EVENT_STATUS)?;
        let events = Events {
            available: status & (1 << AVAILABLE_BIT) != 0,
            detected: status & (1 << DETECTED_BIT) != 0,
            removed: status & (1 << REMOVED_BIT) != 0,
        };
        self.device
            .write_reg_u8(REG_EVENT_STATUS, status & !EVENT_BITS_MASK)?;
        Ok(events)
    }

    /// Debounce time in milliseconds.
    pub fn debounce_time(&mut self) -> Result<u16, I2C::Error> {
        self.device.read_reg_u16_le(REG_EVENT_DEBOUNCE_TIME)
    }

    pub fn set_debounce_time(&mut self, millis: u16) -> Result<(), I2C::Error> {
        self.device.write_reg_u16_le(REG_EVENT_DEBOUNCE_TIME, millis)
    }

    pub fn is_detected_queue_full(&mut self) -> Result<bool, I2C::Error> {
        self.device.read_reg_bit(Queue::Detected.status_reg(), FULL_BIT)
    }

    pub fn is_detected_queue_empty(&mut self) -> Result<bool, I2C::Error> {
        self.device.read_reg_bit(Queue::Detected.status_reg(), EMPTY_BIT)
    }

    pub fn time_since_last_detect(&mut self) -> Result<u32, I2C::Error> {
        self.device.read_reg_u32_le(Queue::Detected.front_reg())
    }

    pub fn time_since_first_detect(&mut self) -> Result<u32, I2C::Error> {
        self.device.read_reg_u32_le(Queue::Detected.back_reg())
    }

    /// Oldest detection, removed from the queue.
    pub fn pop_detected_queue(&mut self) -> Result<u32, I2C::Error> {
        self.pop(Queue::Detected)
    }

    pub fn is_removed_queue_full(&mut self) -> Result<bool, I2C::Error> {
        self.device.read_reg_bit(Queue::Removed.status_reg(), FULL_BIT)
    }

    pub fn is_removed_queue_empty(&mut self) -> Result<bool, I2C::Error> {
        self.device.read_reg_bit(Queue::Removed.status_reg(), EMPTY_BIT)
    }

    pub fn time_since_last_remove(&mut self) -> Result<u32, I2C::Error> {
        self.device.read_reg_u32_le(Queue::Removed.front_reg())
    }

    pub fn time_since_first_remove(&mut self) -> Result<u32, I2C::Error> {
        self.device.read_reg_u32_le(Queue::Removed.back_reg())
    }

    /// Oldest removal, removed from the queue.
    pub fn pop_removed_queue(&mut self) -> Result<u32, I2C::Error> {
        self.pop(Queue::Removed)
    }

    fn pop(&mut self, queue: Queue) -> Result<u32, I2C::Error> {
        let oldest = self.device.read_reg_u32_le(queue.back_reg())?;
        self.device.write_reg_bit(queue.status_reg(), POP_BIT, true)?;
        Ok(oldest)
    }
}
