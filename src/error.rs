//! Errors shared by the drivers that can fail on content as well as on the bus.

use core::fmt;

/// Driver error.
///
/// `E` is the error type of the underlying [`embedded_hal::i2c::I2c`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// I²C bus error
    I2c(E),
    /// The identifier register did not hold the expected value, probably the
    /// wrong device sits at this address.
    UnexpectedId { expected: u16, found: u16 },
    /// The device stayed busy for longer than the poll budget.
    Timeout,
    /// Checksum over the received frame did not verify, holds the residue.
    Crc(u8),
    /// A parameter was outside what the device accepts.
    InvalidArgument,
    /// Failed to parse sensor data
    InvalidData,
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2c(e) => write!(f, "i2c bus error: {:?}", e),
            Error::UnexpectedId { expected, found } => {
                write!(f, "unexpected device id 0x{:x}, expected 0x{:x}", found, expected)
            }
            Error::Timeout => f.write_str("timed out waiting for the device"),
            Error::Crc(residue) => write!(f, "crc check failed, residue 0x{:02x}", residue),
            Error::InvalidArgument => f.write_str("argument out of range"),
            Error::InvalidData => f.write_str("device returned invalid data"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}

/// Compares an identifier read from the device against the expected one.
pub(crate) fn check_id<E>(expected: u16, found: u16) -> Result<(), Error<E>> {
    if expected == found {
        Ok(())
    } else {
        #[cfg(feature = "defmt")]
        defmt::warn!("device id mismatch: expected 0x{:x}, found 0x{:x}", expected, found);
        Err(Error::UnexpectedId { expected, found })
    }
}
