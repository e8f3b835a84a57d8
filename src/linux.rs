//! Linux `/dev/i2c-N` bus.
//!
//! Every [`I2c::transaction`] is handed to the kernel as one `I2C_RDWR` ioctl,
//! so a register address write followed by a data read keeps the bus with a
//! repeated start in between. The target address travels with each message,
//! which lets one open bus serve several devices. Adjacent write operations
//! are joined into a single message.

use std::fmt;
use std::io;
use std::path::Path;

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use i2cdev::core::{I2CMessage, I2CTransfer};
use i2cdev::linux::{LinuxI2CBus, LinuxI2CError, LinuxI2CMessage};

const EIO: i32 = 5;
const ENXIO: i32 = 6;
const EAGAIN: i32 = 11;
const EREMOTEIO: i32 = 121;

/// An open Linux I²C adapter.
pub struct LinuxI2c {
    bus: LinuxI2CBus,
}

impl LinuxI2c {
    /// Opens `/dev/i2c-{bus}`.
    pub fn open(bus: u8) -> Result<Self, BusError> {
        Self::open_path(format!("/dev/i2c-{}", bus))
    }

    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, BusError> {
        let bus = LinuxI2CBus::new(path)?;
        Ok(LinuxI2c { bus })
    }
}

impl fmt::Debug for LinuxI2c {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinuxI2c").finish_non_exhaustive()
    }
}

impl ErrorType for LinuxI2c {
    type Error = BusError;
}

impl I2c for LinuxI2c {
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
        let mut segments = join_writes(operations);
        let mut messages: Vec<LinuxI2CMessage<'_>> = segments
            .iter_mut()
            .map(|segment| match segment {
                Segment::Read(buf) => LinuxI2CMessage::read(buf),
                Segment::Write(bytes) => LinuxI2CMessage::write(bytes),
            })
            .map(|msg| msg.with_address(u16::from(address)))
            .collect();
        self.bus.transfer(&mut messages)?;
        Ok(())
    }
}

/// One `i2c_msg` of a transfer.
#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Read(&'a mut [u8]),
    Write(Vec<u8>),
}

// Each kernel message starts with a (repeated) start condition, so adjacent
// writes must share a message to go out back to back.
fn join_writes<'a>(operations: &'a mut [Operation<'_>]) -> Vec<Segment<'a>> {
    let mut segments: Vec<Segment<'a>> = Vec::with_capacity(operations.len());
    for op in operations.iter_mut() {
        match op {
            Operation::Read(buf) => segments.push(Segment::Read(&mut **buf)),
            Operation::Write(bytes) => match segments.last_mut() {
                Some(Segment::Write(joined)) => joined.extend_from_slice(bytes),
                _ => segments.push(Segment::Write(bytes.to_vec())),
            },
        }
    }
    segments
}

/// Failure reported by the kernel I²C driver.
#[derive(Debug)]
pub struct BusError(io::Error);

impl BusError {
    pub fn errno(&self) -> Option<i32> {
        self.0.raw_os_error()
    }
}

impl From<LinuxI2CError> for BusError {
    fn from(err: LinuxI2CError) -> Self {
        BusError(err.into())
    }
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i2c bus error: {}", self.0)
    }
}

impl std::error::Error for BusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl embedded_hal::i2c::Error for BusError {
    fn kind(&self) -> ErrorKind {
        errno_kind(self.errno())
    }
}

fn errno_kind(errno: Option<i32>) -> ErrorKind {
    match errno {
        Some(ENXIO) | Some(EREMOTEIO) => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
        Some(EAGAIN) => ErrorKind::ArbitrationLoss,
        Some(EIO) => ErrorKind::Bus,
        _ => ErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::Error as _;

    #[test]
    fn errno_maps_to_hal_kind() {
        assert_eq!(
            errno_kind(Some(EREMOTEIO)),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown)
        );
        assert_eq!(errno_kind(Some(EAGAIN)), ErrorKind::ArbitrationLoss);
        assert_eq!(errno_kind(None), ErrorKind::Other);
    }

    #[test]
    fn adjacent_writes_share_one_message() {
        let mut first = [0u8; 2];
        let mut second = [0u8; 1];
        let mut operations = [
            Operation::Write(&[0x10]),
            Operation::Write(&[0xaa, 0xbb]),
            Operation::Read(&mut first),
            Operation::Read(&mut second),
            Operation::Write(&[0x20]),
        ];

        let segments = join_writes(&mut operations);

        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0], Segment::Write(vec![0x10, 0xaa, 0xbb]));
        assert!(matches!(&segments[1], Segment::Read(buf) if buf.len() == 2));
        assert!(matches!(&segments[2], Segment::Read(buf) if buf.len() == 1));
        assert_eq!(segments[3], Segment::Write(vec![0x20]));
    }

    #[test]
    fn missing_adapter_fails_to_open() {
        let err = LinuxI2c::open_path("/dev/i2c-does-not-exist").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(err.to_string().starts_with("i2c bus error"));
    }
}
