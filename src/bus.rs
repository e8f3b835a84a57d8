//! Register access on top of an [`I2c`] bus.
//!
//! Register reads are issued with [`I2c::write_read`], so the register address
//! and the data come back in one transaction with a repeated start. Devices
//! with a 16-bit register space get their address sent most significant
//! byte first.
//!
//! Register writes up to [`MAX_FRAME_PAYLOAD`] bytes are framed on the stack
//! and sent as one write. Longer payloads go out as two write operations of a
//! single [`I2c::transaction`], which the bus sends back to back without a
//! restart.

use embedded_hal::i2c::{I2c, Operation};

/// Largest payload framed on the stack by the `write_reg*` helpers.
pub const MAX_FRAME_PAYLOAD: usize = 16;

/// A device at a fixed address on an I²C bus.
#[derive(Debug)]
pub struct Device<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> Device<I2C> {
    pub const fn new(i2c: I2C, address: u8) -> Self {
        Device { i2c, address }
    }

    /// 7-bit target address.
    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> Device<I2C> {
    /// Plain write, no register address prepended.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, bytes)
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), I2C::Error> {
        self.write(&[value])
    }

    /// Plain read, no register address sent.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<(), I2C::Error> {
        self.i2c.read(self.address, buf)
    }

    /// Reads `buf.len()` bytes starting at an 8-bit register address.
    pub fn read_reg(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), I2C::Error> {
        self.i2c.write_read(self.address, &[reg], buf)
    }

    pub fn read_reg_u8(&mut self, reg: u8) -> Result<u8, I2C::Error> {
        let mut buf = [0u8; 1];
        self.read_reg(reg, &mut buf)?;
        Ok(buf[0])
    }

    pub fn read_reg_u16_be(&mut self, reg: u8) -> Result<u16, I2C::Error> {
        let mut buf = [0u8; 2];
        self.read_reg(reg, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    pub fn read_reg_u16_le(&mut self, reg: u8) -> Result<u16, I2C::Error> {
        let mut buf = [0u8; 2];
        self.read_reg(reg, &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    pub fn read_reg_i16_be(&mut self, reg: u8) -> Result<i16, I2C::Error> {
        let mut buf = [0u8; 2];
        self.read_reg(reg, &mut buf)?;
        Ok(i16::from_be_bytes(buf))
    }

    pub fn read_reg_u24_be(&mut self, reg: u8) -> Result<u32, I2C::Error> {
        let mut buf = [0u8; 4];
        self.read_reg(reg, &mut buf[1..])?;
        Ok(u32::from_be_bytes(buf))
    }

    pub fn read_reg_u32_le(&mut self, reg: u8) -> Result<u32, I2C::Error> {
        let mut buf = [0u8; 4];
        self.read_reg(reg, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Reads a `len` bit wide field starting at bit `pos`.
    pub fn read_reg_bits(&mut self, reg: u8, pos: u8, len: u8) -> Result<u8, I2C::Error> {
        let value = self.read_reg_u8(reg)?;
        Ok((value & field_mask(pos, len)) >> pos)
    }

    pub fn read_reg_bit(&mut self, reg: u8, pos: u8) -> Result<bool, I2C::Error> {
        Ok(self.read_reg_bits(reg, pos, 1)? != 0)
    }

    /// Writes `data` to an 8-bit register address in one transaction.
    pub fn write_reg(&mut self, reg: u8, data: &[u8]) -> Result<(), I2C::Error> {
        self.write_prefixed(&[reg], data)
    }

    pub fn write_reg_u8(&mut self, reg: u8, value: u8) -> Result<(), I2C::Error> {
        self.write(&[reg, value])
    }

    pub fn write_reg_u16_be(&mut self, reg: u8, value: u16) -> Result<(), I2C::Error> {
        let [hi, lo] = value.to_be_bytes();
        self.write(&[reg, hi, lo])
    }

    pub fn write_reg_u16_le(&mut self, reg: u8, value: u16) -> Result<(), I2C::Error> {
        let [lo, hi] = value.to_le_bytes();
        self.write(&[reg, lo, hi])
    }

    /// Read-modify-write of a `len` bit wide field at bit `pos`. Bits of
    /// `value` that do not fit the field are dropped.
    pub fn write_reg_bits(&mut self, reg: u8, pos: u8, len: u8, value: u8) -> Result<(), I2C::Error> {
        let current = self.read_reg_u8(reg)?;
        let updated = set_bits!(current, field_mask(pos, len), pos, value);
        self.write_reg_u8(reg, updated)
    }

    pub fn write_reg_bit(&mut self, reg: u8, pos: u8, set: bool) -> Result<(), I2C::Error> {
        self.write_reg_bits(reg, pos, 1, set as u8)
    }

    /// Reads `buf.len()` bytes starting at a 16-bit register address.
    pub fn read_reg16(&mut self, reg: u16, buf: &mut [u8]) -> Result<(), I2C::Error> {
        self.i2c.write_read(self.address, &reg.to_be_bytes(), buf)
    }

    pub fn read_reg16_u8(&mut self, reg: u16) -> Result<u8, I2C::Error> {
        let mut buf = [0u8; 1];
        self.read_reg16(reg, &mut buf)?;
        Ok(buf[0])
    }

    pub fn read_reg16_u16_be(&mut self, reg: u16) -> Result<u16, I2C::Error> {
        let mut buf = [0u8; 2];
        self.read_reg16(reg, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    pub fn read_reg16_u16_le(&mut self, reg: u16) -> Result<u16, I2C::Error> {
        let mut buf = [0u8; 2];
        self.read_reg16(reg, &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Writes `data` to a 16-bit register address in one transaction.
    pub fn write_reg16(&mut self, reg: u16, data: &[u8]) -> Result<(), I2C::Error> {
        self.write_prefixed(&reg.to_be_bytes(), data)
    }

    pub fn write_reg16_u8(&mut self, reg: u16, value: u8) -> Result<(), I2C::Error> {
        let [rh, rl] = reg.to_be_bytes();
        self.write(&[rh, rl, value])
    }

    pub fn write_reg16_u16_be(&mut self, reg: u16, value: u16) -> Result<(), I2C::Error> {
        let [rh, rl] = reg.to_be_bytes();
        let [hi, lo] = value.to_be_bytes();
        self.write(&[rh, rl, hi, lo])
    }

    pub fn write_reg16_u16_le(&mut self, reg: u16, value: u16) -> Result<(), I2C::Error> {
        let [rh, rl] = reg.to_be_bytes();
        let [lo, hi] = value.to_le_bytes();
        self.write(&[rh, rl, lo, hi])
    }

    // `reg` is at most two bytes
    fn write_prefixed(&mut self, reg: &[u8], data: &[u8]) -> Result<(), I2C::Error> {
        if data.len() > MAX_FRAME_PAYLOAD {
            return self
                .i2c
                .transaction(self.address, &mut [Operation::Write(reg), Operation::Write(data)]);
        }
        let mut frame = [0u8; MAX_FRAME_PAYLOAD + 2];
        let len = reg.len() + data.len();
        frame[..reg.len()].copy_from_slice(reg);
        frame[reg.len()..len].copy_from_slice(data);
        self.write(&frame[..len])
    }
}

#[inline]
fn field_mask(pos: u8, len: u8) -> u8 {
    debug_assert!(pos + len <= 8);
    (((1u16 << len) - 1) << pos) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = 0x42;

    #[test]
    fn multi_byte_reads_follow_byte_order() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![0x01], vec![0x01, 0x9b]),
            I2cTransaction::write_read(ADDR, vec![0x01], vec![0x01, 0x9b]),
            I2cTransaction::write_read(ADDR, vec![0x41], vec![0xfc, 0x18]),
            I2cTransaction::write_read(ADDR, vec![0x00], vec![0x12, 0x34, 0x56]),
            I2cTransaction::write_read(ADDR, vec![0x08], vec![0x78, 0x56, 0x34, 0x12]),
        ];
        let mut dev = Device::new(I2cMock::new(&expectations), ADDR);

        assert_eq!(dev.read_reg_u16_be(0x01), Ok(411));
        assert_eq!(dev.read_reg_u16_le(0x01), Ok(0x9b01));
        assert_eq!(dev.read_reg_i16_be(0x41), Ok(-1000));
        assert_eq!(dev.read_reg_u24_be(0x00), Ok(0x12_3456));
        assert_eq!(dev.read_reg_u32_le(0x08), Ok(0x1234_5678));

        dev.release().done();
    }

    #[test]
    fn sixteen_bit_register_address_goes_msb_first() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![0x01, 0x0f], vec![0xea, 0xcc]),
            I2cTransaction::write(ADDR, vec![0x00, 0x1e, 0x01, 0x40]),
            I2cTransaction::write(ADDR, vec![0x00, 0x05, 0xe8, 0x03]),
            I2cTransaction::write(ADDR, vec![0x00, 0x2d, 0xaa, 0xbb, 0xcc]),
        ];
        let mut dev = Device::new(I2cMock::new(&expectations), ADDR);

        assert_eq!(dev.read_reg16_u16_be(0x010f), Ok(0xeacc));
        dev.write_reg16_u16_be(0x001e, 0x0140).unwrap();
        dev.write_reg16_u16_le(0x0005, 1000).unwrap();
        dev.write_reg16(0x002d, &[0xaa, 0xbb, 0xcc]).unwrap();

        dev.release().done();
    }

    #[test]
    fn writes_prepend_register() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0x05, 0x01, 0xb8, 0x03, 0xe8]),
            I2cTransaction::write(ADDR, vec![0xa1, 0x01, 0x2c]),
            I2cTransaction::write(ADDR, vec![0x00, 0x34, 0x12]),
        ];
        let mut dev = Device::new(I2cMock::new(&expectations), ADDR);

        dev.write_reg(0x05, &[0x01, 0xb8, 0x03, 0xe8]).unwrap();
        dev.write_reg_u16_be(0xa1, 300).unwrap();
        dev.write_reg_u16_le(0x00, 0x1234).unwrap();

        dev.release().done();
    }

    #[test]
    fn long_payloads_are_one_transaction() {
        let payload = vec![0xaa; MAX_FRAME_PAYLOAD + 1];
        let expectations = [
            I2cTransaction::transaction_start(ADDR),
            I2cTransaction::write(ADDR, vec![0x10]),
            I2cTransaction::write(ADDR, payload.clone()),
            I2cTransaction::transaction_end(ADDR),
            I2cTransaction::transaction_start(ADDR),
            I2cTransaction::write(ADDR, vec![0x00, 0x2d]),
            I2cTransaction::write(ADDR, vec![0x55; 91]),
            I2cTransaction::transaction_end(ADDR),
            // a full frame still fits on the stack
            I2cTransaction::write(ADDR, [vec![0x07], vec![0x01; MAX_FRAME_PAYLOAD]].concat()),
        ];
        let mut dev = Device::new(I2cMock::new(&expectations), ADDR);

        dev.write_reg(0x10, &payload).unwrap();
        dev.write_reg16(0x002d, &[0x55; 91]).unwrap();
        dev.write_reg(0x07, &[0x01; MAX_FRAME_PAYLOAD]).unwrap();

        dev.release().done();
    }

    #[test]
    fn bit_field_update_keeps_other_bits() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![0x1f], vec![0b0010_1111]),
            I2cTransaction::write(ADDR, vec![0x1f, 0b0111_1111]),
            I2cTransaction::write_read(ADDR, vec![0x03], vec![0b1111_1111]),
            I2cTransaction::write(ADDR, vec![0x03, 0b1111_0001]),
            I2cTransaction::write_read(ADDR, vec![0x2a], vec![0b1000_0000]),
        ];
        let mut dev = Device::new(I2cMock::new(&expectations), ADDR);

        dev.write_reg_bits(0x1f, 4, 3, 0b111).unwrap();
        dev.write_reg_bits(0x03, 1, 3, 0).unwrap();
        assert_eq!(dev.read_reg_bit(0x2a, 7), Ok(true));

        dev.release().done();
    }

    #[test]
    fn bus_errors_are_passed_through() {
        let expectations = [I2cTransaction::write_read(ADDR, vec![0x00], vec![0x00]).with_error(ErrorKind::Other)];
        let mut dev = Device::new(I2cMock::new(&expectations), ADDR);

        assert_eq!(dev.read_reg_u8(0x00), Err(ErrorKind::Other));

        dev.release().done();
    }

    #[test]
    fn field_masks() {
        assert_eq!(field_mask(0, 8), 0xff);
        assert_eq!(field_mask(4, 3), 0b0111_0000);
        assert_eq!(field_mask(1, 3), 0b0000_1110);
    }
}
