use crate::{DeviceStatus, Ds2482, Ds2482Error, Ds2482Result, OperationState, warn};
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

pub(crate) const ONEWIRE_RESET_CMD: u8 = 0xb4;
pub(crate) const ONEWIRE_WRITE_BYTE: u8 = 0xa5;
pub(crate) const ONEWIRE_READ_BYTE: u8 = 0x96;
pub(crate) const ONEWIRE_READ_DATA_PTR: u8 = 0xe1;
pub(crate) const ONEWIRE_SINGLE_BIT: u8 = 0x87;

// Payload byte for a single-bit command: bit 7 carries the bit value, and a
// one also serves as the read slot.
const SINGLE_BIT_ONE: u8 = 0x80;
const SINGLE_BIT_ZERO: u8 = 0x00;

impl<I2C: I2c<SevenBitAddress>, D: DelayNs, C> Ds2482<I2C, D, C> {
    /// Reset the 1-Wire bus on the selected channel and check for a
    /// presence pulse.
    ///
    /// Returns the final status register on success. A short on the line or
    /// a missing presence pulse is an error and latches the
    /// [`Error`](OperationState::Error) state; a successful reset leaves the
    /// state untouched.
    pub fn wire_reset(&mut self) -> Ds2482Result<DeviceStatus, I2C::Error> {
        self.onewire_wait()?;
        self.write_bytes(&[ONEWIRE_RESET_CMD])?;
        let status = self.onewire_wait()?;
        if status.short_detect() {
            warn!("short detected on the 1-Wire line");
            self.state = OperationState::Error;
            return Err(Ds2482Error::ShortCircuit);
        }
        if !status.presence_pulse_detect() {
            warn!("no presence pulse detected");
            self.state = OperationState::Error;
            return Err(Ds2482Error::NoDevicePresent);
        }
        Ok(status)
    }

    /// Write a single bit to the 1-Wire bus.
    pub fn wire_write_bit(&mut self, bit: bool) -> Ds2482Result<(), I2C::Error> {
        self.onewire_wait()?;
        self.write_bytes(&[
            ONEWIRE_SINGLE_BIT,
            if bit { SINGLE_BIT_ONE } else { SINGLE_BIT_ZERO },
        ])
    }

    /// Read a single bit from the 1-Wire bus.
    ///
    /// Generates a read slot by writing a one bit and samples the line
    /// through the single-bit-result status flag.
    pub fn wire_read_bit(&mut self) -> Ds2482Result<bool, I2C::Error> {
        self.wire_write_bit(true)?;
        Ok(self.onewire_wait()?.single_bit_result())
    }

    /// Write a byte to the 1-Wire bus.
    pub fn wire_write_byte(&mut self, byte: u8) -> Ds2482Result<(), I2C::Error> {
        self.onewire_wait()?;
        self.write_bytes(&[ONEWIRE_WRITE_BYTE, byte])
    }

    /// Read a byte from the 1-Wire bus.
    ///
    /// The bridge clocks the byte in autonomously; once the busy flag
    /// clears, the result is fetched through the read-data register.
    pub fn wire_read_byte(&mut self) -> Ds2482Result<u8, I2C::Error> {
        self.onewire_wait()?;
        self.write_bytes(&[ONEWIRE_READ_BYTE])?;
        self.onewire_wait()?;
        self.read_register(ONEWIRE_READ_DATA_PTR)
    }
}
