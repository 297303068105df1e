use crate::{Ds2482, Ds2482Error, Ds2482Result, OperationState, debug, warn};
use bitfield_struct::bitfield;
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

pub(crate) const READ_PTR_CMD: u8 = 0xe1; // Set the read pointer
pub(crate) const DEVICE_STATUS_PTR: u8 = 0xf0; // Device status register
pub(crate) const DEVICE_RST_CMD: u8 = 0xf0; // Reset the device

// Status right after a successful device reset: RST and LL set, a quiet
// pulled-up 1-Wire line, nothing else pending.
pub(crate) const POST_RESET_STATUS: u8 = 0x18;

// Busy waits poll in 1 ms steps, bounding every bus-level wait at ~100 ms.
pub(crate) const BUSY_RETRIES: u8 = 100;

/// Status register for the DS2482-800.
///
/// The read-only Status register is the general means for the bridge to
/// report bit-type data from the 1-Wire side, 1-Wire busy status, and its
/// own reset status to the host processor. It is never cached: every read
/// issues a fresh bus transaction.
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct DeviceStatus {
    /// 1WB reports whether the 1-Wire line is busy. During 1-Wire
    /// communication 1WB is 1; once the command completes it returns to 0.
    pub onewire_busy: bool,
    /// PPD is updated with every 1-Wire Reset command and is set when the
    /// bridge detects a presence pulse during the presence-detect cycle.
    pub presence_pulse_detect: bool,
    /// SD is updated with every 1-Wire Reset command and is set when the
    /// 1-Wire line is low at the short-detect sampling time.
    pub short_detect: bool,
    /// LL reports the logic state of the active 1-Wire line without
    /// initiating any 1-Wire communication; sampled on every status read.
    pub logic_level: bool,
    /// RST is set after the bridge has performed an internal reset cycle,
    /// either from power-on or from executing the Device Reset command.
    pub device_reset: bool,
    /// SBR reports the line state sampled during the last 1-Wire Single Bit
    /// command; this is how read-bit results come back.
    pub single_bit_result: bool,
    /// TSB reports the second bit of a 1-Wire Triplet command. Updated only
    /// by triplet commands, which this driver does not issue.
    pub triplet_search_bit: bool,
    /// DIR reports the search direction chosen by the last 1-Wire Triplet
    /// command. Updated only by triplet commands.
    pub branch_dir_taken: bool,
}

impl<I2C: I2c<SevenBitAddress>, D: DelayNs, C> Ds2482<I2C, D, C> {
    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) -> Ds2482Result<(), I2C::Error> {
        match self.i2c.write(self.addr, bytes) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.state = OperationState::Error;
                Err(Ds2482Error::I2c(e))
            }
        }
    }

    pub(crate) fn read_register(&mut self, ptr: u8) -> Ds2482Result<u8, I2C::Error> {
        let mut buf = [0u8; 1];
        match self.i2c.write_read(self.addr, &[READ_PTR_CMD, ptr], &mut buf) {
            Ok(()) => Ok(buf[0]),
            Err(e) => {
                self.state = OperationState::Error;
                Err(Ds2482Error::I2c(e))
            }
        }
    }

    /// Read the status register.
    ///
    /// A bus failure is reported as [`Ds2482Error::I2c`], never as a
    /// sentinel status value.
    pub fn read_status(&mut self) -> Ds2482Result<DeviceStatus, I2C::Error> {
        self.read_register(DEVICE_STATUS_PTR)
            .map(DeviceStatus::from_bits)
    }

    /// Poll the status register until `ready` holds, spinning in 1 ms steps
    /// bounded by [`BUSY_RETRIES`].
    pub(crate) fn poll_status(
        &mut self,
        ready: impl Fn(DeviceStatus) -> bool,
    ) -> Ds2482Result<DeviceStatus, I2C::Error> {
        let mut tries = 0;
        loop {
            let status = self.read_status()?;
            if ready(status) {
                return Ok(status);
            }
            if tries >= BUSY_RETRIES {
                self.state = OperationState::Error;
                return Err(Ds2482Error::RetriesExceeded);
            }
            tries += 1;
            self.delay.delay_ms(1);
        }
    }

    pub(crate) fn onewire_wait(&mut self) -> Ds2482Result<DeviceStatus, I2C::Error> {
        self.poll_status(|status| !status.onewire_busy())
    }

    /// Reset the device.
    ///
    /// Performs a global reset of the bridge state machine logic, terminates
    /// any ongoing 1-Wire communication and reverts the bridge to channel 0.
    pub fn reset(&mut self) -> Ds2482Result<(), I2C::Error> {
        self.write_bytes(&[DEVICE_RST_CMD])?;
        self.poll_status(|status| status.device_reset())?;
        self.channel = 0;
        self.state = OperationState::Idle;
        Ok(())
    }

    /// Wake the device with a read-byte probe and wait for the 1-Wire side
    /// to go idle.
    pub fn wake_up(&mut self) -> Ds2482Result<(), I2C::Error> {
        self.write_bytes(&[crate::onewire::ONEWIRE_READ_BYTE])?;
        self.onewire_wait()?;
        Ok(())
    }

    /// Initialize the device: reset, wake it up, then verify the status
    /// register against the expected post-reset pattern.
    pub fn begin(&mut self) -> Ds2482Result<(), I2C::Error> {
        self.reset()?;
        self.wake_up()?;
        let status = self.read_status()?;
        if status.into_bits() != POST_RESET_STATUS {
            warn!("unexpected status after init: {:x}", status.into_bits());
            self.state = OperationState::Error;
            return Err(Ds2482Error::UnexpectedStatus(status.into_bits()));
        }
        debug!("DS2482-800 initialized");
        self.state = OperationState::Idle;
        Ok(())
    }
}
