use crate::{Ds2482, Ds2482Result, Monotonic, debug, trace};
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

pub(crate) const SKIP_ROM_CMD: u8 = 0xcc;
pub(crate) const CONVERT_T_CMD: u8 = 0x44;
pub(crate) const READ_SCRATCHPAD_CMD: u8 = 0xbe;

// Worst-case DS18B20 conversion time at 12-bit resolution. Completion is
// purely time-based; the sensor offers no completion signal this driver
// reads.
pub(crate) const CONVERSION_TIME_MS: u32 = 750;

/// Driver operation state.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    /// No operation in flight.
    #[default]
    Idle,
    /// A temperature conversion has been started and its conversion window
    /// has not yet elapsed.
    Converting,
    /// A lower layer reported an unrecoverable bus condition. Terminal until
    /// cleared by [`begin`](crate::Ds2482::begin),
    /// [`reset`](crate::Ds2482::reset) or
    /// [`clear_state`](crate::Ds2482::clear_state).
    Error,
}

/// Bytes 0 and 1 of the scratchpad are the conversion result, a signed
/// 16-bit value in units of 1/16 degree Celsius.
fn temperature_from_scratchpad(scratchpad: &[u8; 9]) -> f32 {
    i16::from_le_bytes([scratchpad[0], scratchpad[1]]) as f32 / 16.0
}

impl<I2C: I2c<SevenBitAddress>, D: DelayNs, C: Monotonic> Ds2482<I2C, D, C> {
    /// Address the sensor on the selected channel: bus reset with presence
    /// check, then Skip ROM. One sensor per channel, so no ROM matching.
    fn address_sensor(&mut self) -> Ds2482Result<(), I2C::Error> {
        self.state = OperationState::Idle;
        self.wire_reset()?;
        self.wire_write_byte(SKIP_ROM_CMD)
    }

    /// Start a temperature conversion on the given channel.
    ///
    /// Selects and verifies the channel, confirms sensor presence and issues
    /// Convert T, then returns immediately; poll
    /// [`check_conversion_status`](Self::check_conversion_status) for
    /// completion. On failure the state is whatever the failing layer set
    /// and no conversion is in flight.
    pub fn start_temperature_conversion(&mut self, channel: u8) -> Ds2482Result<(), I2C::Error> {
        self.state = OperationState::Idle;
        self.select_channel(channel)?;
        self.address_sensor()?;
        self.wire_write_byte(CONVERT_T_CMD)?;
        self.conversion_start = self.clock.now_ms();
        self.state = OperationState::Converting;
        debug!("conversion started on channel {}", channel);
        Ok(())
    }

    /// Whether the running conversion has completed.
    ///
    /// Returns `false` unless a conversion is in flight; once the
    /// conversion window has elapsed, returns `true` exactly once and the
    /// state returns to [`OperationState::Idle`].
    pub fn check_conversion_status(&mut self) -> bool {
        if self.state != OperationState::Converting {
            return false;
        }
        let elapsed = self.clock.now_ms().wrapping_sub(self.conversion_start);
        if elapsed < CONVERSION_TIME_MS {
            return false;
        }
        debug!("conversion complete");
        self.state = OperationState::Idle;
        true
    }

    /// Read the latest conversion result from the sensor on the given
    /// channel, in degrees Celsius.
    ///
    /// Does not wait for a running conversion: the caller is responsible
    /// for having observed [`check_conversion_status`](Self::check_conversion_status)
    /// return `true` (or for having waited out the conversion time). Read
    /// too early, the sensor hands back its previous or power-on reading.
    pub fn read_temperature(&mut self, channel: u8) -> Ds2482Result<f32, I2C::Error> {
        self.state = OperationState::Idle;
        self.select_channel(channel)?;
        let scratchpad = self.read_scratchpad()?;
        let celsius = temperature_from_scratchpad(&scratchpad);
        debug!("channel {} temperature: {} C", channel, celsius);
        Ok(celsius)
    }

    /// Read the 9-byte scratchpad of the sensor on the currently selected
    /// channel.
    ///
    /// Alarm threshold, configuration and CRC bytes are returned as-is and
    /// not validated.
    pub fn read_scratchpad(&mut self) -> Ds2482Result<[u8; 9], I2C::Error> {
        self.address_sensor()?;
        self.wire_write_byte(READ_SCRATCHPAD_CMD)?;
        let mut scratchpad = [0u8; 9];
        for byte in scratchpad.iter_mut() {
            *byte = self.wire_read_byte()?;
        }
        trace!(
            "scratchpad temperature bytes: {:x} {:x}",
            scratchpad[0],
            scratchpad[1]
        );
        Ok(scratchpad)
    }
}
