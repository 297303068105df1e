/// DS2482 hardware and protocol errors.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ds2482Error<E> {
    /// I2C bus errors.
    I2c(E),
    /// Busy-wait retries exceeded.
    RetriesExceeded,
    /// No presence pulse after a 1-Wire bus reset.
    NoDevicePresent,
    /// A short circuit was detected on the 1-Wire line.
    ShortCircuit,
    /// Channel outside the 0..=7 range; rejected before any bus traffic.
    InvalidChannel(u8),
    /// The channel-selection register did not read back the code expected
    /// for the requested channel.
    ChannelMismatch {
        /// The channel that was being selected.
        channel: u8,
        /// The value the channel-selection register actually returned.
        readback: u8,
    },
    /// The status register did not match the expected post-reset pattern
    /// during initialization.
    UnexpectedStatus(u8),
}

impl<E> From<E> for Ds2482Error<E> {
    fn from(value: E) -> Self {
        Self::I2c(value)
    }
}
