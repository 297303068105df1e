#![no_std]
#![deny(missing_docs)]

/*! # DS2482-800
 *
 * A `no_std` driver for the Analog Devices DS2482-800 I2C to 1-Wire bridge,
 * geared towards DS18B20-class temperature sensors with one sensor per
 * channel.
 *
 * The bridge executes all 1-Wire line timing autonomously and signals
 * completion through the busy flag of its status register, so every bus
 * primitive here is a command/poll round trip with a bounded wait rather
 * than a delay sized to the slowest theoretical 1-Wire operation.
 * Temperature conversions are likewise non-blocking: start one with
 * [`Ds2482::start_temperature_conversion`], poll
 * [`Ds2482::check_conversion_status`] until it reports completion, then
 * fetch the result with [`Ds2482::read_temperature`].
 *
 * ## Features
 *
 * - `defmt`: diagnostics through the `defmt` framework.
 * - `log`: diagnostics through the `log` facade.
 *
 * Diagnostics are a side channel only; protocol behavior is identical with
 * and without them.
 */

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!(
    "Features \"defmt\" and \"log\" are mutually exclusive and cannot be enabled together"
);

#[cfg(test)]
#[macro_use]
extern crate std;

mod channel;
mod error;
mod onewire;
mod registers;
mod temperature;
mod traits;

pub use error::Ds2482Error;
pub use registers::DeviceStatus;
pub use temperature::OperationState;
pub use traits::Monotonic;

#[cfg(feature = "defmt")]
pub(crate) use defmt::{debug, trace, warn};
#[cfg(feature = "log")]
pub(crate) use log::{debug, trace, warn};

#[cfg(not(any(feature = "defmt", feature = "log")))]
macro_rules! debug {
    ($($arg:tt)*) => {{}};
}
#[cfg(not(any(feature = "defmt", feature = "log")))]
macro_rules! trace {
    ($($arg:tt)*) => {{}};
}
#[cfg(not(any(feature = "defmt", feature = "log")))]
macro_rules! warn {
    ($($arg:tt)*) => {{}};
}
#[cfg(not(any(feature = "defmt", feature = "log")))]
pub(crate) use debug;
#[cfg(not(any(feature = "defmt", feature = "log")))]
pub(crate) use trace;
#[cfg(not(any(feature = "defmt", feature = "log")))]
pub(crate) use warn;

/// Results of DS2482-specific function calls.
pub type Ds2482Result<T, E> = Result<T, Ds2482Error<E>>;

/// Default 7-bit bus address with all address strap pins tied low.
pub const DEFAULT_ADDRESS: u8 = 0x18;

/// A DS2482-800 I2C to 1-Wire bridge device.
///
/// Takes ownership of an I2C bus (implementing the
/// [`I2c`](embedded_hal::i2c::I2c) trait), a timer object implementing the
/// [`DelayNs`](embedded_hal::delay::DelayNs) trait, and a monotonic
/// millisecond clock implementing [`Monotonic`], used to time sensor
/// conversions without blocking.
pub struct Ds2482<I, D, C> {
    pub(crate) i2c: I,
    pub(crate) addr: u8,
    pub(crate) delay: D,
    pub(crate) clock: C,
    pub(crate) state: OperationState,
    pub(crate) channel: u8,
    pub(crate) conversion_start: u32,
}

impl<I, D, C> Ds2482<I, D, C> {
    /// Creates a new instance of `Ds2482` with the default bus address.
    pub fn new(i2c: I, delay: D, clock: C) -> Self {
        Ds2482 {
            i2c,
            addr: DEFAULT_ADDRESS,
            delay,
            clock,
            state: OperationState::Idle,
            channel: 0,
            conversion_start: 0,
        }
    }

    /// Use a different 7-bit bus address, matching the AD0..AD2 strap pins.
    pub fn with_address(mut self, addr: u8) -> Self {
        self.addr = addr;
        self
    }

    /// Current operation state.
    pub fn state(&self) -> OperationState {
        self.state
    }

    /// Whether a temperature conversion is in flight.
    pub fn is_busy(&self) -> bool {
        self.state == OperationState::Converting
    }

    /// Force the state machine back to [`OperationState::Idle`].
    ///
    /// The error state is terminal; after clearing it the device should be
    /// re-initialized with [`Ds2482::begin`] before further 1-Wire traffic.
    pub fn clear_state(&mut self) {
        self.state = OperationState::Idle;
    }

    /// The channel most recently selected and verified, 0 after a device
    /// reset (the bridge reverts to channel 0).
    pub fn current_channel(&self) -> u8 {
        self.channel
    }

    /// Destroys the driver and releases the owned bus, delay and clock.
    pub fn release(self) -> (I, D, C) {
        (self.i2c, self.delay, self.clock)
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use crate::Monotonic;
    use core::cell::Cell;

    impl Monotonic for &Cell<u32> {
        fn now_ms(&mut self) -> u32 {
            self.get()
        }
    }
}
