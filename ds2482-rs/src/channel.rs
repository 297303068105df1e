use crate::{Ds2482, Ds2482Error, Ds2482Result, OperationState, trace, warn};
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

pub(crate) const CHANNEL_SELECT_CMD: u8 = 0xc3;
pub(crate) const CHANNEL_READBACK_PTR: u8 = 0xd2;

// Per-channel selection codes and the distinct values the channel-selection
// register reads back once the switch has taken effect.
const CHANNEL_CODES: [u8; 8] = [0xf0, 0xe1, 0xd2, 0xc3, 0xb4, 0xa5, 0x96, 0x87];
const CHANNEL_READBACK: [u8; 8] = [0xb8, 0xb1, 0xaa, 0xa3, 0x9c, 0x95, 0x8e, 0x87];

impl<I2C: I2c<SevenBitAddress>, D: DelayNs, C> Ds2482<I2C, D, C> {
    /// Route the 1-Wire master to one of the eight bus segments.
    ///
    /// Channel select is fire-and-forget at the bus level, so the selection
    /// is verified through the channel-selection register; the current
    /// channel is updated only once the read-back matches the expected code.
    pub fn select_channel(&mut self, channel: u8) -> Ds2482Result<(), I2C::Error> {
        if channel > 7 {
            return Err(Ds2482Error::InvalidChannel(channel));
        }
        self.write_bytes(&[CHANNEL_SELECT_CMD, CHANNEL_CODES[channel as usize]])?;
        // Settle time before the readback is valid.
        self.delay.delay_us(100);
        let readback = self.read_register(CHANNEL_READBACK_PTR)?;
        let expected = CHANNEL_READBACK[channel as usize];
        if readback != expected {
            warn!(
                "channel {} readback {:x}, expected {:x}",
                channel, readback, expected
            );
            self.state = OperationState::Error;
            return Err(Ds2482Error::ChannelMismatch { channel, readback });
        }
        trace!("channel {} selected", channel);
        self.channel = channel;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CHANNEL_CODES, CHANNEL_READBACK};
    use crate::{Ds2482, Ds2482Error, OperationState};
    use core::cell::Cell;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = 0x18;

    #[test]
    fn select_verifies_the_readback_for_every_channel() {
        for channel in 0..8u8 {
            let transactions = [
                I2cTransaction::write(ADDR, vec![0xc3, CHANNEL_CODES[channel as usize]]),
                I2cTransaction::write_read(
                    ADDR,
                    vec![0xe1, 0xd2],
                    vec![CHANNEL_READBACK[channel as usize]],
                ),
            ];
            let clock = Cell::new(0u32);
            let mut dev = Ds2482::new(I2cMock::new(&transactions), NoopDelay::new(), &clock);

            dev.select_channel(channel).unwrap();
            assert_eq!(dev.current_channel(), channel);
            assert_eq!(dev.state(), OperationState::Idle);

            let (mut i2c, ..) = dev.release();
            i2c.done();
        }
    }

    #[test]
    fn select_rejects_a_mismatched_readback() {
        let transactions = [
            I2cTransaction::write(ADDR, vec![0xc3, 0xd2]),
            I2cTransaction::write_read(ADDR, vec![0xe1, 0xd2], vec![0x55]),
        ];
        let clock = Cell::new(0u32);
        let mut dev = Ds2482::new(I2cMock::new(&transactions), NoopDelay::new(), &clock);

        assert_eq!(
            dev.select_channel(2),
            Err(Ds2482Error::ChannelMismatch {
                channel: 2,
                readback: 0x55
            })
        );
        assert_eq!(dev.state(), OperationState::Error);
        assert_eq!(dev.current_channel(), 0);

        let (mut i2c, ..) = dev.release();
        i2c.done();
    }

    #[test]
    fn out_of_range_channel_issues_no_bus_traffic() {
        let clock = Cell::new(0u32);
        let mut dev = Ds2482::new(I2cMock::new(&[]), NoopDelay::new(), &clock);

        assert_eq!(dev.select_channel(8), Err(Ds2482Error::InvalidChannel(8)));
        assert_eq!(dev.state(), OperationState::Idle);
        assert_eq!(dev.current_channel(), 0);

        let (mut i2c, ..) = dev.release();
        i2c.done();
    }

    #[test]
    fn select_surfaces_a_transport_failure() {
        let transactions =
            [I2cTransaction::write(ADDR, vec![0xc3, 0xf0]).with_error(ErrorKind::Other)];
        let clock = Cell::new(0u32);
        let mut dev = Ds2482::new(I2cMock::new(&transactions), NoopDelay::new(), &clock);

        assert_eq!(
            dev.select_channel(0),
            Err(Ds2482Error::I2c(ErrorKind::Other))
        );
        assert_eq!(dev.state(), OperationState::Error);

        let (mut i2c, ..) = dev.release();
        i2c.done();
    }
}
