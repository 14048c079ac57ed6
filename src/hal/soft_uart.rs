//! Software-timed serial on two GPIO lines: the transport for boards whose
//! USART pins are taken.
//!
//! 8N1, LSB first. Receive waits half a bit after the start edge, samples the
//! eight data bits one bit period apart and then lets the stop bit pass
//! without looking at it. There is no buffering: a byte that starts while
//! the programmer is busy elsewhere is lost, which the protocol's lock-step
//! request/response pattern never provokes.
//!
//! The bit period is kept in nanoseconds and every edge or sample is placed
//! at its offset from the start of the frame, so the microsecond rounding of
//! the delay never exceeds half a microsecond at any bit.

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::{InputPin, OutputPin};
use embedded_hal::serial;

const NS_PER_US: u32 = 1_000;

pub struct SoftSerial<TX, RX, D> {
    tx: TX,
    rx: RX,
    delay: D,
    bit_ns: u32,
}

/// Microseconds already waited since the frame started.
struct FrameClock {
    elapsed_us: u32,
}

impl FrameClock {
    fn start() -> Self {
        Self { elapsed_us: 0 }
    }

    /// Delay until `offset_ns` after the frame start, rounded to the nearest
    /// microsecond.
    fn wait_until<D: DelayUs<u16>>(&mut self, delay: &mut D, offset_ns: u32) {
        let target_us = (offset_ns + NS_PER_US / 2) / NS_PER_US;
        if target_us > self.elapsed_us {
            delay.delay_us((target_us - self.elapsed_us) as u16);
            self.elapsed_us = target_us;
        }
    }
}

impl<TX, RX, D> SoftSerial<TX, RX, D>
where
    TX: OutputPin,
    RX: InputPin,
    D: DelayUs<u16>,
{
    /// `tx` must already idle high. `baud` must be at least 16 so one bit
    /// fits a `u16` microsecond delay.
    pub fn new(tx: TX, rx: RX, delay: D, baud: u32) -> Self {
        Self {
            tx,
            rx,
            delay,
            bit_ns: 1_000_000_000 / baud.max(16),
        }
    }

    pub fn bit_period_ns(&self) -> u32 {
        self.bit_ns
    }

    pub fn release(self) -> (TX, RX, D) {
        (self.tx, self.rx, self.delay)
    }

    fn bit_offset(&self, bits: u32) -> u32 {
        self.bit_ns * bits
    }
}

impl<TX, RX, D> serial::Read<u8> for SoftSerial<TX, RX, D>
where
    TX: OutputPin,
    RX: InputPin,
    D: DelayUs<u16>,
{
    type Error = RX::Error;

    fn read(&mut self) -> nb::Result<u8, RX::Error> {
        // Line idles high; low is the start bit
        if self.rx.is_high()? {
            return Err(nb::Error::WouldBlock);
        }

        let half = self.bit_ns / 2;
        let mut clock = FrameClock::start();
        let mut byte = 0u8;
        for bit in 1..=8 {
            let offset = half + self.bit_offset(bit);
            clock.wait_until(&mut self.delay, offset);
            byte >>= 1;
            if self.rx.is_high()? {
                byte |= 0x80;
            }
        }

        // Middle of the stop bit
        let offset = half + self.bit_offset(9);
        clock.wait_until(&mut self.delay, offset);
        Ok(byte)
    }
}

impl<TX, RX, D> serial::Write<u8> for SoftSerial<TX, RX, D>
where
    TX: OutputPin,
    RX: InputPin,
    D: DelayUs<u16>,
{
    type Error = TX::Error;

    fn write(&mut self, byte: u8) -> nb::Result<(), TX::Error> {
        let mut clock = FrameClock::start();

        self.tx.set_low()?;
        let offset = self.bit_offset(1);
        clock.wait_until(&mut self.delay, offset);

        let mut bits = byte;
        for bit in 2..=9 {
            if bits & 1 != 0 {
                self.tx.set_high()?;
            } else {
                self.tx.set_low()?;
            }
            let offset = self.bit_offset(bit);
            clock.wait_until(&mut self.delay, offset);
            bits >>= 1;
        }

        self.tx.set_high()?;
        let offset = self.bit_offset(10);
        clock.wait_until(&mut self.delay, offset);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), TX::Error> {
        Ok(())
    }
}
