//! Byte transport with the watchdog riding on the receive loop
//!
//! Both serial strategies (polled USART, bit-banged pins) are plain
//! `embedded_hal::serial` implementations; `Link` adds the STK500 framing
//! rules on top and owns the watchdog, since waiting for the host is the only
//! place it gets fed.

use embedded_hal::serial;
use embedded_hal::watchdog::Watchdog;
use ufmt::derive::uDebug;

use super::{CRC_EOP, STK_INSYNC};

/// Unrecoverable protocol state. The host is not told; the device goes quiet
/// and waits for the watchdog to reset it.
#[derive(Debug, uDebug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// A frame ended with this byte instead of CRC_EOP.
    OutOfSync(u8),
}

pub struct Link<S, W> {
    serial: S,
    watchdog: W,
}

impl<S, W> Link<S, W>
where
    S: serial::Read<u8> + serial::Write<u8>,
    W: Watchdog,
{
    pub fn new(serial: S, watchdog: W) -> Self {
        Self { serial, watchdog }
    }

    /// Block for the next byte, feeding the watchdog on every idle poll.
    ///
    /// Line errors (framing, overrun) are polled past without feeding, so a
    /// host talking at the wrong rate eventually starves the watchdog.
    pub fn getch(&mut self) -> u8 {
        loop {
            match self.serial.read() {
                Ok(byte) => return byte,
                Err(nb::Error::WouldBlock) => self.watchdog.feed(),
                Err(nb::Error::Other(_)) => {}
            }
        }
    }

    pub fn putch(&mut self, byte: u8) {
        // Nothing to report a failed transmit to; the host times out instead.
        let _ = nb::block!(self.serial.write(byte));
    }

    /// Fill `buffer` from the line.
    pub fn receive_into(&mut self, buffer: &mut [u8]) {
        for byte in buffer.iter_mut() {
            *byte = self.getch();
        }
    }

    /// Check the frame terminator and answer STK_INSYNC.
    pub fn verify_space(&mut self) -> Result<(), Fault> {
        let terminator = self.getch();
        if terminator != CRC_EOP {
            return Err(Fault::OutOfSync(terminator));
        }
        self.putch(STK_INSYNC);
        Ok(())
    }

    /// Discard `count` payload bytes, then check the terminator.
    pub fn skip(&mut self, count: u8) -> Result<(), Fault> {
        for _ in 0..count {
            self.getch();
        }
        self.verify_space()
    }

    /// Spin without feeding the watchdog until it resets the part.
    pub fn stall(&mut self) -> ! {
        loop {
            core::hint::spin_loop();
        }
    }

    pub fn watchdog(&self) -> &W {
        &self.watchdog
    }

    pub fn release(self) -> (S, W) {
        (self.serial, self.watchdog)
    }
}
