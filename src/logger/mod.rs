//! Trace output for the programmer
//!
//! The programming line carries nothing but protocol bytes, so trace events go
//! to a separate `ufmt::uWrite` sink (USART1 on the ATmega128 board). The
//! default sink discards everything and compiles away.

use core::convert::Infallible;

use ufmt::{uwriteln, uWrite};

use crate::bootloader::VectorShadow;
use crate::config::Config;
use crate::drivers::FlashAddress;
use crate::protocol::transport::Fault;
use crate::protocol::Command;

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTrace;

impl uWrite for NoTrace {
    type Error = Infallible;

    #[inline]
    fn write_str(&mut self, _s: &str) -> Result<(), Infallible> {
        Ok(())
    }
}

pub struct Trace<W> {
    sink: W,
}

// Write errors are dropped: a broken trace line must not stop programming.
impl<W: uWrite> Trace<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    /// First line of every session: which part and protocol version.
    pub fn banner(&mut self, config: &Config) {
        let _ = uwriteln!(
            self.sink,
            "stkboot {} v{}.{} redirect={}",
            config.device.name,
            config.version.major,
            config.version.minor,
            config.redirect
        );
    }

    pub fn command(&mut self, command: Command) {
        let _ = uwriteln!(self.sink, "cmd {:?}", command);
    }

    pub fn address(&mut self, address: FlashAddress) {
        let _ = uwriteln!(self.sink, "addr {}:{}", address.bank, address.offset);
    }

    pub fn erase(&mut self, address: FlashAddress, deferred: bool) {
        let when = if deferred { "deferred" } else { "early" };
        let _ = uwriteln!(self.sink, "erase {} {}", address.linear(), when);
    }

    pub fn commit(&mut self, address: FlashAddress) {
        let _ = uwriteln!(self.sink, "write {}", address.linear());
    }

    pub fn protected(&mut self, address: FlashAddress) {
        let _ = uwriteln!(self.sink, "skip {} (programmer)", address.linear());
    }

    pub fn redirect(&mut self, shadow: &VectorShadow) {
        let _ = uwriteln!(
            self.sink,
            "redirect reset={} secondary={}",
            shadow.reset,
            shadow.secondary
        );
    }

    pub fn fault(&mut self, fault: Fault) {
        let _ = uwriteln!(self.sink, "fault {:?}", fault);
    }
}
