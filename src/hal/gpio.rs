//! Port E pins, the only GPIO the programmer touches (serial lines)

use avr_device::atmega128a::PORTE;
use core::convert::Infallible;
use core::marker::PhantomData;
use embedded_hal::digital::v2::{InputPin, OutputPin};

pub trait PinMode {}
pub struct Input;
pub struct Output;
impl PinMode for Input {}
impl PinMode for Output {}

pub struct Pin<const P: u8, MODE> {
    _mode: PhantomData<MODE>,
}

impl<const P: u8> Pin<P, Input> {
    /// Input with the pull-up on, so a floating line reads idle.
    pub fn pull_up() -> Self {
        unsafe {
            let p = PORTE::ptr();
            (*p).ddre.modify(|r, w| w.bits(r.bits() & !(1 << P)));
            (*p).porte.modify(|r, w| w.bits(r.bits() | (1 << P)));
        }
        Self { _mode: PhantomData }
    }
}

impl<const P: u8> Pin<P, Output> {
    /// Output driven high, the serial idle level.
    pub fn idle_high() -> Self {
        unsafe {
            let p = PORTE::ptr();
            (*p).porte.modify(|r, w| w.bits(r.bits() | (1 << P)));
            (*p).ddre.modify(|r, w| w.bits(r.bits() | (1 << P)));
        }
        Self { _mode: PhantomData }
    }
}

impl<const P: u8, MODE: PinMode> Pin<P, MODE> {
    /// Back to a tri-stated input without pull-up.
    pub fn release(self) {
        unsafe {
            let p = PORTE::ptr();
            (*p).ddre.modify(|r, w| w.bits(r.bits() & !(1 << P)));
            (*p).porte.modify(|r, w| w.bits(r.bits() & !(1 << P)));
        }
    }
}

impl<const P: u8> OutputPin for Pin<P, Output> {
    type Error = Infallible;

    #[inline]
    fn set_high(&mut self) -> Result<(), Infallible> {
        unsafe {
            (*PORTE::ptr()).porte.modify(|r, w| w.bits(r.bits() | (1 << P)));
        }
        Ok(())
    }

    #[inline]
    fn set_low(&mut self) -> Result<(), Infallible> {
        unsafe {
            (*PORTE::ptr()).porte.modify(|r, w| w.bits(r.bits() & !(1 << P)));
        }
        Ok(())
    }
}

impl<const P: u8> InputPin for Pin<P, Input> {
    type Error = Infallible;

    #[inline]
    fn is_high(&self) -> Result<bool, Infallible> {
        Ok(unsafe { (*PORTE::ptr()).pine.read().bits() & (1 << P) } != 0)
    }

    #[inline]
    fn is_low(&self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}

/// Serial lines of the radio board: RXD0 / TXD0 pins, bit-banged.
pub mod board {
    use super::*;

    pub type SoftRx = Pin<0, Input>;
    pub type SoftTx = Pin<1, Output>;
}
