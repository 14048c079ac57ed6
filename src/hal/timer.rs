//! Microsecond delays from Timer0, for the software serial bit timing

use avr_device::atmega128a::TC0;
use embedded_hal::blocking::delay::DelayUs;

use crate::config::CPU_FREQ_HZ;

// clk/8: 2 ticks per microsecond at 16 MHz
const PRESCALER_DIV8: u8 = 2;
const TICKS_PER_US: u32 = CPU_FREQ_HZ / 8 / 1_000_000;
// Longest wait that still fits the 8-bit counter
const MAX_CHUNK_US: u16 = (250 / TICKS_PER_US) as u16;

const _: () = assert!(TICKS_PER_US >= 1, "timer delay needs F_CPU >= 8 MHz");

pub struct TimerDelay {
    _private: (),
}

impl TimerDelay {
    pub fn new() -> Self {
        unsafe {
            let p = TC0::ptr();
            // Normal mode, free running
            (*p).tccr0.write(|w| w.bits(PRESCALER_DIV8));
        }
        Self { _private: () }
    }

    pub fn stop(self) {
        unsafe {
            (*TC0::ptr()).tccr0.write(|w| w.bits(0));
        }
    }

    fn wait_ticks(ticks: u8) {
        unsafe {
            let p = TC0::ptr();
            (*p).tcnt0.write(|w| w.bits(0));
            while (*p).tcnt0.read().bits() < ticks {}
        }
    }
}

impl Default for TimerDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayUs<u16> for TimerDelay {
    fn delay_us(&mut self, us: u16) {
        let mut remaining = us;
        while remaining > 0 {
            let chunk = remaining.min(MAX_CHUNK_US);
            Self::wait_ticks((chunk as u32 * TICKS_PER_US) as u8);
            remaining -= chunk;
        }
    }
}
