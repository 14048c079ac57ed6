//! ATmega128 peripherals used by the programmer.
//!
//! Register access only exists on AVR targets; the watchdog period table,
//! the baud rate arithmetic and the bit-banged serial line are generic and
//! build everywhere.

pub mod soft_uart;
pub mod uart;
pub mod watchdog;

#[cfg(target_arch = "avr")]
pub mod eeprom;
#[cfg(target_arch = "avr")]
pub mod gpio;
#[cfg(target_arch = "avr")]
pub mod reset;
#[cfg(target_arch = "avr")]
pub mod spm;
#[cfg(target_arch = "avr")]
pub mod timer;

pub use soft_uart::SoftSerial;
pub use watchdog::WatchdogTimeout;

#[cfg(target_arch = "avr")]
pub use self::{eeprom::Eeprom, spm::Spm, timer::TimerDelay, uart::Usart, watchdog::Watchdog};
