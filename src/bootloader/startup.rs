//! What happens between reset and the first protocol byte, and the way out
//! to the application.

use crate::config::Config;
use crate::drivers::{FlashAddress, ProgramMemory};

use super::page::SECONDARY_SLOT;

/// MCUCSR / MCUSR reset flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResetCause(u8);

impl ResetCause {
    pub const POWER_ON: u8 = 1 << 0;
    pub const EXTERNAL: u8 = 1 << 1;
    pub const BROWN_OUT: u8 = 1 << 2;
    pub const WATCHDOG: u8 = 1 << 3;
    pub const JTAG: u8 = 1 << 4;

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_external(self) -> bool {
        self.0 & Self::EXTERNAL != 0
    }

    pub const fn is_watchdog(self) -> bool {
        self.0 & Self::WATCHDOG != 0
    }

    pub const fn is_power_on(self) -> bool {
        self.0 & Self::POWER_ON != 0
    }
}

/// Only a reset button press (or the host toggling DTR into RESET) starts
/// the programmer. Power-on, brown-out and watchdog resets go straight to the
/// application; the watchdog case is how a desynchronised session ends.
pub const fn should_enter_programmer(cause: ResetCause) -> bool {
    cause.is_external()
}

/// Word address the application is entered at, or `None` if that flash word
/// is still erased.
///
/// With redirection the reset vector belongs to the programmer and the
/// application entry sits in the secondary slot.
pub fn application_entry<F: ProgramMemory>(config: &Config, flash: &mut F) -> Option<u16> {
    let entry = if config.redirect {
        (SECONDARY_SLOT / 2) as u16
    } else {
        0
    };
    let address = FlashAddress::new(entry * 2, 0);
    let low = flash.read_byte(address);
    let high = flash.read_byte(FlashAddress::new(address.offset + 1, 0));
    if u16::from_le_bytes([low, high]) == 0xFFFF {
        None
    } else {
        Some(entry)
    }
}
