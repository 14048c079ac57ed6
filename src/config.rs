//! Configuration constants and the per-build programmer configuration

use crate::device::Device;
use crate::hal::watchdog::WatchdogTimeout;

/// CPU frequency in Hz, supplied by the build script
pub const CPU_FREQ_HZ: u32 = parse_hz(env!("MCU_FREQ_HZ"));

/// UART baud rate
pub const UART_BAUD: u32 = 115_200;

/// Watchdog period while the programmer is waiting for the host
pub const WDT_TIMEOUT: WatchdogTimeout = WatchdogTimeout::Ms1000;

/// Reported through GET_PARAMETER 0x81 / 0x82
pub const VERSION: Version = Version { major: 4, minor: 5 };

/// Reply to every GET_PARAMETER id we do not track. Enough to keep avrdude happy.
pub const GENERIC_PARAMETER: u8 = 0x03;

const fn parse_hz(digits: &str) -> u32 {
    let bytes = digits.as_bytes();
    assert!(!bytes.is_empty(), "MCU_FREQ_HZ is empty");
    let mut value = 0u32;
    let mut i = 0;
    while i < bytes.len() {
        assert!(bytes[i].is_ascii_digit(), "MCU_FREQ_HZ is not a number");
        value = value * 10 + (bytes[i] - b'0') as u32;
        i += 1;
    }
    value
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

/// Everything the programmer needs to know about the part it runs on.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub device: Device,
    pub version: Version,
    pub generic_parameter: u8,
    /// Patch the reset vector of every page 0 write so the programmer keeps
    /// running first after reset.
    pub redirect: bool,
}

impl Config {
    /// Redirection defaults on for parts without a fused boot section.
    pub const fn new(device: Device) -> Self {
        Self {
            device,
            version: VERSION,
            generic_parameter: GENERIC_PARAMETER,
            redirect: !device.hardware_boot,
        }
    }

    pub const fn with_redirect(self, redirect: bool) -> Self {
        Self { redirect, ..self }
    }

    pub const fn with_version(self, major: u8, minor: u8) -> Self {
        Self {
            version: Version { major, minor },
            ..self
        }
    }

    /// Value returned for a GET_PARAMETER request.
    pub fn parameter(&self, id: u8) -> u8 {
        match id {
            crate::protocol::PARAM_SW_MAJOR => self.version.major,
            crate::protocol::PARAM_SW_MINOR => self.version.minor,
            _ => self.generic_parameter,
        }
    }
}
