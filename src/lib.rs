//! STK500v1 bootloader core for AVR parts.
//!
//! The crate is split the same way the firmware is wired: `hal` talks to the
//! ATmega128 registers, `drivers` describes the memories the programmer
//! writes, `protocol` frames bytes on the serial line and `bootloader` holds
//! the programmer itself. Only the register-level parts of `hal` are tied to
//! the AVR target, so the protocol and the programming pipeline are tested on
//! the host against the simulation doubles in `testing`.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]

pub mod bootloader;
pub mod config;
pub mod device;
pub mod drivers;
pub mod hal;
pub mod logger;
pub mod protocol;
pub mod testing;

pub use bootloader::{Fault, Programmer};
pub use config::Config;
pub use device::Device;
