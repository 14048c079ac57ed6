//! Reset cause and the jump into the application

use avr_device::atmega128a::CPU;
use core::arch::asm;

use crate::bootloader::startup::ResetCause;

/// Read and clear MCUCSR so the application sees a clean slate.
pub fn take_reset_cause() -> ResetCause {
    unsafe {
        let p = CPU::ptr();
        let bits = (*p).mcucsr.read().bits();
        (*p).mcucsr.write(|w| w.bits(0));
        ResetCause::from_bits(bits)
    }
}

/// Jump to the application entry at word address `entry`. The caller has
/// already put the watchdog and serial line back into their reset state.
pub fn start_application(entry: u16) -> ! {
    unsafe {
        asm!(
            "out 0x3B, r1", // RAMPZ = 0
            "ijmp",
            in("Z") entry,
            options(noreturn)
        );
    }
}
