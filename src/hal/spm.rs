//! Self-programming (SPM) access to the ATmega128's own flash

use core::arch::asm;

use crate::drivers::{FlashAddress, ProgramMemory};

// SPMCSR lives outside the I/O space on the ATmega128, hence lds/sts.
const SPMCSR: u16 = 0x68;
// RAMPZ as an I/O address for out
const RAMPZ_IO: u8 = 0x3B;

const SPMEN: u8 = 1 << 0;
const PGERS: u8 = 1 << 1;
const PGWRT: u8 = 1 << 2;
const RWWSRE: u8 = 1 << 4;

pub struct Spm {
    _private: (),
}

impl Spm {
    pub fn new() -> Self {
        Self { _private: () }
    }

    #[inline(always)]
    fn set_bank(bank: u8) {
        unsafe {
            asm!("out {rampz}, {bank}", rampz = const RAMPZ_IO, bank = in(reg) bank);
        }
    }

    /// Issue one SPM command; r1:r0 carry the fill word.
    #[inline(always)]
    fn spm(command: u8, address: FlashAddress, word: u16) {
        Self::set_bank(address.bank);
        unsafe {
            asm!(
                "movw r0, {word}",
                "sts {spmcsr}, {command}",
                "spm",
                "clr r1",
                word = in(reg_pair) word,
                command = in(reg) command,
                spmcsr = const SPMCSR,
                in("Z") address.offset,
            );
        }
    }
}

impl Default for Spm {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramMemory for Spm {
    fn erase_page(&mut self, page: FlashAddress) {
        Self::spm(PGERS | SPMEN, page, 0);
    }

    fn fill_word(&mut self, address: FlashAddress, word: u16) {
        Self::spm(SPMEN, address, word);
    }

    fn write_page(&mut self, page: FlashAddress) {
        Self::spm(PGWRT | SPMEN, page, 0);
    }

    fn is_busy(&mut self) -> bool {
        let status: u8;
        unsafe {
            asm!("lds {status}, {spmcsr}", status = out(reg) status, spmcsr = const SPMCSR);
        }
        status & SPMEN != 0
    }

    fn enable_rww(&mut self) {
        Self::spm(RWWSRE | SPMEN, FlashAddress::default(), 0);
    }

    fn read_byte(&mut self, address: FlashAddress) -> u8 {
        let byte: u8;
        Self::set_bank(address.bank);
        unsafe {
            asm!("elpm {byte}, Z", byte = out(reg) byte, in("Z") address.offset);
        }
        byte
    }
}
