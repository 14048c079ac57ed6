//! Virtual boot partition: reset vector redirection for parts without a
//! fused boot section.
//!
//! Writing page 0 would hand the reset vector to the application and lock the
//! programmer out. Instead the application's reset instruction moves to the
//! secondary slot and the reset vector jumps to the programmer, which later
//! starts the application through the secondary slot. Reads of page 0 put
//! the original bytes back so the host's verify pass sees its own image.

use super::page::{PageBuffer, SECONDARY_SLOT};

const RJMP: u16 = 0xC000;
const OPCODE_MASK: u16 = 0xF000;
const OFFSET_MASK: u16 = 0x0FFF;

/// Words between the reset vector and the secondary slot.
pub const SLOT_DISTANCE: u16 = (SECONDARY_SLOT / 2) as u16;

/// `rjmp` placed at word `from` that lands on word `to`.
pub const fn rjmp(from: u16, to: u16) -> u16 {
    RJMP | (to.wrapping_sub(from).wrapping_sub(1) & OFFSET_MASK)
}

/// Re-target a relative jump after moving it `words` further from its
/// destination. The offset wraps in 12 bits like the CPU's. Anything that is
/// not an `rjmp` does not depend on its location and is kept as is.
pub const fn rebias(instruction: u16, words: u16) -> u16 {
    if instruction & OPCODE_MASK == RJMP {
        RJMP | (instruction.wrapping_sub(words) & OFFSET_MASK)
    } else {
        instruction
    }
}

/// Page 0 vector bytes as the host sent them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorShadow {
    pub reset: u16,
    pub secondary: u16,
}

impl VectorShadow {
    /// Patch `page` (page 0) to boot into the programmer at `boot_start`.
    pub fn install(page: &mut PageBuffer, boot_start: u32) -> Self {
        let shadow = Self {
            reset: page.reset_vector(),
            secondary: page.secondary_vector(),
        };
        page.set_secondary_vector(rebias(shadow.reset, SLOT_DISTANCE));
        page.set_reset_vector(rjmp(0, (boot_start / 2) as u16));
        shadow
    }

    /// Undo `install` on a page held in memory.
    pub fn uninstall(&self, page: &mut PageBuffer) {
        page.set_reset_vector(self.reset);
        page.set_secondary_vector(self.secondary);
    }

    /// Original byte for one of the four patched page 0 offsets.
    pub fn byte_at(&self, offset: u16) -> Option<u8> {
        let [reset_lo, reset_hi] = self.reset.to_le_bytes();
        let [secondary_lo, secondary_hi] = self.secondary.to_le_bytes();
        match offset {
            0 => Some(reset_lo),
            1 => Some(reset_hi),
            8 => Some(secondary_lo),
            9 => Some(secondary_hi),
            _ => None,
        }
    }
}
