//! Header of the PROG_PAGE / READ_PAGE frames

use ufmt::derive::uDebug;

/// Memory selector following the length in page frames.
#[derive(Debug, uDebug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryKind {
    Flash,
    Eeprom,
}

impl MemoryKind {
    pub const EEPROM_TAG: u8 = b'E';
    pub const FLASH_TAG: u8 = b'F';

    /// Only 'E' selects EEPROM. Every other tag is treated as flash.
    pub fn from_tag(tag: u8) -> Self {
        if tag == Self::EEPROM_TAG {
            MemoryKind::Eeprom
        } else {
            MemoryKind::Flash
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Byte count, 1..=256.
    pub length: usize,
    pub kind: MemoryKind,
}

impl PageRequest {
    /// Build from the three header bytes. The length is big endian but only
    /// its low byte counts; a low byte of zero means a full 256 bytes.
    pub fn from_header(_length_high: u8, length_low: u8, tag: u8) -> Self {
        let length = match length_low {
            0 => 256,
            n => n as usize,
        };
        Self {
            length,
            kind: MemoryKind::from_tag(tag),
        }
    }
}
