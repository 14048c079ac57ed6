//! Static descriptions of the parts the programmer can drive.

use crate::bootloader::page::MAX_PAGE_SIZE;

/// Flash and EEPROM geometry plus the fixed identity of one part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Device {
    pub name: &'static str,
    /// Returned verbatim by READ_SIGNATURE.
    pub signature: [u8; 3],
    pub flash_size: u32,
    /// SPM page size in bytes.
    pub page_size: usize,
    pub eeprom_size: u16,
    /// First byte address of the no-read-while-write section. Pages below it
    /// can be erased while the programmer keeps running from NRWW flash.
    pub nrww_start: u32,
    /// First byte address occupied by the programmer image.
    pub boot_start: u32,
    /// Flash beyond 64K, reached through RAMPZ and ELPM.
    pub extended: bool,
    /// The part has a fused boot section that the reset vector can point at.
    /// Parts without one need the reset vector redirected in software.
    pub hardware_boot: bool,
    /// The RWW section stays unreadable after SPM until RWWSRE is issued.
    pub rww_reenable: bool,
}

impl Device {
    pub const fn words_per_page(&self) -> usize {
        self.page_size / 2
    }

    /// Start of the page holding `linear`.
    pub const fn page_base(&self, linear: u32) -> u32 {
        linear & !(self.page_size as u32 - 1)
    }

    pub const fn is_read_while_write(&self, linear: u32) -> bool {
        linear < self.nrww_start
    }

    pub const fn is_programmer_image(&self, linear: u32) -> bool {
        linear >= self.boot_start
    }
}

pub const ATMEGA128: Device = Device {
    name: "ATmega128",
    signature: [0x1E, 0x97, 0x02],
    flash_size: 0x2_0000,
    page_size: 256,
    eeprom_size: 4096,
    nrww_start: 0x1_E000,
    boot_start: 0x1_FD00,
    extended: true,
    hardware_boot: true,
    rww_reenable: true,
};

pub const ATMEGA1284P: Device = Device {
    name: "ATmega1284P",
    signature: [0x1E, 0x97, 0x05],
    flash_size: 0x2_0000,
    page_size: 256,
    eeprom_size: 4096,
    nrww_start: 0x1_E000,
    boot_start: 0x1_FC00,
    extended: true,
    hardware_boot: true,
    rww_reenable: true,
};

pub const ATMEGA328P: Device = Device {
    name: "ATmega328P",
    signature: [0x1E, 0x95, 0x0F],
    flash_size: 0x8000,
    page_size: 128,
    eeprom_size: 1024,
    nrww_start: 0x7000,
    boot_start: 0x7E00,
    extended: false,
    hardware_boot: true,
    rww_reenable: true,
};

pub const ATMEGA168: Device = Device {
    name: "ATmega168",
    signature: [0x1E, 0x94, 0x06],
    flash_size: 0x4000,
    page_size: 128,
    eeprom_size: 512,
    nrww_start: 0x3800,
    boot_start: 0x3E00,
    extended: false,
    hardware_boot: true,
    rww_reenable: true,
};

/// No boot section and no RWW split: every page is NRWW.
pub const ATTINY84: Device = Device {
    name: "ATtiny84",
    signature: [0x1E, 0x93, 0x0C],
    flash_size: 0x2000,
    page_size: 64,
    eeprom_size: 512,
    nrww_start: 0,
    boot_start: 0x1D00,
    extended: false,
    hardware_boot: false,
    rww_reenable: false,
};

pub const DEVICES: [Device; 5] = [ATMEGA128, ATMEGA1284P, ATMEGA328P, ATMEGA168, ATTINY84];

const _: () = {
    let mut i = 0;
    while i < DEVICES.len() {
        let device = DEVICES[i];
        assert!(device.page_size <= MAX_PAGE_SIZE);
        assert!(device.page_size.is_power_of_two());
        assert!(device.eeprom_size.is_power_of_two());
        assert!(device.nrww_start <= device.boot_start);
        assert!(device.boot_start < device.flash_size);
        i += 1;
    }
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_base_masks_offset_within_page() {
        assert_eq!(ATMEGA328P.page_base(0x0000), 0x0000);
        assert_eq!(ATMEGA328P.page_base(0x00FF), 0x0080);
        assert_eq!(ATMEGA128.page_base(0x1_E0FF), 0x1_E000);
        assert_eq!(ATTINY84.page_base(0x0047), 0x0040);
    }

    #[test]
    fn tiny_parts_have_no_read_while_write_section() {
        assert!(!ATTINY84.is_read_while_write(0));
        assert!(ATTINY84.is_programmer_image(0x1D00));
        assert!(!ATTINY84.is_programmer_image(0x1CFF));
    }
}
