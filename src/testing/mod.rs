//! Simulated hardware for exercising the programmer off target
//!
//! Every double models the behaviour the programmer relies on rather than the
//! registers: flash keeps NOR semantics (erase sets bits, writes only clear
//! them), SPM operations stay busy until polled and locked RWW reads are
//! flagged. Misuse is counted instead of panicking so tests can assert on it.

use core::convert::Infallible;

use embedded_hal::watchdog::{Watchdog, WatchdogEnable};
use ufmt::uWrite;

use crate::bootloader::page::MAX_PAGE_SIZE;
use crate::device::Device;
use crate::drivers::{ByteStore, FlashAddress, ProgramMemory};
use crate::hal::watchdog::WatchdogTimeout;

/// `SIZE` bytes of self-programmable flash laid out like `device`.
pub struct SimFlash<const SIZE: usize> {
    memory: [u8; SIZE],
    latch: [u16; MAX_PAGE_SIZE / 2],
    device: Device,
    busy: bool,
    rww_locked: bool,
    erases: u32,
    writes: u32,
    violations: u32,
}

impl<const SIZE: usize> SimFlash<SIZE> {
    pub fn new(device: Device) -> Self {
        Self {
            memory: [0xFF; SIZE],
            latch: [0xFFFF; MAX_PAGE_SIZE / 2],
            device,
            busy: false,
            rww_locked: false,
            erases: 0,
            writes: 0,
            violations: 0,
        }
    }

    /// Preload contents without counting as programming.
    pub fn load(&mut self, linear: u32, bytes: &[u8]) {
        let start = linear as usize;
        self.memory[start..start + bytes.len()].copy_from_slice(bytes);
    }

    pub fn contents(&self) -> &[u8] {
        &self.memory
    }

    pub fn bytes(&self, linear: u32, length: usize) -> &[u8] {
        let start = linear as usize;
        &self.memory[start..start + length]
    }

    pub fn erases(&self) -> u32 {
        self.erases
    }

    pub fn writes(&self) -> u32 {
        self.writes
    }

    /// SPM issued while busy, out-of-range pages, or RWW reads while locked.
    pub fn violations(&self) -> u32 {
        self.violations
    }

    pub fn is_rww_locked(&self) -> bool {
        self.rww_locked
    }

    fn page_range(&mut self, page: FlashAddress) -> Option<core::ops::Range<usize>> {
        let base = self.device.page_base(page.linear()) as usize;
        if base + self.device.page_size > SIZE {
            self.violations += 1;
            return None;
        }
        Some(base..base + self.device.page_size)
    }

    fn start_spm(&mut self, page: FlashAddress) {
        if self.busy {
            self.violations += 1;
        }
        self.busy = true;
        if self.device.is_read_while_write(page.linear()) {
            self.rww_locked = true;
        }
    }
}

impl<const SIZE: usize> ProgramMemory for SimFlash<SIZE> {
    fn erase_page(&mut self, page: FlashAddress) {
        self.start_spm(page);
        if let Some(range) = self.page_range(page) {
            self.memory[range].fill(0xFF);
            self.erases += 1;
        }
    }

    fn fill_word(&mut self, address: FlashAddress, word: u16) {
        if self.busy {
            self.violations += 1;
        }
        let index = (address.offset as usize % self.device.page_size) / 2;
        self.latch[index] = word;
    }

    fn write_page(&mut self, page: FlashAddress) {
        self.start_spm(page);
        if let Some(range) = self.page_range(page) {
            let words = self.device.words_per_page();
            for (i, word) in self.latch[..words].iter().enumerate() {
                let [low, high] = word.to_le_bytes();
                self.memory[range.start + 2 * i] &= low;
                self.memory[range.start + 2 * i + 1] &= high;
            }
            self.writes += 1;
        }
        self.latch = [0xFFFF; MAX_PAGE_SIZE / 2];
    }

    /// Every operation completes by the first poll.
    fn is_busy(&mut self) -> bool {
        let busy = self.busy;
        self.busy = false;
        busy
    }

    fn enable_rww(&mut self) {
        if self.busy {
            self.violations += 1;
        }
        self.rww_locked = false;
    }

    fn read_byte(&mut self, address: FlashAddress) -> u8 {
        let linear = address.linear();
        if self.rww_locked && self.device.is_read_while_write(linear) {
            self.violations += 1;
            return 0xFF;
        }
        self.memory.get(linear as usize).copied().unwrap_or(0xFF)
    }
}

/// `SIZE` bytes of EEPROM that counts physical writes.
pub struct SimEeprom<const SIZE: usize> {
    memory: [u8; SIZE],
    writes: u32,
}

impl<const SIZE: usize> SimEeprom<SIZE> {
    pub fn new() -> Self {
        Self {
            memory: [0xFF; SIZE],
            writes: 0,
        }
    }

    pub fn load(&mut self, address: u16, bytes: &[u8]) {
        let start = address as usize;
        self.memory[start..start + bytes.len()].copy_from_slice(bytes);
    }

    pub fn contents(&self) -> &[u8] {
        &self.memory
    }

    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl<const SIZE: usize> Default for SimEeprom<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SIZE: usize> ByteStore for SimEeprom<SIZE> {
    fn read(&mut self, address: u16) -> u8 {
        self.memory[address as usize % SIZE]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.memory[address as usize % SIZE] = value;
        self.writes += 1;
    }
}

/// Watchdog that only counts.
#[derive(Debug, Default)]
pub struct SimWatchdog {
    feeds: u32,
    period: Option<WatchdogTimeout>,
}

impl SimWatchdog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feeds(&self) -> u32 {
        self.feeds
    }

    pub fn period(&self) -> Option<WatchdogTimeout> {
        self.period
    }
}

impl Watchdog for SimWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
    }
}

impl WatchdogEnable for SimWatchdog {
    type Time = WatchdogTimeout;

    fn start<T>(&mut self, period: T)
    where
        T: Into<Self::Time>,
    {
        self.period = Some(period.into());
    }
}

/// Fixed-size trace sink that keeps the first 1 KiB of output.
pub struct TraceBuffer {
    data: [u8; 1024],
    len: usize,
}

impl TraceBuffer {
    pub fn new() -> Self {
        Self {
            data: [0; 1024],
            len: 0,
        }
    }

    pub fn as_str(&self) -> &str {
        // Only whole `&str`s are ever appended.
        core::str::from_utf8(&self.data[..self.len]).unwrap_or("")
    }
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl uWrite for TraceBuffer {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        let bytes = s.as_bytes();
        if self.len + bytes.len() <= self.data.len() {
            self.data[self.len..self.len + bytes.len()].copy_from_slice(bytes);
            self.len += bytes.len();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{ATMEGA328P, ATTINY84};

    #[test]
    fn write_without_erase_only_clears_bits() {
        let mut flash = SimFlash::<0x8000>::new(ATMEGA328P);
        flash.load(0x100, &[0x0F]);

        flash.fill_word(FlashAddress::new(0x100, 0), 0xFFF0);
        flash.write_page(FlashAddress::new(0x100, 0));
        flash.wait_ready();

        assert_eq!(flash.bytes(0x100, 2), &[0x00, 0xFF]);
    }

    #[test]
    fn overlapping_spm_is_a_violation() {
        let mut flash = SimFlash::<0x2000>::new(ATTINY84);
        flash.erase_page(FlashAddress::new(0x40, 0));
        flash.fill_word(FlashAddress::new(0x40, 0), 0x1234);
        assert_eq!(flash.violations(), 1);
    }

    #[test]
    fn rww_reads_need_reenable() {
        let mut flash = SimFlash::<0x8000>::new(ATMEGA328P);
        flash.erase_page(FlashAddress::new(0, 0));
        flash.wait_ready();
        assert!(flash.is_rww_locked());

        // NRWW stays readable
        assert_eq!(flash.read_byte(FlashAddress::new(0x7000, 0)), 0xFF);
        assert_eq!(flash.violations(), 0);

        flash.read_byte(FlashAddress::new(0, 0));
        assert_eq!(flash.violations(), 1);

        flash.enable_rww();
        flash.read_byte(FlashAddress::new(0, 0));
        assert_eq!(flash.violations(), 1);
    }
}
