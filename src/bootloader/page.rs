//! The single page buffer shared by every programming command

pub const MAX_PAGE_SIZE: usize = 256;

/// Byte offset of the reset vector in page 0.
pub const RESET_SLOT: usize = 0;
/// Byte offset of the vector that carries the application entry once the
/// reset vector points at the programmer (the watchdog vector on tinyAVR).
pub const SECONDARY_SLOT: usize = 8;

/// One page of staging memory. Holds up to `MAX_PAGE_SIZE` received bytes;
/// `size` of them form the page committed to flash. Contents carry over
/// from whatever command used the buffer last.
pub struct PageBuffer {
    data: [u8; MAX_PAGE_SIZE],
    size: usize,
}

impl PageBuffer {
    pub const fn new(size: usize) -> Self {
        assert!(size <= MAX_PAGE_SIZE && size >= SECONDARY_SLOT + 2);
        Self {
            data: [0xFF; MAX_PAGE_SIZE],
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// The first `length` bytes, for payloads that are not page sized.
    pub fn head(&self, length: usize) -> &[u8] {
        &self.data[..length]
    }

    pub fn head_mut(&mut self, length: usize) -> &mut [u8] {
        &mut self.data[..length]
    }

    pub fn page(&self) -> &[u8] {
        &self.data[..self.size]
    }

    /// Little-endian words of the page, in SPM fill order.
    pub fn words(&self) -> impl Iterator<Item = u16> + '_ {
        self.page()
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
    }

    pub fn reset_vector(&self) -> u16 {
        self.slot(RESET_SLOT)
    }

    pub fn set_reset_vector(&mut self, instruction: u16) {
        self.set_slot(RESET_SLOT, instruction)
    }

    pub fn secondary_vector(&self) -> u16 {
        self.slot(SECONDARY_SLOT)
    }

    pub fn set_secondary_vector(&mut self, instruction: u16) {
        self.set_slot(SECONDARY_SLOT, instruction)
    }

    fn slot(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.data[offset], self.data[offset + 1]])
    }

    fn set_slot(&mut self, offset: usize, instruction: u16) {
        self.data[offset..offset + 2].copy_from_slice(&instruction.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_slots_are_little_endian() {
        let mut page = PageBuffer::new(64);
        page.head_mut(10)
            .copy_from_slice(&[0x11, 0x22, 0, 0, 0, 0, 0, 0, 0x33, 0x44]);

        assert_eq!(page.reset_vector(), 0x2211);
        assert_eq!(page.secondary_vector(), 0x4433);

        page.set_secondary_vector(0xC0DE);
        assert_eq!(&page.page()[8..10], &[0xDE, 0xC0]);
    }

    #[test]
    fn words_cover_exactly_one_page() {
        let mut page = PageBuffer::new(64);
        for (i, byte) in page.head_mut(MAX_PAGE_SIZE).iter_mut().enumerate() {
            *byte = i as u8;
        }

        let words: Vec<u16> = page.words().collect();
        assert_eq!(words.len(), 32);
        assert_eq!(words[0], 0x0100);
        assert_eq!(words[31], 0x3F3E);
    }
}
