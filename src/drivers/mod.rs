pub mod eeprom;
pub mod flash;

pub use eeprom::ByteStore;
pub use flash::{FlashAddress, ProgramMemory};
