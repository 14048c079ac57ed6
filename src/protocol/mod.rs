//! STK500v1 wire protocol, the subset avrdude's `arduino` programmer uses

pub mod packet;
pub mod transport;

use ufmt::derive::uDebug;

pub use packet::{MemoryKind, PageRequest};
pub use transport::Link;

pub const STK_OK: u8 = 0x10;
pub const STK_INSYNC: u8 = 0x14;
/// Frame terminator that must close every command.
pub const CRC_EOP: u8 = 0x20;

pub const STK_GET_PARAMETER: u8 = 0x41;
pub const STK_SET_DEVICE: u8 = 0x42;
pub const STK_SET_DEVICE_EXT: u8 = 0x45;
pub const STK_ENTER_PROGMODE: u8 = 0x50;
pub const STK_LEAVE_PROGMODE: u8 = 0x51;
pub const STK_LOAD_ADDRESS: u8 = 0x55;
pub const STK_UNIVERSAL: u8 = 0x56;
pub const STK_PROG_PAGE: u8 = 0x64;
pub const STK_READ_PAGE: u8 = 0x74;
pub const STK_READ_SIGN: u8 = 0x75;

pub const PARAM_SW_MAJOR: u8 = 0x81;
pub const PARAM_SW_MINOR: u8 = 0x82;

pub const SET_DEVICE_LEN: u8 = 20;
pub const SET_DEVICE_EXT_LEN: u8 = 5;
pub const UNIVERSAL_LEN: u8 = 4;

/// Reply byte for UNIVERSAL; the command itself is never executed.
pub const UNIVERSAL_REPLY: u8 = 0x00;

#[derive(Debug, uDebug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    GetParameter,
    SetDevice,
    SetDeviceExt,
    LoadAddress,
    Universal,
    ProgPage,
    ReadPage,
    ReadSignature,
    LeaveProgramMode,
    /// Anything else, STK_ENTER_PROGMODE included. Answered with the bare
    /// handshake so probing hosts stay in sync.
    Other(u8),
}

impl Command {
    pub fn decode(opcode: u8) -> Self {
        match opcode {
            STK_GET_PARAMETER => Command::GetParameter,
            STK_SET_DEVICE => Command::SetDevice,
            STK_SET_DEVICE_EXT => Command::SetDeviceExt,
            STK_LOAD_ADDRESS => Command::LoadAddress,
            STK_UNIVERSAL => Command::Universal,
            STK_PROG_PAGE => Command::ProgPage,
            STK_READ_PAGE => Command::ReadPage,
            STK_READ_SIGN => Command::ReadSignature,
            STK_LEAVE_PROGMODE => Command::LeaveProgramMode,
            other => Command::Other(other),
        }
    }
}
