//! The programmer: STK500v1 command dispatch over one owned session
//!
//! `Programmer` owns the transport, watchdog, both memories, the page buffer,
//! the address cursor and the vector shadow. `step` runs one command and
//! reports the out-of-sync fault instead of hanging, which is what the tests
//! drive; `run` is the firmware loop and never returns.

pub mod eeprom;
pub mod flash;
pub mod page;
pub mod startup;
pub mod vector;

use embedded_hal::serial;
use embedded_hal::watchdog::Watchdog;
use ufmt::uWrite;

use crate::config::Config;
use crate::drivers::{ByteStore, FlashAddress, ProgramMemory};
use crate::logger::{NoTrace, Trace};
use crate::protocol::{
    Command, Link, MemoryKind, PageRequest, SET_DEVICE_EXT_LEN, SET_DEVICE_LEN, STK_OK,
    UNIVERSAL_LEN, UNIVERSAL_REPLY,
};

pub use crate::protocol::transport::Fault;
pub use page::PageBuffer;
pub use vector::VectorShadow;

pub struct Programmer<S, W, F, E, L = NoTrace> {
    link: Link<S, W>,
    flash: F,
    eeprom: E,
    config: Config,
    page: PageBuffer,
    address: FlashAddress,
    shadow: Option<VectorShadow>,
    fault: Option<Fault>,
    trace: Trace<L>,
}

impl<S, W, F, E> Programmer<S, W, F, E>
where
    S: serial::Read<u8> + serial::Write<u8>,
    W: Watchdog,
    F: ProgramMemory,
    E: ByteStore,
{
    pub fn new(config: Config, serial: S, watchdog: W, flash: F, eeprom: E) -> Self {
        Self {
            link: Link::new(serial, watchdog),
            flash,
            eeprom,
            page: PageBuffer::new(config.device.page_size),
            config,
            address: FlashAddress::default(),
            shadow: None,
            fault: None,
            trace: Trace::new(NoTrace),
        }
    }
}

impl<S, W, F, E, L> Programmer<S, W, F, E, L>
where
    S: serial::Read<u8> + serial::Write<u8>,
    W: Watchdog,
    F: ProgramMemory,
    E: ByteStore,
    L: uWrite,
{
    /// Send trace events to `sink`. Never the programming line.
    pub fn with_trace<T: uWrite>(self, sink: T) -> Programmer<S, W, F, E, T> {
        let mut trace = Trace::new(sink);
        trace.banner(&self.config);
        Programmer {
            link: self.link,
            flash: self.flash,
            eeprom: self.eeprom,
            config: self.config,
            page: self.page,
            address: self.address,
            shadow: self.shadow,
            fault: self.fault,
            trace,
        }
    }

    /// Serve commands until the watchdog resets the part.
    pub fn run(&mut self) -> ! {
        loop {
            if self.step().is_err() {
                self.link.stall();
            }
        }
    }

    /// Serve one command.
    ///
    /// After a framing fault the programmer is dead: every later call returns
    /// the same fault without touching the line.
    pub fn step(&mut self) -> Result<(), Fault> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }

        let opcode = self.link.getch();
        let command = Command::decode(opcode);
        self.trace.command(command);

        match self.execute(command) {
            Ok(()) => {
                self.link.putch(STK_OK);
                Ok(())
            }
            Err(fault) => {
                self.trace.fault(fault);
                self.fault = Some(fault);
                Err(fault)
            }
        }
    }

    fn execute(&mut self, command: Command) -> Result<(), Fault> {
        match command {
            Command::GetParameter => {
                let id = self.link.getch();
                self.link.verify_space()?;
                self.link.putch(self.config.parameter(id));
            }
            Command::SetDevice => self.link.skip(SET_DEVICE_LEN)?,
            Command::SetDeviceExt => self.link.skip(SET_DEVICE_EXT_LEN)?,
            Command::LoadAddress => {
                let low = self.link.getch();
                let high = self.link.getch();
                let word = u16::from_le_bytes([low, high]);
                self.address = FlashAddress::from_word(word, self.config.device.extended);
                self.trace.address(self.address);
                self.link.verify_space()?;
            }
            Command::Universal => {
                self.link.skip(UNIVERSAL_LEN)?;
                self.link.putch(UNIVERSAL_REPLY);
            }
            Command::ProgPage => {
                let request = self.page_request();
                match request.kind {
                    MemoryKind::Flash => self.program_flash(request.length)?,
                    MemoryKind::Eeprom => self.program_eeprom(request.length)?,
                }
            }
            Command::ReadPage => {
                let request = self.page_request();
                match request.kind {
                    MemoryKind::Flash => self.read_flash(request.length)?,
                    MemoryKind::Eeprom => self.read_eeprom(request.length)?,
                }
            }
            Command::ReadSignature => {
                self.link.verify_space()?;
                for byte in self.config.device.signature {
                    self.link.putch(byte);
                }
            }
            Command::LeaveProgramMode | Command::Other(_) => self.link.verify_space()?,
        }
        Ok(())
    }

    fn page_request(&mut self) -> PageRequest {
        let length_high = self.link.getch();
        let length_low = self.link.getch();
        let tag = self.link.getch();
        PageRequest::from_header(length_high, length_low, tag)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Session address cursor.
    pub fn address(&self) -> FlashAddress {
        self.address
    }

    pub fn shadow(&self) -> Option<VectorShadow> {
        self.shadow
    }

    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    pub fn eeprom(&self) -> &E {
        &self.eeprom
    }

    pub fn watchdog(&self) -> &W {
        self.link.watchdog()
    }

    pub fn trace_sink(&self) -> &L {
        self.trace.sink()
    }

    /// Hand the hardware back, e.g. to shut it down before starting the
    /// application.
    pub fn release(self) -> (S, W, F, E) {
        let (serial, watchdog) = self.link.release();
        (serial, watchdog, self.flash, self.eeprom)
    }
}
