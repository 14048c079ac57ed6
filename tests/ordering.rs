//! When the erase is issued relative to the payload bytes on the line

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::serial;

use stkboot::device::{ATMEGA128, ATMEGA328P};
use stkboot::drivers::{FlashAddress, ProgramMemory};
use stkboot::protocol::CRC_EOP;
use stkboot::testing::{SimEeprom, SimWatchdog};
use stkboot::{Config, Device, Programmer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Rx(u8),
    Tx(u8),
    Erase(u32),
    Write(u32),
}

type Log = Rc<RefCell<Vec<Event>>>;

struct ScriptedLine {
    input: VecDeque<u8>,
    log: Log,
}

impl serial::Read<u8> for ScriptedLine {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        let byte = self.input.pop_front().ok_or(nb::Error::WouldBlock)?;
        self.log.borrow_mut().push(Event::Rx(byte));
        Ok(byte)
    }
}

impl serial::Write<u8> for ScriptedLine {
    type Error = Infallible;

    fn write(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        self.log.borrow_mut().push(Event::Tx(byte));
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Infallible> {
        Ok(())
    }
}

struct RecordingFlash {
    log: Log,
}

impl ProgramMemory for RecordingFlash {
    fn erase_page(&mut self, page: FlashAddress) {
        self.log.borrow_mut().push(Event::Erase(page.linear()));
    }

    fn fill_word(&mut self, _address: FlashAddress, _word: u16) {}

    fn write_page(&mut self, page: FlashAddress) {
        self.log.borrow_mut().push(Event::Write(page.linear()));
    }

    fn is_busy(&mut self) -> bool {
        false
    }

    fn enable_rww(&mut self) {}

    fn read_byte(&mut self, _address: FlashAddress) -> u8 {
        0xFF
    }
}

/// Run LOAD_ADDRESS + PROG_PAGE and return the events of the PROG_PAGE.
fn program_page(device: Device, word: u16) -> Vec<Event> {
    let log = Log::default();
    let [low, high] = word.to_le_bytes();
    let mut input = vec![0x55, low, high, CRC_EOP];
    input.extend_from_slice(&[0x64, (device.page_size >> 8) as u8, device.page_size as u8, b'F']);
    input.extend((0..device.page_size).map(|i| i as u8));
    input.push(CRC_EOP);

    let line = ScriptedLine {
        input: input.into(),
        log: log.clone(),
    };
    let flash = RecordingFlash { log: log.clone() };
    let mut programmer = Programmer::new(
        Config::new(device),
        line,
        SimWatchdog::new(),
        flash,
        SimEeprom::<16>::new(),
    );

    assert_eq!(programmer.step(), Ok(()));
    log.borrow_mut().clear();
    assert_eq!(programmer.step(), Ok(()));

    let events = log.borrow().clone();
    events
}

fn received_before(events: &[Event], target: Event) -> usize {
    events
        .iter()
        .take_while(|event| **event != target)
        .filter(|event| matches!(event, Event::Rx(_)))
        .count()
}

#[test]
fn read_while_write_page_erases_before_payload() {
    let events = program_page(ATMEGA328P, 0x40);

    // Opcode plus the three header bytes, then straight to erasing
    assert_eq!(received_before(&events, Event::Erase(0x80)), 4);
    assert_eq!(events[4], Event::Erase(0x80));
    assert!(events.ends_with(&[Event::Tx(0x14), Event::Write(0x80), Event::Tx(0x10)]));
}

#[test]
fn no_read_while_write_page_erases_after_payload() {
    let events = program_page(ATMEGA328P, 0x3800);

    assert_eq!(received_before(&events, Event::Erase(0x7000)), 4 + 128);
    let erase = events.iter().position(|e| *e == Event::Erase(0x7000));
    assert_eq!(erase, Some(4 + 128));
    // Terminator still follows the erase
    assert_eq!(events[4 + 128 + 1], Event::Rx(CRC_EOP));
}

#[test]
fn full_length_page_in_upper_bank() {
    // 256-byte pages wrap the length low byte to zero
    let events = program_page(ATMEGA128, 0xF000);

    assert_eq!(received_before(&events, Event::Erase(0x1_E000)), 4 + 256);
    assert!(events.contains(&Event::Write(0x1_E000)));
}

#[test]
fn programmer_image_pages_are_neither_erased_nor_written() {
    let events = program_page(ATMEGA328P, 0x3F40);

    assert!(!events
        .iter()
        .any(|e| matches!(e, Event::Erase(_) | Event::Write(_))));
    assert!(events.ends_with(&[Event::Tx(0x14), Event::Tx(0x10)]));
}
