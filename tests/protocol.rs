//! Command framing and replies, driven over a scripted serial line

use embedded_hal_mock::serial::{Mock, Transaction};

use stkboot::device::{ATMEGA128, ATMEGA328P};
use stkboot::drivers::FlashAddress;
use stkboot::protocol::{CRC_EOP, STK_INSYNC, STK_OK};
use stkboot::testing::{SimEeprom, SimFlash, SimWatchdog, TraceBuffer};
use stkboot::{Config, Fault, Programmer};

type Session = Programmer<Mock<u8>, SimWatchdog, SimFlash<0x8000>, SimEeprom<1024>>;

fn session(expectations: &[Transaction<u8>]) -> Session {
    Programmer::new(
        Config::new(ATMEGA328P),
        Mock::new(expectations),
        SimWatchdog::new(),
        SimFlash::new(ATMEGA328P),
        SimEeprom::new(),
    )
}

fn finish(programmer: Session) {
    let (mut serial, _, _, _) = programmer.release();
    serial.done();
}

#[test]
fn get_parameter_reports_version() {
    let mut programmer = session(&[
        Transaction::read_many([0x41, 0x81, CRC_EOP]),
        Transaction::write_many([STK_INSYNC, 4, STK_OK]),
        Transaction::read_many([0x41, 0x82, CRC_EOP]),
        Transaction::write_many([STK_INSYNC, 5, STK_OK]),
    ]);

    assert_eq!(programmer.step(), Ok(()));
    assert_eq!(programmer.step(), Ok(()));
    finish(programmer);
}

#[test]
fn unknown_parameter_gets_generic_reply() {
    let mut programmer = session(&[
        Transaction::read_many([0x41, 0x98, CRC_EOP]),
        Transaction::write_many([STK_INSYNC, 0x03, STK_OK]),
    ]);

    assert_eq!(programmer.step(), Ok(()));
    finish(programmer);
}

#[test]
fn read_signature_sends_device_bytes() {
    let mut programmer = session(&[
        Transaction::read_many([0x75, CRC_EOP]),
        Transaction::write_many([STK_INSYNC, 0x1E, 0x95, 0x0F, STK_OK]),
    ]);

    assert_eq!(programmer.step(), Ok(()));
    finish(programmer);
}

#[test]
fn universal_answers_zero() {
    let mut programmer = session(&[
        Transaction::read_many([0x56, 0xAC, 0x80, 0x00, 0x00, CRC_EOP]),
        Transaction::write_many([STK_INSYNC, 0x00, STK_OK]),
    ]);

    assert_eq!(programmer.step(), Ok(()));
    finish(programmer);
}

#[test]
fn device_descriptions_are_skipped() {
    let mut set_device = vec![0x42];
    set_device.extend_from_slice(&[0x86; 20]);
    set_device.push(CRC_EOP);
    let mut set_device_ext = vec![0x45];
    set_device_ext.extend_from_slice(&[0x05, 0x04, 0xD7, 0xC2, 0x00]);
    set_device_ext.push(CRC_EOP);

    let mut programmer = session(&[
        Transaction::read_many(set_device),
        Transaction::write_many([STK_INSYNC, STK_OK]),
        Transaction::read_many(set_device_ext),
        Transaction::write_many([STK_INSYNC, STK_OK]),
    ]);

    assert_eq!(programmer.step(), Ok(()));
    assert_eq!(programmer.step(), Ok(()));
    finish(programmer);
}

#[test]
fn mode_changes_and_unknown_opcodes_only_handshake() {
    let mut programmer = session(&[
        Transaction::read_many([0x50, CRC_EOP]),
        Transaction::write_many([STK_INSYNC, STK_OK]),
        Transaction::read_many([0x30, CRC_EOP]),
        Transaction::write_many([STK_INSYNC, STK_OK]),
        Transaction::read_many([0x51, CRC_EOP]),
        Transaction::write_many([STK_INSYNC, STK_OK]),
    ]);

    for _ in 0..3 {
        assert_eq!(programmer.step(), Ok(()));
    }
    assert_eq!(programmer.address(), FlashAddress::default());
    finish(programmer);
}

#[test]
fn load_address_doubles_word_address() {
    let mut programmer = session(&[
        Transaction::read_many([0x55, 0x40, 0x00, CRC_EOP]),
        Transaction::write_many([STK_INSYNC, STK_OK]),
    ]);

    assert_eq!(programmer.step(), Ok(()));
    assert_eq!(programmer.address(), FlashAddress::new(0x80, 0));
    finish(programmer);
}

#[test]
fn load_address_selects_upper_bank_on_atmega128() {
    let mut programmer = Programmer::new(
        Config::new(ATMEGA128),
        Mock::new(&[
            Transaction::read_many([0x55, 0x80, 0xF0, CRC_EOP]),
            Transaction::write_many([STK_INSYNC, STK_OK]),
        ]),
        SimWatchdog::new(),
        // Addressing only, memory is never touched
        SimFlash::<0x100>::new(ATMEGA128),
        SimEeprom::<16>::new(),
    );

    assert_eq!(programmer.step(), Ok(()));
    assert_eq!(programmer.address(), FlashAddress::new(0xE100, 1));
    assert_eq!(programmer.address().linear(), 0x1_E100);

    let (mut serial, _, _, _) = programmer.release();
    serial.done();
}

#[test]
fn read_page_streams_flash_and_advances() {
    let mut programmer = session(&[
        Transaction::read_many([0x55, 0x80, 0x00, CRC_EOP]),
        Transaction::write_many([STK_INSYNC, STK_OK]),
        Transaction::read_many([0x74, 0x00, 0x04, b'F', CRC_EOP]),
        Transaction::write_many([STK_INSYNC, 0xDE, 0xAD, 0xBE, 0xEF, STK_OK]),
    ]);
    programmer
        .flash_mut()
        .load(0x100, &[0xDE, 0xAD, 0xBE, 0xEF]);

    assert_eq!(programmer.step(), Ok(()));
    assert_eq!(programmer.step(), Ok(()));
    assert_eq!(programmer.address(), FlashAddress::new(0x104, 0));
    finish(programmer);
}

#[test]
fn bad_terminator_silences_the_programmer() {
    let mut programmer = session(&[Transaction::read_many([0x41, 0x81, 0x21])]);

    assert_eq!(programmer.step(), Err(Fault::OutOfSync(0x21)));
    // Dead until reset: no further reads, no replies
    assert_eq!(programmer.step(), Err(Fault::OutOfSync(0x21)));
    assert_eq!(programmer.fault(), Some(Fault::OutOfSync(0x21)));
    finish(programmer);
}

#[test]
fn bad_page_terminator_writes_nothing_and_stays_dead() {
    let mut frame = vec![0x64, 0x00, 0x80, b'F'];
    frame.extend_from_slice(&[0x5A; 128]);
    frame.push(0x21);

    let mut programmer = session(&[
        Transaction::read_many([0x55, 0x40, 0x00, CRC_EOP]),
        Transaction::write_many([STK_INSYNC, STK_OK]),
        Transaction::read_many(frame),
    ]);

    assert_eq!(programmer.step(), Ok(()));
    assert_eq!(programmer.step(), Err(Fault::OutOfSync(0x21)));
    assert_eq!(programmer.step(), Err(Fault::OutOfSync(0x21)));

    let flash = programmer.flash();
    assert_eq!(flash.writes(), 0);
    assert_eq!(flash.bytes(0x80, 128), &[0xFF; 128][..]);
    // No INSYNC, no OK: the mock expects no writes for the frame
    finish(programmer);
}

#[test]
fn watchdog_is_fed_while_the_line_is_idle() {
    let mut programmer = session(&[
        Transaction::read_error(nb::Error::WouldBlock),
        Transaction::read_error(nb::Error::WouldBlock),
        Transaction::read_many([0x75, CRC_EOP]),
        Transaction::write_many([STK_INSYNC, 0x1E, 0x95, 0x0F, STK_OK]),
    ]);

    assert_eq!(programmer.step(), Ok(()));
    assert_eq!(programmer.watchdog().feeds(), 2);
    finish(programmer);
}

#[test]
fn trace_goes_to_its_own_sink() {
    let mut programmer = session(&[
        Transaction::read_many([0x75, CRC_EOP]),
        Transaction::write_many([STK_INSYNC, 0x1E, 0x95, 0x0F, STK_OK]),
    ])
    .with_trace(TraceBuffer::new());

    assert_eq!(programmer.step(), Ok(()));
    assert_eq!(
        programmer.trace_sink().as_str(),
        "stkboot ATmega328P v4.5 redirect=false\ncmd ReadSignature\n"
    );

    let (mut serial, _, _, _) = programmer.release();
    serial.done();
}
