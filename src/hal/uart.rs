//! Polled USART0: the hardware transport
//!
//! No interrupts and no buffering: `read` reports `WouldBlock` until RXC is
//! set and `write` until UDRE is. Framing errors are not checked, a garbled
//! byte is passed up like any other.

use crate::config::{CPU_FREQ_HZ, UART_BAUD};

/// UBRR for double speed (U2X) mode, rounded to nearest.
pub const fn ubrr_double_speed(f_cpu: u32, baud: u32) -> u32 {
    (f_cpu + baud * 4) / (baud * 8) - 1
}

/// Achieved baud rate for a double speed divisor.
pub const fn double_speed_baud(f_cpu: u32, ubrr: u32) -> u32 {
    f_cpu / (8 * (ubrr + 1))
}

pub const UBRR: u32 = ubrr_double_speed(CPU_FREQ_HZ, UART_BAUD);

const _: () = assert!(UBRR <= 250, "unachievable baud rate (too slow)");
const _: () = assert!(UBRR >= 3, "unachievable baud rate (too fast)");

/// Rate the USART really runs at after rounding the divisor.
pub const ACTUAL_BAUD: u32 = double_speed_baud(CPU_FREQ_HZ, UBRR);

// Beyond 5% the stop bit lands in the next frame
const _: () = assert!(
    baud_error_per_mille(UART_BAUD, ACTUAL_BAUD) <= 50,
    "baud rate error above 5%"
);

/// Deviation of `actual` from `target`, in tenths of a percent.
pub const fn baud_error_per_mille(target: u32, actual: u32) -> u32 {
    (target.abs_diff(actual) as u64 * 1000 / target as u64) as u32
}

#[cfg(target_arch = "avr")]
pub use self::avr::{Usart, UsartRegisterBlock};

#[cfg(target_arch = "avr")]
mod avr {
    use avr_device::atmega128a::{USART0, USART1};
    use core::convert::Infallible;
    use core::marker::PhantomData;
    use embedded_hal::serial;

    const RXC: u8 = 1 << 7;
    const UDRE: u8 = 1 << 5;
    const U2X: u8 = 1 << 1;
    const RXEN: u8 = 1 << 4;
    const TXEN: u8 = 1 << 3;
    // 8 data bits, no parity, 1 stop bit
    const UCSZ_8N1: u8 = (1 << 2) | (1 << 1);

    pub struct Usart<U> {
        _usart: PhantomData<U>,
    }

    impl<U: UsartRegisterBlock> Usart<U> {
        pub fn new(ubrr: u8) -> Self {
            U::configure(ubrr);
            Self { _usart: PhantomData }
        }

        /// Turn receiver and transmitter off so the application finds the
        /// USART in its reset state.
        pub fn disable(&mut self) {
            U::disable();
        }
    }

    impl<U: UsartRegisterBlock> serial::Read<u8> for Usart<U> {
        type Error = Infallible;

        fn read(&mut self) -> nb::Result<u8, Infallible> {
            if U::status() & RXC == 0 {
                return Err(nb::Error::WouldBlock);
            }
            Ok(U::read_data())
        }
    }

    impl<U: UsartRegisterBlock> serial::Write<u8> for Usart<U> {
        type Error = Infallible;

        fn write(&mut self, byte: u8) -> nb::Result<(), Infallible> {
            if U::status() & UDRE == 0 {
                return Err(nb::Error::WouldBlock);
            }
            U::write_data(byte);
            Ok(())
        }

        fn flush(&mut self) -> nb::Result<(), Infallible> {
            if U::status() & UDRE == 0 {
                return Err(nb::Error::WouldBlock);
            }
            Ok(())
        }
    }

    /// Register access for the two ATmega128 USARTs.
    pub trait UsartRegisterBlock {
        fn configure(ubrr: u8);
        fn disable();
        fn status() -> u8;
        fn read_data() -> u8;
        fn write_data(byte: u8);
    }

    macro_rules! impl_usart {
        ($USART:ident, $udr:ident, $ucsra:ident, $ucsrb:ident, $ucsrc:ident, $ubrrl:ident, $ubrrh:ident) => {
            impl UsartRegisterBlock for $USART {
                fn configure(ubrr: u8) {
                    unsafe {
                        let p = $USART::ptr();
                        (*p).$ucsra.write(|w| w.bits(U2X));
                        (*p).$ucsrb.write(|w| w.bits(RXEN | TXEN));
                        (*p).$ucsrc.write(|w| w.bits(UCSZ_8N1));
                        (*p).$ubrrh.write(|w| w.bits(0));
                        (*p).$ubrrl.write(|w| w.bits(ubrr));
                    }
                }

                fn disable() {
                    unsafe {
                        let p = $USART::ptr();
                        (*p).$ucsrb.write(|w| w.bits(0));
                        (*p).$ucsra.write(|w| w.bits(0));
                    }
                }

                #[inline]
                fn status() -> u8 {
                    unsafe { (*$USART::ptr()).$ucsra.read().bits() }
                }

                #[inline]
                fn read_data() -> u8 {
                    unsafe { (*$USART::ptr()).$udr.read().bits() }
                }

                #[inline]
                fn write_data(byte: u8) {
                    unsafe { (*$USART::ptr()).$udr.write(|w| w.bits(byte)) }
                }
            }
        };
    }

    impl_usart!(USART0, udr0, ucsr0a, ucsr0b, ucsr0c, ubrr0l, ubrr0h);
    impl_usart!(USART1, udr1, ucsr1a, ucsr1b, ucsr1c, ubrr1l, ubrr1h);

    // Trace output on USART1 is write-only and blocking.
    impl ufmt::uWrite for Usart<USART1> {
        type Error = Infallible;

        fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
            for byte in s.bytes() {
                let _ = nb::block!(serial::Write::write(self, byte));
            }
            Ok(())
        }
    }
}
