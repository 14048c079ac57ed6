#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]

#[cfg(target_arch = "avr")]
mod firmware {
    use panic_halt as _;

    use embedded_hal::watchdog::{WatchdogDisable, WatchdogEnable};

    use stkboot::bootloader::startup::{application_entry, should_enter_programmer};
    use stkboot::config::WDT_TIMEOUT;
    use stkboot::device::ATMEGA128;
    use stkboot::hal::{reset, Eeprom, Spm, Watchdog};
    use stkboot::{Config, Programmer};

    #[avr_device::entry]
    fn main() -> ! {
        avr_device::interrupt::disable();

        let cause = reset::take_reset_cause();
        let config = Config::new(ATMEGA128);
        let mut flash = Spm::new();
        let mut watchdog = Watchdog::new();

        if !should_enter_programmer(cause) {
            if let Some(entry) = application_entry(&config, &mut flash) {
                watchdog.disable();
                reset::start_application(entry);
            }
        }

        watchdog.start(WDT_TIMEOUT);
        let serial = transport();
        let programmer = Programmer::new(config, serial, watchdog, flash, Eeprom::new());

        #[cfg(feature = "trace")]
        let mut programmer = {
            use stkboot::hal::uart::UBRR;
            use stkboot::hal::Usart;
            programmer.with_trace(Usart::<avr_device::atmega128a::USART1>::new(UBRR as u8))
        };
        #[cfg(not(feature = "trace"))]
        let mut programmer = programmer;

        programmer.run()
    }

    #[cfg(not(feature = "soft-uart"))]
    fn transport() -> stkboot::hal::Usart<avr_device::atmega128a::USART0> {
        stkboot::hal::Usart::new(stkboot::hal::uart::UBRR as u8)
    }

    #[cfg(feature = "soft-uart")]
    fn transport() -> stkboot::hal::SoftSerial<
        stkboot::hal::gpio::board::SoftTx,
        stkboot::hal::gpio::board::SoftRx,
        stkboot::hal::TimerDelay,
    > {
        use stkboot::config::UART_BAUD;
        use stkboot::hal::gpio::board::{SoftRx, SoftTx};
        use stkboot::hal::{SoftSerial, TimerDelay};

        SoftSerial::new(SoftTx::idle_high(), SoftRx::pull_up(), TimerDelay::new(), UART_BAUD)
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {}
