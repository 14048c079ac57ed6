//! Watchdog timer: the programmer's only timeout and its crash recovery

/// WDP bits of WDTCR. Periods are nominal at 5 V.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WatchdogTimeout {
    Ms16 = 0,
    Ms32 = 1,
    Ms64 = 2,
    Ms125 = 3,
    Ms250 = 4,
    Ms500 = 5,
    Ms1000 = 6,
    Ms2000 = 7,
}

impl WatchdogTimeout {
    pub const fn millis(self) -> u16 {
        16 << self as u16
    }
}

#[cfg(target_arch = "avr")]
pub use self::avr::Watchdog;

#[cfg(target_arch = "avr")]
mod avr {
    use super::WatchdogTimeout;
    use avr_device::atmega128a::WDT;
    use embedded_hal::watchdog;

    const WDCE: u8 = 1 << 4;
    const WDE: u8 = 1 << 3;

    pub struct Watchdog {
        _private: (),
    }

    impl Watchdog {
        #[inline]
        pub fn new() -> Self {
            Self { _private: () }
        }
    }

    impl Default for Watchdog {
        fn default() -> Self {
            Self::new()
        }
    }

    impl watchdog::WatchdogEnable for Watchdog {
        type Time = WatchdogTimeout;

        #[inline]
        fn start<T>(&mut self, period: T)
        where
            T: Into<WatchdogTimeout>,
        {
            let period = period.into();
            unsafe {
                let p = WDT::ptr();
                // Timed sequence: change enable, then system reset mode with period
                (*p).wdtcr.write(|w| w.bits(WDCE | WDE));
                (*p).wdtcr.write(|w| w.bits(WDE | period as u8));
            }
        }
    }

    impl watchdog::Watchdog for Watchdog {
        #[inline]
        fn feed(&mut self) {
            avr_device::asm::wdr();
        }
    }

    impl watchdog::WatchdogDisable for Watchdog {
        #[inline]
        fn disable(&mut self) {
            avr_device::asm::wdr();
            unsafe {
                let p = WDT::ptr();
                (*p).wdtcr.write(|w| w.bits(WDCE | WDE));
                (*p).wdtcr.write(|w| w.bits(0x00));
            }
        }
    }
}
