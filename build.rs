use std::env;

const DEFAULT_F_CPU: &str = "16000000";
const BOOT_SECTION: u32 = 0x1_FC00;

fn main() {
    println!("cargo:rerun-if-env-changed=STKBOOT_F_CPU");

    // Pass CPU frequency for baud rate and watchdog calculations
    let f_cpu = env::var("STKBOOT_F_CPU").unwrap_or_else(|_| DEFAULT_F_CPU.to_string());
    if f_cpu.is_empty() || !f_cpu.bytes().all(|b| b.is_ascii_digit()) {
        panic!("STKBOOT_F_CPU must be a frequency in Hz, got {:?}", f_cpu);
    }
    println!("cargo:rustc-env=MCU_FREQ_HZ={}", f_cpu);

    // Host builds only carry the protocol core and its tests
    let target = env::var("TARGET").unwrap_or_default();
    if target.contains("avr") {
        println!("cargo:rustc-link-arg=-mmcu=atmega128");
        // Smallest hardware boot section (BOOTSZ = 11, 512 words)
        println!("cargo:rustc-link-arg=-Wl,--section-start=.text={:#x}", BOOT_SECTION);
        println!("cargo:warning=Building stkboot for ATmega128 at {} Hz", f_cpu);
    }
}
