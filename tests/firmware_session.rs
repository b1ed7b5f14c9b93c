//! End-to-end runs of the firmware over raw serial bytes.

use picomux::board::{PICO_CONTROL_V1, PICO_CONTROL_V2};
use picomux::host::{sweep_order, PicoLink};
use picomux::{Device, EnableLines, Firmware, Level, PinWrite, SimulatedGpio};

fn session(board: &'static picomux::BoardConfig, bytes: &[u8]) -> Firmware<SimulatedGpio> {
    let mut fw = Firmware::new(board, SimulatedGpio::new());
    fw.feed(bytes);
    fw
}

#[test]
fn enable_select_disable_sequence() {
    let fw = session(&PICO_CONTROL_V1, b"2_32\n2_12\n2_33\n");
    let journal = fw.dispatcher().gpio().journal();

    // 2_32: EN high. 2_12 (label 13 -> address 12 = 0b01100): pulse. 2_33: EN low.
    let expected = [
        PinWrite::new(8, Level::High),
        PinWrite::new(8, Level::High),
        PinWrite::new(14, Level::Low),
        PinWrite::new(13, Level::Low),
        PinWrite::new(12, Level::High),
        PinWrite::new(11, Level::High),
        PinWrite::new(10, Level::Low),
        PinWrite::new(8, Level::Low),
        PinWrite::new(8, Level::Low),
    ];
    assert_eq!(journal, &expected);
}

#[test]
fn garbage_and_unknown_devices_leave_pins_alone() {
    let fw = session(&PICO_CONTROL_V1, b"3_1\n9_32\n1_34\n1_99\n");
    assert!(fw.dispatcher().gpio().journal().is_empty());
}

#[test]
fn malformed_line_acts_as_zero_command() {
    let malformed = session(&PICO_CONTROL_V1, b"hello\n");
    let zero = session(&PICO_CONTROL_V1, b"0_0\n");
    assert_eq!(
        malformed.dispatcher().gpio().journal(),
        zero.dispatcher().gpio().journal()
    );
    assert!(!malformed.dispatcher().gpio().journal().is_empty());
}

#[test]
fn selector_lines_hold_last_address() {
    // Scope2 selector 12 (label 13) is address 28 = 0b11100 on v1.
    let fw = session(&PICO_CONTROL_V1, b"1_12\n");
    let gpio = fw.dispatcher().gpio();
    let levels: Vec<Level> = [19u8, 18, 17, 16, 9]
        .iter()
        .map(|&line| gpio.level(line).unwrap())
        .collect();
    assert_eq!(
        levels,
        vec![Level::Low, Level::Low, Level::High, Level::High, Level::High]
    );
    assert_eq!(gpio.level(7), Some(Level::Low));
}

#[test]
fn v2_scopes_never_enable_both_halves_during_a_sweep() {
    let mut link = PicoLink::new(Vec::new());
    for cmd in sweep_order() {
        link.send(&cmd).unwrap();
    }
    let bytes = link.into_inner();

    let mut fw = Firmware::new(&PICO_CONTROL_V2, SimulatedGpio::new());
    for line in bytes.split_inclusive(|&b| b == b'\n') {
        let dispatched = fw.feed(line);
        assert_eq!(dispatched, 1);
        for device in [Device::Scope1, Device::Scope2] {
            if let EnableLines::Dual { a, b } = PICO_CONTROL_V2.pins(device).enable {
                let gpio = fw.dispatcher().gpio();
                let a_high = gpio.level(a) == Some(Level::High);
                let b_high = gpio.level(b) == Some(Level::High);
                // Until a scope has been addressed both halves are still off.
                assert!(!(a_high && b_high));
            }
        }
    }

    let gpio = fw.dispatcher().gpio();
    for (a, b) in [(6u8, 27u8), (7, 9)] {
        let a_high = gpio.level(a) == Some(Level::High);
        let b_high = gpio.level(b) == Some(Level::High);
        assert!(a_high ^ b_high);
    }
}

#[test]
fn overlong_line_is_cut_at_fifteen_bytes() {
    // The first 15 bytes "00000000000002_" form a line (2_0), the '3' that
    // overflows the buffer is dropped, and the trailing "2" becomes a line
    // without separator, i.e. the zero command.
    let fw = session(&PICO_CONTROL_V1, b"00000000000002_32\n");
    let journal = fw.dispatcher().gpio().journal();
    assert_eq!(journal.first(), Some(&PinWrite::new(8, Level::High)));
    assert_eq!(journal.len(), 14);
}
