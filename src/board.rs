//! Per-board wiring: which GPIO lines drive each multiplexer, and how a
//! schematic label maps onto a mux address.
//!
//! The two PicoControl revisions are wired differently and their tables are
//! not interchangeable, so each lives in its own [`BoardConfig`].

use std::fmt;
use std::str::FromStr;

/// Number of selectable channels per device.
pub const CHANNELS: usize = 32;

/// The three mux slots on a PicoControl board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    Scope1 = 0,
    Scope2 = 1,
    Wavegen2 = 2,
}

impl Device {
    pub const ALL: [Device; 3] = [Device::Scope1, Device::Scope2, Device::Wavegen2];

    /// Maps a command's device index onto a slot. Anything other than 0, 1 or
    /// 2 has no device behind it.
    pub fn from_index(index: u32) -> Option<Device> {
        match index {
            0 => Some(Device::Scope1),
            1 => Some(Device::Scope2),
            2 => Some(Device::Wavegen2),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Device::Scope1 => "scope1",
            Device::Scope2 => "scope2",
            Device::Wavegen2 => "wavegen2",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Enable wiring of one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnableLines {
    /// One active-high enable line.
    Single(u8),
    /// Two enable lines switched break-before-make. Which one is left high
    /// after a selection carries the fifth address bit.
    Dual { a: u8, b: u8 },
}

/// GPIO lines of one device. `select[0]` carries address bit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevicePins {
    pub enable: EnableLines,
    pub select: &'static [u8],
}

/// A complete board description.
#[derive(Debug, PartialEq, Eq)]
pub struct BoardConfig {
    pub name: &'static str,
    pub devices: [DevicePins; 3],
    /// `table[device][selector]` is the raw mux address for a schematic label
    /// (label = selector + 1).
    pub table: [[u8; CHANNELS]; 3],
}

impl BoardConfig {
    pub fn pins(&self, device: Device) -> &DevicePins {
        &self.devices[device.index()]
    }

    /// Mux address for `selector`, if it names a channel (0..=31).
    pub fn lookup(&self, device: Device, selector: u32) -> Option<u8> {
        let selector = usize::try_from(selector).ok()?;
        self.table[device.index()].get(selector).copied()
    }
}

/// First revision: one enable line and five selector lines per device.
pub static PICO_CONTROL_V1: BoardConfig = BoardConfig {
    name: "PicoControl v1",
    devices: [
        DevicePins {
            enable: EnableLines::Single(6),
            select: &[20, 21, 22, 26, 27],
        },
        DevicePins {
            enable: EnableLines::Single(7),
            select: &[19, 18, 17, 16, 9],
        },
        DevicePins {
            enable: EnableLines::Single(8),
            select: &[14, 13, 12, 11, 10],
        },
    ],
    table: [
        // Scope1. Known defect: label 16 (index 15) does not reach the channel
        // wired to wavegen2. Kept as shipped.
        [
            0, 1, 2, 3, 4, 5, 11, 10, 9, 8, 7, 6, 15, 14, 13, 12, //
            16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31,
        ],
        // Scope2
        [
            11, 10, 9, 8, 7, 6, 0, 1, 2, 3, 4, 5, 28, 29, 30, 31, //
            16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 12, 13, 14, 15,
        ],
        // Wavegen2. Labels 17-32 are not connected.
        [
            11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, 12, 13, 14, 15, //
            16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31,
        ],
    ],
};

/// Second revision: the scope muxes are split into two 16-channel halves, each
/// with its own enable line. The old S4 lines now drive the second enable.
pub static PICO_CONTROL_V2: BoardConfig = BoardConfig {
    name: "PicoControl v2",
    devices: [
        DevicePins {
            enable: EnableLines::Dual { a: 6, b: 27 },
            select: &[20, 21, 22, 26],
        },
        DevicePins {
            enable: EnableLines::Dual { a: 7, b: 9 },
            select: &[19, 18, 17, 16],
        },
        DevicePins {
            enable: EnableLines::Single(8),
            select: &[14, 13, 12, 11, 10],
        },
    ],
    table: [
        // Scope1
        [
            0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, //
            16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31,
        ],
        // Scope2
        [
            15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, //
            16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31,
        ],
        // Wavegen2, same board as v1.
        [
            11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, 12, 13, 14, 15, //
            16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31,
        ],
    ],
};

/// Selects one of the built-in board configurations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BoardVariant {
    #[default]
    V1,
    V2,
}

impl BoardVariant {
    pub fn config(self) -> &'static BoardConfig {
        match self {
            BoardVariant::V1 => &PICO_CONTROL_V1,
            BoardVariant::V2 => &PICO_CONTROL_V2,
        }
    }
}

impl FromStr for BoardVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(BoardVariant::V1),
            "v2" | "2" => Ok(BoardVariant::V2),
            other => Err(format!("unknown board variant '{}' (expected v1 or v2)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_index_round_trip() {
        for device in Device::ALL {
            assert_eq!(Device::from_index(device.index() as u32), Some(device));
        }
        assert_eq!(Device::from_index(3), None);
        assert_eq!(Device::from_index(u32::MAX), None);
    }

    #[test]
    fn tables_hold_five_bit_addresses() {
        for board in [&PICO_CONTROL_V1, &PICO_CONTROL_V2] {
            for row in &board.table {
                assert!(row.iter().all(|&addr| addr < 32), "{}", board.name);
            }
        }
    }

    #[test]
    fn scope_rows_are_permutations() {
        for board in [&PICO_CONTROL_V1, &PICO_CONTROL_V2] {
            for device in [Device::Scope1, Device::Scope2] {
                let mut row = board.table[device.index()];
                row.sort_unstable();
                let expected: Vec<u8> = (0..32).collect();
                assert_eq!(row.to_vec(), expected, "{} {}", board.name, device);
            }
        }
    }

    #[test]
    fn v1_label_16_defect_is_preserved() {
        assert_eq!(PICO_CONTROL_V1.lookup(Device::Scope1, 15), Some(12));
    }

    #[test]
    fn lookup_rejects_non_channel_selectors() {
        assert_eq!(PICO_CONTROL_V1.lookup(Device::Scope2, 31), Some(15));
        assert_eq!(PICO_CONTROL_V1.lookup(Device::Scope2, 32), None);
        assert_eq!(PICO_CONTROL_V2.lookup(Device::Wavegen2, 33), None);
    }

    #[test]
    fn selector_line_counts_match_enable_wiring() {
        for board in [&PICO_CONTROL_V1, &PICO_CONTROL_V2] {
            for pins in &board.devices {
                match pins.enable {
                    EnableLines::Single(_) => assert_eq!(pins.select.len(), 5),
                    EnableLines::Dual { .. } => assert_eq!(pins.select.len(), 4),
                }
            }
        }
    }

    #[test]
    fn variants_are_distinct_configurations() {
        assert_ne!(PICO_CONTROL_V1, PICO_CONTROL_V2);
        assert_eq!(BoardVariant::V1.config().name, "PicoControl v1");
        assert_eq!(BoardVariant::V2.config().name, "PicoControl v2");
    }

    #[test]
    fn variant_from_str() {
        assert_eq!("v2".parse::<BoardVariant>(), Ok(BoardVariant::V2));
        assert_eq!("V1".parse::<BoardVariant>(), Ok(BoardVariant::V1));
        assert!("v3".parse::<BoardVariant>().is_err());
    }
}
