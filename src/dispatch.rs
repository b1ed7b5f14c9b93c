//! Turns a [`Command`] into pin writes.
//!
//! Invalid commands are absorbed: an unknown device or an out-of-range
//! selector produces no writes at all and nothing is reported back.

use log::debug;

use crate::board::{BoardConfig, Device, EnableLines};
use crate::command::Command;
use crate::gpio::{GpioBank, Level};

/// Selector value that switches a device's enable line(s) on.
pub const SELECTOR_ENABLE: u32 = 32;
/// Selector value that switches a device's enable line(s) off.
pub const SELECTOR_DISABLE: u32 = 33;

/// What a valid command asks the board to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Enable(Device),
    Disable(Device),
    /// Drive the raw mux address `pattern` (0..=31) onto `device`.
    Select { device: Device, pattern: u8 },
}

impl Action {
    pub fn device(&self) -> Device {
        match *self {
            Action::Enable(device) | Action::Disable(device) => device,
            Action::Select { device, .. } => device,
        }
    }
}

/// Applies the validity gate and the table lookup without touching any pins.
pub fn resolve(board: &BoardConfig, cmd: Command) -> Option<Action> {
    let device = Device::from_index(cmd.device_index)?;
    match cmd.selector {
        SELECTOR_ENABLE => Some(Action::Enable(device)),
        SELECTOR_DISABLE => Some(Action::Disable(device)),
        selector => board
            .lookup(device, selector)
            .map(|pattern| Action::Select { device, pattern }),
    }
}

/// Drives one board through a [`GpioBank`].
#[derive(Debug)]
pub struct Dispatcher<G> {
    board: &'static BoardConfig,
    gpio: G,
}

impl<G: GpioBank> Dispatcher<G> {
    pub fn new(board: &'static BoardConfig, gpio: G) -> Self {
        Self { board, gpio }
    }

    pub fn board(&self) -> &'static BoardConfig {
        self.board
    }

    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    pub fn gpio_mut(&mut self) -> &mut G {
        &mut self.gpio
    }

    pub fn into_inner(self) -> G {
        self.gpio
    }

    /// Executes `cmd`. Commands that fail the gate are dropped silently.
    pub fn dispatch(&mut self, cmd: Command) {
        match resolve(self.board, cmd) {
            Some(action) => {
                debug!("{} -> {:?}", cmd, action);
                self.apply(action);
            }
            None => debug!("{} dropped", cmd),
        }
    }

    /// Performs the pin writes for an already resolved action.
    pub fn apply(&mut self, action: Action) {
        let pins = *self.board.pins(action.device());
        match action {
            Action::Enable(_) => self.set_enable(pins.enable, Level::High),
            Action::Disable(_) => self.set_enable(pins.enable, Level::Low),
            Action::Select { pattern, .. } => match pins.enable {
                EnableLines::Single(en) => {
                    // Pulse: the device is only enabled while the address changes.
                    self.gpio.write(en, Level::High);
                    self.write_address(pins.select, pattern);
                    self.gpio.write(en, Level::Low);
                }
                EnableLines::Dual { a, b } => {
                    // Break-before-make: both halves on, low bits set, then the
                    // half not addressed by bit 4 is dropped.
                    self.gpio.write(a, Level::High);
                    self.gpio.write(b, Level::High);
                    self.write_address(&pins.select[..pins.select.len().min(4)], pattern);
                    if pattern & 0x10 != 0 {
                        self.gpio.write(b, Level::Low);
                    } else {
                        self.gpio.write(a, Level::Low);
                    }
                }
            },
        }
    }

    fn set_enable(&mut self, enable: EnableLines, level: Level) {
        match enable {
            EnableLines::Single(en) => self.gpio.write(en, level),
            EnableLines::Dual { a, b } => {
                self.gpio.write(a, level);
                self.gpio.write(b, level);
            }
        }
    }

    fn write_address(&mut self, select: &[u8], pattern: u8) {
        for (bit, &line) in select.iter().enumerate() {
            self.gpio.write(line, Level::from((pattern >> bit) & 1 == 1));
        }
    }
}
