//! GPIO write primitive and a simulated pin bank.
//!
//! The dispatcher only ever asks for one thing: put level L on line N. The
//! platform owns the pins, checks line numbers and never gets read back by the
//! core.

use log::trace;

/// Highest user GPIO on the RP2040.
pub const MAX_LINE: u8 = 29;
/// Number of lines in a [`SimulatedGpio`] bank (GP0..=GP29).
pub const LINE_COUNT: usize = MAX_LINE as usize + 1;

/// Logical level of an output line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    #[default]
    Low,
    High,
}

impl Level {
    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// The hardware collaborator. Writes are synchronous and take effect before
/// the call returns.
pub trait GpioBank {
    fn write(&mut self, line: u8, level: Level);
}

impl<G: GpioBank + ?Sized> GpioBank for &mut G {
    fn write(&mut self, line: u8, level: Level) {
        (**self).write(line, level)
    }
}

/// One accepted pin write, as recorded by [`SimulatedGpio`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinWrite {
    pub line: u8,
    pub level: Level,
}

impl PinWrite {
    pub const fn new(line: u8, level: Level) -> Self {
        Self { line, level }
    }
}

/// An in-memory GPIO bank standing in for the Pico.
///
/// Every line starts low, as after the firmware's bring-up. Writes to lines
/// above [`MAX_LINE`] are dropped without being journaled.
#[derive(Debug, Clone)]
pub struct SimulatedGpio {
    levels: [Level; LINE_COUNT],
    journal: Vec<PinWrite>,
}

impl Default for SimulatedGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedGpio {
    pub fn new() -> Self {
        Self {
            levels: [Level::Low; LINE_COUNT],
            journal: Vec::new(),
        }
    }

    /// Current level of `line`, or `None` if the bank has no such line.
    pub fn level(&self, line: u8) -> Option<Level> {
        self.levels.get(usize::from(line)).copied()
    }

    pub fn levels(&self) -> &[Level; LINE_COUNT] {
        &self.levels
    }

    /// Every accepted write since creation or the last [`take_journal`](Self::take_journal).
    pub fn journal(&self) -> &[PinWrite] {
        &self.journal
    }

    pub fn take_journal(&mut self) -> Vec<PinWrite> {
        std::mem::take(&mut self.journal)
    }
}

impl GpioBank for SimulatedGpio {
    fn write(&mut self, line: u8, level: Level) {
        if line > MAX_LINE {
            trace!("ignoring write to GP{}: out of range", line);
            return;
        }
        trace!("GP{} <- {:?}", line, level);
        self.levels[usize::from(line)] = level;
        self.journal.push(PinWrite::new(line, level));
    }
}
