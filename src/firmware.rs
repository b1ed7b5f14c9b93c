//! The firmware's main loop: bytes in, one command dispatched per line.

use log::trace;

use crate::board::BoardConfig;
use crate::command::{self, Command};
use crate::dispatch::{self, Action, Dispatcher};
use crate::gpio::{GpioBank, PinWrite, SimulatedGpio};
use crate::line::LineAssembler;

/// What one received line did to a simulated board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineOutcome {
    pub command: Command,
    /// `None` when the command was dropped by the gate.
    pub action: Option<Action>,
    pub writes: Vec<PinWrite>,
}

/// A PicoControl board as seen from its serial port.
#[derive(Debug)]
pub struct Firmware<G> {
    lines: LineAssembler,
    dispatcher: Dispatcher<G>,
}

impl<G: GpioBank> Firmware<G> {
    pub fn new(board: &'static BoardConfig, gpio: G) -> Self {
        Self {
            lines: LineAssembler::new(),
            dispatcher: Dispatcher::new(board, gpio),
        }
    }

    /// Feeds one received byte. When it completes a line, the line is parsed
    /// and dispatched before returning, and the parsed command is returned.
    pub fn feed_byte(&mut self, byte: u8) -> Option<Command> {
        let line = self.lines.push(byte)?;
        let cmd = command::parse(&line);
        trace!("line {:?} parsed as {}", line, cmd);
        self.dispatcher.dispatch(cmd);
        Some(cmd)
    }

    /// Feeds a chunk of received bytes and returns how many commands were
    /// dispatched.
    pub fn feed(&mut self, bytes: &[u8]) -> usize {
        bytes.iter().filter_map(|&b| self.feed_byte(b)).count()
    }

    pub fn pending(&self) -> &[u8] {
        self.lines.pending()
    }

    pub fn dispatcher(&self) -> &Dispatcher<G> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<G> {
        &mut self.dispatcher
    }
}

impl Firmware<SimulatedGpio> {
    /// Feeds `line` followed by `\n` and reports every command it produced,
    /// with the pin writes each one caused. Long input can yield more than one
    /// command.
    pub fn feed_line(&mut self, line: &str) -> Vec<LineOutcome> {
        let board = self.dispatcher.board();
        let mut outcomes = Vec::new();
        for &byte in line.as_bytes().iter().chain(b"\n") {
            if let Some(cmd) = self.feed_byte(byte) {
                outcomes.push(LineOutcome {
                    command: cmd,
                    action: dispatch::resolve(board, cmd),
                    writes: self.dispatcher.gpio_mut().take_journal(),
                });
            }
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Device, PICO_CONTROL_V1};
    use crate::gpio::Level;

    #[test]
    fn feed_dispatches_each_line() {
        let mut fw = Firmware::new(&PICO_CONTROL_V1, SimulatedGpio::new());
        assert_eq!(fw.feed(b"0_32\n1_32\n"), 2);
        let gpio = fw.dispatcher().gpio();
        assert_eq!(gpio.level(6), Some(Level::High));
        assert_eq!(gpio.level(7), Some(Level::High));
        assert_eq!(gpio.level(8), Some(Level::Low));
    }

    #[test]
    fn feed_byte_returns_command_only_on_terminator() {
        let mut fw = Firmware::new(&PICO_CONTROL_V1, SimulatedGpio::new());
        assert_eq!(fw.feed_byte(b'2'), None);
        assert_eq!(fw.feed_byte(b'_'), None);
        assert_eq!(fw.feed_byte(b'3'), None);
        assert_eq!(fw.pending(), b"2_3");
        assert!(fw.dispatcher().gpio().journal().is_empty());
        assert_eq!(fw.feed_byte(b'3'), None);
        assert_eq!(fw.feed_byte(b'\r'), Some(Command::new(2, 33)));
        assert_eq!(fw.dispatcher().gpio().journal().len(), 1);
    }

    #[test]
    fn split_chunks_assemble_into_one_command() {
        let mut fw = Firmware::new(&PICO_CONTROL_V1, SimulatedGpio::new());
        assert_eq!(fw.feed(b"0_"), 0);
        assert_eq!(fw.feed(b"32"), 0);
        assert_eq!(fw.feed(b"\n"), 1);
        assert_eq!(fw.dispatcher().gpio().level(6), Some(Level::High));
    }

    #[test]
    fn embedded_nul_hides_the_separator() {
        let mut fw = Firmware::new(&PICO_CONTROL_V1, SimulatedGpio::new());
        let parsed: Vec<Command> = b"2\x00_32\n".iter().filter_map(|&b| fw.feed_byte(b)).collect();
        assert_eq!(parsed, vec![Command::new(0, 0)]);
        // Scope1 pulsed with address 0, Wavegen2 untouched.
        let gpio = fw.dispatcher().gpio();
        assert_eq!(gpio.journal().first(), Some(&PinWrite::new(6, Level::High)));
        assert!(gpio.journal().iter().all(|w| w.line != 8));
    }

    #[test]
    fn feed_line_reports_action_and_writes() {
        let mut fw = Firmware::new(&PICO_CONTROL_V1, SimulatedGpio::new());
        let outcomes = fw.feed_line("2_32");
        assert_eq!(
            outcomes,
            vec![LineOutcome {
                command: Command::new(2, 32),
                action: Some(Action::Enable(Device::Wavegen2)),
                writes: vec![PinWrite::new(8, Level::High)],
            }]
        );
        assert!(fw.dispatcher().gpio().journal().is_empty());
    }

    #[test]
    fn feed_line_reports_dropped_commands() {
        let mut fw = Firmware::new(&PICO_CONTROL_V1, SimulatedGpio::new());
        let outcomes = fw.feed_line("7_1");
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].action, None);
        assert!(outcomes[0].writes.is_empty());
    }

    #[test]
    fn feed_line_splits_overlong_input() {
        let mut fw = Firmware::new(&PICO_CONTROL_V1, SimulatedGpio::new());
        let outcomes = fw.feed_line("00000000000002_32");
        let commands: Vec<Command> = outcomes.iter().map(|o| o.command).collect();
        assert_eq!(commands, vec![Command::new(2, 0), Command::new(0, 0)]);
        assert_eq!(outcomes[0].writes.len(), 7);
    }

    #[test]
    fn bare_terminator_dispatches_zero_command() {
        let mut fw = Firmware::new(&PICO_CONTROL_V1, SimulatedGpio::new());
        assert_eq!(fw.feed(b"\n"), 1);
        // 0_0 pulses Scope1 with address 0: EN, five selector lines, EN.
        assert_eq!(fw.dispatcher().gpio().journal().len(), 7);
    }
}
