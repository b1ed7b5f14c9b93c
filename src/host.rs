//! Host side of the link: sending commands to a PicoControl board and the
//! canned channel walks used on the bench.

use std::io::{self, Write};
use std::time::Duration;

use log::info;

use crate::board::{Device, CHANNELS};
use crate::command::Command;

/// Baud rate the boards are flashed with.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
/// Pause between consecutive commands in a walk.
pub const DEFAULT_COMMAND_DELAY: Duration = Duration::from_millis(100);
/// Time the USB CDC link needs after opening before it accepts input.
pub const SETTLE_TIME: Duration = Duration::from_secs(2);

/// Where a board usually enumerates on this OS.
pub fn default_port() -> &'static str {
    if cfg!(windows) {
        "COM12"
    } else {
        "/dev/ttyACM1"
    }
}

/// A write-only link to a board. The firmware never answers, so nothing is
/// read back.
#[derive(Debug)]
pub struct PicoLink<P> {
    port: P,
}

impl<P: Write> PicoLink<P> {
    pub fn new(port: P) -> Self {
        Self { port }
    }

    pub fn send(&mut self, cmd: &Command) -> io::Result<()> {
        self.send_raw(&cmd.to_string())
    }

    /// Sends `text` followed by `\n`. The firmware accepts any line.
    pub fn send_raw(&mut self, text: &str) -> io::Result<()> {
        self.port.write_all(text.as_bytes())?;
        self.port.write_all(b"\n")?;
        self.port.flush()?;
        info!("Command sent: {}", text);
        Ok(())
    }

    pub fn into_inner(self) -> P {
        self.port
    }
}

/// Every channel of every device, wavegen first, then the scopes follow it
/// onto the same label.
pub fn sweep_order() -> Vec<Command> {
    let order = [Device::Wavegen2, Device::Scope2, Device::Scope1];
    (0..CHANNELS as u32)
        .flat_map(|selector| order.map(|d| Command::new(d.index() as u32, selector)))
        .collect()
}

/// One step of a manual channel search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStep {
    /// Move the wavegen without waiting.
    Source(Command),
    /// Move a scope; the operator confirms before each one.
    Probe(Command),
}

/// For each wavegen channel 0..=30, walk Scope2 then Scope1 over the first
/// sixteen labels.
pub fn search_order() -> Vec<SearchStep> {
    let mut steps = Vec::new();
    for source in 0..31 {
        steps.push(SearchStep::Source(Command::new(Device::Wavegen2.index() as u32, source)));
        for scope in [Device::Scope2, Device::Scope1] {
            for selector in 0..16 {
                steps.push(SearchStep::Probe(Command::new(scope.index() as u32, selector)));
            }
        }
    }
    steps
}
