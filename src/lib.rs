//! # PicoControl Mux Library
//!
//! This library contains the command handling of the PicoControl firmware, the
//! Raspberry Pi Pico that routes lab instruments through analog multiplexers.
//! A host sends lines of the form `<device>_<selector>` over USB serial; each
//! line is decoded, checked, and turned into enable/select pin writes.
//!
//! Nothing here talks to real silicon. Pins go through the [`GpioBank`] trait,
//! and [`SimulatedGpio`] stands in for the Pico so a whole board can be run on
//! a workstation.

pub mod board;
pub mod command;
pub mod dispatch;
pub mod firmware;
pub mod gpio;
pub mod host;
pub mod line;

pub use board::{BoardConfig, BoardVariant, Device, DevicePins, EnableLines};
pub use command::{parse, try_parse, Command, CommandError};
pub use dispatch::{resolve, Action, Dispatcher};
pub use firmware::{Firmware, LineOutcome};
pub use gpio::{GpioBank, Level, PinWrite, SimulatedGpio};
pub use host::PicoLink;
pub use line::LineAssembler;
