//! Parsing of `<device>_<selector>` command lines.
//!
//! The firmware never rejects a line: anything it cannot make sense of turns
//! into a zero field. [`parse`] reproduces that exactly. [`try_parse`] is the
//! strict counterpart used by the host tooling to tell a malformed line apart
//! from a genuine `0_0`.

use std::fmt;
use std::num::ParseIntError;

// Errors reported by the strict parser.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// The line has no `_` separating the two fields.
    MissingSeparator,
    /// The device index is not a base-10 unsigned integer.
    InvalidDeviceIndex(ParseIntError),
    /// The selector is not a base-10 unsigned integer.
    InvalidSelector(ParseIntError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::MissingSeparator => write!(f, "missing '_' between device and selector"),
            CommandError::InvalidDeviceIndex(e) => write!(f, "invalid device index: {}", e),
            CommandError::InvalidSelector(e) => write!(f, "invalid selector: {}", e),
        }
    }
}

impl std::error::Error for CommandError {}

/// A decoded command line. Bounds are not checked here; that is the
/// dispatcher's job.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    pub device_index: u32,
    pub selector: u32,
}

impl Command {
    pub const fn new(device_index: u32, selector: u32) -> Self {
        Self { device_index, selector }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.device_index, self.selector)
    }
}

/// Splits `line` at the first `_` and reads both halves as base-10 unsigned
/// integers.
///
/// A line without `_` yields `Command { 0, 0 }`, which is indistinguishable
/// from the command `0_0`. A half that does not start with a number reads as
/// 0. Line terminators must already be stripped.
pub fn parse(line: &str) -> Command {
    match line.split_once('_') {
        Some((device, selector)) => Command {
            device_index: read_ulong(device),
            selector: read_ulong(selector),
        },
        None => Command::default(),
    }
}

/// Strict variant of [`parse`]: both halves must be plain decimal numbers.
pub fn try_parse(line: &str) -> Result<Command, CommandError> {
    let (device, selector) = line.split_once('_').ok_or(CommandError::MissingSeparator)?;
    let device_index = device.parse::<u32>().map_err(CommandError::InvalidDeviceIndex)?;
    let selector = selector.parse::<u32>().map_err(CommandError::InvalidSelector)?;
    Ok(Command { device_index, selector })
}

// Reads a field the way C's `strtoul(s, NULL, 10)` does on a 32-bit target:
// leading whitespace, an optional sign, then as many digits as are present.
fn read_ulong(field: &str) -> u32 {
    let bytes = field
        .trim_start_matches(&[' ', '\t', '\n', '\x0B', '\x0C', '\r'][..])
        .as_bytes();

    let (negative, digits) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };

    let mut value: u32 = 0;
    for &b in digits.iter().take_while(|b| b.is_ascii_digit()) {
        value = match value.checked_mul(10).and_then(|v| v.checked_add(u32::from(b - b'0'))) {
            Some(v) => v,
            // Out of range saturates, sign included.
            None => return u32::MAX,
        };
    }

    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}
