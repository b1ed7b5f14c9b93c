//! Assembles serial bytes into command lines.

/// Size of the firmware's receive buffer, terminator slot included.
pub const LINE_BUFFER_SIZE: usize = 16;
/// Longest line that can be received; anything past it ends the line.
pub const MAX_LINE_LEN: usize = LINE_BUFFER_SIZE - 1;

/// Collects bytes until `\n`, `\r` or a full buffer.
///
/// When a byte arrives with [`MAX_LINE_LEN`] bytes already buffered, the line
/// is closed and that byte is discarded. A bare terminator closes an empty
/// line, so a `\r\n` pair yields one extra empty line.
///
/// A NUL byte is buffered like any other and counts toward the limit, but the
/// completed line ends at the first NUL, as a C string would.
#[derive(Debug, Default, Clone)]
pub struct LineAssembler {
    buf: Vec<u8>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(MAX_LINE_LEN),
        }
    }

    /// Feeds one byte; returns the completed line, if this byte closed one.
    pub fn push(&mut self, byte: u8) -> Option<String> {
        if byte == b'\n' || byte == b'\r' || self.buf.len() >= MAX_LINE_LEN {
            let end = self.buf.iter().position(|&b| b == 0).unwrap_or(self.buf.len());
            let line = String::from_utf8_lossy(&self.buf[..end]).into_owned();
            self.buf.clear();
            return Some(line);
        }
        self.buf.push(byte);
        None
    }

    /// Bytes received for the line in progress.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }
}
