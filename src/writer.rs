/// Size of the staging buffer of [StringWriter].
pub(crate) const BUFFER_LENGTH: usize = 1024 * 16;

/// Accumulates encoded output.
///
/// Bytes are staged in a fixed-size buffer and moved into the output string
/// in bulk whenever the buffer fills up.
#[derive(Debug)]
pub(crate) struct StringWriter {
    out: String,
    buffer: Vec<u8>,
}

impl StringWriter {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            buffer: Vec::with_capacity(BUFFER_LENGTH),
        }
    }

    /// Appends one ASCII byte.
    #[inline]
    pub fn write(&mut self, byte: u8) {
        debug_assert!(byte.is_ascii());
        self.buffer.push(byte);
        if self.buffer.len() == BUFFER_LENGTH {
            self.drain();
        }
    }

    fn drain(&mut self) {
        // SAFETY: only base64 digits, `,` and `;` are ever written, all of which are ASCII
        self.out
            .push_str(unsafe { std::str::from_utf8_unchecked(&self.buffer) });
        self.buffer.clear();
    }

    /// Returns everything written so far.
    pub fn flush(mut self) -> String {
        if !self.buffer.is_empty() {
            self.drain();
        }
        self.out
    }
}
