use crate::{Error, Result};

/// A cursor over an encoded string.
///
/// The reader works on bytes; every meaningful character of the format is ASCII.
#[derive(Debug)]
pub(crate) struct StringReader<'a> {
    input: &'a [u8],
    pub(crate) pos: usize,
}

impl<'a> StringReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.input.len()
    }

    /// Returns the byte under the cursor and advances past it.
    ///
    /// The cursor does not move once the input is exhausted.
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<u8> {
        let byte = self.input.get(self.pos).copied();
        if byte.is_some() {
            self.pos += 1;
        }
        byte
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Position of the next `byte` at or after the cursor, or the input length.
    #[inline]
    pub fn index_of(&self, byte: u8) -> usize {
        let start = self.pos.min(self.input.len());
        memchr::memchr(byte, &self.input[start..]).map_or(self.input.len(), |idx| start + idx)
    }

    /// Whether another field of the current record follows before `limit`.
    #[inline]
    pub fn has_more_vlq(&self, limit: usize) -> bool {
        self.pos < limit && self.peek() != Some(b',')
    }

    /// Fails with `reason` unless a field of the current record follows.
    #[inline]
    pub fn expect_field(&self, limit: usize, reason: &'static str) -> Result<()> {
        if self.has_more_vlq(limit) {
            Ok(())
        } else {
            Err(Error::invalid_shape(reason))
        }
    }

    /// Consumes the `,` that closes a record.
    ///
    /// A record has to end at `limit` or at a `,`; anything else means it carries
    /// more fields than its shape allows.
    #[inline]
    pub fn finish_record(&mut self, limit: usize, reason: &'static str) -> Result<()> {
        if self.pos >= limit {
            return Ok(());
        }
        match self.peek() {
            Some(b',') => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(Error::invalid_shape(reason)),
        }
    }
}
