use crate::mapping::Position;
use crate::{Error, Result};

#[derive(Debug)]
struct OpenRange {
    // index into the flat output vec
    index: usize,
    start: Position,
    // (start, end) of the last closed child, if any
    last_child: Option<(Position, Position)>,
}

/// Scopes or ranges whose end marker has not been read yet.
///
/// Decoded records live in a flat vec in the order their starts appear;
/// the stack only refers to them by index. An end marker always closes
/// the innermost open record.
///
/// A record may not start before its parent, nor before the end of the
/// sibling closed just ahead of it. Siblings therefore never overlap and
/// the last closed child is also the one reaching furthest.
#[derive(Debug, Default)]
pub(crate) struct OpenRanges {
    stack: Vec<OpenRange>,
    // end of the last closed top-level record
    last_root_end: Option<Position>,
}

impl OpenRanges {
    pub fn open(&mut self, index: usize, start: Position) -> Result<()> {
        let (parent_start, sibling_end) = match self.stack.last() {
            Some(parent) => (Some(parent.start), parent.last_child.map(|(_, end)| end)),
            None => (None, self.last_root_end),
        };
        if parent_start.map_or(false, |parent| start < parent)
            || sibling_end.map_or(false, |sibling| start < sibling)
        {
            return Err(Error::NotNested { start });
        }

        self.stack.push(OpenRange {
            index,
            start,
            last_child: None,
        });
        Ok(())
    }

    /// Closes the innermost open record at `end` and returns its index.
    pub fn close(&mut self, end: Position, offset: usize) -> Result<usize> {
        let open = self
            .stack
            .pop()
            .ok_or(Error::UnmatchedEndMarker { offset })?;

        if end < open.start {
            return Err(Error::invalid_range(open.start, end));
        }
        if let Some((child_start, child_end)) = open.last_child {
            if end < child_end {
                return Err(Error::NotNested { start: child_start });
            }
        }

        match self.stack.last_mut() {
            Some(parent) => parent.last_child = Some((open.start, end)),
            None => self.last_root_end = Some(end),
        }

        Ok(open.index)
    }

    /// Fails if anything is still open.
    pub fn finish(self) -> Result<()> {
        if self.stack.is_empty() {
            Ok(())
        } else {
            Err(Error::UnclosedRange(self.stack.len()))
        }
    }
}
