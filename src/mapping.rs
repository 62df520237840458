use crate::{Error, Result};
use std::fmt::{Debug, Formatter};

/// `Position` represents a zero-based line and zero-based column.
///
/// Positions are ordered line first, then column, which is the order
/// generated ranges and original scopes are nested in.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn min() -> Self {
        Self { line: 0, column: 0 }
    }

    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl From<(u32, u32)> for Position {
    fn from((line, column): (u32, u32)) -> Self {
        Self::new(line, column)
    }
}

/// Presents a specific position in a specific source file.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SourceInfo {
    pub id: u32,
    pub position: Position,
}

impl SourceInfo {
    pub const fn new(id: u32, position: Position) -> Self {
        Self { id, position }
    }
}

/// One segment of a `mappings` line.
///
/// A segment carries 1, 4 or 5 fields:
///
/// - `[generated_column]`
/// - `[generated_column, source, source_line, source_column]`
/// - `[generated_column, source, source_line, source_column, name]`
///
/// The generated line is implied by the line the segment is stored in.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct Segment {
    generated_column: u32,
    source: Option<SourceInfo>,
    name: Option<u32>,
}

impl Debug for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.generated_column)?;
        if let Some(source_info) = self.source {
            write!(
                f,
                " -> {}:{}:{}",
                source_info.id, source_info.position.line, source_info.position.column,
            )?;
        }
        if let Some(name_id) = self.name {
            write!(f, " ({})", name_id)?;
        }
        Ok(())
    }
}

impl Segment {
    #[inline(always)]
    pub const fn new(generated_column: u32) -> Self {
        Self {
            generated_column,
            source: None,
            name: None,
        }
    }

    #[inline(always)]
    pub const fn with_source(self, source_id: u32, source_line: u32, source_col: u32) -> Self {
        Self {
            source: Some(SourceInfo::new(
                source_id,
                Position::new(source_line, source_col),
            )),
            ..self
        }
    }

    /// Attaches a name index.
    ///
    /// A name is only meaningful together with a source,
    /// encoding a segment with a name but no source fails.
    #[inline(always)]
    pub const fn with_name(self, name_id: u32) -> Self {
        Self {
            name: Some(name_id),
            ..self
        }
    }
}

#[allow(clippy::len_without_is_empty)]
impl Segment {
    #[inline]
    pub fn generated_column(&self) -> u32 {
        self.generated_column
    }

    #[inline]
    pub fn source_info(&self) -> Option<SourceInfo> {
        self.source
    }

    #[inline]
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    #[inline]
    pub fn name_info(&self) -> Option<u32> {
        self.name
    }

    #[inline]
    pub fn has_name(&self) -> bool {
        self.name.is_some()
    }

    /// Number of fields this segment occupies in the encoded form.
    #[inline]
    pub fn len(&self) -> usize {
        match (self.source, self.name) {
            (None, _) => 1,
            (Some(_), None) => 4,
            (Some(_), Some(_)) => 5,
        }
    }

    /// Checks whether the fields can be written out as a 1, 4 or 5 field segment.
    pub(crate) fn check_shape(&self) -> Result<()> {
        if self.source.is_none() && self.name.is_some() {
            return Err(Error::invalid_shape("segment has a name but no source"));
        }
        Ok(())
    }

    /// Returns the fields in their encoded order.
    pub fn to_vec(&self) -> Vec<u32> {
        let mut fields = Vec::with_capacity(5);
        fields.push(self.generated_column);
        if let Some(source_info) = self.source {
            fields.extend([
                source_info.id,
                source_info.position.line,
                source_info.position.column,
            ]);
            if let Some(name_id) = self.name {
                fields.push(name_id);
            }
        }
        fields
    }
}

impl TryFrom<&[u32]> for Segment {
    type Error = Error;

    fn try_from(fields: &[u32]) -> Result<Self> {
        match *fields {
            [col] => Ok(Self::new(col)),
            [col, source, line, source_col] => {
                Ok(Self::new(col).with_source(source, line, source_col))
            }
            [col, source, line, source_col, name] => Ok(Self::new(col)
                .with_source(source, line, source_col)
                .with_name(name)),
            _ => Err(Error::invalid_shape("segment must have 1, 4 or 5 fields")),
        }
    }
}

impl<const N: usize> TryFrom<[u32; N]> for Segment {
    type Error = Error;

    #[inline]
    fn try_from(fields: [u32; N]) -> Result<Self> {
        Self::try_from(&fields[..])
    }
}
