use crate::mapping::Position;
use crate::reader::StringReader;
use crate::tree::OpenRanges;
use crate::vlq::{decode_integer, decode_u32, encode_integer, encode_u32};
use crate::writer::StringWriter;
use crate::{Error, Result};

const RANGE_HAS_DEFINITION: u32 = 0b0001;
const RANGE_HAS_CALLSITE: u32 = 0b0010;
const RANGE_IS_SCOPE: u32 = 0b0100;
const RANGE_FLAGS: u32 = RANGE_HAS_DEFINITION | RANGE_HAS_CALLSITE | RANGE_IS_SCOPE;

const RANGE_SHAPE: &str = "generated range is missing fields";
const BINDING_SHAPE: &str = "binding is missing fields";

// wire value of an expression that is not available
const NO_EXPRESSION: i64 = -1;

/// The original scope a generated range was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Definition {
    pub source_index: u32,
    /// Index of the scope in the decoded `originalScopes` entry of `source_index`.
    pub scope_index: u32,
}

/// The original location a generated range was inlined from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Callsite {
    pub source_index: u32,
    pub line: u32,
    pub column: u32,
}

/// A change of the expression bound to a variable, starting at `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubRangeBinding {
    pub from: Position,
    pub expression: Option<u32>,
}

/// The expression that holds the value of one variable of the definition scope.
///
/// `expression` applies from the start of the range. If the expression changes
/// within the range, every change is listed in `sub_ranges`.
/// `None` stands for a value that is not available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Binding {
    pub expression: Option<u32>,
    pub sub_ranges: Vec<SubRangeBinding>,
}

impl Binding {
    pub fn constant(expression: Option<u32>) -> Self {
        Self {
            expression,
            sub_ranges: Vec::new(),
        }
    }

    pub fn with_sub_range<P>(mut self, from: P, expression: Option<u32>) -> Self
    where
        P: Into<Position>,
    {
        self.sub_ranges.push(SubRangeBinding {
            from: from.into(),
            expression,
        });
        self
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.sub_ranges.is_empty()
    }
}

/// A range of generated code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneratedRange {
    pub start: Position,
    pub end: Position,
    pub definition: Option<Definition>,
    pub callsite: Option<Callsite>,
    pub is_scope: bool,
    pub bindings: Vec<Binding>,
}

impl GeneratedRange {
    pub fn new<S, E>(start: S, end: E) -> Self
    where
        S: Into<Position>,
        E: Into<Position>,
    {
        Self {
            start: start.into(),
            end: end.into(),
            definition: None,
            callsite: None,
            is_scope: false,
            bindings: Vec::new(),
        }
    }

    #[inline]
    pub fn with_definition(self, source_index: u32, scope_index: u32) -> Self {
        Self {
            definition: Some(Definition {
                source_index,
                scope_index,
            }),
            ..self
        }
    }

    #[inline]
    pub fn with_callsite(self, source_index: u32, line: u32, column: u32) -> Self {
        Self {
            callsite: Some(Callsite {
                source_index,
                line,
                column,
            }),
            ..self
        }
    }

    #[inline]
    pub fn with_scope(self, is_scope: bool) -> Self {
        Self { is_scope, ..self }
    }

    #[inline]
    pub fn with_bindings(self, bindings: Vec<Binding>) -> Self {
        Self { bindings, ..self }
    }

    /// Whether `other` lies entirely within this range.
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    fn flags(&self) -> u32 {
        let mut flags = 0;
        if self.definition.is_some() {
            flags |= RANGE_HAS_DEFINITION;
        }
        if self.callsite.is_some() {
            flags |= RANGE_HAS_CALLSITE;
        }
        if self.is_scope {
            flags |= RANGE_IS_SCOPE;
        }
        flags
    }
}

// running baselines, shared by the decoder and the encoder
#[derive(Debug, Default)]
struct RangeState {
    line: u32,
    column: u32,
    definition_source: u32,
    definition_scope: u32,
    callsite_source: u32,
    callsite_line: u32,
    callsite_column: u32,
}

/// Decodes a `generatedRanges` string.
///
/// Ranges are returned in the order their starts appear, which is a pre-order walk
/// of the range tree.
#[tracing::instrument(level = "trace", skip_all, fields(len = input.len()))]
pub fn decode_generated_ranges(input: &str) -> Result<Vec<GeneratedRange>> {
    let mut reader = StringReader::new(input);
    let mut ranges: Vec<GeneratedRange> = Vec::new();
    let mut open = OpenRanges::default();
    let mut state = RangeState::default();

    loop {
        let semi = reader.index_of(b';');
        state.column = 0;

        while reader.pos < semi {
            let offset = reader.pos;
            state.column = decode_u32(&mut reader, state.column)?;
            let pos = Position::new(state.line, state.column);

            if !reader.has_more_vlq(semi) {
                let idx = open.close(pos, offset)?;
                ranges[idx].end = pos;
                reader.finish_record(semi, RANGE_SHAPE)?;
                continue;
            }

            let flags = decode_u32(&mut reader, 0)?;
            if flags & !RANGE_FLAGS != 0 {
                return Err(Error::invalid_shape("unknown generated range flags"));
            }

            let mut range = GeneratedRange::new(pos, pos).with_scope(flags & RANGE_IS_SCOPE != 0);

            if flags & RANGE_HAS_DEFINITION != 0 {
                reader.expect_field(semi, RANGE_SHAPE)?;
                let source_index = decode_u32(&mut reader, state.definition_source)?;
                let scope_relative = if source_index == state.definition_source {
                    state.definition_scope
                } else {
                    0
                };
                reader.expect_field(semi, RANGE_SHAPE)?;
                state.definition_scope = decode_u32(&mut reader, scope_relative)?;
                state.definition_source = source_index;
                range = range.with_definition(source_index, state.definition_scope);
            }

            if flags & RANGE_HAS_CALLSITE != 0 {
                reader.expect_field(semi, RANGE_SHAPE)?;
                let source_index = decode_u32(&mut reader, state.callsite_source)?;
                let same_source = source_index == state.callsite_source;

                reader.expect_field(semi, RANGE_SHAPE)?;
                let line = decode_u32(
                    &mut reader,
                    if same_source { state.callsite_line } else { 0 },
                )?;
                let same_line = same_source && line == state.callsite_line;

                reader.expect_field(semi, RANGE_SHAPE)?;
                let column = decode_u32(
                    &mut reader,
                    if same_line { state.callsite_column } else { 0 },
                )?;

                state.callsite_source = source_index;
                state.callsite_line = line;
                state.callsite_column = column;
                range = range.with_callsite(source_index, line, column);
            }

            while reader.has_more_vlq(semi) {
                range.bindings.push(decode_binding(&mut reader, semi, pos)?);
            }

            open.open(ranges.len(), pos)?;
            ranges.push(range);
            reader.finish_record(semi, RANGE_SHAPE)?;
        }

        reader.pos = semi + 1;
        if reader.pos >= reader.len() {
            break;
        }
        state.line = state
            .line
            .checked_add(1)
            .ok_or(Error::ValueOutOfRange { offset: semi })?;
    }

    open.finish()?;
    Ok(ranges)
}

fn decode_expression(reader: &mut StringReader<'_>) -> Result<Option<u32>> {
    let offset = reader.pos;
    let value = decode_integer(reader, 0)?;
    expression_from_wire(value, offset)
}

fn expression_from_wire(value: i64, offset: usize) -> Result<Option<u32>> {
    if value == NO_EXPRESSION {
        return Ok(None);
    }
    u32::try_from(value)
        .map(Some)
        .map_err(|_| Error::ValueOutOfRange { offset })
}

fn expression_to_wire(expression: Option<u32>) -> i64 {
    expression.map_or(NO_EXPRESSION, i64::from)
}

// a count below -1 announces `-count - 1` sub-ranges after the initial expression,
// anything else is the expression itself
fn decode_binding(reader: &mut StringReader<'_>, limit: usize, start: Position) -> Result<Binding> {
    let offset = reader.pos;
    let count = decode_integer(reader, 0)?;
    if count >= NO_EXPRESSION {
        return Ok(Binding::constant(expression_from_wire(count, offset)?));
    }

    reader.expect_field(limit, BINDING_SHAPE)?;
    let mut binding = Binding::constant(decode_expression(reader)?);

    let mut line = start.line;
    let mut column = start.column;
    for _ in 0..(-count - 1) {
        reader.expect_field(limit, BINDING_SHAPE)?;
        let last_line = line;
        line = decode_u32(reader, line)?;
        reader.expect_field(limit, BINDING_SHAPE)?;
        column = decode_u32(reader, if line == last_line { column } else { 0 })?;
        reader.expect_field(limit, BINDING_SHAPE)?;
        let expression = decode_expression(reader)?;
        binding = binding.with_sub_range((line, column), expression);
    }

    Ok(binding)
}

/// Encodes ranges into a `generatedRanges` string.
///
/// `ranges` is expected in the order [decode_generated_ranges] returns them.
/// A range that starts before its parent or before the end of its previous
/// sibling fails with [Error::NotNested]. Lines are only ever moved forward;
/// writing behind the current line fails with [Error::RangesUnordered].
#[tracing::instrument(level = "trace", skip_all, fields(ranges = ranges.len()))]
pub fn encode_generated_ranges(ranges: &[GeneratedRange]) -> Result<String> {
    if ranges.is_empty() {
        return Ok(String::new());
    }

    let mut writer = StringWriter::new();
    let mut state = RangeState::default();

    let mut idx = 0;
    while idx < ranges.len() {
        idx = encode_range(ranges, idx, &mut writer, &mut state)?;
    }

    Ok(writer.flush())
}

fn encode_range(
    ranges: &[GeneratedRange],
    index: usize,
    writer: &mut StringWriter,
    state: &mut RangeState,
) -> Result<usize> {
    let range = &ranges[index];
    if range.end < range.start {
        return Err(Error::invalid_range(range.start, range.end));
    }

    move_to_line(writer, state, range.start.line, index > 0)?;
    state.column = encode_u32(writer, range.start.column, state.column);
    encode_u32(writer, range.flags(), 0);

    if let Some(definition) = range.definition {
        if definition.source_index != state.definition_source {
            state.definition_scope = 0;
        }
        state.definition_source =
            encode_u32(writer, definition.source_index, state.definition_source);
        state.definition_scope = encode_u32(writer, definition.scope_index, state.definition_scope);
    }

    if let Some(callsite) = range.callsite {
        if callsite.source_index != state.callsite_source {
            state.callsite_line = 0;
            state.callsite_column = 0;
        } else if callsite.line != state.callsite_line {
            state.callsite_column = 0;
        }
        state.callsite_source = encode_u32(writer, callsite.source_index, state.callsite_source);
        state.callsite_line = encode_u32(writer, callsite.line, state.callsite_line);
        state.callsite_column = encode_u32(writer, callsite.column, state.callsite_column);
    }

    for binding in &range.bindings {
        encode_binding(writer, binding, range.start);
    }

    let mut next = index + 1;
    while let Some(child) = ranges.get(next) {
        if child.start >= range.end {
            break;
        }
        if child.start < range.start || child.end > range.end {
            return Err(Error::NotNested { start: child.start });
        }
        next = encode_range(ranges, next, writer, state)?;
    }

    move_to_line(writer, state, range.end.line, true)?;
    state.column = encode_u32(writer, range.end.column, state.column);

    Ok(next)
}

// writes the separator in front of a record on `line`
fn move_to_line(
    writer: &mut StringWriter,
    state: &mut RangeState,
    line: u32,
    needs_comma: bool,
) -> Result<()> {
    if line < state.line {
        return Err(Error::RangesUnordered);
    }
    if state.line < line {
        catchup_line(writer, state.line, line);
        state.line = line;
        state.column = 0;
    } else if needs_comma {
        writer.write(b',');
    }
    Ok(())
}

// one `;` per line advanced; a `while (++last < line)` loop would write one too few
fn catchup_line(writer: &mut StringWriter, last_line: u32, line: u32) {
    for _ in last_line..line {
        writer.write(b';');
    }
}

fn encode_binding(writer: &mut StringWriter, binding: &Binding, start: Position) {
    if !binding.is_constant() {
        encode_integer(writer, -(binding.sub_ranges.len() as i64) - 1, 0);
    }
    encode_integer(writer, expression_to_wire(binding.expression), 0);

    let mut line = start.line;
    let mut column = start.column;
    for sub_range in &binding.sub_ranges {
        if sub_range.from.line != line {
            column = 0;
        }
        line = encode_u32(writer, sub_range.from.line, line);
        column = encode_u32(writer, sub_range.from.column, column);
        encode_integer(writer, expression_to_wire(sub_range.expression), 0);
    }
}
