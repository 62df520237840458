use crate::mapping::Position;
use crate::reader::StringReader;
use crate::tree::OpenRanges;
use crate::vlq::{decode_u32, encode_u32};
use crate::writer::StringWriter;
use crate::{Error, Result};

const SCOPE_HAS_NAME: u32 = 0b0001;

const SCOPE_SHAPE: &str = "scope must have a kind and flags";

/// A lexical scope of an original source file.
///
/// `name` and `variables` are indices into the `names` of the source map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OriginalScope {
    pub start: Position,
    pub end: Position,
    pub kind: u32,
    pub name: Option<u32>,
    pub variables: Vec<u32>,
}

impl OriginalScope {
    pub fn new<S, E>(start: S, end: E, kind: u32) -> Self
    where
        S: Into<Position>,
        E: Into<Position>,
    {
        Self {
            start: start.into(),
            end: end.into(),
            kind,
            name: None,
            variables: Vec::new(),
        }
    }

    #[inline]
    pub fn with_name(self, name: u32) -> Self {
        Self {
            name: Some(name),
            ..self
        }
    }

    #[inline]
    pub fn with_variables(self, variables: Vec<u32>) -> Self {
        Self { variables, ..self }
    }

    /// Whether `other` lies entirely within this scope.
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Decodes one `originalScopes` entry.
///
/// Scopes are returned in the order their starts appear, which is a pre-order walk
/// of the scope tree. A scope's children are the scopes that follow it and start
/// before its end.
#[tracing::instrument(level = "trace", skip_all, fields(len = input.len()))]
pub fn decode_original_scopes(input: &str) -> Result<Vec<OriginalScope>> {
    let mut reader = StringReader::new(input);
    let len = reader.len();
    let mut scopes: Vec<OriginalScope> = Vec::new();
    let mut open = OpenRanges::default();
    let mut line = 0;

    while reader.pos < len {
        let offset = reader.pos;
        line = decode_u32(&mut reader, line)?;
        let column = decode_u32(&mut reader, 0)?;
        let pos = Position::new(line, column);

        if !reader.has_more_vlq(len) {
            let idx = open.close(pos, offset)?;
            scopes[idx].end = pos;
            reader.finish_record(len, SCOPE_SHAPE)?;
            continue;
        }

        let kind = decode_u32(&mut reader, 0)?;
        reader.expect_field(len, SCOPE_SHAPE)?;
        let flags = decode_u32(&mut reader, 0)?;
        if flags & !SCOPE_HAS_NAME != 0 {
            return Err(Error::invalid_shape("unknown scope flags"));
        }

        let name = if flags & SCOPE_HAS_NAME != 0 {
            reader.expect_field(len, "scope is missing its name")?;
            Some(decode_u32(&mut reader, 0)?)
        } else {
            None
        };

        let mut variables = Vec::new();
        while reader.has_more_vlq(len) {
            variables.push(decode_u32(&mut reader, 0)?);
        }

        open.open(scopes.len(), pos)?;
        scopes.push(OriginalScope {
            start: pos,
            end: pos,
            kind,
            name,
            variables,
        });
        reader.finish_record(len, SCOPE_SHAPE)?;
    }

    open.finish()?;
    Ok(scopes)
}

#[derive(Debug, Default)]
struct ScopeState {
    line: u32,
}

/// Encodes scopes into one `originalScopes` entry.
///
/// `scopes` is expected in the order [decode_original_scopes] returns them.
#[tracing::instrument(level = "trace", skip_all, fields(scopes = scopes.len()))]
pub fn encode_original_scopes(scopes: &[OriginalScope]) -> Result<String> {
    let mut writer = StringWriter::new();
    let mut state = ScopeState::default();

    let mut idx = 0;
    while idx < scopes.len() {
        idx = encode_scope(scopes, idx, &mut writer, &mut state)?;
    }

    Ok(writer.flush())
}

// writes the scope at `index` with all its children, returns the index after them
fn encode_scope(
    scopes: &[OriginalScope],
    index: usize,
    writer: &mut StringWriter,
    state: &mut ScopeState,
) -> Result<usize> {
    let scope = &scopes[index];
    if scope.end < scope.start {
        return Err(Error::invalid_range(scope.start, scope.end));
    }

    if index > 0 {
        writer.write(b',');
    }

    state.line = encode_u32(writer, scope.start.line, state.line);
    encode_u32(writer, scope.start.column, 0);
    encode_u32(writer, scope.kind, 0);

    match scope.name {
        Some(name) => {
            encode_u32(writer, SCOPE_HAS_NAME, 0);
            encode_u32(writer, name, 0);
        }
        None => {
            encode_u32(writer, 0, 0);
        }
    }

    for &variable in &scope.variables {
        encode_u32(writer, variable, 0);
    }

    let mut next = index + 1;
    while let Some(child) = scopes.get(next) {
        if child.start >= scope.end {
            break;
        }
        if child.start < scope.start || child.end > scope.end {
            return Err(Error::NotNested { start: child.start });
        }
        next = encode_scope(scopes, next, writer, state)?;
    }

    writer.write(b',');
    state.line = encode_u32(writer, scope.end.line, state.line);
    encode_u32(writer, scope.end.column, 0);

    Ok(next)
}
