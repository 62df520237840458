use crate::mapping::Position;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the codecs.
///
/// Offsets are byte offsets into the encoded input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid base64 character {byte:#04x} at offset {offset}")]
    InvalidBase64 { byte: u8, offset: usize },
    #[error("truncated VLQ sequence at offset {offset}")]
    TruncatedVlq { offset: usize },
    #[error("VLQ value at offset {offset} exceeds 32 bits")]
    VlqOverflow { offset: usize },
    #[error("value decoded at offset {offset} is out of range")]
    ValueOutOfRange { offset: usize },
    #[error("{0} scope(s) or range(s) left open at end of input")]
    UnclosedRange(usize),
    #[error("end marker at offset {offset} has no open scope or range")]
    UnmatchedEndMarker { offset: usize },
    #[error(
        "range ends at {}:{} before its start {}:{}",
        end.line,
        end.column,
        start.line,
        start.column
    )]
    InvalidRange { start: Position, end: Position },
    #[error(
        "range starting at {}:{} is not nested in its parent",
        start.line,
        start.column
    )]
    NotNested { start: Position },
    #[error("generated ranges are unordered")]
    RangesUnordered,
    #[error("record has an invalid shape: {0}")]
    InvalidRecordShape(&'static str),
}

impl Error {
    #[inline]
    pub(crate) fn invalid_range(start: Position, end: Position) -> Self {
        Self::InvalidRange { start, end }
    }

    #[inline]
    pub(crate) fn invalid_shape(reason: &'static str) -> Self {
        Self::InvalidRecordShape(reason)
    }
}

#[cfg(feature = "json")]
pub use self::parse::*;

#[cfg(feature = "json")]
mod parse {
    use super::Error;

    pub type ParseResult<T> = Result<T, ParseError>;

    /// Errors raised while reading a whole source map document.
    #[derive(Debug, thiserror::Error)]
    #[non_exhaustive]
    pub enum ParseError {
        #[error("unsupported source map format")]
        UnsupportedFormat,
        #[error("source map syntax error: {0}")]
        Syntax(Box<dyn std::error::Error + Send + Sync>),
        #[error("field `{field}` is malformed: {source}")]
        Codec {
            field: &'static str,
            #[source]
            source: Error,
        },
        #[error("a mapping references unknown source #{0}")]
        UnknownSourceReference(u32),
        #[error("a mapping references unknown name #{0}")]
        UnknownNameReference(u32),
        #[error("a generated range references unknown scope #{scope} of source #{source_index}")]
        UnknownScopeReference { source_index: u32, scope: u32 },
        #[error(
            "source map has {} sources but {} sourcesContent entries",
            sources_len,
            sources_content_len
        )]
        MismatchSourcesContent {
            sources_len: u32,
            sources_content_len: u32,
        },
        #[error(
            "source map has {} sources but {} originalScopes entries",
            sources_len,
            original_scopes_len
        )]
        MismatchOriginalScopes {
            sources_len: u32,
            original_scopes_len: u32,
        },
    }

    impl ParseError {
        #[inline]
        pub(crate) fn codec(field: &'static str) -> impl FnOnce(Error) -> Self {
            move |source| Self::Codec { field, source }
        }
    }

    impl From<simd_json::Error> for ParseError {
        fn from(value: simd_json::Error) -> Self {
            Self::Syntax(Box::new(value))
        }
    }
}
