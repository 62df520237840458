use crate::mappings::{decode, encode, SourceMapMappings};
use crate::ranges::{decode_generated_ranges, encode_generated_ranges, GeneratedRange};
use crate::scopes::{decode_original_scopes, encode_original_scopes, OriginalScope};
use crate::sourcemap::raw::RawSourceMap;
use crate::{ParseError, ParseResult};
use simd_json::Buffers;
use std::borrow::Cow;
use std::fmt::{Debug, Formatter};
use std::io;
use std::io::Write;
use std::iter::repeat_with;
use tracing::debug;

/// `DecodedSourceMap` is a version 3 source map with `mappings`, `originalScopes`
/// and `generatedRanges` decoded.
///
/// Strings are borrowed from the parsed buffer where possible.
/// Use [into_owned](DecodedSourceMap::into_owned) to detach it from the buffer.
///
/// # Methods
///
/// ## Parsing
///
/// - [`DecodedSourceMap::from_slice`]
/// - [`DecodedSourceMap::from_slice_with_buffers`]
///
/// These methods take mutable references because escape sequences are replaced
/// in place.
///
/// ## Access & Modification
///
/// Every field has a getter and a `_mut` variant. After making changes, call
/// [`validate`](DecodedSourceMap::validate) to make sure all indices still point at
/// existing entries.
///
/// ## Output
///
/// - [`write`](DecodedSourceMap::write)
/// - [`to_vec`](DecodedSourceMap::to_vec)
/// - [`to_string`](DecodedSourceMap::to_string)
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DecodedSourceMap<'a> {
    pub(crate) file: Option<Cow<'a, str>>,
    pub(crate) source_root: Option<Cow<'a, str>>,
    pub(crate) sources: Vec<Option<Cow<'a, str>>>,
    pub(crate) sources_content: Vec<Option<Cow<'a, str>>>,
    pub(crate) names: Vec<Cow<'a, str>>,
    pub(crate) mappings: SourceMapMappings,
    pub(crate) original_scopes: Vec<Vec<OriginalScope>>,
    pub(crate) generated_ranges: Vec<GeneratedRange>,
}

impl Debug for DecodedSourceMap<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SourceMap\n")?;
        f.write_str("  sources:\n")?;
        for (idx, source) in self.sources.iter().enumerate() {
            let source = source.as_ref().map(Cow::as_ref).unwrap_or("");
            writeln!(f, "    {idx}: {source}")?;
        }
        f.write_str("  names:\n")?;
        for (idx, name) in self.names.iter().enumerate() {
            writeln!(f, "    {idx}: {name}")?;
        }
        f.write_str("  mappings:\n")?;
        for line in &self.mappings {
            f.write_str("    ")?;
            for (idx, segment) in line.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{:?}", segment)?;
            }
            f.write_str("\n")?;
        }
        if !self.original_scopes.is_empty() {
            f.write_str("  original scopes:\n")?;
            for (idx, scopes) in self.original_scopes.iter().enumerate() {
                writeln!(f, "    {idx}: {} scope(s)", scopes.len())?;
            }
        }
        if !self.generated_ranges.is_empty() {
            writeln!(
                f,
                "  generated ranges: {} range(s)",
                self.generated_ranges.len()
            )?;
        }
        Ok(())
    }
}

impl DecodedSourceMap<'_> {
    /// Checks that every index in the decoded fields refers to an existing entry.
    ///
    /// `originalScopes` may be left empty; otherwise it needs one entry per source.
    pub fn validate(&self) -> ParseResult<()> {
        let sources_len = self.sources.len() as u32;
        let names_len = self.names.len() as u32;

        if self.sources_content.len() as u32 != sources_len {
            return Err(ParseError::MismatchSourcesContent {
                sources_len,
                sources_content_len: self.sources_content.len() as u32,
            });
        }
        if !self.original_scopes.is_empty() && self.original_scopes.len() as u32 != sources_len {
            return Err(ParseError::MismatchOriginalScopes {
                sources_len,
                original_scopes_len: self.original_scopes.len() as u32,
            });
        }

        let check_source = |id: u32| {
            if id < sources_len {
                Ok(())
            } else {
                Err(ParseError::UnknownSourceReference(id))
            }
        };
        let check_name = |id: u32| {
            if id < names_len {
                Ok(())
            } else {
                Err(ParseError::UnknownNameReference(id))
            }
        };

        for segment in self.mappings.iter().flatten() {
            if let Some(source) = segment.source_info() {
                check_source(source.id)?;
            }
            if let Some(name) = segment.name_info() {
                check_name(name)?;
            }
        }

        for scope in self.original_scopes.iter().flatten() {
            if let Some(name) = scope.name {
                check_name(name)?;
            }
            for &variable in &scope.variables {
                check_name(variable)?;
            }
        }

        for range in &self.generated_ranges {
            if let Some(definition) = range.definition {
                let known = self
                    .original_scopes
                    .get(definition.source_index as usize)
                    .map_or(false, |scopes| (definition.scope_index as usize) < scopes.len());
                if !known {
                    return Err(ParseError::UnknownScopeReference {
                        source_index: definition.source_index,
                        scope: definition.scope_index,
                    });
                }
            }
            if let Some(callsite) = range.callsite {
                check_source(callsite.source_index)?;
            }
            for binding in &range.bindings {
                let expressions = binding
                    .sub_ranges
                    .iter()
                    .map(|sub_range| sub_range.expression);
                for expression in std::iter::once(binding.expression)
                    .chain(expressions)
                    .flatten()
                {
                    check_name(expression)?;
                }
            }
        }

        Ok(())
    }

    /// Converts into a source map that owns all its strings.
    pub fn into_owned(self) -> DecodedSourceMap<'static> {
        fn owned(s: Cow<'_, str>) -> Cow<'static, str> {
            Cow::Owned(s.into_owned())
        }

        DecodedSourceMap {
            file: self.file.map(owned),
            source_root: self.source_root.map(owned),
            sources: self.sources.into_iter().map(|s| s.map(owned)).collect(),
            sources_content: self
                .sources_content
                .into_iter()
                .map(|s| s.map(owned))
                .collect(),
            names: self.names.into_iter().map(owned).collect(),
            mappings: self.mappings,
            original_scopes: self.original_scopes,
            generated_ranges: self.generated_ranges,
        }
    }
}

impl<'a> DecodedSourceMap<'a> {
    #[inline]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    #[inline]
    pub fn file_mut(&mut self) -> &mut Option<Cow<'a, str>> {
        &mut self.file
    }

    #[inline]
    pub fn source_root(&self) -> Option<&str> {
        self.source_root.as_deref()
    }

    #[inline]
    pub fn source_root_mut(&mut self) -> &mut Option<Cow<'a, str>> {
        &mut self.source_root
    }

    #[inline]
    pub fn sources(&self) -> &[Option<Cow<'a, str>>] {
        &self.sources
    }

    #[inline]
    pub fn sources_mut(&mut self) -> &mut Vec<Option<Cow<'a, str>>> {
        &mut self.sources
    }

    #[inline]
    pub fn sources_content(&self) -> &[Option<Cow<'a, str>>] {
        &self.sources_content
    }

    #[inline]
    pub fn sources_content_mut(&mut self) -> &mut Vec<Option<Cow<'a, str>>> {
        &mut self.sources_content
    }

    #[inline]
    pub fn names(&self) -> &[Cow<'a, str>] {
        &self.names
    }

    #[inline]
    pub fn names_mut(&mut self) -> &mut Vec<Cow<'a, str>> {
        &mut self.names
    }

    #[inline]
    pub fn mappings(&self) -> &SourceMapMappings {
        &self.mappings
    }

    #[inline]
    pub fn mappings_mut(&mut self) -> &mut SourceMapMappings {
        &mut self.mappings
    }

    #[inline]
    pub fn original_scopes(&self) -> &[Vec<OriginalScope>] {
        &self.original_scopes
    }

    #[inline]
    pub fn original_scopes_mut(&mut self) -> &mut Vec<Vec<OriginalScope>> {
        &mut self.original_scopes
    }

    #[inline]
    pub fn generated_ranges(&self) -> &[GeneratedRange] {
        &self.generated_ranges
    }

    #[inline]
    pub fn generated_ranges_mut(&mut self) -> &mut Vec<GeneratedRange> {
        &mut self.generated_ranges
    }
}

impl<'a> DecodedSourceMap<'a> {
    fn from_raw(raw: RawSourceMap<'a>) -> ParseResult<Self> {
        if !matches!(raw.version, Some(3)) {
            debug!(version = ?raw.version, "rejecting source map");
            return Err(ParseError::UnsupportedFormat);
        }

        let sources: Vec<_> = raw
            .sources
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.map(Cow::Borrowed))
            .collect();
        let sources_len = sources.len();

        let sources_content = match raw.sources_content {
            Some(sources_content) => {
                if sources_content.len() != sources_len {
                    return Err(ParseError::MismatchSourcesContent {
                        sources_len: sources_len as u32,
                        sources_content_len: sources_content.len() as u32,
                    });
                }
                sources_content
                    .into_iter()
                    .map(|s| s.map(Cow::Borrowed))
                    .collect()
            }
            None => repeat_with(|| None).take(sources_len).collect(),
        };

        let original_scopes = raw
            .original_scopes
            .unwrap_or_default()
            .into_iter()
            .map(decode_original_scopes)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ParseError::codec("originalScopes"))?;

        let sm = Self {
            file: raw.file.map(Cow::Borrowed),
            source_root: raw.source_root.map(Cow::Borrowed),
            sources,
            sources_content,
            names: raw
                .names
                .unwrap_or_default()
                .into_iter()
                .map(Cow::Borrowed)
                .collect(),
            mappings: decode(raw.mappings.unwrap_or_default())
                .map_err(ParseError::codec("mappings"))?,
            original_scopes,
            generated_ranges: decode_generated_ranges(raw.generated_ranges.unwrap_or_default())
                .map_err(ParseError::codec("generatedRanges"))?,
        };

        if let Err(err) = sm.validate() {
            debug!(%err, "decoded source map is inconsistent");
            return Err(err);
        }
        Ok(sm)
    }

    /// Parses a source map from a JSON buffer slice.
    ///
    /// The slice is mutable to facilitate in-place replacement of escape characters
    /// in the JSON string, allowing maximum data borrowing.
    #[inline]
    pub fn from_slice(json: &'a mut [u8]) -> ParseResult<Self> {
        Self::from_raw(RawSourceMap::from_slice(json)?)
    }

    /// Similar to [Self::from_slice],
    /// but reuses a buffer for strings to be copied in and out if needed.
    #[inline]
    pub fn from_slice_with_buffers(json: &'a mut [u8], buffers: &mut Buffers) -> ParseResult<Self> {
        Self::from_raw(RawSourceMap::from_slice_with_buffers(json, buffers)?)
    }
}

fn invalid_data(err: crate::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}

impl DecodedSourceMap<'_> {
    /// Encodes every decoded field and writes the map as JSON.
    ///
    /// `names` is left out when empty, as are `sourcesContent` when no source has
    /// content and the two scope fields when they carry nothing.
    pub fn write<W>(&self, w: &mut W) -> io::Result<()>
    where
        W: Write,
    {
        let mappings = encode(&self.mappings).map_err(invalid_data)?;
        let original_scopes = self
            .original_scopes
            .iter()
            .map(|scopes| encode_original_scopes(scopes))
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid_data)?;
        let generated_ranges = encode_generated_ranges(&self.generated_ranges).map_err(invalid_data)?;

        let raw = RawSourceMap {
            version: Some(3),
            file: self.file.as_deref(),
            source_root: self.source_root.as_deref(),
            sources: Some(self.sources.iter().map(|s| s.as_deref()).collect()),
            sources_content: self
                .sources_content
                .iter()
                .any(Option::is_some)
                .then(|| self.sources_content.iter().map(|s| s.as_deref()).collect()),
            names: (!self.names.is_empty()).then(|| self.names.iter().map(Cow::as_ref).collect()),
            mappings: Some(mappings.as_str()),
            original_scopes: (!original_scopes.is_empty())
                .then(|| original_scopes.iter().map(String::as_str).collect()),
            generated_ranges: (!generated_ranges.is_empty()).then_some(generated_ranges.as_str()),
        };

        simd_json::serde::to_writer(w, &raw)?;
        Ok(())
    }

    #[inline]
    pub fn to_vec(&self) -> io::Result<Vec<u8>> {
        let mut v = Vec::with_capacity(1024);
        self.write(&mut v)?;
        Ok(v)
    }

    #[inline]
    pub fn to_string(&self) -> io::Result<String> {
        // SAFETY: the serializer only emits valid UTF-8.
        self.to_vec()
            .map(|v| unsafe { String::from_utf8_unchecked(v) })
    }
}
