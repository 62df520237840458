use crate::mapping::Segment;
use crate::reader::StringReader;
use crate::vlq::{decode_u32, encode_u32};
use crate::writer::StringWriter;
use crate::Result;

/// Segments of one generated line, sorted by generated column.
pub type SourceMapLine = Vec<Segment>;

/// Decoded `mappings`, one entry per generated line.
pub type SourceMapMappings = Vec<SourceMapLine>;

const SEGMENT_SHAPE: &str = "segment must have 1, 4 or 5 fields";

// baselines carried across the whole `mappings` string;
// the generated column is reset on every line and lives outside
#[derive(Debug, Default, Copy, Clone)]
struct MappingState {
    source_id: u32,
    source_line: u32,
    source_col: u32,
    name_id: u32,
}

/// Decodes a `mappings` string.
///
/// The result has one line per `;`-separated group, so an empty string decodes to
/// a single empty line. Lines whose segments are not in ascending generated column
/// order are sorted (stably) before being returned.
///
/// # Example
/// ```
/// # use sora_codec::{decode, Segment};
/// let decoded = decode("AAAA,CAAC;AACA").unwrap();
/// assert_eq!(decoded[0][1], Segment::new(1).with_source(0, 0, 1));
/// assert_eq!(decoded[1][0], Segment::new(0).with_source(0, 1, 1));
/// ```
#[tracing::instrument(level = "trace", skip_all, fields(len = mappings.len()))]
pub fn decode(mappings: &str) -> Result<SourceMapMappings> {
    let mut reader = StringReader::new(mappings);
    let mut state = MappingState::default();
    let mut decoded = Vec::new();

    loop {
        let semi = reader.index_of(b';');
        let mut line = Vec::new();
        let mut generated_col = 0;
        let mut sorted = true;

        while reader.pos < semi {
            // empty segment
            if reader.peek() == Some(b',') {
                reader.pos += 1;
                continue;
            }

            let last_col = generated_col;
            generated_col = decode_u32(&mut reader, generated_col)?;
            if generated_col < last_col {
                sorted = false;
            }

            let mut segment = Segment::new(generated_col);
            if reader.has_more_vlq(semi) {
                state.source_id = decode_u32(&mut reader, state.source_id)?;
                reader.expect_field(semi, SEGMENT_SHAPE)?;
                state.source_line = decode_u32(&mut reader, state.source_line)?;
                reader.expect_field(semi, SEGMENT_SHAPE)?;
                state.source_col = decode_u32(&mut reader, state.source_col)?;
                segment = segment.with_source(state.source_id, state.source_line, state.source_col);

                if reader.has_more_vlq(semi) {
                    state.name_id = decode_u32(&mut reader, state.name_id)?;
                    segment = segment.with_name(state.name_id);
                }
            }

            line.push(segment);
            reader.finish_record(semi, SEGMENT_SHAPE)?;
        }

        if !sorted {
            tracing::trace!(line = decoded.len(), "sorting unordered segments");
            line.sort_by_key(Segment::generated_column);
        }

        decoded.push(line);
        reader.pos = semi + 1;
        if reader.pos > reader.len() {
            break;
        }
    }

    Ok(decoded)
}

/// Encodes lines of segments into a `mappings` string.
///
/// Segments are written in the order given.
///
/// # Example
/// ```
/// # use sora_codec::{encode, Segment};
/// let encoded = encode(&[vec![Segment::new(0)]]).unwrap();
/// assert_eq!(encoded, "A");
/// ```
#[tracing::instrument(level = "trace", skip_all, fields(lines = decoded.len()))]
pub fn encode<L>(decoded: &[L]) -> Result<String>
where
    L: AsRef<[Segment]>,
{
    let mut writer = StringWriter::new();
    let mut state = MappingState::default();

    for (line_idx, line) in decoded.iter().enumerate() {
        if line_idx > 0 {
            writer.write(b';');
        }

        let mut generated_col = 0;
        for (idx, segment) in line.as_ref().iter().enumerate() {
            segment.check_shape()?;
            if idx > 0 {
                writer.write(b',');
            }

            generated_col = encode_u32(&mut writer, segment.generated_column(), generated_col);

            if let Some(source_info) = segment.source_info() {
                state.source_id = encode_u32(&mut writer, source_info.id, state.source_id);
                state.source_line =
                    encode_u32(&mut writer, source_info.position.line, state.source_line);
                state.source_col =
                    encode_u32(&mut writer, source_info.position.column, state.source_col);

                if let Some(name_id) = segment.name_info() {
                    state.name_id = encode_u32(&mut writer, name_id, state.name_id);
                }
            }
        }
    }

    Ok(writer.flush())
}

#[cfg(test)]
mod tests {
    use super::{decode, encode};
    use crate::{Error, Segment};

    #[test]
    fn test_decode_normal() {
        let decoded = decode("AAAA,CAAC;AACA").unwrap();
        insta::assert_snapshot!(format!("{decoded:?}"), @"[[0 -> 0:0:0, 1 -> 0:0:1], [0 -> 0:1:1]]");

        assert_eq!(decode("AAAA").unwrap(), vec![vec![Segment::new(0).with_source(0, 0, 0)]]);
        assert_eq!(
            decode("AAAAC").unwrap(),
            vec![vec![Segment::new(0).with_source(0, 0, 0).with_name(1)]]
        );
    }

    #[test]
    fn test_decode_empty_lines() {
        assert_eq!(decode("").unwrap(), vec![vec![]]);
        assert_eq!(decode(";").unwrap(), vec![vec![], vec![]]);
        assert_eq!(decode("A;").unwrap(), vec![vec![Segment::new(0)], vec![]]);
        let decoded = decode(";;GAAA,,EAAC;").unwrap();
        insta::assert_snapshot!(format!("{decoded:?}"), @"[[], [], [3 -> 0:0:0, 5 -> 0:0:1], []]");
    }

    #[test]
    fn test_decode_unsorted() {
        let decoded = decode("KAAA,DAAC").unwrap();
        insta::assert_snapshot!(format!("{decoded:?}"), @"[[4 -> 0:0:1, 5 -> 0:0:0]]");
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(
            decode("AA"),
            Err(Error::InvalidRecordShape(..))
        ));
        assert!(matches!(
            decode("AAA,A"),
            Err(Error::InvalidRecordShape(..))
        ));
        assert!(matches!(
            decode("AAAAAA"),
            Err(Error::InvalidRecordShape(..))
        ));
        assert_eq!(decode("AAAg"), Err(Error::TruncatedVlq { offset: 4 }));
        assert_eq!(decode("A*AA"), Err(Error::InvalidBase64 { byte: b'*', offset: 1 }));
        // generated column below zero
        assert_eq!(decode("D"), Err(Error::ValueOutOfRange { offset: 0 }));
        // source line below zero
        assert_eq!(decode(";;yZCTnK"), Err(Error::ValueOutOfRange { offset: 5 }));
    }

    #[test]
    fn test_encode_normal() {
        assert_eq!(encode(&[vec![Segment::new(0)]]).unwrap(), "A");
        assert_eq!(encode::<Vec<Segment>>(&[]).unwrap(), "");
        assert_eq!(encode(&[Vec::<Segment>::new(), vec![]]).unwrap(), ";");

        let lines = [
            vec![
                Segment::new(0).with_source(0, 0, 0),
                Segment::new(1).with_source(0, 0, 1),
            ],
            vec![Segment::new(0).with_source(0, 1, 1)],
        ];
        assert_eq!(encode(&lines).unwrap(), "AAAA,CAAC;AACA");
    }

    #[test]
    fn test_encode_invalid_shape() {
        let lines = [[Segment::new(0).with_name(0)]];
        assert!(matches!(
            encode(&lines),
            Err(Error::InvalidRecordShape(..))
        ));
    }

    #[test]
    fn test_round_trip() {
        let input = "AAAA,IAAI,CAAC,SAAS;;AAEA,KAAK,CAAW;AAAA,GAAG,EAAE";
        let decoded = decode(input).unwrap();
        assert_eq!(encode(&decoded).unwrap(), input);
        assert_eq!(decode(&encode(&decoded).unwrap()).unwrap(), decoded);
    }
}
