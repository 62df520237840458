use crate::reader::StringReader;
use crate::writer::StringWriter;
use crate::{Error, Result};

const BASE64_CHARS: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const BASE64_VALUES: [i8; 256] = get_base64_map();

const VLQ_BASE_SHIFT: u32 = 5;
const VLQ_BASE_MASK: i64 = 0b11111;
const VLQ_CONTINUATION_BIT: i64 = 0b100000;

// 7 digits carry 35 bits, enough for a sign bit plus any 32 bit magnitude
const VLQ_MAX_SHIFT: u32 = 30;

const fn get_base64_map() -> [i8; 256] {
    let mut res = [-1i8; 256];
    // `for in` is not allowed in const fn
    let mut idx = 0;
    while idx < 64 {
        res[BASE64_CHARS[idx] as usize] = idx as i8;
        idx += 1;
    }
    res
}

/// Reads one VLQ value and returns `relative` moved by it.
pub(crate) fn decode_integer(reader: &mut StringReader<'_>, relative: i64) -> Result<i64> {
    let mut value = 0i64;
    let mut shift = 0;

    loop {
        let offset = reader.pos;
        let byte = reader.next().ok_or(Error::TruncatedVlq { offset })?;
        let digit = BASE64_VALUES[byte as usize] as i64;
        if digit < 0 {
            return Err(if matches!(byte, b',' | b';') {
                Error::TruncatedVlq { offset }
            } else {
                Error::InvalidBase64 { byte, offset }
            });
        }
        if shift > VLQ_MAX_SHIFT {
            return Err(Error::VlqOverflow { offset });
        }

        value |= (digit & VLQ_BASE_MASK) << shift;
        if digit & VLQ_CONTINUATION_BIT == 0 {
            break;
        }
        shift += VLQ_BASE_SHIFT;
    }

    let magnitude = value >> 1;
    Ok(if value & 1 == 1 {
        relative - magnitude
    } else {
        relative + magnitude
    })
}

/// Like [decode_integer], for fields that have to fit in a `u32`.
#[inline]
pub(crate) fn decode_u32(reader: &mut StringReader<'_>, relative: u32) -> Result<u32> {
    let offset = reader.pos;
    let value = decode_integer(reader, relative as i64)?;
    u32::try_from(value).map_err(|_| Error::ValueOutOfRange { offset })
}

/// Writes `num` as a delta against `relative` and returns `num`,
/// the baseline for the next value of the same field.
pub(crate) fn encode_integer(writer: &mut StringWriter, num: i64, relative: i64) -> i64 {
    let delta = num - relative;

    let mut vlq = if delta < 0 {
        ((-delta) << 1) | 1
    } else {
        delta << 1
    };

    loop {
        let mut digit = vlq & VLQ_BASE_MASK;
        vlq >>= VLQ_BASE_SHIFT;
        if vlq != 0 {
            digit |= VLQ_CONTINUATION_BIT;
        }
        writer.write(BASE64_CHARS[digit as usize]);
        if vlq == 0 {
            break;
        }
    }

    num
}

/// [encode_integer] for `u32` fields.
#[inline]
pub(crate) fn encode_u32(writer: &mut StringWriter, num: u32, relative: u32) -> u32 {
    encode_integer(writer, num as i64, relative as i64);
    num
}
