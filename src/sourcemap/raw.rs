use serde::{Deserialize, Serialize};

/// The JSON document as it is read and written, with every field left encoded.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSourceMap<'a> {
    pub version: Option<u32>,
    #[serde(borrow, default, skip_serializing_if = "Option::is_none")]
    pub file: Option<&'a str>,
    #[serde(borrow, default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<&'a str>,
    #[serde(borrow, default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Option<&'a str>>>,
    #[serde(borrow, default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<&'a str>>>,
    #[serde(borrow, default, skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<&'a str>>,
    #[serde(borrow, default, skip_serializing_if = "Option::is_none")]
    pub mappings: Option<&'a str>,
    #[serde(borrow, default, skip_serializing_if = "Option::is_none")]
    pub original_scopes: Option<Vec<&'a str>>,
    #[serde(borrow, default, skip_serializing_if = "Option::is_none")]
    pub generated_ranges: Option<&'a str>,
}

impl<'a> RawSourceMap<'a> {
    #[inline]
    pub fn from_slice(json: &'a mut [u8]) -> simd_json::Result<Self> {
        simd_json::serde::from_slice(json)
    }

    #[inline]
    pub fn from_slice_with_buffers(
        json: &'a mut [u8],
        buffers: &mut simd_json::Buffers,
    ) -> simd_json::Result<Self> {
        simd_json::serde::from_slice_with_buffers(json, buffers)
    }
}
