mod utils;

use paste::paste;
use serde::Deserialize;
use sora_codec::{decode, encode, Error, Segment, SourceMapMappings};
use std::collections::HashMap;
use std::sync::OnceLock;
use utils::{camel_to_snake, read_file};

static TEST_CASES: OnceLock<HashMap<String, TestCase>> = OnceLock::new();

macro_rules! test {
    ($name:ident) => {
        paste! {
            fn $name(){
                get_test_case(stringify!($name)).test();
            }
            #[test]
            fn [<test_vector_ $name>]() {
                match std::env::var("VECTOR_TEST") {
                    Ok(t) => {
                        if t == stringify!($name) {
                            $name()
                        }
                    }
                    Err(..) => $name()
                }
            }
        }
    };
}

test!(single_segment);
test!(two_lines);
test!(column_only);
test!(empty_string);
test!(empty_lines);
test!(with_names);
test!(negative_deltas);
test!(mixed_field_counts);
test!(max_values);
test!(empty_segments);
test!(unsorted_line);
test!(negative_zero);
test!(segment_with_two_fields);
test!(segment_with_three_fields);
test!(segment_with_six_fields);
test!(non_base64_character);
test!(missing_continuation_digits);
test!(continuation_across_line);
test!(negative_column);
test!(negative_name_index);
test!(column_exceeding32_bits);

fn get_test_case(name: &str) -> &'static TestCase {
    let tests = TEST_CASES.get_or_init(|| {
        let description = read_file("data/mappings-vectors.json");
        let description = serde_json::from_slice::<TestDescription>(&description).unwrap();
        description
            .tests
            .into_iter()
            .map(|t| (camel_to_snake(&t.name), t))
            .collect::<HashMap<_, _>>()
    });
    tests.get(name).unwrap()
}

fn error_kind(err: &Error) -> &'static str {
    match err {
        Error::InvalidBase64 { .. } => "InvalidBase64",
        Error::TruncatedVlq { .. } => "TruncatedVlq",
        Error::VlqOverflow { .. } => "VlqOverflow",
        Error::ValueOutOfRange { .. } => "ValueOutOfRange",
        Error::InvalidRecordShape(..) => "InvalidRecordShape",
        _ => "Other",
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestCase {
    name: String,
    description: String,
    mappings: String,
    decoded: Option<Vec<Vec<Vec<u32>>>>,
    // the encoder's output when it differs from `mappings`
    canonical: Option<String>,
    error: Option<String>,
}

impl TestCase {
    fn expected(&self) -> SourceMapMappings {
        self.decoded
            .as_ref()
            .unwrap()
            .iter()
            .map(|line| {
                line.iter()
                    .map(|fields| Segment::try_from(fields.as_slice()).unwrap())
                    .collect()
            })
            .collect()
    }

    fn test(&self) {
        let msg = format!("[{}] {}", self.name, self.description);

        let result = decode(&self.mappings);

        if let Some(kind) = &self.error {
            let err = result.expect_err(&msg);
            assert_eq!(error_kind(&err), kind.as_str(), "{}", msg);
            return;
        }

        let decoded = result.expect(&msg);
        assert_eq!(decoded, self.expected(), "{}", msg);

        let encoded = encode(&decoded).expect(&msg);
        let canonical = self.canonical.as_deref().unwrap_or(&self.mappings);
        assert_eq!(encoded, canonical, "{}", msg);

        // re-encoding is stable
        assert_eq!(decode(&encoded).expect(&msg), decoded, "{}", msg);
    }
}

#[derive(Deserialize)]
struct TestDescription {
    tests: Vec<TestCase>,
}
