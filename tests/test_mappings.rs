mod utils;

use sora_codec::{decode, encode, Error, Segment, SourceMapLine};
use utils::Lcg;

// lines with ascending generated columns, as a generator would emit them
fn random_mappings(rng: &mut Lcg, lines: u32) -> Vec<SourceMapLine> {
    (0..lines)
        .map(|_| {
            let mut column = 0;
            (0..rng.below(8))
                .map(|_| {
                    column += rng.below(40);
                    let segment = Segment::new(column);
                    match rng.below(3) {
                        0 => segment,
                        1 => segment.with_source(rng.below(4), rng.below(500), rng.below(120)),
                        _ => segment
                            .with_source(rng.below(4), rng.below(500), rng.below(120))
                            .with_name(rng.below(30)),
                    }
                })
                .collect()
        })
        .collect()
}

#[test]
fn test_scenarios() {
    assert_eq!(
        decode("AAAA").unwrap(),
        vec![vec![Segment::new(0).with_source(0, 0, 0)]]
    );

    let decoded = decode("AAAA,CAAC;AACA").unwrap();
    let fields: Vec<Vec<Vec<u32>>> = decoded
        .iter()
        .map(|line| line.iter().map(Segment::to_vec).collect())
        .collect();
    assert_eq!(
        fields,
        vec![
            vec![vec![0, 0, 0, 0], vec![1, 0, 0, 1]],
            vec![vec![0, 0, 1, 1]],
        ]
    );

    assert_eq!(encode(&[vec![Segment::new(0)]]).unwrap(), "A");
}

#[test]
fn test_round_trip() {
    let mut rng = Lcg::new(0x5eed);
    for lines in [1, 2, 10, 200] {
        let mappings = random_mappings(&mut rng, lines);
        let encoded = encode(&mappings).unwrap();
        assert_eq!(decode(&encoded).unwrap(), mappings, "{encoded}");
        // encoding what was decoded gives the same bytes back
        assert_eq!(encode(&decode(&encoded).unwrap()).unwrap(), encoded);
    }
}

#[test]
fn test_encode_accepts_slices() {
    let lines: [&[Segment]; 2] = [&[Segment::new(0).with_source(0, 0, 0)], &[]];
    assert_eq!(encode(&lines).unwrap(), "AAAA;");
}

#[test]
fn test_encode_name_without_source() {
    assert!(matches!(
        encode(&[vec![Segment::new(0).with_name(0)]]),
        Err(Error::InvalidRecordShape(..))
    ));
}

#[test]
fn test_encode_large_output() {
    // larger than one writer buffer
    let line = vec![Segment::new(0).with_source(0, 0, 0); 10_000];
    let encoded = encode(&[line]).unwrap();
    assert_eq!(encoded.len(), 4 * 10_000 + 9_999);
    assert!(encoded.starts_with("AAAA,AAAA"));
    assert_eq!(decode(&encoded).unwrap()[0].len(), 10_000);
}

#[test]
fn test_error_display() {
    let err = decode("A*").unwrap_err();
    insta::assert_snapshot!(err, @"invalid base64 character 0x2a at offset 1");
}
