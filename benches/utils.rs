#![allow(dead_code)]

use sora_codec::{Binding, GeneratedRange, OriginalScope, Segment, SourceMapLine};
use std::fs::File;
use std::io::Read;

pub fn read_file(path: &str) -> Vec<u8> {
    let mut file = File::open(path).unwrap();
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).unwrap();
    buf
}

// roughly the shape of minified output: few long lines, many segments each
pub fn minified_mappings(lines: u32, segments: u32) -> Vec<SourceMapLine> {
    (0..lines)
        .map(|line| {
            (0..segments)
                .map(|idx| {
                    let segment = Segment::new(idx * 7).with_source(
                        (line + idx) % 16,
                        (line * 31 + idx) % 5_000,
                        (idx * 13) % 120,
                    );
                    if idx % 3 == 0 {
                        segment.with_name(idx % 400)
                    } else {
                        segment
                    }
                })
                .collect()
        })
        .collect()
}

// a function scope per `step` lines, each holding a block scope
pub fn nested_scopes(functions: u32, step: u32) -> Vec<OriginalScope> {
    let end = functions * step + 1;
    let mut scopes = vec![OriginalScope::new((0, 0), (end, 0), 0)];
    for idx in 0..functions {
        let line = 1 + idx * step;
        scopes.push(
            OriginalScope::new((line, 0), (line + step - 1, 1), 1)
                .with_name(idx)
                .with_variables(vec![idx, idx + 1, idx + 2]),
        );
        scopes.push(OriginalScope::new((line + 1, 2), (line + 2, 3), 2).with_variables(vec![idx]));
    }
    scopes
}

// inlined calls with bindings that change halfway through
pub fn inlined_ranges(calls: u32, step: u32) -> Vec<GeneratedRange> {
    let end = calls * step + 1;
    let mut ranges = vec![GeneratedRange::new((0, 0), (end, 0))
        .with_definition(0, 0)
        .with_scope(true)];
    for idx in 0..calls {
        let line = 1 + idx * step;
        ranges.push(
            GeneratedRange::new((line, 4), (line + step - 1, 8))
                .with_definition(idx % 4, idx)
                .with_callsite(0, idx * 3, 2)
                .with_bindings(vec![
                    Binding::constant(Some(idx)),
                    Binding::constant(None).with_sub_range((line + 1, 0), Some(idx + 1)),
                ]),
        );
    }
    ranges
}
