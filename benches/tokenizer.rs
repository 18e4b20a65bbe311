// Copyright 2024-2025 The html5tok Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use html5tok::{IgnoreParseErrors, Tokenizer, TokenizerOpts};

/// A synthetic document exercising the common states: text, nested tags
/// with attributes, comments and an occasional entity-looking ampersand.
fn build_document(repeats: usize) -> Vec<u8> {
    let mut doc = String::from("<!DOCTYPE html>\n<html><body>\n");
    for i in 0..repeats {
        doc.push_str("<div class=\"row\" id='r");
        doc.push_str(&i.to_string());
        doc.push_str("' data-kind=plain>\n");
        doc.push_str("<p>some text with an &amp; and a <b>bold</b> span</p>\n");
        doc.push_str("<!-- a comment -->\n");
        doc.push_str("<img src=\"x.png\" alt=\"\"/>\n");
        doc.push_str("</div>\n");
    }
    doc.push_str("</body></html>\n");
    doc.into_bytes()
}

fn bench_tokenizer(c: &mut Criterion) {
    let doc = build_document(500);
    let mut group = c.benchmark_group("tokenizer");
    group.throughput(Throughput::Bytes(doc.len() as u64));
    group.bench_function("synthetic-document", |b| {
        b.iter(|| {
            let tok = Tokenizer::new(
                Cursor::new(doc.clone()),
                IgnoreParseErrors,
                TokenizerOpts::default(),
            );
            for token in tok {
                black_box(token);
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_tokenizer);
criterion_main!(benches);
