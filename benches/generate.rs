//! Benchmark: derive and render a synthetic dialect of a few hundred messages, with and
//! without the final template pass.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mavsharp::{Compilation, Enumeration, Field, Generator, MessageBuilder, Schema, Settings};

const TYPES: [&str; 8] = ["uint8_t", "int16_t", "uint32_t", "float", "int64_t", "char", "uint16_t", "double"];

fn synthetic(messages: u32) -> Schema {
    let mut schema = Schema::new("synthetic", Settings::v2());
    let mut e = Enumeration::new("SYN_KIND");
    for v in 0..64 {
        e = e.entry(format!("SYN_KIND_{}", v), v);
    }
    schema.enums.push(e);
    for id in 0..messages {
        let mut b = MessageBuilder::new(id, format!("SYN_{}", id));
        for f in 0..(4 + id % 12) {
            let t = TYPES[((id + f) % TYPES.len() as u32) as usize];
            let field = Field::new(format!("f{}", f), t);
            b = b.field(if f % 5 == 4 { field.array(8) } else { field });
        }
        if let Ok(m) = b.build() {
            schema.messages.push(m);
        }
    }
    schema
}

fn bench_generate(c: &mut Criterion) {
    let schemas = [synthetic(400)];
    let generator = Generator::default();

    c.bench_function("compile", |b| {
        b.iter(|| Compilation::compile(black_box(&schemas)).map(|c| c.messages.len()))
    });
    c.bench_function("render", |b| {
        b.iter(|| generator.render(black_box(&schemas)).map(|s| s.len()))
    });
}

criterion_group!(benches, bench_generate);
criterion_main!(benches);
