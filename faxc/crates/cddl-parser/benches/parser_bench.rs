use criterion::{black_box, criterion_group, criterion_main, Criterion};

const SAMPLE: &str = r#"
byte = uint .size 1
public-key = [24*24 byte]
adult = (~person, age: min-age .. max-age)
min-age = 18
max-age = 120
choice = "bow tie" / "necktie" / "Internet attire"
range = 0..10.0
"#;

fn bench_parse_all(c: &mut Criterion) {
    c.bench_function("parse_sample_corpus", |b| {
        b.iter(|| cddl_parser::parse(black_box(SAMPLE)))
    });
}

criterion_group!(benches, bench_parse_all);
criterion_main!(benches);
