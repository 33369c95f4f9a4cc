use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cddl_lex::{Lexer, Token};

const SAMPLE: &str = r#"
byte = uint .size 1
public-key = [24*24 byte]
adult = (~person, age: min-age .. max-age)
min-age = 18
max-age = 120
choice = "bow tie" / "necktie" / "Internet attire"
"#;

fn bench_scan_all(c: &mut Criterion) {
    c.bench_function("lex_sample_corpus", |b| {
        b.iter(|| {
            let mut lexer = Lexer::new(black_box(SAMPLE));
            loop {
                let (tok, _, _) = lexer.scan();
                if tok == Token::Eof {
                    break;
                }
            }
        })
    });
}

criterion_group!(benches, bench_scan_all);
criterion_main!(benches);
