use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cddl_util::diagnostic::{Diagnostic, ErrorList};
use cddl_util::position::{Position, PositionRange};

fn bench_error_list_push(c: &mut Criterion) {
    c.bench_function("error_list_push_1000", |b| {
        b.iter(|| {
            let mut list = ErrorList::new();
            for i in 0..1000u32 {
                let pos = Position::new(0, i as usize, i, 1);
                let range = PositionRange::new(pos, pos.to(3));
                list.push(Diagnostic::error("parser", range, "unresolved reference"));
            }
            black_box(list.len())
        })
    });
}

criterion_group!(benches, bench_error_list_push);
criterion_main!(benches);
