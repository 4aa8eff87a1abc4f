use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pyrite_runtime::{alloc, Arena};

fn bench_tracked_alloc(c: &mut Criterion) {
    c.bench_function("alloc_release_64", |b| {
        b.iter(|| {
            let mut slot = Some(alloc::alloc(black_box(64)).expect("alloc"));
            alloc::release(&mut slot);
        });
    });
}

fn bench_arena_bump(c: &mut Criterion) {
    c.bench_function("arena_bump_16x64", |b| {
        let mut arena = Arena::new().expect("arena");
        b.iter(|| {
            arena.reset();
            for _ in 0..16 {
                arena.alloc(black_box(64)).expect("bump");
            }
        });
    });
}

criterion_group!(benches, bench_tracked_alloc, bench_arena_bump);
criterion_main!(benches);
