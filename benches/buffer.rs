use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pyrite_runtime::{seq, SliceSpec, StrBuf};

fn bench_buffer_append(c: &mut Criterion) {
    c.bench_function("buf_append_text_13", |b| {
        let mut buf = StrBuf::new().expect("buffer");
        b.iter(|| {
            buf.clear();
            buf.append_text(black_box("Hello, World!")).expect("append");
        });
    });
}

fn bench_buffer_fmt(c: &mut Criterion) {
    c.bench_function("buf_append_fmt", |b| {
        let mut buf = StrBuf::new().expect("buffer");
        b.iter(|| {
            buf.clear();
            buf.append_fmt(format_args!("line {} of {}", black_box(3), black_box(10)))
                .expect("append");
        });
    });
}

fn bench_normalize_slice(c: &mut Criterion) {
    c.bench_function("normalize_slice_reverse", |b| {
        let spec = SliceSpec {
            step: Some(-1),
            ..SliceSpec::full()
        };
        b.iter(|| seq::normalize_slice(black_box(spec), black_box(1024)).expect("slice"));
    });
}

criterion_group!(
    benches,
    bench_buffer_append,
    bench_buffer_fmt,
    bench_normalize_slice
);
criterion_main!(benches);
