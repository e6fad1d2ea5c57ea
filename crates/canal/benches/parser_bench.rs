//! 파서 처리량 벤치마크

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ceelog_canal::parse_bytes;

fn bench_parser(c: &mut Criterion) {
    let plain = b"<191>2006-01-02T15:04:05.999999-07:00 host.example.org test: hello world\n";
    let cee = b"<191>2006-01-02T15:04:05.999999-07:00 host.example.org test: @cee:{\"a\":\"b\"}\n";
    let legacy = b"<38>Mon Jan  2 15:04:05 host.example.org test: hello world\n";

    c.bench_function("parse_plain", |b| {
        b.iter(|| parse_bytes(black_box(plain)).unwrap())
    });
    c.bench_function("parse_cee", |b| {
        b.iter(|| parse_bytes(black_box(cee)).unwrap())
    });
    // 레거시 형식은 형식 테이블을 끝까지 훑는 최악 경로다
    c.bench_function("parse_least_likely_time", |b| {
        b.iter(|| parse_bytes(black_box(legacy)).unwrap())
    });
    c.bench_function("parse_and_serialize", |b| {
        b.iter(|| parse_bytes(black_box(plain)).unwrap().serialize())
    });
}

criterion_group!(benches, bench_parser);
criterion_main!(benches);
