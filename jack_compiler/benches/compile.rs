use criterion::{black_box, criterion_group, criterion_main, Criterion};

use jack_compiler::{compile_str, compile_with, lex::tokenize, CompileConf, OutputMode};

fn criterion_benchmark(c: &mut Criterion) {
    let counter = include_str!("../tests/Counter.jack");
    let main = include_str!("../tests/Main.jack");

    c.bench_function("counter tokenize", |b| {
        b.iter(|| black_box(tokenize(black_box(counter)).unwrap()))
    });

    c.bench_function("counter compile", |b| {
        b.iter(|| black_box(compile_str(black_box(counter)).unwrap()))
    });

    let conf = CompileConf { mode: OutputMode::Tree };
    c.bench_function("main parse tree", |b| {
        b.iter(|| black_box(compile_with(black_box(main), &conf).unwrap()))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
