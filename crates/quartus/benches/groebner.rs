//! Benchmarks for the F4 reduction engine.
//!
//! Cyclic-n systems are the standard stress test: every degree step
//! produces a dense matrix with many reducer rows.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use quartus::prelude::*;

fn cyclic(field: &PrimeField, monoid: &TermMonoid, n: usize) -> Vec<Polynomial> {
    let order = TermOrder::DegRevLex;
    let mut gens = Vec::new();
    for d in 1..n {
        let mut rows: Vec<(i64, Vec<u16>)> = Vec::new();
        for i in 0..n {
            let mut exps = vec![0u16; n];
            for k in 0..d {
                exps[(i + k) % n] += 1;
            }
            rows.push((1, exps));
        }
        let borrowed: Vec<(i64, &[u16])> = rows.iter().map(|(c, e)| (*c, e.as_slice())).collect();
        gens.push(Polynomial::build(field, monoid, order, &borrowed).unwrap());
    }
    let all = vec![1u16; n];
    gens.push(Polynomial::build(field, monoid, order, &[(1, all.as_slice()), (-1, &[])]).unwrap());
    gens
}

fn bench_cyclic(c: &mut Criterion) {
    let mut group = c.benchmark_group("cyclic");

    for n in [4usize, 5] {
        let field = PrimeField::new(32003).unwrap();
        group.bench_with_input(BenchmarkId::new("degrevlex", n), &n, |b, &n| {
            b.iter(|| {
                let monoid = TermMonoid::new(n).unwrap();
                let gens = cyclic(&field, &monoid, n);
                let f4 = F4::new(&field, &monoid, TermOrder::DegRevLex, F4Config::default());
                black_box(f4.compute(gens).unwrap())
            })
        });
    }

    group.finish();
}

fn bench_thread_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("cyclic5_threads");
    group.sample_size(10);

    for threads in [1usize, 2, 4] {
        let field = PrimeField::new(32003).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            b.iter(|| {
                let monoid = TermMonoid::new(5).unwrap();
                let gens = cyclic(&field, &monoid, 5);
                let config = F4Config {
                    threads,
                    ..F4Config::default()
                };
                let f4 = F4::new(&field, &monoid, TermOrder::DegRevLex, config);
                black_box(f4.compute(gens).unwrap())
            })
        });
    }

    group.finish();
}

criterion_group!(groebner_benches, bench_cyclic, bench_thread_scaling);
criterion_main!(groebner_benches);
