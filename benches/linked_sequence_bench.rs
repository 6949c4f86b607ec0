use chained_collections::LinkedSequence;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn bench_add_100k(c: &mut Criterion) {
    c.bench_function("sequence::add_100k", |b| {
        b.iter_batched(
            LinkedSequence::<u64>::new,
            |mut list| {
                for x in lcg(1).take(100_000) {
                    list.add(x);
                }
                black_box(list)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_random_1k(c: &mut Criterion) {
    c.bench_function("sequence::get_random_1k_on_10k", |b| {
        let list: LinkedSequence<u64> = lcg(3).take(10_000).collect();
        let n = list.len();
        let indices: Vec<usize> = lcg(4).take(1_000).map(|x| (x as usize) % n).collect();
        b.iter(|| {
            for &i in &indices {
                black_box(list.get(i).ok());
            }
        })
    });
}

fn bench_insert_middle_1k(c: &mut Criterion) {
    c.bench_function("sequence::insert_middle_1k_on_10k", |b| {
        b.iter_batched(
            || lcg(5).take(10_000).collect::<LinkedSequence<u64>>(),
            |mut list| {
                for x in lcg(6).take(1_000) {
                    let mid = list.len() / 2;
                    let _ = list.insert(mid, x);
                }
                black_box(list)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_cursor_remove_even_100k(c: &mut Criterion) {
    c.bench_function("sequence::cursor_remove_even_100k", |b| {
        b.iter_batched(
            || (0..100_000u64).collect::<LinkedSequence<u64>>(),
            |mut list| {
                let mut cur = list.cursor();
                while cur.has_next(&list) {
                    let even = matches!(cur.next(&list), Ok(v) if v % 2 == 0);
                    if even {
                        let _ = cur.remove(&mut list);
                    }
                }
                black_box(list)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_iter_both_ways(c: &mut Criterion) {
    c.bench_function("sequence::iter_forward_back_100k", |b| {
        let list: LinkedSequence<u64> = lcg(9).take(100_000).collect();
        b.iter(|| {
            let f = list.iter().fold(0u64, |a, v| a.wrapping_add(*v));
            let r = list.iter().rev().fold(0u64, |a, v| a.wrapping_add(*v));
            black_box((f, r))
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_add_100k,
              bench_get_random_1k,
              bench_insert_middle_1k,
              bench_cursor_remove_even_100k,
              bench_iter_both_ways
}
criterion_main!(benches);
