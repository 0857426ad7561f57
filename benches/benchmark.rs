use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use arena_avl::{AvlTree, TraversalOrder};

const N: usize = 100_000;

pub fn benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (1..=N).map(|_| rng.gen()).collect();

    c.bench_function("avl_insert", |b| {
        let mut tree = AvlTree::new();
        b.iter(|| {
            for value in &values {
                tree.insert(*value, *value);
            }
        })
    });

    let mut tree = AvlTree::new();
    for value in &values {
        tree.insert(*value, *value);
    }

    c.bench_function("avl_search", |b| {
        b.iter(|| {
            for value in &values {
                black_box(tree.search(value));
            }
        })
    });

    c.bench_function("avl_iter", |b| {
        b.iter(|| {
            for (k, v) in &tree {
                black_box((k, v));
            }
        })
    });

    c.bench_function("avl_level_order", |b| {
        b.iter(|| {
            tree.traverse(TraversalOrder::LevelOrder, |k, v| {
                black_box((k, v));
            })
        })
    });

    c.bench_function("avl_delete", |b| {
        b.iter_batched(
            || tree.clone(),
            |mut tree| {
                for value in &values {
                    tree.delete(value);
                }
                tree
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
