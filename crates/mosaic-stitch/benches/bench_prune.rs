use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use mosaic_stitch::{
    pruner::{prune_matches, PruneThresholds},
    vision::{KeyPoint, Match},
};

// a shifted grid of keypoints where every seventh match is an outlier
fn synthetic_matches(n: usize) -> (Vec<KeyPoint>, Vec<KeyPoint>, Vec<Match>) {
    let side = (n as f64).sqrt().ceil() as usize;
    let mut object = Vec::with_capacity(n);
    let mut scene = Vec::with_capacity(n);
    let mut matches = Vec::with_capacity(n);

    for i in 0..n {
        let (x, y) = ((i % side) as f32 * 4.0, (i / side) as f32 * 4.0);
        object.push(KeyPoint::new(x, y));
        if i % 7 == 0 {
            scene.push(KeyPoint::new(y + 3.0, x * 0.5 - 20.0));
        } else {
            scene.push(KeyPoint::new(x + 120.0, y - 15.0));
        }
        matches.push(Match {
            object_idx: i,
            scene_idx: i,
            distance: 10.0 + (i % 13) as f32,
        });
    }

    (object, scene, matches)
}

fn bench_prune_matches(c: &mut Criterion) {
    let mut group = c.benchmark_group("PruneMatches");
    let thresholds = PruneThresholds::default();

    for n in [100, 1000, 10000].iter() {
        group.throughput(criterion::Throughput::Elements(*n as u64));

        let (object, scene, matches) = synthetic_matches(*n);

        group.bench_with_input(BenchmarkId::new("prune", n), &matches, |b, matches| {
            b.iter(|| {
                prune_matches(
                    black_box(matches),
                    black_box(&object),
                    black_box(&scene),
                    black_box(&thresholds),
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_prune_matches);
criterion_main!(benches);
