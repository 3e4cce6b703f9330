use chart_flow::api::{AnimationConfig, ChartHost, ChartHostConfig, ConsumerKey, ModelProducer};
use chart_flow::core::{ColumnPartial, ExtraStore, MutableExtraStore, YRange};
use chart_flow::drawing::{DrawingModelInterpolator, column_drawing_model};
use chart_flow::sample::RandomEntriesGenerator;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

fn generator(points: f64) -> RandomEntriesGenerator {
    RandomEntriesGenerator::new(0.0..=points - 1.0, 1.0, -500.0..=500.0)
        .expect("valid generator")
        .with_seed(17)
}

fn bench_column_completion_10k(c: &mut Criterion) {
    let partial = generator(10_000.0)
        .column_partial(4)
        .expect("generated columns");

    c.bench_function("column_completion_10k", |b| {
        b.iter(|| {
            let _ = black_box(&partial).complete(ExtraStore::empty());
        })
    });
}

fn bench_drawing_interpolation_5k(c: &mut Criterion) {
    let mut generator = generator(5_000.0);
    let range = YRange::new(-1_000.0, 1_000.0);
    let mut drawing = || {
        let partial: ColumnPartial = generator.column_partial(2).expect("generated columns");
        column_drawing_model(&partial.complete(ExtraStore::empty()), range)
    };
    let mut interpolator = DrawingModelInterpolator::default();
    interpolator.set_models(Some(drawing()), Some(drawing()));

    c.bench_function("drawing_interpolation_5k", |b| {
        b.iter(|| {
            let _ = interpolator.transform(black_box(0.5));
        })
    });
}

fn bench_commit_fan_out_2k(c: &mut Criterion) {
    let producer = ModelProducer::new();
    for _ in 0..4 {
        let host = ChartHost::new(
            ChartHostConfig::default().with_animation(AnimationConfig::disabled()),
        )
        .expect("host");
        producer
            .register_for_updates(ConsumerKey::unique(), Arc::new(host), MutableExtraStore::new())
            .expect("register");
    }
    let mut generator = generator(2_000.0);
    let batches: Vec<_> = (0..8)
        .map(|_| generator.random_chart_partials().expect("generated partials"))
        .collect();
    let mut next = 0;

    c.bench_function("commit_fan_out_2k", |b| {
        b.iter(|| {
            let layers = batches[next % batches.len()].clone();
            next += 1;
            producer
                .run_transaction(|tx| {
                    for layer in layers {
                        tx.add(layer);
                    }
                    Ok(())
                })
                .expect("commit");
        })
    });
}

criterion_group!(
    benches,
    bench_column_completion_10k,
    bench_drawing_interpolation_5k,
    bench_commit_fan_out_2k
);
criterion_main!(benches);
