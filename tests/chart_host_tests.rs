mod support;

use std::sync::Arc;
use std::time::Duration;

use approx::assert_relative_eq;
use chart_flow::api::{
    AnimationConfig, ChartHost, ChartHostConfig, ColumnMergeMode, ConsumerKey, LayerConfig,
    ModelConsumer, ModelProducer,
};
use chart_flow::core::{
    AdaptiveYRange, AxisPosition, ColumnPartial, FixedRange, LayerPartial, MutableExtraStore,
    PiePartial, YRange,
};
use chart_flow::drawing::LayerDrawingModel;
use support::{SteppedClock, line};

const WAIT: Duration = Duration::from_secs(10);

fn columns(series: &[&[f64]]) -> LayerPartial {
    let mut builder = ColumnPartial::builder();
    for ys in series {
        builder = builder.series(ys.iter().copied());
    }
    builder.build().expect("column partial").into()
}

fn host(config: ChartHostConfig) -> Arc<ChartHost> {
    Arc::new(ChartHost::new(config).expect("host"))
}

fn register(producer: &ModelProducer, host: &Arc<ChartHost>) -> ConsumerKey {
    let key = ConsumerKey::unique();
    producer
        .register_for_updates(key, Arc::clone(host) as _, MutableExtraStore::new())
        .expect("register");
    key
}

fn commit(producer: &ModelProducer, layers: Vec<LayerPartial>) {
    producer
        .run_transaction(|tx| {
            for layer in layers {
                tx.add(layer);
            }
            Ok(())
        })
        .expect("commit");
}

#[test]
fn stacked_columns_use_aggregate_range() {
    let config = ChartHostConfig::default()
        .with_animation(AnimationConfig::disabled())
        .with_layer(LayerConfig::default().with_column_merge_mode(ColumnMergeMode::Stacked));
    let stacked = host(config);
    let grouped = host(ChartHostConfig::default().with_animation(AnimationConfig::disabled()));
    let producer = ModelProducer::new();
    register(&producer, &stacked);
    register(&producer, &grouped);

    commit(&producer, vec![columns(&[&[3.0, -1.0], &[2.0, -2.0]])]);

    let stacked_range = stacked.snapshot().expect("snapshot").ranges.y_range(None);
    let grouped_range = grouped.snapshot().expect("snapshot").ranges.y_range(None);
    assert_eq!(stacked_range, YRange::new(-3.0, 5.0));
    assert_eq!(grouped_range, YRange::new(-2.0, 3.0));
}

#[test]
fn layers_scale_against_their_own_axis() {
    let config = ChartHostConfig::default()
        .with_animation(AnimationConfig::disabled())
        .with_layer(LayerConfig::default().with_axis_position(AxisPosition::Start))
        .with_layer(LayerConfig::default().with_axis_position(AxisPosition::End));
    let host = host(config);
    let producer = ModelProducer::new();
    register(&producer, &host);

    commit(&producer, vec![line(&[0.0, 10.0]), line(&[100.0, 200.0])]);

    let drawing = host.drawing_models().expect("drawing models");
    let start = drawing.0[0].as_ref().and_then(LayerDrawingModel::as_line).expect("line");
    let end = drawing.0[1].as_ref().and_then(LayerDrawingModel::as_line).expect("line");
    assert_relative_eq!(start.get(0, 1.0).expect("point").y, 1.0);
    assert_relative_eq!(end.get(0, 0.0).expect("point").y, 0.0);
    assert_relative_eq!(end.get(0, 1.0).expect("point").y, 1.0);
}

#[test]
fn pie_layers_do_not_touch_cartesian_ranges() {
    let host = host(ChartHostConfig::default().with_animation(AnimationConfig::disabled()));
    let producer = ModelProducer::new();
    register(&producer, &host);

    let pie = PiePartial::builder()
        .series([40.0, 60.0])
        .build()
        .expect("pie")
        .into();
    commit(&producer, vec![line(&[1.0, 2.0]), pie]);

    let ranges = host.snapshot().expect("snapshot").ranges;
    assert_eq!(ranges.y_range(None), YRange::new(1.0, 2.0));
    let drawing = host.drawing_models().expect("drawing models");
    let pie = drawing.0[1].as_ref().and_then(LayerDrawingModel::as_pie).expect("pie");
    assert_relative_eq!(pie.get(0, 1.0).expect("slice").sweep, 0.6);
}

#[test]
fn range_overrides_apply_in_order() {
    let config = ChartHostConfig::default()
        .with_animation(AnimationConfig::disabled())
        .with_fixed_range(FixedRange::default().with_y(0.0, 10.0))
        .with_adaptive_y(AdaptiveYRange::new(1.2, true).expect("adaptive"));
    let host = host(config);
    let producer = ModelProducer::new();
    register(&producer, &host);
    commit(&producer, vec![line(&[3.0, 4.0])]);

    assert_eq!(
        host.snapshot().expect("snapshot").ranges.y_range(None),
        YRange::new(-1.0, 11.0)
    );
}

#[test]
fn animated_final_frame_matches_direct_jump() {
    let clock = SteppedClock::new(Duration::from_millis(10), Duration::from_millis(1));
    let animated = Arc::new(
        ChartHost::new(
            ChartHostConfig::default()
                .with_animation(AnimationConfig::default().with_duration_ms(120)),
        )
        .expect("host")
        .with_frame_clock(clock),
    );
    let jumping = host(ChartHostConfig::default().with_animation(AnimationConfig::disabled()));
    let producer = ModelProducer::new();
    register(&producer, &animated);
    register(&producer, &jumping);
    assert!(animated.await_final_frames(1, WAIT));

    commit(&producer, vec![columns(&[&[1.0, 5.0, 2.0]])]);
    assert!(animated.await_final_frames(2, WAIT));
    commit(&producer, vec![columns(&[&[4.0, 2.0]]), line(&[7.0, 8.0])]);
    assert!(animated.await_final_frames(3, WAIT));

    assert_eq!(animated.drawing_models(), jumping.drawing_models());
    assert_eq!(jumping.final_frames(), 3);
}

#[test]
fn cleared_model_removes_drawing_models() {
    let host = host(ChartHostConfig::default().with_animation(AnimationConfig::disabled()));
    let producer = ModelProducer::new();
    register(&producer, &host);

    commit(&producer, vec![line(&[1.0])]);
    assert!(host.drawing_models().is_some());
    commit(&producer, Vec::new());

    let snapshot = host.snapshot().expect("snapshot");
    assert!(snapshot.model.is_none());
    assert!(host.drawing_models().is_none());
}

#[test]
fn identity_follows_layer_configuration() {
    let plain = host(ChartHostConfig::default());
    let same = host(ChartHostConfig::default().with_frame_interval_ms(33));
    let stacked = host(
        ChartHostConfig::default()
            .with_layer(LayerConfig::default().with_column_merge_mode(ColumnMergeMode::Stacked)),
    );

    assert_eq!(plain.identity(), same.identity());
    assert_ne!(plain.identity(), stacked.identity());
}

#[test]
fn zero_frame_interval_is_rejected() {
    assert!(ChartHost::new(ChartHostConfig::default().with_frame_interval_ms(0)).is_err());
}
