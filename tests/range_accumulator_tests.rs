use approx::assert_relative_eq;
use chart_flow::core::{AdaptiveYRange, AxisPosition, FixedRange, RangeAccumulator, YRange};

#[test]
fn untouched_accumulator_is_neutral() {
    let ranges = RangeAccumulator::new().to_ranges();
    assert_eq!(ranges.min_x(), 0.0);
    assert_eq!(ranges.max_x(), 0.0);
    assert_eq!(ranges.x_step(), 1.0);
    assert_eq!(ranges.y_range(None), YRange::new(0.0, 0.0));
    assert_eq!(ranges.y_range(Some(AxisPosition::End)), YRange::new(0.0, 0.0));
}

#[test]
fn updates_widen_default_and_axis_ranges() {
    let mut accumulator = RangeAccumulator::new();
    accumulator.try_update(1.0, 5.0, -2.0, 4.0, Some(AxisPosition::Start));
    accumulator.try_update(0.0, 3.0, 10.0, 20.0, Some(AxisPosition::End));
    accumulator.try_update(2.0, 9.0, 1.0, 2.0, None);

    let ranges = accumulator.to_ranges();
    assert_eq!(ranges.min_x(), 0.0);
    assert_eq!(ranges.max_x(), 9.0);
    assert_eq!(ranges.x_length(), 9.0);
    assert_eq!(ranges.y_range(None), YRange::new(-2.0, 20.0));
    assert_eq!(ranges.y_range(Some(AxisPosition::Start)), YRange::new(-2.0, 4.0));
    assert_eq!(ranges.y_range(Some(AxisPosition::End)), YRange::new(10.0, 20.0));
}

#[test]
fn unknown_axis_falls_back_to_default_range() {
    let mut accumulator = RangeAccumulator::new();
    accumulator.try_update(0.0, 1.0, 3.0, 8.0, None);
    assert_eq!(
        accumulator.to_ranges().y_range(Some(AxisPosition::End)),
        YRange::new(3.0, 8.0)
    );
}

#[test]
fn reset_clears_bounds_and_step() {
    let mut accumulator = RangeAccumulator::new();
    accumulator.try_update(4.0, 5.0, 6.0, 7.0, Some(AxisPosition::Start));
    accumulator.set_x_step(0.5);
    accumulator.reset();
    assert_eq!(accumulator, RangeAccumulator::new());
}

#[test]
fn fixed_range_pins_selected_bounds() {
    let mut accumulator = RangeAccumulator::new();
    accumulator.try_update(1.0, 4.0, -3.0, 12.0, Some(AxisPosition::End));
    accumulator.apply_override(&FixedRange::default().with_y(0.0, 10.0));

    let ranges = accumulator.to_ranges();
    assert_eq!(ranges.min_x(), 1.0);
    assert_eq!(ranges.max_x(), 4.0);
    assert_eq!(ranges.y_range(None), YRange::new(0.0, 10.0));
    assert_eq!(ranges.y_range(Some(AxisPosition::End)), YRange::new(0.0, 10.0));
}

#[test]
fn adaptive_range_pads_and_rounds_outward() {
    let mut accumulator = RangeAccumulator::new();
    accumulator.try_update(0.0, 1.0, 1.2, 3.2, None);
    accumulator.apply_override(&AdaptiveYRange::new(1.5, false).expect("adaptive"));
    let padded = accumulator.to_ranges().y_range(None);
    assert_relative_eq!(padded.min_y, 0.7, epsilon = 1e-12);
    assert_relative_eq!(padded.max_y, 3.7, epsilon = 1e-12);

    let mut accumulator = RangeAccumulator::new();
    accumulator.try_update(0.0, 1.0, 1.2, 3.2, None);
    accumulator.apply_override(&AdaptiveYRange::new(1.5, true).expect("adaptive"));
    assert_eq!(accumulator.to_ranges().y_range(None), YRange::new(0.0, 4.0));
}

#[test]
fn adaptive_range_rejects_shrinking_fraction() {
    assert!(AdaptiveYRange::new(0.9, false).is_err());
    assert!(AdaptiveYRange::new(f64::NAN, false).is_err());
}
