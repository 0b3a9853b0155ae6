use approx::assert_abs_diff_eq;
use meander_rs::axis::{self, AxisCurve};
use meander_rs::ecology::{HealthInputs, classify_health};
use meander_rs::meander::synthesize_meander;
use meander_rs::{GeoPoint, SmoothingConfig, StreamHealth, StreamParams, ValleyLine, design_channel};

// Three points spanning roughly 500 m with a gentle bend
fn valley() -> ValleyLine {
    ValleyLine::new(vec![
        GeoPoint::new(45.0, -122.0),
        GeoPoint::new(45.0005, -121.99685),
        GeoPoint::new(45.0, -121.9937),
    ])
}

fn scenario() -> StreamParams {
    StreamParams {
        valley_slope_percent: 2.5,
        bankfull_width: 8.0,
        bankfull_depth: 1.2,
        mannings_n: 0.045,
        wavelength: 100.0,
        amplitude: 20.0,
        sinuosity_target: 1.4,
        valley_line: valley(),
    }
}

#[test]
fn end_to_end_scenario() {
    let params = scenario();
    let length = params.valley_line.length_m();
    assert!(length > 450.0 && length < 550.0, "valley length {}", length);

    let design = design_channel(&params, &SmoothingConfig::default(), 20).unwrap();
    let h = &design.hydraulics;
    let e = &design.ecology;

    assert!(h.sinuosity_index > 1.0 && h.sinuosity_index < 1.8, "sinuosity {}", h.sinuosity_index);
    assert!(h.new_velocity < h.original_velocity);
    assert!(e.habitat_units >= 1);
    assert!(h.shear_stress > 0.0 && h.stream_power > 0.0);

    // lambda = 100 m, a = 20 m puts the bend radius at ~12.7 m, under 2x the
    // 8 m width, so the avulsion rule takes priority over the sinuosity bands
    assert!(h.radius_of_curvature / params.bankfull_width < 2.0);
    assert_eq!(e.health, StreamHealth::HighRisk);
    assert_eq!(e.warnings.len(), 1);
}

#[test]
fn wide_bends_at_the_same_sinuosity_are_recovering_or_stable() {
    let params = StreamParams {
        wavelength: 200.0,
        amplitude: 40.0,
        ..scenario()
    };
    let design = design_channel(&params, &SmoothingConfig::default(), 20).unwrap();
    let h = &design.hydraulics;
    assert!(h.radius_of_curvature / params.bankfull_width >= 2.0);
    assert!(h.sinuosity_index > 1.0 && h.sinuosity_index < 1.8);
    assert!(matches!(
        design.ecology.health,
        StreamHealth::Recovering | StreamHealth::Stable
    ));
    assert!(design.ecology.warnings.is_empty());
}

#[test]
fn sinuosity_never_drops_below_one_and_channel_never_shortens() {
    let smoothing = SmoothingConfig::default();
    for &amplitude in &[0.0, 2.0, 10.0, 25.0] {
        for &wavelength in &[5.0, 60.0, 150.0, 400.0] {
            let params = StreamParams {
                amplitude,
                wavelength,
                ..scenario()
            };
            let h = design_channel(&params, &smoothing, 20).unwrap().hydraulics;
            assert!(h.sinuosity_index >= 1.0);
            assert!(
                h.channel_length >= h.valley_length,
                "amplitude {} wavelength {}: {} < {}",
                amplitude,
                wavelength,
                h.channel_length,
                h.valley_length
            );
        }
    }
}

#[test]
fn zero_amplitude_reproduces_the_axis() {
    let params = StreamParams {
        amplitude: 0.0,
        ..scenario()
    };
    let smoothing = SmoothingConfig::default();
    let design = design_channel(&params, &smoothing, 20).unwrap();
    let axis = axis::smooth(&params.valley_line, &smoothing).unwrap();

    let path = design.meander_path.points();
    let n = path.len() - 1;
    for (i, p) in path.iter().enumerate() {
        let expected = axis.point_at(i as f64 / n as f64 * axis.length());
        assert_abs_diff_eq!(p.distance_to(&expected), 0.0, epsilon = 1e-6);
    }
    assert_eq!(design.hydraulics.sinuosity_index, 1.0);
    assert_eq!(design.hydraulics.new_velocity, design.hydraulics.original_velocity);
}

#[test]
fn zero_amplitude_on_a_sharp_bend_is_exactly_unit_sinuosity() {
    let params = StreamParams {
        amplitude: 0.0,
        valley_line: ValleyLine::new(vec![
            GeoPoint::new(45.0, -122.0),
            GeoPoint::new(45.003, -121.998),
            GeoPoint::new(45.0, -121.996),
        ]),
        ..scenario()
    };
    for wavelength in [25.0, 100.0, 310.0] {
        let params = params.with_wavelength(wavelength);
        let design = design_channel(&params, &SmoothingConfig::default(), 20).unwrap();
        assert_eq!(design.hydraulics.sinuosity_index, 1.0, "wavelength {}", wavelength);
        assert_eq!(design.hydraulics.channel_length, design.hydraulics.valley_length);
    }
}

#[test]
fn path_endpoints_meet_the_valley_endpoints() {
    let params = scenario();
    let design = design_channel(&params, &SmoothingConfig::default(), 20).unwrap();
    let path = design.meander_path.points();
    let valley = params.valley_line.points();
    assert_eq!(path[0], valley[0]);
    assert_eq!(path[path.len() - 1], valley[valley.len() - 1]);
}

#[test]
fn more_amplitude_never_reduces_sinuosity() {
    let smoothing = SmoothingConfig::default();
    let mut previous = 0.0;
    for amplitude in [0.0, 5.0, 10.0, 15.0, 20.0, 30.0, 40.0] {
        let params = StreamParams {
            amplitude,
            ..scenario()
        };
        let h = design_channel(&params, &smoothing, 20).unwrap().hydraulics;
        assert!(h.sinuosity_index >= previous, "amplitude {}", amplitude);
        if h.sinuosity_index > 1.0 {
            assert!(h.new_velocity <= h.original_velocity);
        }
        previous = h.sinuosity_index;
    }
}

#[test]
fn avulsion_boundary_for_an_eight_meter_channel() {
    // lambda = 100 m, a = 16 m: radius ~15.8 m, ratio just under 2
    let params = StreamParams {
        amplitude: 16.0,
        ..scenario()
    };
    let design = design_channel(&params, &SmoothingConfig::default(), 20).unwrap();
    let h = design.hydraulics;
    let ratio = h.radius_of_curvature / params.bankfull_width;
    assert!(ratio < 2.0 && ratio > 1.9, "ratio {}", ratio);
    assert!(h.sinuosity_index > 1.05);
    assert_eq!(design.ecology.health, StreamHealth::HighRisk);

    // same bend geometry on a channel that is barely sinuous
    let straightish = meander_rs::HydraulicMetrics {
        sinuosity_index: 1.05,
        ..h
    };
    let inputs = HealthInputs::new(&straightish, &params);
    assert_ne!(classify_health(&inputs).health, StreamHealth::HighRisk);
}

#[test]
fn meander_fed_back_as_a_valley_reproduces_itself() {
    let smoothing = SmoothingConfig::default();
    let params = scenario();
    let original = synthesize_meander(&params.valley_line, 20.0, 100.0, 20, &smoothing);

    let replay = synthesize_meander(&original.to_valley_line(), 0.0, 100.0, 20, &smoothing);
    let (a, b) = (original.length_m(), replay.length_m());
    assert!((a - b).abs() / a < 0.02, "lengths {} vs {}", a, b);

    let first = original.points()[0];
    let last = original.points()[original.len() - 1];
    assert_abs_diff_eq!(replay.points()[0].distance_to(&first), 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(
        replay.points()[replay.len() - 1].distance_to(&last),
        0.0,
        epsilon = 1e-6
    );

    // every replayed point lies on the original centerline, within a sample spacing
    for p in replay.points() {
        let nearest = original
            .points()
            .iter()
            .map(|q| q.distance_to(p))
            .fold(f64::INFINITY, f64::min);
        assert!(nearest < 6.0, "replayed point {:?} is {} m off", p, nearest);
    }
}

#[test]
fn single_point_valley_degrades_gracefully() {
    let params = StreamParams {
        valley_line: ValleyLine::new(vec![GeoPoint::new(45.0, -122.0)]),
        ..scenario()
    };
    let design = design_channel(&params, &SmoothingConfig::default(), 20).unwrap();
    assert!(design.meander_path.is_empty());
    assert_eq!(design.hydraulics.sinuosity_index, 1.0);
    assert!(design.hydraulics.new_velocity.is_finite());
}
