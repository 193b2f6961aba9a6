use std::rc::Rc;

use cadenza_animation_core::curve::AnimationCurve;
use cadenza_animation_core::{
    bind_clip, sample_motion_paths, AnimationClip, AnimationState, Config, CurveMode, PropertyBag,
    SceneResolver, Value,
};

fn approx(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn xy(v: &Value) -> [f64; 2] {
    match v {
        Value::Vec2(p) => *p,
        other => panic!("expected vec2, got {other:?}"),
    }
}

fn motion_clip() -> AnimationClip {
    let json = cadenza_test_fixtures::clips::json("motion-path").expect("load motion-path");
    AnimationClip::from_json(&json).expect("parse clip")
}

#[test]
fn flattens_position_track_at_clip_sample_rate() {
    let clip = motion_clip();
    let keyframes = &clip.curve_data.props["position"];
    let authored = AnimationCurve::from_keyframes("position", keyframes, clip.duration).unwrap();
    let track = sample_motion_paths(
        keyframes,
        authored.ratios(),
        authored.segments(),
        clip.duration,
        60.0,
        Config::default().arc_length_divisions,
    )
    .expect("motion path present");

    assert_eq!(track.values.len(), 121);
    assert_eq!(track.ratios.len(), 121);

    let first = xy(&track.values[0]);
    approx(first[0], 0.0, 1e-4);
    approx(first[1], 480.0, 1e-4);
    let last = xy(&track.values[120]);
    approx(last[0], 640.0, 1e-4);
    approx(last[1], 480.0, 1e-4);

    let index = (0.198 / (1.0 / 120.0)) as usize + 1;
    let p = xy(&track.values[index]);
    approx(p[0], 0.1327874, 1e-4);
    approx(p[1], 3.8064457, 1e-4);

    let between = 1.0 / 120.0;
    for pair in track.ratios.windows(2) {
        approx(pair[1] - pair[0], between, 1e-4);
    }
}

#[test]
fn binding_switches_position_to_sampled_lookup() {
    let bag = PropertyBag::new()
        .with("position", Value::vec2(0.0, 0.0))
        .into_shared();
    let resolver = SceneResolver::new().with_root(bag.clone());
    let mut state =
        AnimationState::bind(Rc::new(motion_clip()), &resolver, &Config::default()).unwrap();

    let curve = state.curves()[0].curve().clone();
    assert_eq!(curve.mode(), CurveMode::Sampled);
    assert_eq!(curve.len(), 121);

    state.set_time(1.0);
    state.sample();
    let expected = curve.sample(0.5).unwrap();
    assert_eq!(bag.borrow().get("position"), Some(&expected));
}

#[test]
fn fps_falls_back_to_config_without_clip_sample() {
    let mut clip = motion_clip();
    clip.sample = None;
    let bag = PropertyBag::new()
        .with("position", Value::vec2(0.0, 0.0))
        .into_shared();
    let resolver = SceneResolver::new().with_root(bag);
    let config = Config {
        motion_path_fps: 30.0,
        ..Config::default()
    };
    let curves = bind_clip(&clip, &resolver, &config).unwrap();
    assert_eq!(curves[0].curve().len(), 61);
}

#[test]
fn malformed_paths_leave_the_curve_authored() {
    let json = r#"{
        "name": "bad-path",
        "duration": 1,
        "curveData": { "props": { "position": [
            { "frame": 0, "value": [0, 0], "motionPath": [[1, 2, 3]] },
            { "frame": 1, "value": [10, 10] }
        ] } }
    }"#;
    let clip = AnimationClip::from_json(json).unwrap();
    let bag = PropertyBag::new()
        .with("position", Value::vec2(0.0, 0.0))
        .into_shared();
    let resolver = SceneResolver::new().with_root(bag);
    let curves = bind_clip(&clip, &resolver, &Config::default()).unwrap();
    assert_eq!(curves[0].curve().mode(), CurveMode::Dynamic);
    assert_eq!(curves[0].curve().len(), 2);
}
