use cadenza_animation_core::wrap::{wrap, WrapMode};

fn approx(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

#[test]
fn normal_stops_at_end() {
    let info = wrap(0.5, 2.0, WrapMode::Normal, 1.0, 1.0);
    assert_eq!(info.time, 0.5);
    assert_eq!(info.ratio, 0.25);
    assert!(!info.stopped);

    let info = wrap(3.0, 2.0, WrapMode::Normal, 1.0, 1.0);
    assert!(info.stopped);
    assert_eq!(info.time, 2.0);
    assert_eq!(info.ratio, 1.0);
    assert_eq!(info.iterations, 1.0);
}

#[test]
fn loop_folds_time() {
    let info = wrap(5.0, 2.0, WrapMode::Loop, f64::INFINITY, 1.0);
    assert_eq!(info.time, 1.0);
    assert_eq!(info.iterations, 2.5);
    assert!(!info.stopped);
    // An exact multiple lands on the end of the pass, not its start.
    let info = wrap(4.0, 2.0, WrapMode::Loop, f64::INFINITY, 1.0);
    assert_eq!(info.ratio, 1.0);
}

#[test]
fn reverse_mirrors_time() {
    let info = wrap(0.5, 2.0, WrapMode::Reverse, 1.0, 1.0);
    assert_eq!(info.time, 1.5);
    assert_eq!(info.direction, -1.0);
    let info = wrap(0.5, 2.0, WrapMode::LoopReverse, f64::INFINITY, 1.0);
    assert_eq!(info.time, 1.5);
}

#[test]
fn ping_pong_alternates() {
    let d = 2.0;
    let mode = WrapMode::PingPong;
    let rc = f64::INFINITY;

    let info = wrap(1.0, d, mode, rc, 1.0);
    assert_eq!((info.time, info.direction), (1.0, 1.0));

    let info = wrap(2.0, d, mode, rc, 1.0);
    assert_eq!((info.time, info.direction), (2.0, 1.0));

    let info = wrap(2.5, d, mode, rc, 1.0);
    assert_eq!((info.time, info.direction), (1.5, -1.0));

    let info = wrap(4.0, d, mode, rc, 1.0);
    assert_eq!(info.time, 0.0);
    assert_eq!(info.direction, -1.0);

    let info = wrap(4.5, d, mode, rc, 1.0);
    assert_eq!((info.time, info.direction), (0.5, 1.0));
}

#[test]
fn ping_pong_reverse_starts_backwards() {
    let info = wrap(0.5, 2.0, WrapMode::PingPongReverse, f64::INFINITY, 1.0);
    assert_eq!((info.time, info.direction), (1.5, -1.0));
    let info = wrap(2.5, 2.0, WrapMode::PingPongReverse, f64::INFINITY, 1.0);
    assert_eq!((info.time, info.direction), (0.5, 1.0));
}

#[test]
fn fractional_repeat_count_stops_mid_clip() {
    let info = wrap(10.0, 2.0, WrapMode::Loop, 1.25, 1.0);
    assert!(info.stopped);
    assert_eq!(info.iterations, 1.25);
    approx(info.time, 0.5, 1e-12);
}

#[test]
fn negative_speed_flips_direction_and_negative_time_wraps() {
    let info = wrap(-0.5, 2.0, WrapMode::Loop, f64::INFINITY, -1.0);
    assert_eq!(info.time, 1.5);
    assert_eq!(info.direction, -1.0);
}

#[test]
fn default_mode_behaves_as_normal() {
    assert_eq!(
        wrap(3.0, 2.0, WrapMode::Default, 1.0, 1.0),
        wrap(3.0, 2.0, WrapMode::Normal, 1.0, 1.0)
    );
}

#[test]
fn ping_pong_reference_points() {
    let cases = [
        (2.0, 2.0, 1.0, 1.0, 1.0),
        (2.1, 1.9, 0.95, -1.0, 1.05),
        (4.0, 0.0, 0.0, -1.0, 2.0),
        (4.2, 0.2, 0.1, 1.0, 2.1),
    ];
    for (t, time, ratio, direction, iterations) in cases {
        let info = wrap(t, 2.0, WrapMode::PingPong, f64::INFINITY, 1.0);
        approx(info.time, time, 1e-9);
        approx(info.ratio, ratio, 1e-9);
        assert_eq!(info.direction, direction, "direction at {t}");
        approx(info.iterations, iterations, 1e-9);
        assert!(!info.stopped);
    }
}
