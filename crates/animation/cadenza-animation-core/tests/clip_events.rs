use std::rc::Rc;

use cadenza_animation_core::{
    AnimationClip, AnimationError, AnimationState, ClipEvent, Config, EventContext, EventLog,
    WrapMode,
};
use serde_json::json;

const STEPS: [f64; 12] = [0.0, 0.1, 0.1, 0.1, 1.0, 0.3, 0.3, 0.2, 0.55, 0.2, 0.3, 1.0];

fn events_clip() -> Rc<AnimationClip> {
    let json = cadenza_test_fixtures::clips::json("clip-events").expect("load clip-events");
    Rc::new(AnimationClip::from_json(&json).expect("parse clip"))
}

fn state_for(clip: Rc<AnimationClip>, config: &Config) -> AnimationState {
    AnimationState::new(clip, Vec::new(), config)
}

fn label(event: &ClipEvent) -> String {
    format!("{}@{}", event.func, event.frame)
}

/// Play the clip in `mode` and collect the labels fired by each step.
fn run(mode: WrapMode, steps: &[f64]) -> Vec<Vec<String>> {
    let mut state = state_for(events_clip(), &Config::default());
    state.play();
    state.set_wrap_mode(mode);
    steps
        .iter()
        .map(|&dt| {
            let mut log = EventLog::new();
            state.update(dt, &mut log).unwrap();
            log.fired.iter().map(label).collect()
        })
        .collect()
}

fn expect(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|s| s.to_string()).collect())
        .collect()
}

#[test]
fn normal_fires_each_event_once_in_frame_order() {
    let got = run(WrapMode::Normal, &STEPS);
    let want = expect(&[
        &[],
        &[],
        &["func1@0.2"],
        &[],
        &["func2@0.4", "func3@0.4", "func1@1", "func1@1.2"],
        &["func1@1.4"],
        &["func1@1.8"],
        &[],
        &[],
        &[],
        &[],
        &[],
    ]);
    assert_eq!(got, want);
}

#[test]
fn loop_wraps_back_to_the_first_events() {
    let got = run(WrapMode::Loop, &STEPS);
    assert_eq!(got[8], vec!["func1@0.2", "func2@0.4", "func3@0.4"]);
    assert!(got[9].is_empty());
    assert_eq!(got[10], vec!["func1@1"]);
    assert_eq!(got[11], vec!["func1@1.2", "func1@1.4", "func1@1.8"]);
}

#[test]
fn reverse_fires_in_descending_frame_order() {
    let got = run(WrapMode::Reverse, &STEPS);
    let want = expect(&[
        &[],
        &[],
        &["func1@1.8"],
        &[],
        &["func1@1.4", "func1@1.2", "func1@1"],
        &["func2@0.4", "func3@0.4"],
        &["func1@0.2"],
        &[],
        &[],
        &[],
        &[],
        &[],
    ]);
    assert_eq!(got, want);
}

#[test]
fn loop_reverse_restarts_from_the_end() {
    let got = run(WrapMode::LoopReverse, &STEPS);
    assert_eq!(got[8], vec!["func1@1.8", "func1@1.4"]);
    assert_eq!(got[9], vec!["func1@1.2"]);
    assert_eq!(got[10], vec!["func1@1"]);
    assert_eq!(got[11], vec!["func2@0.4", "func3@0.4", "func1@0.2"]);
}

#[test]
fn ping_pong_retraces_events_on_the_way_back() {
    let got = run(WrapMode::PingPong, &STEPS);
    assert_eq!(got[6], vec!["func1@1.8"]);
    // Crosses 1.8 forward, reflects at the end, then crosses 1.8 and 1.4 backward.
    assert_eq!(got[8], vec!["func1@1.8", "func1@1.4"]);
    assert_eq!(got[9], vec!["func1@1.2"]);
    assert_eq!(got[10], vec!["func1@1"]);
    assert_eq!(got[11], vec!["func2@0.4", "func3@0.4", "func1@0.2"]);
}

#[test]
fn ping_pong_reverse_mirrors_ping_pong() {
    let got = run(WrapMode::PingPongReverse, &STEPS);
    assert_eq!(got[2], vec!["func1@1.8"]);
    assert_eq!(got[6], vec!["func1@0.2"]);
    assert_eq!(got[8], vec!["func1@0.2", "func2@0.4", "func3@0.4"]);
    assert_eq!(got[11], vec!["func1@1.2", "func1@1.4", "func1@1.8"]);
}

#[test]
fn large_steps_fire_every_crossed_pass_in_order() {
    let got = run(WrapMode::Loop, &[4.5]);
    let one_pass = [
        "func1@0.2",
        "func2@0.4",
        "func3@0.4",
        "func1@1",
        "func1@1.2",
        "func1@1.4",
        "func1@1.8",
    ];
    let mut want: Vec<&str> = Vec::new();
    want.extend(one_pass);
    want.extend(one_pass);
    want.extend(&one_pass[..3]);
    assert_eq!(got[0], want);
}

#[test]
fn reflection_points_fire_once_per_traversal() {
    let clip = AnimationClip::new("edges", 1.0)
        .with_event(0.0, "start", Vec::new())
        .with_event(1.0, "end", Vec::new());
    let mut state = state_for(Rc::new(clip), &Config::default());
    state.play();
    state.set_wrap_mode(WrapMode::PingPong);
    let mut fired = Vec::new();
    for _ in 0..4 {
        let mut log = EventLog::new();
        state.update(0.6, &mut log).unwrap();
        fired.push(log.funcs().join(","));
    }
    assert_eq!(fired, vec!["start", "end", "", "start"]);

    let clip = AnimationClip::new("edges", 1.0)
        .with_event(0.0, "start", Vec::new())
        .with_event(1.0, "end", Vec::new());
    let mut state = state_for(Rc::new(clip), &Config::default());
    state.play();
    state.set_wrap_mode(WrapMode::Loop);
    let mut log = EventLog::new();
    state.update(1.2, &mut log).unwrap();
    // In a loop the end and the next start are distinct moments.
    assert_eq!(log.funcs(), vec!["start", "end", "start"]);
}

#[test]
fn seeking_back_re_arms_events() {
    let clip = AnimationClip::new("seek", 2.0).with_event(1.0, "mid", Vec::new());
    let mut state = state_for(Rc::new(clip), &Config::default());
    state.play();

    let mut log = EventLog::new();
    state.update(1.5, &mut log).unwrap();
    assert_eq!(log.funcs(), vec!["mid"]);

    state.set_time(0.5);
    log.clear();
    state.update(0.5, &mut log).unwrap();
    assert_eq!(log.funcs(), vec!["mid"]);
}

fn early_late_clip() -> Rc<AnimationClip> {
    Rc::new(
        AnimationClip::new("back", 2.0)
            .with_event(0.5, "early", Vec::new())
            .with_event(1.5, "late", Vec::new()),
    )
}

fn steps_fired(state: &mut AnimationState, steps: &[f64]) -> Vec<String> {
    steps
        .iter()
        .map(|&dt| {
            let mut log = EventLog::new();
            state.update(dt, &mut log).unwrap();
            log.funcs().join(",")
        })
        .collect()
}

#[test]
fn negative_speed_from_a_positive_start_fires_backwards() {
    let mut state = state_for(early_late_clip(), &Config::default());
    state.set_speed(-1.0);
    state.play_from(1.8);
    assert_eq!(steps_fired(&mut state, &[0.5, 0.5, 0.5]), vec!["late", "", "early"]);
}

#[test]
fn negative_speed_crosses_loop_seams_and_zero() {
    let mut state = state_for(early_late_clip(), &Config::default());
    state.set_wrap_mode(WrapMode::Loop);
    state.set_speed(-1.0);
    state.play_from(2.6);
    // 2.6 -> 1.8 -> 0.8 -> -0.2 -> -0.7: the clip keeps playing backwards past zero.
    assert_eq!(
        steps_fired(&mut state, &[0.8, 1.0, 1.0, 0.5]),
        vec!["early", "late", "early", "late"]
    );
}

#[test]
fn flipping_speed_mid_play_turns_back() {
    let mut state = state_for(early_late_clip(), &Config::default());
    state.play();
    assert_eq!(steps_fired(&mut state, &[1.2]), vec!["early"]);
    state.set_speed(-1.0);
    // 1.2 -> 0.7 stays clear of both events, 0.7 -> 0.2 passes "early" again.
    assert_eq!(steps_fired(&mut state, &[0.5, 0.5]), vec!["", "early"]);
}

#[test]
fn handler_can_stop_the_state() {
    let mut state = state_for(events_clip(), &Config::default());
    state.play();
    let mut seen = Vec::new();
    let mut sink = |event: &ClipEvent, ctx: &mut EventContext<'_>| -> cadenza_animation_core::Result<()> {
        assert_eq!(ctx.clip(), "clip-events");
        seen.push(label(event));
        if event.func == "func2" {
            ctx.stop();
        }
        Ok(())
    };
    state.update(1.3, &mut sink).unwrap();
    assert_eq!(seen, vec!["func1@0.2", "func2@0.4"]);
    assert!(!state.is_playing());
    assert_eq!(state.time(), 1.3);
}

#[test]
fn handler_errors_propagate() {
    let mut state = state_for(events_clip(), &Config::default());
    state.play();
    let mut sink = |event: &ClipEvent, _ctx: &mut EventContext<'_>| -> cadenza_animation_core::Result<()> {
        Err(AnimationError::EventHandler {
            func: event.func.clone(),
            reason: "boom".into(),
        })
    };
    let err = state.update(0.5, &mut sink).unwrap_err();
    assert_eq!(err.category(), "event");
    assert!(err.is_recoverable());
}

#[test]
fn params_are_passed_through() {
    let mut state = state_for(events_clip(), &Config::default());
    state.play();
    let mut log = EventLog::new();
    state.update(0.8, &mut log).unwrap();
    assert_eq!(log.fired[1].params, vec![json!(1), json!(2)]);
    assert_eq!(log.fired[0].ratio, 0.1);
}

#[test]
fn per_tick_cap_drops_the_excess() {
    let config = Config {
        max_events_per_tick: 3,
        ..Config::default()
    };
    let mut state = state_for(events_clip(), &config);
    state.play();
    state.set_wrap_mode(WrapMode::Loop);
    let mut log = EventLog::new();
    state.update(100.0, &mut log).unwrap();
    assert_eq!(log.funcs(), vec!["func1", "func2", "func3"]);
    assert!(state.is_playing());
}
