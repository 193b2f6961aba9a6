use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cadenza_animation_core::actions::ease::{ease_bezier, ease_elastic_out, ease_in, ease_quadratic_in};
use cadenza_animation_core::actions::{
    CallFunc, DelayTime, EaseAction, FiniteTimeAction, FlipX, Hide, Place, PropertyBy, PropertyTo,
    Repeat, Sequence, Show, ToggleVisibility,
};
use cadenza_animation_core::easing;
use cadenza_animation_core::{AnimationError, PropertyBag, TargetRef, Value};

fn approx(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn sprite() -> (Rc<RefCell<PropertyBag>>, TargetRef) {
    let bag = PropertyBag::new()
        .with("x", Value::f(0.0))
        .with("scale", Value::vec2(1.0, 1.0))
        .with("active", Value::Bool(false))
        .with("position", Value::vec2(0.0, 0.0))
        .with("flipX", Value::Bool(false))
        .into_shared();
    let target: TargetRef = bag.clone();
    (bag, target)
}

fn x(bag: &Rc<RefCell<PropertyBag>>) -> f64 {
    bag.borrow().float("x").unwrap()
}

fn move_by(duration: f64, dx: f64) -> Box<dyn FiniteTimeAction> {
    Box::new(PropertyBy::new(duration, "x", Value::f(dx)).unwrap())
}

#[test]
fn update_before_start_is_an_error() {
    let mut action = PropertyBy::new(1.0, "x", Value::f(1.0)).unwrap();
    assert_eq!(
        action.update(0.5),
        Err(AnimationError::ActionNotStarted { action: "PropertyBy" })
    );
    let mut seq = Sequence::new(vec![move_by(1.0, 1.0)]).unwrap();
    assert!(matches!(seq.update(0.5), Err(AnimationError::ActionNotStarted { .. })));
    let mut show = Show::new();
    assert!(show.update(1.0).is_err());
}

#[test]
fn step_drives_the_elapsed_clock() {
    let (bag, target) = sprite();
    let mut action = PropertyTo::new(2.0, "x", Value::f(100.0)).unwrap();
    action.start_with_target(&target);
    action.step(0.016).unwrap();
    assert_eq!(x(&bag), 0.0);
    action.step(1.0).unwrap();
    approx(x(&bag), 50.0, 1e-9);
    assert!(!action.is_done());
    action.step(1.5).unwrap();
    approx(x(&bag), 100.0, 1e-9);
    assert!(action.is_done());
}

#[test]
fn property_actions_address_sub_fields() {
    let (bag, target) = sprite();
    let mut grow = PropertyBy::new(1.0, "scale.y", Value::f(2.0)).unwrap();
    grow.start_with_target(&target);
    grow.update(0.5).unwrap();
    assert_eq!(bag.borrow().get("scale"), Some(&Value::vec2(1.0, 2.0)));
}

#[test]
fn ease_action_reshapes_and_reverses_together() {
    let (bag, target) = sprite();
    let mut eased = EaseAction::new(move_by(1.0, 10.0), easing::QUAD_IN).unwrap();
    eased.start_with_target(&target);
    eased.update(0.5).unwrap();
    approx(x(&bag), 2.5, 1e-9);
    eased.update(1.0).unwrap();
    approx(x(&bag), 10.0, 1e-9);

    let mut back = eased.reverse();
    back.start_with_target(&target);
    back.update(0.5).unwrap();
    // quadOut(0.5) of a -10 move from 10.
    approx(x(&bag), 10.0 - 7.5, 1e-9);
    back.update(1.0).unwrap();
    approx(x(&bag), 0.0, 1e-9);
}

#[test]
fn ease_action_clones_are_independent() {
    let (bag_a, target_a) = sprite();
    let (bag_b, target_b) = sprite();
    let mut first = EaseAction::new(move_by(1.0, 10.0), easing::SINE_OUT).unwrap();
    let mut copy = first.clone_action();
    first.start_with_target(&target_a);
    copy.start_with_target(&target_b);
    first.update(1.0).unwrap();
    copy.update(0.0).unwrap();
    approx(x(&bag_a), 10.0, 1e-9);
    approx(x(&bag_b), 0.0, 1e-9);
    assert_eq!(copy.name(), "EaseAction");
    assert_eq!(copy.duration(), 1.0);
}

#[test]
fn ease_constructors_validate_parameters() {
    assert!(ease_in(0.0).is_err());
    assert!(ease_elastic_out(Some(0.0)).is_err());
    assert!(ease_bezier(0.0, 0.3, 0.7, 1.0).is_ok());
    assert_eq!(ease_elastic_out(None).unwrap(), easing::Easing::elastic(easing::Phase::Out, 0.3).unwrap());
    let eased = EaseAction::new(move_by(1.0, 1.0), ease_quadratic_in()).unwrap();
    assert_eq!(eased.easing(), easing::QUAD_IN);
    assert_eq!(eased.inner().name(), "PropertyBy");
    assert!(EaseAction::new(move_by(1.0, 1.0), easing::Easing::Rate { phase: easing::Phase::In, rate: 0.0, inverse: false }).is_err());
}

#[test]
fn sequence_runs_children_back_to_back() {
    let (bag, target) = sprite();
    let mut seq = Sequence::new(vec![
        move_by(1.0, 10.0),
        Box::new(DelayTime::new(1.0)),
        move_by(2.0, 20.0),
    ])
    .unwrap();
    assert_eq!(seq.duration(), 4.0);
    assert_eq!(seq.len(), 3);

    seq.start_with_target(&target);
    seq.update(0.125).unwrap();
    approx(x(&bag), 5.0, 1e-9);
    seq.update(0.375).unwrap();
    approx(x(&bag), 10.0, 1e-9);
    // Jumping into the last child completes everything before it.
    seq.update(0.75).unwrap();
    approx(x(&bag), 20.0, 1e-9);
    seq.update(1.0).unwrap();
    approx(x(&bag), 30.0, 1e-9);
}

#[test]
fn sequence_reverse_plays_reversed_children_backwards() {
    let (bag, target) = sprite();
    let seq = Sequence::new(vec![move_by(1.0, 10.0), move_by(1.0, 5.0)]).unwrap();
    let mut back = seq.reverse();
    bag.borrow_mut().insert("x", Value::f(15.0));
    back.start_with_target(&target);
    back.update(0.5).unwrap();
    approx(x(&bag), 10.0, 1e-9);
    back.update(1.0).unwrap();
    approx(x(&bag), 0.0, 1e-9);
}

#[test]
fn empty_composites_are_rejected() {
    assert!(matches!(
        Sequence::new(Vec::new()),
        Err(AnimationError::EmptyComposite { action: "Sequence" })
    ));
    assert!(matches!(
        Repeat::new(move_by(1.0, 1.0), 0),
        Err(AnimationError::EmptyComposite { action: "Repeat" })
    ));
}

#[test]
fn repeat_restarts_the_inner_action_each_pass() {
    let (bag, target) = sprite();
    let mut repeat = Repeat::new(move_by(1.0, 10.0), 3).unwrap();
    assert_eq!(repeat.duration(), 3.0);
    repeat.start_with_target(&target);
    repeat.step(0.0).unwrap();
    repeat.step(1.5).unwrap();
    approx(x(&bag), 15.0, 1e-9);
    assert_eq!(repeat.pass(), 1);
    repeat.step(1.5).unwrap();
    approx(x(&bag), 30.0, 1e-9);
    assert!(repeat.is_done());
    assert_eq!(repeat.times(), 3);
}

#[test]
fn instant_actions_apply_on_first_step() {
    let (bag, target) = sprite();

    let mut show = Show::new();
    show.start_with_target(&target);
    assert!(show.is_done());
    show.step(0.0).unwrap();
    assert_eq!(bag.borrow().get("active"), Some(&Value::Bool(true)));

    let mut hide = show.reverse();
    hide.start_with_target(&target);
    hide.step(0.0).unwrap();
    assert_eq!(bag.borrow().get("active"), Some(&Value::Bool(false)));
    assert_eq!(hide.name(), "Hide");

    let mut toggle = ToggleVisibility::new();
    toggle.start_with_target(&target);
    toggle.step(0.0).unwrap();
    toggle.step(0.0).unwrap();
    toggle.step(0.0).unwrap();
    assert_eq!(bag.borrow().get("active"), Some(&Value::Bool(true)));

    let mut place = Place::new(Value::vec2(3.0, 4.0));
    place.start_with_target(&target);
    place.step(0.0).unwrap();
    assert_eq!(bag.borrow().get("position"), Some(&Value::vec2(3.0, 4.0)));

    let mut flip = FlipX::new(true).reverse();
    flip.start_with_target(&target);
    flip.step(0.0).unwrap();
    assert_eq!(bag.borrow().get("flipX"), Some(&Value::Bool(false)));

    let mut unflip = FlipX::new(true);
    unflip.start_with_target(&target);
    unflip.update(1.0).unwrap();
    assert_eq!(bag.borrow().get("flipX"), Some(&Value::Bool(true)));

    let bare: TargetRef = PropertyBag::new().into_shared();
    let mut hide = Hide::new();
    hide.start_with_target(&bare);
    assert!(matches!(hide.update(1.0), Err(AnimationError::PropertyNotFound { .. })));
}

#[test]
fn call_func_copies_share_the_callback() {
    let (_bag, target) = sprite();
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let mut call = CallFunc::new(move |_target| counter.set(counter.get() + 1));
    let mut copy = call.clone_action();
    call.start_with_target(&target);
    copy.start_with_target(&target);
    call.step(0.0).unwrap();
    copy.step(0.0).unwrap();
    assert_eq!(calls.get(), 2);
}

#[test]
fn dropped_targets_are_ignored() {
    let (bag, target) = sprite();
    let mut action = PropertyTo::new(1.0, "x", Value::f(5.0)).unwrap();
    action.start_with_target(&target);
    drop(target);
    drop(bag);
    assert!(action.update(0.5).is_ok());
    action.stop();
    assert!(action.update(0.5).is_err());
}
