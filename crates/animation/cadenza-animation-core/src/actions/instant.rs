//! Instant actions: zero duration, applied in full on the first update.

use std::fmt;
use std::rc::Rc;

use cadenza_api_core::Value;

use super::{ActionTarget, FiniteTimeAction, ACTIVE, FLIP_X, FLIP_Y, POSITION};
use crate::binding::TargetRef;
use crate::error::{AnimationError, Result};

/// Run `f` on the live target; a dropped target is a no-op.
fn on_target(slot: &ActionTarget, action: &'static str, f: impl FnOnce(&TargetRef) -> Result<()>) -> Result<()> {
    match slot.get(action)? {
        Some(target) => f(&target),
        None => Ok(()),
    }
}

fn set(target: &TargetRef, property: &str, value: Value) -> Result<()> {
    target.borrow_mut().set_property(property, value)
}

/// Implements the trait plumbing shared by every instant action; `apply` does the work.
macro_rules! instant_action {
    ($ty:ident, $name:literal) => {
        impl FiniteTimeAction for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn duration(&self) -> f64 {
                0.0
            }

            fn start_with_target(&mut self, target: &TargetRef) {
                self.slot.start(target);
            }

            fn update(&mut self, _ratio: f64) -> Result<()> {
                let this = &*self;
                on_target(&this.slot, $name, |t| this.apply(t))
            }

            fn stop(&mut self) {
                self.slot.clear();
            }

            fn step(&mut self, _dt: f64) -> Result<()> {
                self.update(1.0)
            }

            fn is_done(&self) -> bool {
                true
            }

            fn reverse(&self) -> Box<dyn FiniteTimeAction> {
                Box::new(self.reversed())
            }

            fn clone_action(&self) -> Box<dyn FiniteTimeAction> {
                Box::new(self.fresh())
            }
        }
    };
}

/// Sets `active` to true.
#[derive(Clone, Debug, Default)]
pub struct Show {
    slot: ActionTarget,
}

impl Show {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply(&self, target: &TargetRef) -> Result<()> {
        set(target, ACTIVE, Value::Bool(true))
    }

    fn reversed(&self) -> Hide {
        Hide::new()
    }

    fn fresh(&self) -> Self {
        Self::new()
    }
}

instant_action!(Show, "Show");

/// Sets `active` to false.
#[derive(Clone, Debug, Default)]
pub struct Hide {
    slot: ActionTarget,
}

impl Hide {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply(&self, target: &TargetRef) -> Result<()> {
        set(target, ACTIVE, Value::Bool(false))
    }

    fn reversed(&self) -> Show {
        Show::new()
    }

    fn fresh(&self) -> Self {
        Self::new()
    }
}

instant_action!(Hide, "Hide");

#[derive(Clone, Debug, Default)]
pub struct ToggleVisibility {
    slot: ActionTarget,
}

impl ToggleVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply(&self, target: &TargetRef) -> Result<()> {
        let current = target.borrow().get_property(ACTIVE);
        match current {
            Some(Value::Bool(active)) => set(target, ACTIVE, Value::Bool(!active)),
            Some(other) => Err(AnimationError::ValueTypeMismatch {
                name: ACTIVE.into(),
                expected: cadenza_api_core::ValueKind::Bool,
                actual: other.kind(),
            }),
            None => Err(AnimationError::PropertyNotFound { name: ACTIVE.into() }),
        }
    }

    fn reversed(&self) -> Self {
        Self::new()
    }

    fn fresh(&self) -> Self {
        Self::new()
    }
}

instant_action!(ToggleVisibility, "ToggleVisibility");

/// Moves the target to a fixed `position`.
#[derive(Clone, Debug)]
pub struct Place {
    position: Value,
    slot: ActionTarget,
}

impl Place {
    pub fn new(position: Value) -> Self {
        Self {
            position,
            slot: ActionTarget::default(),
        }
    }

    fn apply(&self, target: &TargetRef) -> Result<()> {
        set(target, POSITION, self.position.clone())
    }

    fn reversed(&self) -> Self {
        self.fresh()
    }

    fn fresh(&self) -> Self {
        Self::new(self.position.clone())
    }
}

instant_action!(Place, "Place");

#[derive(Clone, Debug)]
pub struct FlipX {
    flip: bool,
    slot: ActionTarget,
}

impl FlipX {
    pub fn new(flip: bool) -> Self {
        Self {
            flip,
            slot: ActionTarget::default(),
        }
    }

    fn apply(&self, target: &TargetRef) -> Result<()> {
        set(target, FLIP_X, Value::Bool(self.flip))
    }

    fn reversed(&self) -> Self {
        Self::new(!self.flip)
    }

    fn fresh(&self) -> Self {
        Self::new(self.flip)
    }
}

instant_action!(FlipX, "FlipX");

#[derive(Clone, Debug)]
pub struct FlipY {
    flip: bool,
    slot: ActionTarget,
}

impl FlipY {
    pub fn new(flip: bool) -> Self {
        Self {
            flip,
            slot: ActionTarget::default(),
        }
    }

    fn apply(&self, target: &TargetRef) -> Result<()> {
        set(target, FLIP_Y, Value::Bool(self.flip))
    }

    fn reversed(&self) -> Self {
        Self::new(!self.flip)
    }

    fn fresh(&self) -> Self {
        Self::new(self.flip)
    }
}

instant_action!(FlipY, "FlipY");

pub type Callback = Rc<dyn Fn(&TargetRef)>;

/// Invokes a callback with the target. Copies share the callback.
#[derive(Clone)]
pub struct CallFunc {
    callback: Callback,
    slot: ActionTarget,
}

impl CallFunc {
    pub fn new(callback: impl Fn(&TargetRef) + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
            slot: ActionTarget::default(),
        }
    }

    fn apply(&self, target: &TargetRef) -> Result<()> {
        (self.callback)(target);
        Ok(())
    }

    fn reversed(&self) -> Self {
        self.fresh()
    }

    fn fresh(&self) -> Self {
        Self {
            callback: Rc::clone(&self.callback),
            slot: ActionTarget::default(),
        }
    }
}

impl fmt::Debug for CallFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallFunc")
            .field("started", &self.slot.is_started())
            .finish()
    }
}

instant_action!(CallFunc, "CallFunc");
