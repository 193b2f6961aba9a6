//! Easing decorator for interval actions, plus constructors named after the classic
//! ease actions (`ease_in(rate)`, `ease_elastic_out(period)`, ...).

use super::{FiniteTimeAction, IntervalClock};
use crate::binding::TargetRef;
use crate::easing::{self, Easing, Phase};
use crate::error::Result;

/// Wraps an action and reshapes the ratio it receives.
pub struct EaseAction {
    inner: Box<dyn FiniteTimeAction>,
    easing: Easing,
    clock: IntervalClock,
}

impl EaseAction {
    pub fn new(inner: Box<dyn FiniteTimeAction>, easing: Easing) -> Result<Self> {
        easing.validate()?;
        let clock = IntervalClock::new(inner.duration());
        Ok(Self { inner, easing, clock })
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn inner(&self) -> &dyn FiniteTimeAction {
        self.inner.as_ref()
    }
}

impl FiniteTimeAction for EaseAction {
    fn name(&self) -> &'static str {
        "EaseAction"
    }

    fn duration(&self) -> f64 {
        self.inner.duration()
    }

    fn start_with_target(&mut self, target: &TargetRef) {
        self.clock.reset();
        self.inner.start_with_target(target);
    }

    fn update(&mut self, ratio: f64) -> Result<()> {
        self.inner.update(self.easing.apply(ratio))
    }

    fn stop(&mut self) {
        self.inner.stop();
    }

    fn step(&mut self, dt: f64) -> Result<()> {
        let t = self.clock.advance(dt);
        self.update(t)
    }

    fn is_done(&self) -> bool {
        self.clock.is_done()
    }

    fn reverse(&self) -> Box<dyn FiniteTimeAction> {
        Box::new(EaseAction {
            inner: self.inner.reverse(),
            easing: self.easing.reverse(),
            clock: IntervalClock::new(self.duration()),
        })
    }

    fn clone_action(&self) -> Box<dyn FiniteTimeAction> {
        Box::new(EaseAction {
            inner: self.inner.clone_action(),
            easing: self.easing,
            clock: IntervalClock::new(self.duration()),
        })
    }
}

pub fn ease_in(rate: f64) -> Result<Easing> {
    Easing::rate_in(rate)
}

pub fn ease_out(rate: f64) -> Result<Easing> {
    Easing::rate_out(rate)
}

pub fn ease_in_out(rate: f64) -> Result<Easing> {
    Easing::rate_in_out(rate)
}

pub fn ease_exponential_in() -> Easing {
    easing::EXPO_IN
}

pub fn ease_exponential_out() -> Easing {
    easing::EXPO_OUT
}

pub fn ease_exponential_in_out() -> Easing {
    easing::EXPO_IN_OUT
}

pub fn ease_sine_in() -> Easing {
    easing::SINE_IN
}

pub fn ease_sine_out() -> Easing {
    easing::SINE_OUT
}

pub fn ease_sine_in_out() -> Easing {
    easing::SINE_IN_OUT
}

/// `period` defaults to 0.3.
pub fn ease_elastic_in(period: Option<f64>) -> Result<Easing> {
    Easing::elastic(Phase::In, period.unwrap_or(easing::ELASTIC_PERIOD))
}

pub fn ease_elastic_out(period: Option<f64>) -> Result<Easing> {
    Easing::elastic(Phase::Out, period.unwrap_or(easing::ELASTIC_PERIOD))
}

pub fn ease_elastic_in_out(period: Option<f64>) -> Result<Easing> {
    Easing::elastic(Phase::InOut, period.unwrap_or(easing::ELASTIC_PERIOD))
}

pub fn ease_bounce_in() -> Easing {
    easing::BOUNCE_IN
}

pub fn ease_bounce_out() -> Easing {
    easing::BOUNCE_OUT
}

pub fn ease_bounce_in_out() -> Easing {
    easing::BOUNCE_IN_OUT
}

pub fn ease_back_in() -> Easing {
    easing::BACK_IN
}

pub fn ease_back_out() -> Easing {
    easing::BACK_OUT
}

pub fn ease_back_in_out() -> Easing {
    easing::BACK_IN_OUT
}

/// Bezier over the ratio with control values `p0..p3`.
pub fn ease_bezier(p0: f64, p1: f64, p2: f64, p3: f64) -> Result<Easing> {
    let easing = Easing::Bezier([p0, p1, p2, p3]);
    easing.validate()?;
    Ok(easing)
}

pub fn ease_quadratic_in() -> Easing {
    easing::QUAD_IN
}

pub fn ease_quadratic_out() -> Easing {
    easing::QUAD_OUT
}

pub fn ease_quadratic_in_out() -> Easing {
    easing::QUAD_IN_OUT
}

pub fn ease_cubic_in() -> Easing {
    easing::CUBIC_IN
}

pub fn ease_cubic_out() -> Easing {
    easing::CUBIC_OUT
}

pub fn ease_cubic_in_out() -> Easing {
    easing::CUBIC_IN_OUT
}

pub fn ease_quartic_in() -> Easing {
    easing::QUART_IN
}

pub fn ease_quartic_out() -> Easing {
    easing::QUART_OUT
}

pub fn ease_quartic_in_out() -> Easing {
    easing::QUART_IN_OUT
}

pub fn ease_quintic_in() -> Easing {
    easing::QUINT_IN
}

pub fn ease_quintic_out() -> Easing {
    easing::QUINT_OUT
}

pub fn ease_quintic_in_out() -> Easing {
    easing::QUINT_IN_OUT
}

pub fn ease_circle_in() -> Easing {
    easing::CIRC_IN
}

pub fn ease_circle_out() -> Easing {
    easing::CIRC_OUT
}

pub fn ease_circle_in_out() -> Easing {
    easing::CIRC_IN_OUT
}
