//! Easing functions.
//!
//! Every easing is a variant of one closed [`Easing`] enum carrying its parameters.
//! [`Easing::apply`] maps a normalized ratio onto the eased ratio and
//! [`Easing::reverse`] yields the paired easing used when an eased action is
//! played backwards. Values are `Copy` and immutable; the parameterless shapes are
//! exposed as `const` singletons (`QUAD_IN`, `BOUNCE_OUT`, ...).
//!
//! Contract:
//! - input is clamped into [0,1] (NaN reads as 0);
//! - `apply(0) == 0` and `apply(1) == 1` exactly, except for the scalar
//!   [`Easing::Bezier`] blend whose endpoints are its first and last control points;
//! - back and elastic shapes overshoot [0,1] between the endpoints.

use std::f64::consts::PI;

use crate::error::{AnimationError, Result};

/// Which half of the shape accelerates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    In,
    Out,
    InOut,
    OutIn,
}

impl Phase {
    /// In and Out swap; the symmetric phases map to themselves.
    #[inline]
    pub fn reverse(self) -> Phase {
        match self {
            Phase::In => Phase::Out,
            Phase::Out => Phase::In,
            other => other,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    /// Power curve: In = `t^rate`, Out = `t^(1/rate)`. `inverse` swaps the two
    /// exponents; reversing toggles it.
    Rate { phase: Phase, rate: f64, inverse: bool },
    Quad(Phase),
    Cubic(Phase),
    Quart(Phase),
    Quint(Phase),
    Sine(Phase),
    Expo(Phase),
    Circ(Phase),
    Elastic { phase: Phase, period: f64 },
    Back { phase: Phase, overshoot: f64 },
    Bounce(Phase),
    /// Smoothstep `t²(3-2t)`.
    Smooth,
    /// Smootherstep `t³(t(6t-15)+10)`.
    Fade,
    /// Cubic blend of four scalar control values.
    Bezier([f64; 4]),
    /// CSS-style timing curve through (0,0), (x1,y1), (x2,y2), (1,1). A mirrored
    /// curve is point-reflected through (0.5, 0.5).
    CubicBezier { ctrl: [f64; 4], mirrored: bool },
}

pub const BACK_OVERSHOOT: f64 = 1.70158;
/// Overshoot multiplier applied by the symmetric back easing.
pub const BACK_IN_OUT_SCALE: f64 = 1.525;
/// Default elastic period for actions.
pub const ELASTIC_PERIOD: f64 = 0.3;
/// Default elastic period for named curve easings.
pub const CURVE_ELASTIC_PERIOD: f64 = 0.4;
/// Fallback period of the symmetric elastic easing when none is given.
const ELASTIC_IN_OUT_FALLBACK: f64 = 0.3 * 1.5;

pub const LINEAR: Easing = Easing::Linear;
pub const QUAD_IN: Easing = Easing::Quad(Phase::In);
pub const QUAD_OUT: Easing = Easing::Quad(Phase::Out);
pub const QUAD_IN_OUT: Easing = Easing::Quad(Phase::InOut);
pub const CUBIC_IN: Easing = Easing::Cubic(Phase::In);
pub const CUBIC_OUT: Easing = Easing::Cubic(Phase::Out);
pub const CUBIC_IN_OUT: Easing = Easing::Cubic(Phase::InOut);
pub const QUART_IN: Easing = Easing::Quart(Phase::In);
pub const QUART_OUT: Easing = Easing::Quart(Phase::Out);
pub const QUART_IN_OUT: Easing = Easing::Quart(Phase::InOut);
pub const QUINT_IN: Easing = Easing::Quint(Phase::In);
pub const QUINT_OUT: Easing = Easing::Quint(Phase::Out);
pub const QUINT_IN_OUT: Easing = Easing::Quint(Phase::InOut);
pub const SINE_IN: Easing = Easing::Sine(Phase::In);
pub const SINE_OUT: Easing = Easing::Sine(Phase::Out);
pub const SINE_IN_OUT: Easing = Easing::Sine(Phase::InOut);
pub const EXPO_IN: Easing = Easing::Expo(Phase::In);
pub const EXPO_OUT: Easing = Easing::Expo(Phase::Out);
pub const EXPO_IN_OUT: Easing = Easing::Expo(Phase::InOut);
pub const CIRC_IN: Easing = Easing::Circ(Phase::In);
pub const CIRC_OUT: Easing = Easing::Circ(Phase::Out);
pub const CIRC_IN_OUT: Easing = Easing::Circ(Phase::InOut);
pub const BOUNCE_IN: Easing = Easing::Bounce(Phase::In);
pub const BOUNCE_OUT: Easing = Easing::Bounce(Phase::Out);
pub const BOUNCE_IN_OUT: Easing = Easing::Bounce(Phase::InOut);
pub const BACK_IN: Easing = Easing::Back {
    phase: Phase::In,
    overshoot: BACK_OVERSHOOT,
};
pub const BACK_OUT: Easing = Easing::Back {
    phase: Phase::Out,
    overshoot: BACK_OVERSHOOT,
};
pub const BACK_IN_OUT: Easing = Easing::Back {
    phase: Phase::InOut,
    overshoot: BACK_OVERSHOOT,
};
pub const SMOOTH: Easing = Easing::Smooth;
pub const FADE: Easing = Easing::Fade;

/// Compose an In/Out pair into the requested phase.
#[inline]
fn phased(phase: Phase, t: f64, ease_in: impl Fn(f64) -> f64, ease_out: impl Fn(f64) -> f64) -> f64 {
    match phase {
        Phase::In => ease_in(t),
        Phase::Out => ease_out(t),
        Phase::InOut => {
            if t < 0.5 {
                ease_in(t * 2.0) * 0.5
            } else {
                ease_out(t * 2.0 - 1.0) * 0.5 + 0.5
            }
        }
        Phase::OutIn => {
            if t < 0.5 {
                ease_out(t * 2.0) * 0.5
            } else {
                ease_in(t * 2.0 - 1.0) * 0.5 + 0.5
            }
        }
    }
}

#[inline]
fn power_in(n: i32) -> impl Fn(f64) -> f64 {
    move |t: f64| t.powi(n)
}

#[inline]
fn power_out(n: i32) -> impl Fn(f64) -> f64 {
    move |t: f64| 1.0 - (1.0 - t).powi(n)
}

fn expo_in(t: f64) -> f64 {
    if t == 0.0 {
        0.0
    } else {
        2f64.powf(10.0 * (t - 1.0))
    }
}

fn expo_out(t: f64) -> f64 {
    if t == 1.0 {
        1.0
    } else {
        1.0 - 2f64.powf(-10.0 * t)
    }
}

fn sine_in(t: f64) -> f64 {
    1.0 - (t * PI / 2.0).cos()
}

fn sine_out(t: f64) -> f64 {
    (t * PI / 2.0).sin()
}

fn circ_in(t: f64) -> f64 {
    1.0 - (1.0 - t * t).max(0.0).sqrt()
}

fn circ_out(t: f64) -> f64 {
    let u = t - 1.0;
    (1.0 - u * u).max(0.0).sqrt()
}

fn elastic_in(t: f64, period: f64) -> f64 {
    let s = period / 4.0;
    let u = t - 1.0;
    -(2f64.powf(10.0 * u)) * ((u - s) * PI * 2.0 / period).sin()
}

fn elastic_out(t: f64, period: f64) -> f64 {
    let s = period / 4.0;
    2f64.powf(-10.0 * t) * ((t - s) * PI * 2.0 / period).sin() + 1.0
}

fn elastic_in_out(t: f64, period: f64) -> f64 {
    let period = if period > 0.0 {
        period
    } else {
        ELASTIC_IN_OUT_FALLBACK
    };
    let s = period / 4.0;
    let u = t * 2.0 - 1.0;
    let wave = ((u - s) * PI * 2.0 / period).sin();
    if u < 0.0 {
        -0.5 * 2f64.powf(10.0 * u) * wave
    } else {
        2f64.powf(-10.0 * u) * wave * 0.5 + 1.0
    }
}

fn back_in(t: f64, o: f64) -> f64 {
    t * t * ((o + 1.0) * t - o)
}

fn back_out(t: f64, o: f64) -> f64 {
    let u = t - 1.0;
    u * u * ((o + 1.0) * u + o) + 1.0
}

fn back_in_out(t: f64, o: f64) -> f64 {
    let o = o * BACK_IN_OUT_SCALE;
    let u = t * 2.0;
    if u < 1.0 {
        (u * u * ((o + 1.0) * u - o)) / 2.0
    } else {
        let u = u - 2.0;
        (u * u * ((o + 1.0) * u + o)) / 2.0 + 1.0
    }
}

/// Piecewise bounce shared by every bounce phase.
pub fn bounce_time(t: f64) -> f64 {
    if t < 1.0 / 2.75 {
        7.5625 * t * t
    } else if t < 2.0 / 2.75 {
        let t = t - 1.5 / 2.75;
        7.5625 * t * t + 0.75
    } else if t < 2.5 / 2.75 {
        let t = t - 2.25 / 2.75;
        7.5625 * t * t + 0.9375
    } else {
        let t = t - 2.625 / 2.75;
        7.5625 * t * t + 0.984375
    }
}

fn bounce_in(t: f64) -> f64 {
    1.0 - bounce_time(1.0 - t)
}

fn rate_in_out(t: f64, rate: f64) -> f64 {
    let u = t * 2.0;
    if u < 1.0 {
        0.5 * u.powf(rate)
    } else {
        1.0 - 0.5 * (2.0 - u).powf(rate)
    }
}

#[inline]
fn cubic_bezier(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Scalar cubic blend of four control values at `t`.
#[inline]
pub fn bezier_at(p: &[f64; 4], t: f64) -> f64 {
    cubic_bezier(p[0], p[1], p[2], p[3], t)
}

/// Given timing control points (x1, y1, x2, y2) and an input x in [0,1],
/// compute the eased y by inverting the x bezier via binary search.
pub fn bezier_by_time(ctrl: &[f64; 4], x: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    let [x1, y1, x2, y2] = *ctrl;
    // Bezier(0,0,1,1) is exactly linear
    if x1 == 0.0 && y1 == 0.0 && x2 == 1.0 && y2 == 1.0 {
        return x;
    }
    // Monotonic X in [0,1] assumed for x1/x2 in [0,1]
    let mut lo = 0.0f64;
    let mut hi = 1.0f64;
    let mut mid = x;
    for _ in 0..48 {
        let bx = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (bx - x).abs() < 1e-10 {
            break;
        }
        if bx < x {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}

impl Easing {
    /// `t^rate` easing, rejecting a zero rate.
    pub fn rate_in(rate: f64) -> Result<Easing> {
        Easing::Rate {
            phase: Phase::In,
            rate,
            inverse: false,
        }
        .validated()
    }

    pub fn rate_out(rate: f64) -> Result<Easing> {
        Easing::Rate {
            phase: Phase::Out,
            rate,
            inverse: false,
        }
        .validated()
    }

    pub fn rate_in_out(rate: f64) -> Result<Easing> {
        Easing::Rate {
            phase: Phase::InOut,
            rate,
            inverse: false,
        }
        .validated()
    }

    pub fn elastic(phase: Phase, period: f64) -> Result<Easing> {
        Easing::Elastic { phase, period }.validated()
    }

    pub fn back(phase: Phase, overshoot: f64) -> Result<Easing> {
        Easing::Back { phase, overshoot }.validated()
    }

    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Easing> {
        Easing::CubicBezier {
            ctrl: [x1, y1, x2, y2],
            mirrored: false,
        }
        .validated()
    }

    fn validated(self) -> Result<Easing> {
        self.validate()?;
        Ok(self)
    }

    /// Check parameters against each family's domain.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Easing::Rate { rate, .. } => {
                if rate == 0.0 || !rate.is_finite() {
                    return Err(AnimationError::invalid_easing(format!(
                        "rate must be finite and non-zero, got {rate}"
                    )));
                }
            }
            Easing::Elastic { phase, period } => {
                let ok = if phase == Phase::InOut {
                    period >= 0.0
                } else {
                    period > 0.0
                };
                if !ok || !period.is_finite() {
                    return Err(AnimationError::invalid_easing(format!(
                        "elastic period must be positive, got {period}"
                    )));
                }
            }
            Easing::Back { overshoot, .. } => {
                if !overshoot.is_finite() {
                    return Err(AnimationError::invalid_easing("back overshoot must be finite"));
                }
            }
            Easing::Bezier(p) => {
                if p.iter().any(|v| !v.is_finite()) {
                    return Err(AnimationError::invalid_easing("bezier points must be finite"));
                }
            }
            Easing::CubicBezier {
                ctrl: [x1, y1, x2, y2],
                ..
            } => {
                let xs_ok = (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2);
                if !xs_ok || !y1.is_finite() || !y2.is_finite() {
                    return Err(AnimationError::invalid_easing(
                        "cubic bezier x control points must lie in [0,1]",
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Map a normalized ratio onto the eased ratio.
    pub fn apply(&self, ratio: f64) -> f64 {
        let t = if ratio.is_nan() {
            0.0
        } else {
            ratio.clamp(0.0, 1.0)
        };
        if let Easing::Bezier(p) = self {
            return bezier_at(p, t);
        }
        if t == 0.0 || t == 1.0 {
            return t;
        }
        match *self {
            Easing::Linear => t,
            Easing::Rate {
                phase,
                rate,
                inverse,
            } => {
                let (in_exp, out_exp) = if inverse {
                    (1.0 / rate, rate)
                } else {
                    (rate, 1.0 / rate)
                };
                match phase {
                    Phase::InOut => rate_in_out(t, in_exp),
                    _ => phased(phase, t, |u| u.powf(in_exp), |u| u.powf(out_exp)),
                }
            }
            Easing::Quad(phase) => phased(phase, t, power_in(2), power_out(2)),
            Easing::Cubic(phase) => phased(phase, t, power_in(3), power_out(3)),
            Easing::Quart(phase) => phased(phase, t, power_in(4), power_out(4)),
            Easing::Quint(phase) => phased(phase, t, power_in(5), power_out(5)),
            Easing::Sine(phase) => phased(phase, t, sine_in, sine_out),
            Easing::Expo(phase) => phased(phase, t, expo_in, expo_out),
            Easing::Circ(phase) => phased(phase, t, circ_in, circ_out),
            Easing::Elastic { phase, period } => match phase {
                Phase::InOut => elastic_in_out(t, period),
                _ => phased(
                    phase,
                    t,
                    |u| elastic_in(u, period),
                    |u| elastic_out(u, period),
                ),
            },
            Easing::Back { phase, overshoot } => match phase {
                Phase::InOut => back_in_out(t, overshoot),
                _ => phased(
                    phase,
                    t,
                    |u| back_in(u, overshoot),
                    |u| back_out(u, overshoot),
                ),
            },
            Easing::Bounce(phase) => phased(phase, t, bounce_in, bounce_time),
            Easing::Smooth => t * t * (3.0 - 2.0 * t),
            Easing::Fade => t * t * t * (t * (t * 6.0 - 15.0) + 10.0),
            Easing::CubicBezier { ctrl, mirrored } => {
                if mirrored {
                    1.0 - bezier_by_time(&ctrl, 1.0 - t)
                } else {
                    bezier_by_time(&ctrl, t)
                }
            }
            Easing::Bezier(_) => t,
        }
    }

    /// The easing to use when the eased motion is played backwards.
    pub fn reverse(&self) -> Easing {
        match *self {
            Easing::Rate {
                phase: phase @ (Phase::In | Phase::Out),
                rate,
                inverse,
            } => Easing::Rate {
                phase: phase.reverse(),
                rate,
                inverse: !inverse,
            },
            Easing::Quad(p) => Easing::Quad(p.reverse()),
            Easing::Cubic(p) => Easing::Cubic(p.reverse()),
            Easing::Quart(p) => Easing::Quart(p.reverse()),
            Easing::Quint(p) => Easing::Quint(p.reverse()),
            Easing::Sine(p) => Easing::Sine(p.reverse()),
            Easing::Expo(p) => Easing::Expo(p.reverse()),
            Easing::Circ(p) => Easing::Circ(p.reverse()),
            Easing::Bounce(p) => Easing::Bounce(p.reverse()),
            Easing::Elastic { phase, period } => Easing::Elastic {
                phase: phase.reverse(),
                period,
            },
            Easing::Back { phase, overshoot } => Easing::Back {
                phase: phase.reverse(),
                overshoot,
            },
            Easing::Bezier([a, b, c, d]) => Easing::Bezier([d, c, b, a]),
            Easing::CubicBezier { ctrl, mirrored } => Easing::CubicBezier {
                ctrl,
                mirrored: !mirrored,
            },
            other => other,
        }
    }

    /// Resolve a curve easing name such as `"cubicInOut"` or `"bounceOut"`.
    /// `"constant"` is not an easing; curves treat it as a stepped segment.
    pub fn from_name(name: &str) -> Option<Easing> {
        match name {
            "linear" => return Some(Easing::Linear),
            "smooth" => return Some(Easing::Smooth),
            "fade" => return Some(Easing::Fade),
            _ => {}
        }
        let (family, phase) = if let Some(f) = name.strip_suffix("InOut") {
            (f, Phase::InOut)
        } else if let Some(f) = name.strip_suffix("OutIn") {
            (f, Phase::OutIn)
        } else if let Some(f) = name.strip_suffix("In") {
            (f, Phase::In)
        } else if let Some(f) = name.strip_suffix("Out") {
            (f, Phase::Out)
        } else {
            return None;
        };
        let easing = match family {
            "quad" => Easing::Quad(phase),
            "cubic" => Easing::Cubic(phase),
            "quart" => Easing::Quart(phase),
            "quint" => Easing::Quint(phase),
            "sine" => Easing::Sine(phase),
            "expo" => Easing::Expo(phase),
            "circ" => Easing::Circ(phase),
            "elastic" => Easing::Elastic {
                phase,
                period: CURVE_ELASTIC_PERIOD,
            },
            "back" => Easing::Back {
                phase,
                overshoot: BACK_OVERSHOOT,
            },
            "bounce" => Easing::Bounce(phase),
            _ => return None,
        };
        Some(easing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn cubic_in_out_matches_closed_form() {
        // k*=2 -> 0.4, 0.5 * k^3
        assert!(approx(CUBIC_IN_OUT.apply(0.2), 0.032, 1e-12));
        assert!(approx(CUBIC_IN_OUT.apply(0.8), 0.968, 1e-12));
    }

    #[test]
    fn bounce_breakpoints() {
        assert!(approx(bounce_time(0.5), 0.765625, 1e-12));
        assert!(approx(BOUNCE_IN.apply(0.5), 0.234375, 1e-12));
    }

    #[test]
    fn bezier_by_time_solves_x() {
        let y = bezier_by_time(&[0.0, 0.5, 0.5, 1.0], 0.4);
        assert!(approx(y, 0.7667234, 1e-6), "y={y}");
    }

    #[test]
    fn scalar_bezier_is_unguarded() {
        let e = Easing::Bezier([0.2, 0.5, 0.5, 0.9]);
        assert!(approx(e.apply(0.0), 0.2, 1e-12));
        assert!(approx(e.apply(1.0), 0.9, 1e-12));
    }

    #[test]
    fn from_name_parses_phases() {
        assert_eq!(Easing::from_name("cubicInOut"), Some(CUBIC_IN_OUT));
        assert_eq!(Easing::from_name("sineOutIn"), Some(Easing::Sine(Phase::OutIn)));
        assert_eq!(
            Easing::from_name("elasticIn"),
            Some(Easing::Elastic {
                phase: Phase::In,
                period: CURVE_ELASTIC_PERIOD
            })
        );
        assert_eq!(Easing::from_name("constant"), None);
        assert_eq!(Easing::from_name("wobbleIn"), None);
    }

    #[test]
    fn zero_rate_rejected() {
        assert!(Easing::rate_in(0.0).is_err());
        assert!(Easing::elastic(Phase::Out, 0.0).is_err());
        assert!(Easing::elastic(Phase::InOut, 0.0).is_ok());
        assert!(Easing::cubic_bezier(1.5, 0.0, 0.5, 1.0).is_err());
    }
}
