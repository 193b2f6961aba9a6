//! Cadenza Animation Core (engine-agnostic)
//!
//! Evaluates keyframed clips and time-based actions against abstract targets:
//! - `easing`: the closed family of easing functions and their reverses
//! - `wrap`: wrap modes and the time-wrapping function
//! - `data`/`curve`/`motion_path`: clip data, keyframed curves and path flattening
//! - `binding`/`state`/`animation`: targets, per-clip playback state and the
//!   component that owns clips
//! - `events`: clip events fired as playback crosses them
//! - `actions`: instant, interval, composite and eased actions
//!
//! Everything is single-threaded; targets are shared as `Rc<RefCell<_>>` and held
//! weakly by the states and actions animating them.

pub mod actions;
pub mod animation;
pub mod binding;
pub mod config;
pub mod curve;
pub mod data;
pub mod easing;
pub mod error;
pub mod events;
pub mod motion_path;
pub mod scratch;
pub mod state;
pub mod wrap;

// Re-exports for consumers
pub use actions::{EaseAction, FiniteTimeAction, Repeat, Sequence};
pub use animation::{AnimateOptions, Animation, Pose};
pub use binding::{
    bind_clip, AnimationTarget, BoundCurve, PropertyBag, SceneResolver, TargetRef, TargetResolver,
};
pub use config::Config;
pub use curve::{AnimationCurve, CurveMode, SegmentCurve};
pub use data::{compute_null_ratios, AnimationClip, CurveHint, EventData, Keyframe};
pub use easing::{Easing, Phase};
pub use error::{AnimationError, Result};
pub use events::{ClipEvent, EventContext, EventLog, EventSink, NoEvents};
pub use motion_path::sample_motion_paths;
pub use state::AnimationState;
pub use wrap::{wrap, WrapInfo, WrapMode};
pub use cadenza_api_core::{Value, ValueKind};
