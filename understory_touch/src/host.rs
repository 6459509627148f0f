// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capabilities the touch core needs from its platform.
//!
//! The core never touches native views or native event types. A platform adapter
//! implements these traits and hands them to [`TouchEffect::new`](crate::TouchEffect::new):
//!
//! - [`UiRuntime`]: the UI-affinity executor. Every spawned task runs there, so task
//!   continuations may read and mutate subject state directly.
//! - [`VisualHost`]: the native control: named visual states, property animation, image
//!   swaps and ripples.
//! - [`PointerSource`]: native pointer subscription with an attach/detach lifecycle.
//! - [`Command`]: the action bound to tap or long press.

use alloc::rc::Rc;
use core::any::Any;
use core::fmt;
use core::time::Duration;

use futures_util::future::LocalBoxFuture;
use kurbo::{Point, Rect, Vec2};

use crate::easing::Easing;
use crate::effect::WeakTouchEffect;
use crate::style::{BackgroundImage, Color};
use crate::types::VisualState;

/// Parameter passed to a [`Command`].
pub type CommandParameter = Rc<dyn Any>;

/// Failure reported by a host capability.
///
/// The core never propagates these. It logs them and carries on, treating the affected
/// property as settled.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HostError {
    /// The native control is gone or being torn down.
    Detached,
    /// The host cannot perform the request (for example, no rotation on this platform).
    Unsupported,
    /// The native layer rejected the request.
    Rejected,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Detached => "native control is detached",
            Self::Unsupported => "operation not supported by the host",
            Self::Rejected => "native layer rejected the request",
        })
    }
}

impl core::error::Error for HostError {}

/// Single-threaded executor with timers, bound to the UI thread.
pub trait UiRuntime {
    /// Run `task` on the UI context.
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);

    /// Future that resolves after `duration`.
    ///
    /// Dropping the future abandons the wait.
    fn delay(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// A property the core can animate through [`VisualHost::animate_property`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnimatedProperty {
    /// Background color; value is [`PropertyValue::Color`].
    BackgroundColor,
    /// Opacity; value is [`PropertyValue::Scalar`].
    Opacity,
    /// Uniform scale; value is [`PropertyValue::Scalar`].
    Scale,
    /// Translation; value is [`PropertyValue::Offset`].
    Translation,
    /// Rotation around z in degrees; value is [`PropertyValue::Scalar`].
    Rotation,
    /// Rotation around x in degrees; value is [`PropertyValue::Scalar`].
    RotationX,
    /// Rotation around y in degrees; value is [`PropertyValue::Scalar`].
    RotationY,
}

/// Value of an [`AnimatedProperty`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PropertyValue {
    /// Scalar properties.
    Scalar(f64),
    /// Colors.
    Color(Color),
    /// Two-dimensional offsets.
    Offset(Vec2),
}

impl PropertyValue {
    /// Interpolate toward `to`. Mismatched kinds jump to `to`.
    #[must_use]
    pub fn lerp(self, to: Self, t: f64) -> Self {
        match (self, to) {
            (Self::Scalar(a), Self::Scalar(b)) => Self::Scalar(a + (b - a) * t),
            (Self::Color(a), Self::Color(b)) => Self::Color(a.lerp(b, t)),
            (Self::Offset(a), Self::Offset(b)) => Self::Offset(a.lerp(b, t)),
            (_, to) => to,
        }
    }
}

/// Request to animate one property of the native control.
///
/// Hosts that drive animations from their own frame clock call [`Self::value_at`] on
/// every tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PropertyAnimation {
    /// Animated property.
    pub property: AnimatedProperty,
    /// Start value, read from the control when the pass began.
    pub from: PropertyValue,
    /// End value.
    pub to: PropertyValue,
    /// Length of the animation; never zero (zero-length changes use [`VisualHost::set_value`]).
    pub duration: Duration,
    /// Curve.
    pub easing: Easing,
}

impl PropertyAnimation {
    /// Property value at linear time fraction `t`.
    pub fn value_at(&self, t: f64) -> PropertyValue {
        self.from.lerp(self.to, self.easing.ease(t))
    }
}

/// How a native property animation ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnimationOutcome {
    /// Reached its end value.
    Finished,
    /// Stopped early, for example by [`VisualHost::cancel_animations`].
    Interrupted,
}

/// Native ripple request.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ripple {
    /// Anchor, in the same space as [`VisualHost::bounds`].
    pub origin: Point,
    /// Ripple color; host default when `None`.
    pub color: Option<Color>,
    /// Ripple radius; host default when `None`.
    pub radius: Option<f64>,
    /// Shadow radius; host default when `None`.
    pub shadow_radius: Option<f64>,
    /// Whether the ripple may draw outside the control.
    pub borderless: bool,
}

/// The native control the core drives.
pub trait VisualHost {
    /// Switch the control to a named visual state. Called synchronously on every state change.
    fn apply_visual_state(&self, state: VisualState) -> Result<(), HostError>;

    /// Current value of a property.
    fn current_value(&self, property: AnimatedProperty) -> Result<PropertyValue, HostError>;

    /// Set a property immediately.
    fn set_value(&self, property: AnimatedProperty, value: PropertyValue) -> Result<(), HostError>;

    /// Start a property animation. The returned future resolves when it ends.
    fn animate_property(
        &self,
        animation: PropertyAnimation,
    ) -> Result<LocalBoxFuture<'static, AnimationOutcome>, HostError>;

    /// Replace the background image; `None` clears it.
    fn set_background_image(&self, image: Option<&BackgroundImage>) -> Result<(), HostError>;

    /// Stop every running property animation on the control.
    fn cancel_animations(&self);

    /// Stop the running animation of one property.
    fn cancel_animation(&self, property: AnimatedProperty);

    /// Bounds of the control in pointer coordinates.
    fn bounds(&self) -> Rect;

    /// Shortest duration the native animation engine accepts.
    ///
    /// Engines that reject zero-length animations return a positive tick; passes shorter
    /// than this are stretched to it.
    fn min_animation_duration(&self) -> Duration {
        Duration::ZERO
    }

    /// Start the native ripple.
    fn start_ripple(&self, ripple: &Ripple) -> Result<(), HostError> {
        let _ = ripple;
        Err(HostError::Unsupported)
    }

    /// Stop the native ripple, if one is showing.
    fn stop_ripple(&self) {}

    /// Ask the parent not to steal the pointer (for example, to start scrolling).
    fn set_parent_intercept_disallowed(&self, disallow: bool) {
        let _ = disallow;
    }
}

/// Native pointer subscription.
///
/// `attach` subscribes to native events and forwards them to
/// [`WeakTouchEffect::handle_pointer`]; `detach` unsubscribes. Events that arrive after the
/// effect is gone are dropped by the weak handle.
pub trait PointerSource {
    /// Start forwarding pointer events to `sink`.
    fn attach(&mut self, sink: WeakTouchEffect);

    /// Stop forwarding pointer events.
    fn detach(&mut self);
}

/// Action bound to a tap or long press.
pub trait Command {
    /// Whether the command may run now.
    fn can_execute(&self, parameter: Option<&CommandParameter>) -> bool {
        let _ = parameter;
        true
    }

    /// Run the command.
    fn execute(&self, parameter: Option<&CommandParameter>);
}

impl<F: Fn(Option<&CommandParameter>)> Command for F {
    fn execute(&self, parameter: Option<&CommandParameter>) {
        self(parameter);
    }
}
