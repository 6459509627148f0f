// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Touch: press, hover and toggle feedback for interactive controls.
//!
//! This crate turns abstract pointer input into a canonical interaction state and drives
//! the visual feedback and commands that follow from it:
//! - **Statuses and states** ([`TouchStatus`], [`TouchState`], [`HoverStatus`],
//!   [`HoverState`], [`InteractionStatus`]). A status is one discrete pointer action; a
//!   state is the persistent look the control animates toward.
//! - **Feedback styles** ([`style::TouchStyle`]) giving per-state background color and
//!   image, opacity, scale, translation and three rotations, with optional hovered values
//!   and per-state timing.
//! - **Commands** ([`host::Command`]) for tap and long press. A tap fires at most once per
//!   completed press, and a long press that fired suppresses the tap of the same press.
//! - **Toggle subjects**, where press and release switch an on/off value and an
//!   interrupted press animation continues from where it stopped.
//!
//! The crate never touches native views. A platform adapter implements the capabilities
//! in [`host`] ([`host::VisualHost`] for the control, [`host::UiRuntime`] for the UI
//! executor, [`host::PointerSource`] for native input) and reports input to a
//! [`TouchEffect`], either as statuses or as raw [`pointer::PointerEvent`]s.
//!
//! ## Minimal example
//!
//! A headless host whose runtime never runs animation tasks is enough to observe the
//! state machine and command dispatch, which are synchronous:
//!
//! ```rust
//! use core::cell::Cell;
//! use std::rc::Rc;
//!
//! use understory_touch::host::CommandParameter;
//! use understory_touch::{TouchEffect, TouchState, TouchStatus};
//! # use core::time::Duration;
//! # use futures_util::future::LocalBoxFuture;
//! # use kurbo::Rect;
//! # use understory_touch::host::{
//! #     AnimatedProperty, AnimationOutcome, HostError, PropertyAnimation, PropertyValue,
//! #     UiRuntime, VisualHost,
//! # };
//! # use understory_touch::style::BackgroundImage;
//! # use understory_touch::VisualState;
//! # struct Headless;
//! # impl VisualHost for Headless {
//! #     fn apply_visual_state(&self, _: VisualState) -> Result<(), HostError> { Ok(()) }
//! #     fn current_value(&self, _: AnimatedProperty) -> Result<PropertyValue, HostError> {
//! #         Err(HostError::Unsupported)
//! #     }
//! #     fn set_value(&self, _: AnimatedProperty, _: PropertyValue) -> Result<(), HostError> {
//! #         Ok(())
//! #     }
//! #     fn animate_property(
//! #         &self,
//! #         _: PropertyAnimation,
//! #     ) -> Result<LocalBoxFuture<'static, AnimationOutcome>, HostError> {
//! #         Err(HostError::Unsupported)
//! #     }
//! #     fn set_background_image(&self, _: Option<&BackgroundImage>) -> Result<(), HostError> {
//! #         Ok(())
//! #     }
//! #     fn cancel_animations(&self) {}
//! #     fn cancel_animation(&self, _: AnimatedProperty) {}
//! #     fn bounds(&self) -> Rect { Rect::new(0.0, 0.0, 80.0, 32.0) }
//! # }
//! # struct Idle;
//! # impl UiRuntime for Idle {
//! #     fn spawn_local(&self, _: LocalBoxFuture<'static, ()>) {}
//! #     fn delay(&self, _: Duration) -> LocalBoxFuture<'static, ()> {
//! #         Box::pin(core::future::pending())
//! #     }
//! # }
//!
//! let effect = TouchEffect::new(Rc::new(Headless), Rc::new(Idle));
//! let taps = Rc::new(Cell::new(0));
//! let counter = taps.clone();
//! effect.set_command(Some(Rc::new(move |_: Option<&CommandParameter>| {
//!     counter.set(counter.get() + 1);
//! })));
//!
//! effect.handle_touch(TouchStatus::Started);
//! assert_eq!(effect.state(), TouchState::Pressed);
//!
//! effect.handle_touch(TouchStatus::Completed);
//! assert_eq!(effect.state(), TouchState::Normal);
//! assert_eq!(taps.get(), 1);
//! ```
//!
//! ## Threading
//!
//! A [`TouchEffect`] is `!Send`. Every call into it, and every task it spawns on the
//! [`host::UiRuntime`], runs on the UI context. Animation passes and the long-press timer
//! are canceled cooperatively with [`cancel::CancellationToken`]s; a superseded pass simply
//! stops.
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for dependencies such as `kurbo`.
//! - `libm`: enables `no_std` + `alloc` builds that rely on `libm` for the easing curves.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod animation;
pub mod cancel;
pub mod easing;
pub mod host;
pub mod pointer;
pub mod style;

mod effect;
mod gesture;
mod long_press;
mod primitives;
mod subject;
mod types;

#[cfg(test)]
mod test_util;

pub use effect::{ListenerId, TouchEffect, WeakTouchEffect};
pub use subject::{DEFAULT_LONG_PRESS_DURATION, NativeAnimation, RippleRepeat, TouchOptions};
pub use types::{
    HoverState, HoverStatus, InteractionStatus, TouchEvent, TouchState, TouchStatus,
    VisualState,
};
