// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw pointer tracking for platform adapters.
//!
//! Most platforms deliver down / move / up / cancel and enter / exit with positions, and
//! leave it to the control to decide what counts as a press. [`PointerTracker`] makes
//! that decision once, in a platform-neutral way, and answers each event with the
//! [`PointerAction`]s to perform:
//!
//! - A down starts the interaction and the press, asks the parent not to intercept when a
//!   movement threshold is configured, and starts the native ripple when enabled.
//! - A move further than the threshold (on either axis) from the down position abandons
//!   the press so the parent can take over, for example to scroll.
//! - Within the threshold, leaving the bounds cancels the press and re-entering restarts it.
//! - An up completes the press if it is still started and cancels it otherwise.
//!
//! Once a press has ended, further moves and ups are ignored until the next down.
//!
//! ```
//! use kurbo::{Point, Rect};
//! use understory_touch::pointer::{PointerAction, PointerContext, PointerEvent, PointerTracker};
//! use understory_touch::{InteractionStatus, TouchStatus};
//!
//! let mut tracker = PointerTracker::new();
//! let ctx = PointerContext {
//!     bounds: Rect::new(0.0, 0.0, 100.0, 40.0),
//!     status: TouchStatus::Completed,
//!     threshold: 0.0,
//!     native_ripple: false,
//! };
//! let actions = tracker.handle(PointerEvent::Down(Point::new(10.0, 10.0)), &ctx);
//! assert_eq!(
//!     actions.as_slice(),
//!     [
//!         PointerAction::Interaction(InteractionStatus::Started),
//!         PointerAction::Touch(TouchStatus::Started),
//!     ]
//! );
//! ```

use kurbo::{Point, Rect};
use smallvec::SmallVec;

use crate::types::{HoverStatus, InteractionStatus, TouchStatus};

/// Platform-neutral pointer event, in the coordinate space of [`PointerContext::bounds`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PointerEvent {
    /// Pointer pressed.
    Down(Point),
    /// Pointer moved while pressed.
    Move(Point),
    /// Pointer released.
    Up(Point),
    /// The platform took the pointer away (for example, a parent intercepted it).
    Cancel,
    /// A hovering pointer entered the control.
    Enter,
    /// A hovering pointer left the control.
    Exit,
}

/// What to do in response to a [`PointerEvent`], in order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PointerAction {
    /// Report an interaction status.
    Interaction(InteractionStatus),
    /// Report a touch status.
    Touch(TouchStatus),
    /// Report a hover status.
    Hover(HoverStatus),
    /// Start the native ripple at this position.
    StartRipple(Point),
    /// Stop the native ripple.
    StopRipple,
    /// Ask the parent to stop (`true`) or resume (`false`) intercepting the pointer.
    DisallowParentIntercept(bool),
}

/// Actions produced by one event.
pub type PointerActions = SmallVec<[PointerAction; 4]>;

/// Inputs of [`PointerTracker::handle`] that live outside the tracker.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerContext {
    /// Bounds of the control.
    pub bounds: Rect,
    /// Current touch status of the subject.
    pub status: TouchStatus,
    /// Movement after which the press is abandoned; `0.0` disables.
    pub threshold: f64,
    /// Whether the native ripple is enabled.
    pub native_ripple: bool,
}

/// Press tracking state for one control.
#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
    /// Down position of the live press; `None` when no press is live.
    origin: Option<Point>,
}

impl PointerTracker {
    /// A tracker with no live press.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a press is live (down seen, not yet ended).
    pub fn is_pressing(&self) -> bool {
        self.origin.is_some()
    }

    /// Process one event.
    pub fn handle(&mut self, event: PointerEvent, ctx: &PointerContext) -> PointerActions {
        let mut actions = PointerActions::new();
        match event {
            PointerEvent::Down(position) => self.on_down(position, ctx, &mut actions),
            PointerEvent::Move(position) => self.on_move(position, ctx, &mut actions),
            PointerEvent::Up(_) => {
                let status = if ctx.status == TouchStatus::Started {
                    TouchStatus::Completed
                } else {
                    TouchStatus::Canceled
                };
                self.end(status, ctx, &mut actions);
            }
            PointerEvent::Cancel => self.end(TouchStatus::Canceled, ctx, &mut actions),
            PointerEvent::Enter => actions.push(PointerAction::Hover(HoverStatus::Entered)),
            PointerEvent::Exit => actions.push(PointerAction::Hover(HoverStatus::Exited)),
        }
        actions
    }

    fn on_down(&mut self, position: Point, ctx: &PointerContext, actions: &mut PointerActions) {
        self.origin = Some(position);
        actions.push(PointerAction::Interaction(InteractionStatus::Started));
        actions.push(PointerAction::Touch(TouchStatus::Started));
        if ctx.native_ripple {
            actions.push(PointerAction::StartRipple(position));
        }
        if ctx.threshold > 0.0 {
            actions.push(PointerAction::DisallowParentIntercept(true));
        }
    }

    fn on_move(&mut self, position: Point, ctx: &PointerContext, actions: &mut PointerActions) {
        let Some(origin) = self.origin else {
            return;
        };

        let delta = position - origin;
        let travel = delta.x.abs().max(delta.y.abs());
        if ctx.threshold > 0.0 && travel > ctx.threshold {
            self.end(TouchStatus::Canceled, ctx, actions);
            return;
        }

        let status = if ctx.bounds.contains(position) {
            TouchStatus::Started
        } else {
            TouchStatus::Canceled
        };
        if ctx.status == status {
            return;
        }
        actions.push(PointerAction::Touch(status));
        if ctx.native_ripple {
            actions.push(match status {
                TouchStatus::Started => PointerAction::StartRipple(position),
                TouchStatus::Canceled | TouchStatus::Completed => PointerAction::StopRipple,
            });
        }
    }

    fn end(&mut self, status: TouchStatus, ctx: &PointerContext, actions: &mut PointerActions) {
        if self.origin.take().is_none() {
            return;
        }
        if ctx.threshold > 0.0 {
            actions.push(PointerAction::DisallowParentIntercept(false));
        }
        actions.push(PointerAction::Touch(status));
        actions.push(PointerAction::Interaction(InteractionStatus::Completed));
        if ctx.native_ripple {
            actions.push(PointerAction::StopRipple);
        }
    }
}
