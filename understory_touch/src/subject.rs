// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The interactive element ("subject") whose touch, hover and toggle state the core owns.

use alloc::rc::Rc;
use core::fmt;
use core::time::Duration;

use crate::host::{Command, CommandParameter};
use crate::style::{Color, TouchStyle};
use crate::types::{HoverState, HoverStatus, InteractionStatus, TouchState, TouchStatus};

/// How long a press must be held before the long-press command fires.
pub const DEFAULT_LONG_PRESS_DURATION: Duration = Duration::from_millis(500);

/// How often an animated press repeats the press ↔ release ripple sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RippleRepeat {
    /// Run the sequence this many times; `0` disables it.
    Times(u32),
    /// Repeat until the next state change cancels it.
    Forever,
}

impl RippleRepeat {
    /// Disabled.
    pub const OFF: Self = Self::Times(0);

    /// Whether the sequence is disabled.
    pub const fn is_off(self) -> bool {
        matches!(self, Self::Times(0))
    }
}

impl Default for RippleRepeat {
    fn default() -> Self {
        Self::OFF
    }
}

/// Native ripple configuration.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct NativeAnimation {
    /// Opt in to the platform ripple.
    pub enabled: bool,
    /// Ripple color; host default when `None`.
    pub color: Option<Color>,
    /// Ripple radius; host default when `None`.
    pub radius: Option<f64>,
    /// Shadow radius; host default when `None`.
    pub shadow_radius: Option<f64>,
    /// Let the ripple draw outside the control.
    pub borderless: bool,
}

/// Behavioral configuration of a subject.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TouchOptions {
    /// Hold time before the long-press command fires.
    pub long_press_duration: Duration,
    /// Ripple sequence repeat count for animated presses.
    pub ripple: RippleRepeat,
    /// Platform ripple.
    pub native_animation: NativeAnimation,
    /// Pointer travel (in pointer units) after which a press is canceled so a parent can
    /// take over. While a press is active with a positive threshold, the parent is asked not
    /// to intercept. `0.0` disables both.
    pub disallow_touch_threshold: f64,
}

impl Default for TouchOptions {
    fn default() -> Self {
        Self {
            long_press_duration: DEFAULT_LONG_PRESS_DURATION,
            ripple: RippleRepeat::OFF,
            native_animation: NativeAnimation::default(),
            disallow_touch_threshold: 0.0,
        }
    }
}

/// Touch, hover, interaction and toggle state plus bindings of one element.
///
/// Mutated only through [`TouchEffect`](crate::TouchEffect), on the UI context.
pub(crate) struct Subject {
    pub(crate) enabled: bool,
    pub(crate) available: bool,
    pub(crate) command: Option<Rc<dyn Command>>,
    pub(crate) command_parameter: Option<CommandParameter>,
    pub(crate) long_press_command: Option<Rc<dyn Command>>,
    pub(crate) long_press_parameter: Option<CommandParameter>,
    pub(crate) toggled: Option<bool>,
    pub(crate) status: TouchStatus,
    pub(crate) state: TouchState,
    pub(crate) hover_status: HoverStatus,
    pub(crate) hover_state: HoverState,
    pub(crate) interaction_status: InteractionStatus,
    pub(crate) style: TouchStyle,
    pub(crate) options: TouchOptions,
}

impl Default for Subject {
    fn default() -> Self {
        Self {
            enabled: true,
            available: true,
            command: None,
            command_parameter: None,
            long_press_command: None,
            long_press_parameter: None,
            toggled: None,
            status: TouchStatus::default(),
            state: TouchState::default(),
            hover_status: HoverStatus::default(),
            hover_state: HoverState::default(),
            interaction_status: InteractionStatus::default(),
            style: TouchStyle::default(),
            options: TouchOptions::default(),
        }
    }
}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("enabled", &self.enabled)
            .field("available", &self.available)
            .field("has_command", &self.command.is_some())
            .field("has_long_press_command", &self.long_press_command.is_some())
            .field("toggled", &self.toggled)
            .field("status", &self.status)
            .field("state", &self.state)
            .field("hover_status", &self.hover_status)
            .field("hover_state", &self.hover_state)
            .field("interaction_status", &self.interaction_status)
            .field("style", &self.style)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Subject {
    /// Disabled subjects ignore touch and hover entirely.
    pub(crate) fn is_disabled(&self) -> bool {
        !self.enabled
    }

    /// Whether a press may start and the tap command may run.
    ///
    /// Requires an enabled, available subject whose command (when bound) accepts the
    /// current parameter.
    pub(crate) fn can_execute(&self) -> bool {
        self.enabled
            && self.available
            && self
                .command
                .as_ref()
                .is_none_or(|command| command.can_execute(self.command_parameter.as_ref()))
    }

    /// Parameter for the long-press command, falling back to the tap parameter.
    pub(crate) fn effective_long_press_parameter(&self) -> Option<&CommandParameter> {
        self.long_press_parameter
            .as_ref()
            .or(self.command_parameter.as_ref())
    }
}
