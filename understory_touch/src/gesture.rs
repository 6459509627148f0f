// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch and hover state machine.
//!
//! The functions here are synchronous and side-effect free apart from the subject and
//! animation bookkeeping they are handed. Everything that reaches outside (listener
//! notifications, animations, commands, toggle writes) is pushed onto an [`Effects`]
//! buffer, which [`TouchEffect`](crate::TouchEffect) applies in order once its internal
//! borrows are released. That keeps commands and listeners free to call back into the
//! effect.
//!
//! ## Toggle subjects
//!
//! A subject with a toggle value treats press/release as on/off switching. A press shows
//! the *opposite* of the current toggle value; a release completes the switch. When the
//! release interrupts the press animation, the next pass is shortened with a duration
//! multiplier (see [`duration_multiplier`]) so it continues from where the press left off.

use smallvec::SmallVec;

use crate::animation::AnimationTracking;
use crate::subject::Subject;
use crate::types::{
    HoverState, HoverStatus, InteractionStatus, TouchEvent, TouchState, TouchStatus,
};

/// Side effect requested by the state machine.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Effect {
    /// Tell listeners.
    Notify(TouchEvent),
    /// The touch state changed: animate toward it, re-evaluate the long-press timer and
    /// tell listeners.
    StateChanged(TouchState),
    /// The hover state changed: animate toward it and tell listeners.
    HoverStateChanged(HoverState),
    /// Refresh the visual state without a state change.
    ForceUpdate {
        /// Whether to animate, or apply immediately (honoring a pending multiplier).
        animated: bool,
    },
    /// Run the tap path.
    Tap,
    /// Store a new toggle value.
    Toggle(bool),
}

/// Ordered effect buffer.
pub(crate) type Effects = SmallVec<[Effect; 6]>;

/// Feed one touch status into the machine.
pub(crate) fn handle_touch(
    subject: &mut Subject,
    tracking: &mut AnimationTracking,
    status: TouchStatus,
    effects: &mut Effects,
) {
    if subject.is_disabled() {
        return;
    }

    let status = if status == TouchStatus::Started && !subject.can_execute() {
        log::trace!("press rejected by command policy, treating as canceled");
        TouchStatus::Canceled
    } else {
        status
    };

    let mut state = TouchState::from_status(status);

    if status == TouchStatus::Started {
        tracking.progress = 0.0;
        tracking.reference_state = state;
    }

    if let Some(toggled) = subject.toggled {
        if status != TouchStatus::Started {
            tracking.duration_multiplier = Some(duration_multiplier(
                tracking.reference_state,
                toggled,
                tracking.progress,
            ));

            update_status_and_state(subject, status, state, effects);
            if status == TouchStatus::Canceled {
                effects.push(Effect::ForceUpdate { animated: false });
                return;
            }

            effects.push(Effect::Tap);
            effects.push(Effect::Toggle(!toggled));
            return;
        }

        state = TouchState::for_toggle(!toggled);
    }

    update_status_and_state(subject, status, state, effects);

    if status == TouchStatus::Completed {
        effects.push(Effect::Tap);
    }
}

/// Feed one hover status into the machine.
///
/// The hover state only notifies on change, but every report updates the status and
/// notifies, so repeated `Entered` reports are observable.
pub(crate) fn handle_hover(subject: &mut Subject, status: HoverStatus, effects: &mut Effects) {
    if subject.is_disabled() {
        return;
    }

    let state = HoverState::from_status(status);
    if subject.hover_state != state {
        subject.hover_state = state;
        effects.push(Effect::HoverStateChanged(state));
    }

    subject.hover_status = status;
    effects.push(Effect::Notify(TouchEvent::HoverStatusChanged(status)));
}

/// Record whether a user interaction sequence is running.
pub(crate) fn handle_user_interaction(
    subject: &mut Subject,
    status: InteractionStatus,
    effects: &mut Effects,
) {
    if subject.interaction_status != status {
        subject.interaction_status = status;
        effects.push(Effect::Notify(TouchEvent::InteractionStatusChanged(status)));
    }
}

/// Whether the tap command may fire now.
///
/// A long press that already fired in this interaction marks it completed, which
/// suppresses the tap that its release would otherwise produce.
pub(crate) fn tap_allowed(subject: &Subject) -> bool {
    subject.can_execute()
        && !(subject.long_press_command.is_some()
            && subject.interaction_status == InteractionStatus::Completed)
}

/// Scale applied to the next pass when a toggle release interrupts a press pass.
///
/// `reference` is the state the interrupted pass was animating toward and `progress` how
/// far it got. If the pass was heading away from the look of the current toggle value,
/// the remaining `1 - progress` is used; otherwise the elapsed `progress`.
///
/// | reference | toggled | multiplier     |
/// |-----------|---------|----------------|
/// | Pressed   | false   | `1 - progress` |
/// | Normal    | true    | `1 - progress` |
/// | Pressed   | true    | `progress`     |
/// | Normal    | false   | `progress`     |
pub(crate) fn duration_multiplier(reference: TouchState, toggled: bool, progress: f64) -> f64 {
    if reference != TouchState::for_toggle(toggled) {
        1.0 - progress
    } else {
        progress
    }
}

fn update_status_and_state(
    subject: &mut Subject,
    status: TouchStatus,
    state: TouchState,
    effects: &mut Effects,
) {
    if subject.status != status {
        subject.status = status;
        effects.push(Effect::Notify(TouchEvent::StatusChanged(status)));
    }

    // Every report re-runs the state, except a cancel that leaves it where it was.
    if subject.state != state || status != TouchStatus::Canceled {
        subject.state = state;
        effects.push(Effect::StateChanged(state));
    }
}
