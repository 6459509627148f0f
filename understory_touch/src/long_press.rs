// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Long-press timer.
//!
//! Re-evaluated on every touch state change. Releasing the press cancels the pending
//! timer; pressing arms a fresh one when the subject has a long-press command and a user
//! interaction is in progress. On expiry the interaction is marked completed, which is
//! what keeps the release from also firing the tap command.

use alloc::boxed::Box;
use alloc::rc::Rc;

use crate::cancel::{cancel_slot, renew, run_until_canceled};
use crate::effect::{Shared, TouchEffect};
use crate::types::{InteractionStatus, TouchEvent, TouchState};

/// Arm, re-arm or disarm the timer for the subject's current state.
pub(crate) fn handle_long_press(shared: &Rc<Shared>) {
    let (duration, token) = {
        let mut core = shared.core.borrow_mut();
        if core.subject.state == TouchState::Normal {
            if cancel_slot(&mut core.long_press_token) {
                log::trace!("long press disarmed");
            }
            return;
        }
        if core.subject.long_press_command.is_none()
            || core.subject.interaction_status == InteractionStatus::Completed
        {
            return;
        }
        let duration = core.subject.options.long_press_duration;
        (duration, renew(&mut core.long_press_token))
    };

    log::trace!("long press armed for {duration:?}");
    let delay = shared.runtime.delay(duration);
    let effect = Rc::downgrade(shared);
    shared.runtime.spawn_local(Box::pin(async move {
        if run_until_canceled(&token, delay).await.is_none() {
            return;
        }
        let Some(shared) = effect.upgrade() else {
            return;
        };
        {
            let mut core = shared.core.borrow_mut();
            if core.long_press_token.as_ref().is_some_and(|t| t.same_as(&token)) {
                core.long_press_token = None;
            }
        }
        fire(&TouchEffect::from_shared(shared));
    }));
}

fn fire(effect: &TouchEffect) {
    effect.handle_user_interaction(InteractionStatus::Completed);

    let (command, parameter) = {
        let core = effect.shared().core.borrow();
        let subject = &core.subject;
        (
            subject.long_press_command.clone(),
            subject.effective_long_press_parameter().cloned(),
        )
    };
    if let Some(command) = command {
        log::debug!("long press fired");
        command.execute(parameter.as_ref());
    }
    effect.notify(TouchEvent::LongPressCompleted);
}
