// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-element driver handle.
//!
//! [`TouchEffect`] owns a subject, its animation and long-press bookkeeping, and the
//! host capabilities. Platform adapters feed it statuses (or raw pointer events through
//! [`TouchEffect::handle_pointer`]); everything else follows from there.
//!
//! All methods must be called on the UI context that runs the [`UiRuntime`].

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt;

use smallvec::SmallVec;

use crate::animation::{self, AnimationTracking, CustomAnimation};
use crate::cancel::{CancellationToken, cancel_slot};
use crate::gesture::{self, Effect, Effects};
use crate::host::{Command, CommandParameter, PointerSource, Ripple, UiRuntime, VisualHost};
use crate::long_press;
use crate::pointer::{PointerAction, PointerContext, PointerEvent, PointerTracker};
use crate::style::{Color, TouchStyle};
use crate::subject::{Subject, TouchOptions};
use crate::types::{
    HoverState, HoverStatus, InteractionStatus, TouchEvent, TouchState, TouchStatus,
};

/// Handle identifying a listener registered with [`TouchEffect::subscribe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn(&TouchEvent)>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: SmallVec<[(ListenerId, Listener); 2]>,
}

/// Mutable state behind a [`TouchEffect`].
pub(crate) struct Core {
    pub(crate) subject: Subject,
    pub(crate) tracking: AnimationTracking,
    pub(crate) animation_token: Option<CancellationToken>,
    pub(crate) long_press_token: Option<CancellationToken>,
    pub(crate) default_background: Option<Color>,
    pub(crate) custom_animation: Option<CustomAnimation>,
    pub(crate) detached: bool,
    pointer: PointerTracker,
    source: Option<Box<dyn PointerSource>>,
}

pub(crate) struct Shared {
    pub(crate) host: Rc<dyn VisualHost>,
    pub(crate) runtime: Rc<dyn UiRuntime>,
    pub(crate) core: RefCell<Core>,
    listeners: RefCell<Listeners>,
}

/// Touch feedback and command dispatch for one interactive element.
///
/// Cloning yields another handle to the same effect.
#[derive(Clone)]
pub struct TouchEffect {
    shared: Rc<Shared>,
}

/// Non-owning handle to a [`TouchEffect`], held by pointer sources and other
/// long-lived platform callbacks. Calls on a dropped effect are ignored.
#[derive(Clone, Default)]
pub struct WeakTouchEffect {
    shared: Weak<Shared>,
}

impl fmt::Debug for TouchEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("TouchEffect");
        if let Ok(core) = self.shared.core.try_borrow() {
            s.field("subject", &core.subject)
                .field("detached", &core.detached)
                .field("has_source", &core.source.is_some());
        }
        s.finish_non_exhaustive()
    }
}

impl fmt::Debug for WeakTouchEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakTouchEffect")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}

impl WeakTouchEffect {
    /// The effect, if it is still alive.
    pub fn upgrade(&self) -> Option<TouchEffect> {
        self.shared.upgrade().map(TouchEffect::from_shared)
    }

    /// Forward a raw pointer event; dropped if the effect is gone.
    pub fn handle_pointer(&self, event: PointerEvent) {
        if let Some(effect) = self.upgrade() {
            effect.handle_pointer(event);
        }
    }
}

impl TouchEffect {
    /// Create an effect for a native control.
    pub fn new(host: Rc<dyn VisualHost>, runtime: Rc<dyn UiRuntime>) -> Self {
        let core = Core {
            subject: Subject::default(),
            tracking: AnimationTracking::default(),
            animation_token: None,
            long_press_token: None,
            default_background: None,
            custom_animation: None,
            detached: false,
            pointer: PointerTracker::new(),
            source: None,
        };
        Self::from_shared(Rc::new(Shared {
            host,
            runtime,
            core: RefCell::new(core),
            listeners: RefCell::default(),
        }))
    }

    pub(crate) fn from_shared(shared: Rc<Shared>) -> Self {
        Self { shared }
    }

    pub(crate) fn shared(&self) -> &Rc<Shared> {
        &self.shared
    }

    /// A non-owning handle.
    pub fn downgrade(&self) -> WeakTouchEffect {
        WeakTouchEffect {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Subscribe a native pointer source, replacing any previous one, and resume
    /// processing after [`Self::detach`].
    pub fn attach(&self, mut source: Box<dyn PointerSource>) {
        let previous = {
            let mut core = self.shared.core.borrow_mut();
            core.detached = false;
            core.source.take()
        };
        if let Some(mut previous) = previous {
            previous.detach();
        }
        source.attach(self.downgrade());
        self.shared.core.borrow_mut().source = Some(source);
        log::debug!("touch effect attached");
    }

    /// Stop all work and unsubscribe the pointer source.
    ///
    /// Pending animations and the long-press timer are canceled; input is ignored until
    /// the next [`Self::attach`].
    pub fn detach(&self) {
        let source = {
            let mut core = self.shared.core.borrow_mut();
            core.detached = true;
            core.pointer = PointerTracker::new();
            cancel_slot(&mut core.long_press_token);
            core.source.take()
        };
        animation::abort_animations(&self.shared);
        if let Some(mut source) = source {
            source.detach();
        }
        log::debug!("touch effect detached");
    }

    /// Report a touch status.
    pub fn handle_touch(&self, status: TouchStatus) {
        self.run(|core, effects| {
            log::trace!("touch {status:?}");
            gesture::handle_touch(&mut core.subject, &mut core.tracking, status, effects);
        });
    }

    /// Report a hover status.
    pub fn handle_hover(&self, status: HoverStatus) {
        self.run(|core, effects| {
            log::trace!("hover {status:?}");
            gesture::handle_hover(&mut core.subject, status, effects);
        });
    }

    /// Report whether a user interaction sequence is running.
    pub fn handle_user_interaction(&self, status: InteractionStatus) {
        self.run(|core, effects| {
            gesture::handle_user_interaction(&mut core.subject, status, effects);
        });
    }

    /// Feed a raw pointer event through the built-in [`PointerTracker`].
    pub fn handle_pointer(&self, event: PointerEvent) {
        let bounds = self.shared.host.bounds();
        let (actions, native) = {
            let mut core = self.shared.core.borrow_mut();
            if core.detached {
                return;
            }
            let native = core.subject.options.native_animation;
            let ctx = PointerContext {
                bounds,
                status: core.subject.status,
                threshold: core.subject.options.disallow_touch_threshold,
                native_ripple: native.enabled,
            };
            (core.pointer.handle(event, &ctx), native)
        };

        for action in actions {
            match action {
                PointerAction::Interaction(status) => self.handle_user_interaction(status),
                PointerAction::Touch(status) => self.handle_touch(status),
                PointerAction::Hover(status) => self.handle_hover(status),
                PointerAction::StartRipple(origin) => {
                    // Only a press the subject accepted gets a ripple.
                    if self.status() != TouchStatus::Started {
                        continue;
                    }
                    let ripple = Ripple {
                        origin,
                        color: native.color,
                        radius: native.radius,
                        shadow_radius: native.shadow_radius,
                        borderless: native.borderless,
                    };
                    if let Err(err) = self.shared.host.start_ripple(&ripple) {
                        log::debug!("native ripple failed: {err}");
                    }
                }
                PointerAction::StopRipple => self.shared.host.stop_ripple(),
                PointerAction::DisallowParentIntercept(disallow) => {
                    self.shared.host.set_parent_intercept_disallowed(disallow);
                }
            }
        }
    }

    /// Animate toward the current state, superseding any running animation.
    pub fn change_state(&self, animated: bool) {
        animation::change_state(&self.shared, animated);
    }

    /// Re-apply the current state after a configuration change.
    ///
    /// Equivalent to [`Self::change_state`]; non-animated updates consume a pending
    /// toggle duration multiplier.
    pub fn force_update_state(&self, animated: bool) {
        self.change_state(animated);
    }

    /// Cancel the running animation and every native animation on the control.
    pub fn abort_animations(&self) {
        animation::abort_animations(&self.shared);
    }

    /// Register a listener for [`TouchEvent`]s.
    pub fn subscribe(&self, listener: impl Fn(&TouchEvent) + 'static) -> ListenerId {
        let mut listeners = self.shared.listeners.borrow_mut();
        let id = ListenerId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.shared.listeners.borrow_mut();
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry, _)| *entry != id);
        listeners.entries.len() != before
    }

    /// Enable or disable the subject. Disabled subjects ignore touch and hover.
    pub fn set_enabled(&self, enabled: bool) {
        self.shared.core.borrow_mut().subject.enabled = enabled;
    }

    /// Whether the subject is enabled.
    pub fn is_enabled(&self) -> bool {
        self.shared.core.borrow().subject.enabled
    }

    /// Set the availability flag consulted by the can-execute check.
    pub fn set_available(&self, available: bool) {
        self.shared.core.borrow_mut().subject.available = available;
    }

    /// Whether the subject is available.
    pub fn is_available(&self) -> bool {
        self.shared.core.borrow().subject.available
    }

    /// Whether a press may start and the tap command may run right now.
    pub fn can_execute(&self) -> bool {
        self.shared.core.borrow().subject.can_execute()
    }

    /// Bind the tap command.
    pub fn set_command(&self, command: Option<Rc<dyn Command>>) {
        self.shared.core.borrow_mut().subject.command = command;
    }

    /// Parameter passed to the tap command (and to the long-press command by default).
    pub fn set_command_parameter(&self, parameter: Option<CommandParameter>) {
        self.shared.core.borrow_mut().subject.command_parameter = parameter;
    }

    /// Bind the long-press command.
    pub fn set_long_press_command(&self, command: Option<Rc<dyn Command>>) {
        self.shared.core.borrow_mut().subject.long_press_command = command;
    }

    /// Parameter passed to the long-press command.
    pub fn set_long_press_parameter(&self, parameter: Option<CommandParameter>) {
        self.shared.core.borrow_mut().subject.long_press_parameter = parameter;
    }

    /// Set the toggle value; `None` makes the subject a plain button.
    ///
    /// A change is applied to the visuals without animation and reported as
    /// [`TouchEvent::ToggledChanged`].
    pub fn set_toggled(&self, toggled: Option<bool>) {
        {
            let mut core = self.shared.core.borrow_mut();
            if core.subject.toggled == toggled {
                return;
            }
            core.subject.toggled = toggled;
        }
        self.force_update_state(false);
        self.notify(TouchEvent::ToggledChanged(toggled));
    }

    /// The toggle value.
    pub fn toggled(&self) -> Option<bool> {
        self.shared.core.borrow().subject.toggled
    }

    /// Edit the style, then re-apply the current state.
    pub fn update_style(&self, update: impl FnOnce(&mut TouchStyle)) {
        update(&mut self.shared.core.borrow_mut().subject.style);
        self.force_update_state(true);
    }

    /// A copy of the style.
    pub fn style(&self) -> TouchStyle {
        self.shared.core.borrow().subject.style.clone()
    }

    /// Edit the behavioral options.
    pub fn update_options(&self, update: impl FnOnce(&mut TouchOptions)) {
        update(&mut self.shared.core.borrow_mut().subject.options);
    }

    /// The behavioral options.
    pub fn options(&self) -> TouchOptions {
        self.shared.core.borrow().subject.options
    }

    /// Install or remove the extra animation leg run on every pass.
    pub fn set_custom_animation(&self, animation: Option<CustomAnimation>) {
        self.shared.core.borrow_mut().custom_animation = animation;
    }

    /// Current touch status.
    pub fn status(&self) -> TouchStatus {
        self.shared.core.borrow().subject.status
    }

    /// Current touch state.
    pub fn state(&self) -> TouchState {
        self.shared.core.borrow().subject.state
    }

    /// Last reported hover status.
    pub fn hover_status(&self) -> HoverStatus {
        self.shared.core.borrow().subject.hover_status
    }

    /// Current hover state.
    pub fn hover_state(&self) -> HoverState {
        self.shared.core.borrow().subject.hover_state
    }

    /// Current interaction status.
    pub fn interaction_status(&self) -> InteractionStatus {
        self.shared.core.borrow().subject.interaction_status
    }

    /// Run a state-machine step, then apply the effects it produced.
    fn run(&self, step: impl FnOnce(&mut Core, &mut Effects)) {
        let mut effects = Effects::new();
        {
            let mut core = self.shared.core.borrow_mut();
            if core.detached {
                return;
            }
            step(&mut *core, &mut effects);
        }
        self.apply(effects);
    }

    fn apply(&self, effects: Effects) {
        for effect in effects {
            match effect {
                Effect::Notify(event) => self.notify(event),
                Effect::StateChanged(state) => {
                    self.change_state(true);
                    long_press::handle_long_press(&self.shared);
                    self.notify(TouchEvent::StateChanged(state));
                }
                Effect::HoverStateChanged(state) => {
                    self.change_state(true);
                    self.notify(TouchEvent::HoverStateChanged(state));
                }
                Effect::ForceUpdate { animated } => self.force_update_state(animated),
                Effect::Tap => self.tap(),
                Effect::Toggle(toggled) => self.set_toggled(Some(toggled)),
            }
        }
    }

    fn tap(&self) {
        let (command, parameter) = {
            let core = self.shared.core.borrow();
            if !gesture::tap_allowed(&core.subject) {
                log::trace!("tap suppressed");
                return;
            }
            (
                core.subject.command.clone(),
                core.subject.command_parameter.clone(),
            )
        };
        if let Some(command) = command {
            log::debug!("tap fired");
            command.execute(parameter.as_ref());
        }
        self.notify(TouchEvent::Completed);
    }

    pub(crate) fn notify(&self, event: TouchEvent) {
        let listeners: SmallVec<[Listener; 4]> = self
            .shared
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }
}
