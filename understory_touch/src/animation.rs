// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation orchestration.
//!
//! Every call to [`change_state`] supersedes the previous one: the old token is canceled
//! and native animations are stopped before the new pass is planned, so at most one pass
//! sequence is live per subject. Planning happens synchronously against a snapshot of the
//! subject; the pass itself runs as a task on the [`UiRuntime`].
//!
//! A pass launches one leg per animated property plus a progress tracker and waits for
//! all of them. Ripple sequences chain press and release passes, checking the token
//! between passes.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::time::Duration;

use futures_util::FutureExt as _;
use futures_util::future::{LocalBoxFuture, join_all};

use crate::cancel::{CancellationToken, cancel_slot, renew, run_until_canceled};
use crate::effect::{Core, Shared};
use crate::host::{AnimatedProperty, PropertyValue, UiRuntime, VisualHost};
use crate::primitives;
use crate::style::{AnimatedProperties, Color, Timing, TouchStyle};
use crate::subject::{RippleRepeat, Subject};
use crate::types::{HoverState, TouchState, TouchStatus, VisualState};

/// Interval at which a running pass reports its progress.
pub const PROGRESS_STEP: Duration = Duration::from_millis(10);

/// What a [`CustomAnimation`] is asked to animate.
#[derive(Clone, Debug)]
pub struct AnimationContext {
    /// State the pass animates toward.
    pub target: TouchState,
    /// Hover state at the time the pass was planned.
    pub hover: HoverState,
    /// Resolved duration and easing of the pass.
    pub timing: Timing,
    /// Canceled when the pass is superseded.
    pub token: CancellationToken,
}

/// Extra leg run alongside the built-in ones on every pass.
pub type CustomAnimation = Rc<dyn Fn(AnimationContext) -> LocalBoxFuture<'static, ()>>;

/// Progress of the latest pass, used to size the next one after an interruption.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) struct AnimationTracking {
    /// Fraction of the latest pass that has elapsed, in `[0, 1]`.
    pub(crate) progress: f64,
    /// State the latest pass animates toward.
    pub(crate) reference_state: TouchState,
    /// Scale for the next non-animated pass; consumed by it.
    pub(crate) duration_multiplier: Option<f64>,
}

/// Shape of the work a state change schedules.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Plan {
    /// One pass toward `target`, its duration scaled by `multiplier`.
    Single {
        target: TouchState,
        multiplier: Option<f64>,
    },
    /// Alternating `first` / opposite passes.
    Ripple {
        first: TouchState,
        repeat: RippleRepeat,
    },
}

/// Decide what a state change animates.
///
/// Consumes the pending duration multiplier for non-animated changes; a missing
/// multiplier makes them instantaneous.
pub(crate) fn plan(subject: &Subject, tracking: &mut AnimationTracking, animated: bool) -> Plan {
    if !animated {
        let target = subject
            .toggled
            .map_or(subject.state, TouchState::for_toggle);
        let multiplier = tracking.duration_multiplier.take().unwrap_or(0.0);
        return Plan::Single {
            target,
            multiplier: Some(multiplier),
        };
    }

    let repeat = subject.options.ripple;
    if repeat.is_off() || (subject.state == TouchState::Normal && subject.toggled.is_none()) {
        let target = match subject.toggled {
            // A press shows the opposite of the toggle value; anything else shows the value.
            Some(toggled) if (subject.status == TouchStatus::Started) == toggled => {
                TouchState::Normal
            }
            Some(_) => TouchState::Pressed,
            None => subject.state,
        };
        return Plan::Single {
            target,
            multiplier: None,
        };
    }

    let first = if subject.toggled == Some(true) {
        TouchState::Normal
    } else {
        TouchState::Pressed
    };
    Plan::Ripple { first, repeat }
}

/// Supersede any running pass and animate toward the subject's current state.
pub(crate) fn change_state(shared: &Rc<Shared>, animated: bool) {
    let (visual, plan, pass) = {
        let mut core = shared.core.borrow_mut();
        if core.detached {
            return;
        }
        let core = &mut *core;
        let token = renew(&mut core.animation_token);
        let visual = VisualState::resolve(core.subject.state, core.subject.hover_state);
        let plan = plan(&core.subject, &mut core.tracking, animated);
        let default_background = default_background(core, &*shared.host);
        let pass = Pass {
            host: shared.host.clone(),
            runtime: shared.runtime.clone(),
            shared: Rc::downgrade(shared),
            style: core.subject.style.clone(),
            hover: core.subject.hover_state,
            default_background,
            custom: core.custom_animation.clone(),
            token,
        };
        (visual, plan, pass)
    };

    log::trace!("change_state animated={animated} visual={} plan={plan:?}", visual.name());
    stop_native_animations(&*shared.host);
    if let Err(err) = shared.host.apply_visual_state(visual) {
        log::debug!("applying visual state {} failed: {err}", visual.name());
    }
    shared.runtime.spawn_local(Box::pin(pass.run(plan)));
}

/// Cancel the running pass and every native animation.
pub(crate) fn abort_animations(shared: &Shared) {
    cancel_slot(&mut shared.core.borrow_mut().animation_token);
    stop_native_animations(&*shared.host);
}

fn stop_native_animations(host: &dyn VisualHost) {
    host.cancel_animations();
    host.cancel_animation(AnimatedProperty::BackgroundColor);
}

/// Background color the control had before the first color pass.
///
/// Read from the host once, the first time a style animates the background color.
fn default_background(core: &mut Core, host: &dyn VisualHost) -> Color {
    if let Some(color) = core.default_background {
        return color;
    }
    if !core
        .subject
        .style
        .animated_properties()
        .contains(AnimatedProperties::BACKGROUND_COLOR)
    {
        return Color::TRANSPARENT;
    }
    let color = match host.current_value(AnimatedProperty::BackgroundColor) {
        Ok(PropertyValue::Color(color)) => color,
        Ok(other) => {
            log::debug!("background color reported as {other:?}, assuming transparent");
            Color::TRANSPARENT
        }
        Err(err) => {
            log::debug!("reading background color failed, assuming transparent: {err}");
            Color::TRANSPARENT
        }
    };
    core.default_background = Some(color);
    color
}

/// Everything a pass sequence needs, captured when it was planned.
struct Pass {
    host: Rc<dyn VisualHost>,
    runtime: Rc<dyn UiRuntime>,
    shared: Weak<Shared>,
    style: TouchStyle,
    hover: HoverState,
    default_background: Color,
    custom: Option<CustomAnimation>,
    token: CancellationToken,
}

impl Pass {
    async fn run(self, plan: Plan) {
        match plan {
            Plan::Single { target, multiplier } => {
                self.pass(target, multiplier).await;
            }
            Plan::Ripple { first, repeat } => {
                let mut remaining = repeat;
                loop {
                    let mut elapsed = Duration::ZERO;
                    for target in [first, first.inverted()] {
                        elapsed += self.pass(target, None).await;
                        if self.token.is_canceled() {
                            return;
                        }
                    }
                    match &mut remaining {
                        RippleRepeat::Times(n) => {
                            *n = n.saturating_sub(1);
                            if *n == 0 {
                                return;
                            }
                        }
                        // Instant passes would spin without ever yielding.
                        RippleRepeat::Forever if elapsed.is_zero() => {
                            log::trace!("endless ripple with zero duration stops after one round");
                            return;
                        }
                        RippleRepeat::Forever => {}
                    }
                }
            }
        }
    }

    fn timing(&self, target: TouchState, multiplier: Option<f64>) -> Timing {
        let mut timing = self.style.timings.resolve(target, self.hover);
        if let Some(multiplier) = multiplier {
            timing.duration = timing.duration.mul_f64(multiplier.clamp(0.0, 1.0));
        }
        timing.duration = timing.duration.max(self.host.min_animation_duration());
        timing
    }

    /// Run one pass and return its duration.
    async fn pass(&self, target: TouchState, multiplier: Option<f64>) -> Duration {
        let timing = self.timing(target, multiplier);
        log::trace!("pass toward {target:?} over {:?}", timing.duration);

        let mut legs: Vec<LocalBoxFuture<'_, ()>> = Vec::new();
        if let Some(custom) = &self.custom {
            legs.push(custom(AnimationContext {
                target,
                hover: self.hover,
                timing,
                token: self.token.clone(),
            }));
        }
        if let Some(image) = primitives::image_target(&self.style, target, self.hover) {
            legs.push(
                primitives::swap_image(
                    &*self.host,
                    &*self.runtime,
                    image,
                    self.style.set_image_on_animation_end,
                    timing.duration,
                    &self.token,
                )
                .boxed_local(),
            );
        }
        let targets =
            primitives::property_targets(&self.style, target, self.hover, self.default_background);
        for (property, to) in targets {
            legs.push(
                primitives::animate_property(&*self.host, property, to, timing, &self.token)
                    .boxed_local(),
            );
        }
        legs.push(self.track_progress(target, timing.duration).boxed_local());

        join_all(legs).await;
        timing.duration
    }

    async fn track_progress(&self, target: TouchState, duration: Duration) {
        if !self.update_tracking(|tracking| {
            tracking.progress = 0.0;
            tracking.reference_state = target;
        }) {
            return;
        }

        let mut elapsed = Duration::ZERO;
        while elapsed < duration {
            if run_until_canceled(&self.token, self.runtime.delay(PROGRESS_STEP))
                .await
                .is_none()
            {
                return;
            }
            elapsed += PROGRESS_STEP;
            let progress = (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0);
            if !self.update_tracking(|tracking| tracking.progress = progress) {
                return;
            }
        }
        self.update_tracking(|tracking| tracking.progress = 1.0);
    }

    /// Apply `update` unless the pass was superseded or the effect is gone.
    fn update_tracking(&self, update: impl FnOnce(&mut AnimationTracking)) -> bool {
        if self.token.is_canceled() {
            return false;
        }
        let Some(shared) = self.shared.upgrade() else {
            return false;
        };
        update(&mut shared.core.borrow_mut().tracking);
        true
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::cell::Cell;
    use std::vec;

    use super::*;
    use crate::easing::Easing;
    use crate::style::{AnimationTimings, StateValues};
    use crate::test_util::{Call, Fixture};
    use crate::types::{HoverStatus, TouchEvent};

    fn subject(toggled: Option<bool>, status: TouchStatus, state: TouchState) -> Subject {
        Subject {
            toggled,
            status,
            state,
            ..Subject::default()
        }
    }

    #[test]
    fn non_animated_consumes_multiplier() {
        let mut tracking = AnimationTracking {
            duration_multiplier: Some(0.4),
            ..AnimationTracking::default()
        };
        let s = subject(Some(true), TouchStatus::Completed, TouchState::Normal);
        assert_eq!(
            plan(&s, &mut tracking, false),
            Plan::Single {
                target: TouchState::Pressed,
                multiplier: Some(0.4)
            }
        );
        assert_eq!(tracking.duration_multiplier, None);
        assert_eq!(
            plan(&s, &mut tracking, false),
            Plan::Single {
                target: TouchState::Pressed,
                multiplier: Some(0.0)
            }
        );
    }

    #[test]
    fn animated_toggle_target_follows_status_and_value() {
        let mut tracking = AnimationTracking::default();
        let cases = [
            (TouchStatus::Started, true, TouchState::Normal),
            (TouchStatus::Started, false, TouchState::Pressed),
            (TouchStatus::Completed, true, TouchState::Pressed),
            (TouchStatus::Completed, false, TouchState::Normal),
        ];
        for (status, toggled, expected) in cases {
            let s = subject(Some(toggled), status, TouchState::Normal);
            assert_eq!(
                plan(&s, &mut tracking, true),
                Plan::Single {
                    target: expected,
                    multiplier: None
                },
                "{status:?} toggled={toggled}"
            );
        }
    }

    #[test]
    fn ripple_only_for_presses_or_toggles() {
        let mut tracking = AnimationTracking::default();
        let mut s = subject(None, TouchStatus::Started, TouchState::Pressed);
        s.options.ripple = RippleRepeat::Times(2);
        assert_eq!(
            plan(&s, &mut tracking, true),
            Plan::Ripple {
                first: TouchState::Pressed,
                repeat: RippleRepeat::Times(2)
            }
        );

        s.state = TouchState::Normal;
        assert!(matches!(plan(&s, &mut tracking, true), Plan::Single { .. }));

        s.toggled = Some(true);
        assert_eq!(
            plan(&s, &mut tracking, true),
            Plan::Ripple {
                first: TouchState::Normal,
                repeat: RippleRepeat::Times(2)
            }
        );
    }

    fn scale_style(ms: u64) -> TouchStyle {
        TouchStyle {
            scale: StateValues::new(1.0, 0.9),
            timings: AnimationTimings::uniform(Duration::from_millis(ms), Easing::Linear),
            ..TouchStyle::default()
        }
    }

    #[test]
    fn state_change_supersedes_previous_pass() {
        let fx = Fixture::new();
        fx.effect.update_style(|style| *style = scale_style(100));
        fx.host.clear();

        fx.effect.handle_touch(TouchStatus::Started);
        fx.runtime.run_until_stalled();
        fx.effect.handle_touch(TouchStatus::Canceled);
        fx.runtime.run_until_stalled();

        let calls = fx.host.calls();
        assert_eq!(
            calls[..3],
            [
                Call::CancelAll,
                Call::CancelAnimation(AnimatedProperty::BackgroundColor),
                Call::VisualState(VisualState::Pressed),
            ]
        );
        let animations = fx.host.animations();
        assert_eq!(animations.len(), 2);
        assert_eq!(animations[0].to, PropertyValue::Scalar(0.9));
        assert_eq!(animations[1].to, PropertyValue::Scalar(1.0));
        assert!(calls.contains(&Call::VisualState(VisualState::Normal)));

        // Only the latest pass may finish and write its value.
        fx.runtime.advance(Duration::from_millis(200));
        assert_eq!(fx.host.value(AnimatedProperty::Scale), Some(PropertyValue::Scalar(1.0)));
    }

    #[test]
    fn progress_tracks_elapsed_fraction() {
        let fx = Fixture::new();
        fx.effect.update_style(|style| *style = scale_style(100));

        fx.effect.handle_touch(TouchStatus::Started);
        fx.runtime.advance(Duration::from_millis(40));
        let tracking = fx.effect.shared().core.borrow().tracking;
        assert_eq!(tracking.reference_state, TouchState::Pressed);
        assert!((tracking.progress - 0.4).abs() < 1e-9);

        fx.runtime.advance(Duration::from_millis(100));
        assert_eq!(fx.effect.shared().core.borrow().tracking.progress, 1.0);
    }

    #[test]
    fn default_background_is_captured_once() {
        let fx = Fixture::new();
        let blue = Color::new(0.0, 0.0, 1.0, 1.0);
        fx.host.store(AnimatedProperty::BackgroundColor, PropertyValue::Color(blue));
        fx.effect.update_style(|style| {
            style.background_color = StateValues::new(None, Some(Color::BLACK));
        });

        fx.effect.handle_touch(TouchStatus::Started);
        fx.runtime.run_until_stalled();
        assert_eq!(
            fx.host.value(AnimatedProperty::BackgroundColor),
            Some(PropertyValue::Color(Color::BLACK))
        );

        fx.effect.handle_touch(TouchStatus::Completed);
        fx.runtime.run_until_stalled();
        assert_eq!(
            fx.host.value(AnimatedProperty::BackgroundColor),
            Some(PropertyValue::Color(blue))
        );
    }

    #[test]
    fn hover_resolves_hovered_values() {
        let fx = Fixture::new();
        fx.effect.update_style(|style| {
            style.opacity = StateValues::uniform(1.0).with_hovered(0.6);
        });
        fx.effect.handle_hover(HoverStatus::Entered);
        fx.runtime.run_until_stalled();
        assert!(fx.host.calls().contains(&Call::VisualState(VisualState::PointerOver)));
        assert_eq!(fx.host.value(AnimatedProperty::Opacity), Some(PropertyValue::Scalar(0.6)));
    }

    #[test]
    fn ripple_runs_press_release_rounds() {
        let fx = Fixture::new();
        fx.effect.update_style(|style| *style = scale_style(50));
        fx.effect.update_options(|options| options.ripple = RippleRepeat::Times(2));
        fx.host.clear();

        fx.effect.handle_touch(TouchStatus::Started);
        fx.runtime.advance(Duration::from_millis(500));

        let targets: Vec<_> = fx.host.animations().iter().map(|a| a.to).collect();
        assert_eq!(
            targets,
            vec![
                PropertyValue::Scalar(0.9),
                PropertyValue::Scalar(1.0),
                PropertyValue::Scalar(0.9),
                PropertyValue::Scalar(1.0),
            ]
        );
    }

    #[test]
    fn toggled_on_press_ripples_from_released_look() {
        let fx = Fixture::new();
        fx.effect.update_style(|style| *style = scale_style(50));
        fx.effect.update_options(|options| options.ripple = RippleRepeat::Times(1));
        fx.effect.set_toggled(Some(true));
        fx.runtime.run_until_stalled();
        fx.host.clear();
        let events = fx.record_events();

        fx.effect.handle_touch(TouchStatus::Started);
        fx.runtime.advance(Duration::from_millis(500));

        assert_eq!(
            *events.borrow(),
            vec![
                TouchEvent::StatusChanged(TouchStatus::Started),
                TouchEvent::StateChanged(TouchState::Normal),
            ]
        );
        let targets: Vec<_> = fx.host.animations().iter().map(|a| a.to).collect();
        assert_eq!(
            targets,
            vec![PropertyValue::Scalar(1.0), PropertyValue::Scalar(0.9)]
        );
    }

    #[test]
    fn endless_ripple_loops_until_aborted() {
        let fx = Fixture::new();
        fx.effect.update_style(|style| *style = scale_style(50));
        fx.effect.update_options(|options| options.ripple = RippleRepeat::Forever);
        fx.host.clear();

        fx.effect.handle_touch(TouchStatus::Started);
        fx.runtime.advance(Duration::from_millis(1000));
        let running = fx.host.animations().len();
        assert!(running > 4, "only {running} passes ran");

        fx.effect.abort_animations();
        fx.runtime.advance(Duration::from_millis(1000));
        assert!(fx.host.animations().len() <= running + 1);
    }

    #[test]
    fn instant_endless_ripple_runs_one_round() {
        let fx = Fixture::new();
        fx.effect.update_style(|style| *style = scale_style(0));
        fx.effect.update_options(|options| options.ripple = RippleRepeat::Forever);
        fx.host.clear();

        fx.effect.handle_touch(TouchStatus::Started);
        fx.runtime.run_until_stalled();

        let sets: Vec<_> = fx
            .host
            .calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Set(AnimatedProperty::Scale, _)))
            .collect();
        assert_eq!(
            sets,
            vec![
                Call::Set(AnimatedProperty::Scale, PropertyValue::Scalar(0.9)),
                Call::Set(AnimatedProperty::Scale, PropertyValue::Scalar(1.0)),
            ]
        );
    }

    #[test]
    fn host_minimum_duration_stretches_passes() {
        let fx = Fixture::new();
        fx.host.set_min_duration(Duration::from_millis(16));
        fx.effect.update_style(|style| *style = scale_style(0));
        fx.host.clear();

        fx.effect.handle_touch(TouchStatus::Started);
        fx.runtime.run_until_stalled();
        assert_eq!(fx.host.animations()[0].duration, Duration::from_millis(16));
    }

    #[test]
    fn custom_animation_runs_each_pass() {
        let fx = Fixture::new();
        let seen = Rc::new(Cell::new(0_u32));
        let hook_seen = seen.clone();
        let hook: CustomAnimation =
            Rc::new(move |ctx: AnimationContext| -> LocalBoxFuture<'static, ()> {
                assert!(!ctx.token.is_canceled());
                hook_seen.set(hook_seen.get() + 1);
                Box::pin(async {})
            });
        fx.effect.set_custom_animation(Some(hook));

        fx.effect.handle_touch(TouchStatus::Started);
        fx.runtime.run_until_stalled();
        fx.effect.handle_touch(TouchStatus::Completed);
        fx.runtime.run_until_stalled();
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn abort_stops_everything() {
        let fx = Fixture::new();
        fx.effect.update_style(|style| *style = scale_style(100));
        fx.effect.handle_touch(TouchStatus::Started);
        fx.runtime.run_until_stalled();
        fx.host.clear();

        fx.effect.abort_animations();
        assert_eq!(
            fx.host.calls(),
            [
                Call::CancelAll,
                Call::CancelAnimation(AnimatedProperty::BackgroundColor)
            ]
        );
        fx.runtime.advance(Duration::from_millis(200));
        assert_ne!(fx.host.value(AnimatedProperty::Scale), Some(PropertyValue::Scalar(0.9)));
    }
}
