// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-property animation legs.
//!
//! Each leg moves one aspect of the control toward the value its style gives the target
//! state, then resolves. Legs never fail: host errors are logged and the leg ends, and a
//! canceled token ends it silently.

use core::time::Duration;

use kurbo::Vec2;
use smallvec::SmallVec;

use crate::cancel::{CancellationToken, run_until_canceled};
use crate::host::{
    AnimatedProperty, AnimationOutcome, PropertyAnimation, PropertyValue, UiRuntime, VisualHost,
};
use crate::style::{AnimatedProperties, BackgroundImage, Color, StateValues, Timing, TouchStyle};
use crate::types::{HoverState, TouchState};

/// Property targets of one pass, in launch order.
pub(crate) type PropertyTargets = SmallVec<[(AnimatedProperty, PropertyValue); 7]>;

/// Resolve the end value of every property the style varies.
///
/// Properties whose per-state values are all neutral are left out entirely, so a style
/// that only scales never touches the background. An unset background color resolves to
/// `default_background`.
pub(crate) fn property_targets(
    style: &TouchStyle,
    state: TouchState,
    hover: HoverState,
    default_background: Color,
) -> PropertyTargets {
    let animated = style.animated_properties();
    let mut targets = PropertyTargets::new();

    if animated.contains(AnimatedProperties::BACKGROUND_COLOR) {
        let color = style
            .background_color
            .resolve(state, hover)
            .unwrap_or(default_background);
        targets.push((AnimatedProperty::BackgroundColor, PropertyValue::Color(color)));
    }

    if animated.contains(AnimatedProperties::TRANSLATION) {
        let offset: Vec2 = *style.translation.resolve(state, hover);
        targets.push((AnimatedProperty::Translation, PropertyValue::Offset(offset)));
    }

    let scalars: [(AnimatedProperties, AnimatedProperty, &StateValues<f64>); 5] = [
        (AnimatedProperties::OPACITY, AnimatedProperty::Opacity, &style.opacity),
        (AnimatedProperties::SCALE, AnimatedProperty::Scale, &style.scale),
        (AnimatedProperties::ROTATION, AnimatedProperty::Rotation, &style.rotation),
        (AnimatedProperties::ROTATION_X, AnimatedProperty::RotationX, &style.rotation_x),
        (AnimatedProperties::ROTATION_Y, AnimatedProperty::RotationY, &style.rotation_y),
    ];
    for (flag, property, values) in scalars {
        if animated.contains(flag) {
            targets.push((property, PropertyValue::Scalar(*values.resolve(state, hover))));
        }
    }

    targets
}

/// Image the style shows in `(state, hover)`, or `None` when the style has no images.
///
/// An unset pressed or hovered image keeps the normal one.
pub(crate) fn image_target(
    style: &TouchStyle,
    state: TouchState,
    hover: HoverState,
) -> Option<Option<BackgroundImage>> {
    if !style
        .animated_properties()
        .contains(AnimatedProperties::BACKGROUND_IMAGE)
    {
        return None;
    }
    let images = &style.background_image;
    Some(
        images
            .resolve(state, hover)
            .clone()
            .or_else(|| images.normal.clone()),
    )
}

/// Move one property to `to`.
///
/// A zero duration sets the value directly after stopping any running animation of the
/// property. Otherwise the host animates from the property's current value.
pub(crate) async fn animate_property(
    host: &dyn VisualHost,
    property: AnimatedProperty,
    to: PropertyValue,
    timing: Timing,
    token: &CancellationToken,
) {
    if token.is_canceled() {
        return;
    }

    if timing.duration.is_zero() {
        host.cancel_animation(property);
        if let Err(err) = host.set_value(property, to) {
            log::debug!("setting {property:?} failed: {err}");
        }
        return;
    }

    let from = match host.current_value(property) {
        Ok(from) => from,
        Err(err) => {
            log::debug!("reading {property:?} failed, jumping to target: {err}");
            to
        }
    };
    let animation = PropertyAnimation {
        property,
        from,
        to,
        duration: timing.duration,
        easing: timing.easing,
    };
    let running = match host.animate_property(animation) {
        Ok(running) => running,
        Err(err) => {
            log::debug!("animating {property:?} failed: {err}");
            return;
        }
    };

    match run_until_canceled(token, running).await {
        Some(AnimationOutcome::Finished) => {}
        Some(AnimationOutcome::Interrupted) => {
            log::trace!("{property:?} animation interrupted by the host");
        }
        None => log::trace!("{property:?} animation canceled"),
    }
}

/// Swap the background image, either right away or once `duration` has elapsed.
pub(crate) async fn swap_image(
    host: &dyn VisualHost,
    runtime: &dyn UiRuntime,
    image: Option<BackgroundImage>,
    at_end: bool,
    duration: Duration,
    token: &CancellationToken,
) {
    if at_end
        && !duration.is_zero()
        && run_until_canceled(token, runtime.delay(duration))
            .await
            .is_none()
    {
        return;
    }
    if token.is_canceled() {
        return;
    }
    if let Err(err) = host.set_background_image(image.as_ref()) {
        log::debug!("background image swap failed: {err}");
    }
}
