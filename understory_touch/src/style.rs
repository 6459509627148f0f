// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-state visual overrides and animation timing.
//!
//! Every animated property is described by a [`StateValues`]: one value for the normal
//! look, one for the pressed look, and an *optional* hovered value. A hovered value only
//! applies when it was explicitly configured; otherwise hovering keeps the normal value.
//! Pressed always wins over hovered.
//!
//! ```
//! use understory_touch::style::{StateValues, TouchStyle};
//! use understory_touch::{HoverState, TouchState};
//!
//! let style = TouchStyle {
//!     scale: StateValues::new(1.0, 0.95).with_hovered(1.05),
//!     ..TouchStyle::default()
//! };
//! assert_eq!(*style.scale.resolve(TouchState::Normal, HoverState::Hovered), 1.05);
//! assert_eq!(*style.scale.resolve(TouchState::Pressed, HoverState::Hovered), 0.95);
//! ```

use alloc::rc::Rc;
use core::time::Duration;

use kurbo::Vec2;

use crate::easing::Easing;
use crate::types::{HoverState, TouchState};

/// Base animation duration when nothing else is configured: changes apply instantly.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::ZERO;

/// Values of one property for the normal, pressed and (optionally) hovered looks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateValues<T> {
    /// Value in the resting look.
    pub normal: T,
    /// Value while pressed.
    pub pressed: T,
    /// Value while hovered, if configured.
    pub hovered: Option<T>,
}

impl<T> StateValues<T> {
    /// Normal and pressed values, no hover override.
    pub const fn new(normal: T, pressed: T) -> Self {
        Self {
            normal,
            pressed,
            hovered: None,
        }
    }

    /// Configure the hovered value.
    #[must_use]
    pub fn with_hovered(mut self, hovered: T) -> Self {
        self.hovered = Some(hovered);
        self
    }

    /// Value for a `(TouchState, HoverState)` combination.
    pub fn resolve(&self, state: TouchState, hover: HoverState) -> &T {
        match (state, hover, &self.hovered) {
            (TouchState::Pressed, _, _) => &self.pressed,
            (TouchState::Normal, HoverState::Hovered, Some(hovered)) => hovered,
            (TouchState::Normal, _, _) => &self.normal,
        }
    }
}

impl<T: Clone> StateValues<T> {
    /// The same value for the normal and pressed looks.
    pub fn uniform(value: T) -> Self {
        Self::new(value.clone(), value)
    }
}

impl<T: PartialEq> StateValues<T> {
    /// Whether every configured value equals `neutral`, meaning nothing needs animating.
    pub fn is_uniformly(&self, neutral: &T) -> bool {
        self.normal == *neutral
            && self.pressed == *neutral
            && self.hovered.as_ref().is_none_or(|hovered| hovered == neutral)
    }
}

/// Straight (non-premultiplied) RGBA color with components in `[0, 1]`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
    /// Alpha.
    pub a: f64,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Color from float components.
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Color from 8-bit components.
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f64 / 255.0,
            g as f64 / 255.0,
            b as f64 / 255.0,
            a as f64 / 255.0,
        )
    }

    /// Component-wise interpolation toward `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

/// How a background image is fitted into the control.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ImageAspect {
    /// Scale to fit, preserving aspect ratio.
    #[default]
    AspectFit,
    /// Scale to fill, preserving aspect ratio and cropping.
    AspectFill,
    /// Stretch to fill.
    Fill,
}

/// A background image swap target.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BackgroundImage {
    /// Host-interpreted image source (resource name, path or URI).
    pub source: Rc<str>,
    /// Fitting mode.
    pub aspect: ImageAspect,
}

impl BackgroundImage {
    /// Image with the default aspect.
    pub fn new(source: impl Into<Rc<str>>) -> Self {
        Self {
            source: source.into(),
            aspect: ImageAspect::default(),
        }
    }

    /// Override the aspect.
    #[must_use]
    pub fn with_aspect(mut self, aspect: ImageAspect) -> Self {
        self.aspect = aspect;
        self
    }
}

/// Resolved duration and easing of one animation pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Timing {
    /// Duration of the pass.
    pub duration: Duration,
    /// Curve of the pass.
    pub easing: Easing,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            duration: DEFAULT_ANIMATION_DURATION,
            easing: Easing::Linear,
        }
    }
}

/// Optional per-state replacement of the base [`Timing`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TimingOverride {
    /// Replacement duration.
    pub duration: Option<Duration>,
    /// Replacement easing.
    pub easing: Option<Easing>,
}

/// Base timing plus per-state overrides.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AnimationTimings {
    /// Used when no override applies.
    pub base: Timing,
    /// Applies when animating toward the normal look.
    pub normal: TimingOverride,
    /// Applies when animating toward the pressed look.
    pub pressed: TimingOverride,
    /// Applies when animating toward the hovered look.
    pub hovered: TimingOverride,
}

impl AnimationTimings {
    /// Timings with a single base duration and easing.
    pub const fn uniform(duration: Duration, easing: Easing) -> Self {
        Self {
            base: Timing { duration, easing },
            normal: TimingOverride {
                duration: None,
                easing: None,
            },
            pressed: TimingOverride {
                duration: None,
                easing: None,
            },
            hovered: TimingOverride {
                duration: None,
                easing: None,
            },
        }
    }

    /// Effective timing toward `(state, hover)`, before any duration multiplier.
    pub fn resolve(&self, state: TouchState, hover: HoverState) -> Timing {
        let over = match (state, hover) {
            (TouchState::Pressed, _) => &self.pressed,
            (TouchState::Normal, HoverState::Hovered) => &self.hovered,
            (TouchState::Normal, HoverState::Normal) => &self.normal,
        };
        Timing {
            duration: over.duration.unwrap_or(self.base.duration),
            easing: over.easing.unwrap_or(self.base.easing),
        }
    }
}

bitflags::bitflags! {
    /// Set of properties a [`TouchStyle`] actually varies between states.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AnimatedProperties: u8 {
        /// Background color.
        const BACKGROUND_COLOR = 1 << 0;
        /// Background image.
        const BACKGROUND_IMAGE = 1 << 1;
        /// Opacity.
        const OPACITY = 1 << 2;
        /// Uniform scale.
        const SCALE = 1 << 3;
        /// Translation.
        const TRANSLATION = 1 << 4;
        /// Rotation around z.
        const ROTATION = 1 << 5;
        /// Rotation around x.
        const ROTATION_X = 1 << 6;
        /// Rotation around y.
        const ROTATION_Y = 1 << 7;
    }
}

/// Visual feedback configuration of a subject.
///
/// A `None` background color means "the control's own background", captured lazily the
/// first time a color animation runs.
#[derive(Clone, Debug, PartialEq)]
pub struct TouchStyle {
    /// Background color per state.
    pub background_color: StateValues<Option<Color>>,
    /// Background image per state.
    pub background_image: StateValues<Option<BackgroundImage>>,
    /// Swap the background image after the pass duration instead of at its start.
    pub set_image_on_animation_end: bool,
    /// Opacity per state; neutral `1.0`.
    pub opacity: StateValues<f64>,
    /// Uniform scale per state; neutral `1.0`.
    pub scale: StateValues<f64>,
    /// Translation per state; neutral zero.
    pub translation: StateValues<Vec2>,
    /// Rotation around z in degrees; neutral `0.0`.
    pub rotation: StateValues<f64>,
    /// Rotation around x in degrees; neutral `0.0`.
    pub rotation_x: StateValues<f64>,
    /// Rotation around y in degrees; neutral `0.0`.
    pub rotation_y: StateValues<f64>,
    /// Duration and easing of passes.
    pub timings: AnimationTimings,
}

impl Default for TouchStyle {
    fn default() -> Self {
        Self {
            background_color: StateValues::uniform(None),
            background_image: StateValues::uniform(None),
            set_image_on_animation_end: false,
            opacity: StateValues::uniform(1.0),
            scale: StateValues::uniform(1.0),
            translation: StateValues::uniform(Vec2::ZERO),
            rotation: StateValues::uniform(0.0),
            rotation_x: StateValues::uniform(0.0),
            rotation_y: StateValues::uniform(0.0),
            timings: AnimationTimings::default(),
        }
    }
}

impl TouchStyle {
    /// Properties with at least one non-neutral value.
    pub fn animated_properties(&self) -> AnimatedProperties {
        let mut props = AnimatedProperties::empty();
        props.set(
            AnimatedProperties::BACKGROUND_COLOR,
            !self.background_color.is_uniformly(&None),
        );
        props.set(
            AnimatedProperties::BACKGROUND_IMAGE,
            !self.background_image.is_uniformly(&None),
        );
        props.set(AnimatedProperties::OPACITY, !self.opacity.is_uniformly(&1.0));
        props.set(AnimatedProperties::SCALE, !self.scale.is_uniformly(&1.0));
        props.set(
            AnimatedProperties::TRANSLATION,
            !self.translation.is_uniformly(&Vec2::ZERO),
        );
        props.set(AnimatedProperties::ROTATION, !self.rotation.is_uniformly(&0.0));
        props.set(
            AnimatedProperties::ROTATION_X,
            !self.rotation_x.is_uniformly(&0.0),
        );
        props.set(
            AnimatedProperties::ROTATION_Y,
            !self.rotation_y.is_uniformly(&0.0),
        );
        props
    }
}
