// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Status and state vocabulary shared by the state machine, the orchestrator and hosts.
//!
//! A *status* is a transient signal describing one discrete pointer action.
//! A *state* is the persistent visual condition of the subject that animations target.

/// Outcome of one discrete pointer action, as reported by a platform adapter.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TouchStatus {
    /// The pointer went down on (or moved back into) the subject.
    Started,
    /// The press was abandoned: moved away, stolen by a parent, or rejected by policy.
    Canceled,
    /// The press was released over the subject.
    #[default]
    Completed,
}

/// Persistent press state of the subject.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TouchState {
    /// Resting look.
    #[default]
    Normal,
    /// Pressed look.
    Pressed,
}

impl TouchState {
    /// Candidate state for a status: `Pressed` only for [`TouchStatus::Started`].
    #[must_use]
    pub const fn from_status(status: TouchStatus) -> Self {
        match status {
            TouchStatus::Started => Self::Pressed,
            TouchStatus::Canceled | TouchStatus::Completed => Self::Normal,
        }
    }

    /// The opposite state.
    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Self::Normal => Self::Pressed,
            Self::Pressed => Self::Normal,
        }
    }

    /// State shown by a toggle subject for a given toggle value.
    #[must_use]
    pub const fn for_toggle(toggled: bool) -> Self {
        if toggled { Self::Pressed } else { Self::Normal }
    }
}

/// Hover signal from a hover-capable pointer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum HoverStatus {
    /// The pointer entered the subject.
    Entered,
    /// The pointer left the subject.
    #[default]
    Exited,
}

/// Persistent hover state of the subject.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum HoverState {
    /// Not hovered.
    #[default]
    Normal,
    /// Hovered.
    Hovered,
}

impl HoverState {
    /// State for a hover status.
    #[must_use]
    pub const fn from_status(status: HoverStatus) -> Self {
        match status {
            HoverStatus::Entered => Self::Hovered,
            HoverStatus::Exited => Self::Normal,
        }
    }
}

/// Whether a user interaction sequence (press → release, or long press) is in progress.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum InteractionStatus {
    /// A press sequence is running.
    Started,
    /// No sequence is running, or the long press already consumed the current one.
    #[default]
    Completed,
}

/// Named visual state applied to the native control before animations start.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum VisualState {
    /// Neither pressed nor hovered.
    #[default]
    Normal,
    /// Pressed; wins over hover.
    Pressed,
    /// Hovered and not pressed.
    PointerOver,
}

impl VisualState {
    /// Resolve the visual state for a `(TouchState, HoverState)` pair.
    #[must_use]
    pub const fn resolve(state: TouchState, hover: HoverState) -> Self {
        match (state, hover) {
            (TouchState::Pressed, _) => Self::Pressed,
            (TouchState::Normal, HoverState::Hovered) => Self::PointerOver,
            (TouchState::Normal, HoverState::Normal) => Self::Normal,
        }
    }

    /// Conventional name of the state, as used by visual-state managers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Pressed => "Pressed",
            Self::PointerOver => "PointerOver",
        }
    }
}

/// Notification raised by a [`TouchEffect`](crate::TouchEffect) to its listeners.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TouchEvent {
    /// [`TouchStatus`] changed.
    StatusChanged(TouchStatus),
    /// [`TouchState`] changed.
    StateChanged(TouchState),
    /// A hover status was reported. Raised for every report, even repeated ones.
    HoverStatusChanged(HoverStatus),
    /// [`HoverState`] changed.
    HoverStateChanged(HoverState),
    /// [`InteractionStatus`] changed.
    InteractionStatusChanged(InteractionStatus),
    /// The toggle value changed.
    ToggledChanged(Option<bool>),
    /// The tap command ran.
    Completed,
    /// The long-press command ran.
    LongPressCompleted,
}
