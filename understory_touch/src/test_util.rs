// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic host and runtime for unit tests.
//!
//! [`ManualRuntime`] runs tasks on a [`LocalPool`] and only moves time when told to, so
//! tests can step through animation passes and long-press timers exactly.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};
use core::time::Duration;

use futures_executor::{LocalPool, LocalSpawner};
use futures_task::LocalSpawn as _;
use futures_util::future::LocalBoxFuture;
use kurbo::{Point, Rect, Vec2};

use crate::effect::{TouchEffect, WeakTouchEffect};
use crate::host::{
    AnimatedProperty, AnimationOutcome, Command, CommandParameter, HostError, PointerSource,
    PropertyAnimation, PropertyValue, Ripple, UiRuntime, VisualHost,
};
use crate::style::{BackgroundImage, Color};
use crate::types::{TouchEvent, VisualState};

#[derive(Default)]
struct TimerSlot {
    fired: Cell<bool>,
    waker: RefCell<Option<Waker>>,
}

impl TimerSlot {
    fn fire(&self) {
        self.fired.set(true);
        if let Some(waker) = self.waker.borrow_mut().take() {
            waker.wake();
        }
    }
}

struct Delay(Rc<TimerSlot>);

impl Future for Delay {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0.fired.get() {
            return Poll::Ready(());
        }
        *self.0.waker.borrow_mut() = Some(cx.waker().clone());
        Poll::Pending
    }
}

/// Single-threaded runtime with virtual time.
pub(crate) struct ManualRuntime {
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
    now: Cell<Duration>,
    next_seq: Cell<u64>,
    timers: RefCell<Vec<(Duration, u64, Rc<TimerSlot>)>>,
}

impl ManualRuntime {
    pub(crate) fn new() -> Rc<Self> {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Rc::new(Self {
            pool: RefCell::new(pool),
            spawner,
            now: Cell::new(Duration::ZERO),
            next_seq: Cell::new(0),
            timers: RefCell::default(),
        })
    }

    pub(crate) fn spawn(&self, task: impl Future<Output = ()> + 'static) {
        self.spawn_local(Box::pin(task));
    }

    pub(crate) fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.pool.borrow_mut().run_until(future)
    }

    /// Move time forward, firing due timers in deadline order and running tasks after
    /// each firing.
    pub(crate) fn advance(&self, by: Duration) {
        let until = self.now.get() + by;
        loop {
            self.run_until_stalled();
            let next = self
                .timers
                .borrow()
                .iter()
                .map(|(deadline, _, _)| *deadline)
                .min()
                .filter(|deadline| *deadline <= until);
            let Some(deadline) = next else {
                break;
            };
            self.now.set(deadline);
            let mut due: Vec<_> = {
                let mut timers = self.timers.borrow_mut();
                let (due, pending): (Vec<_>, Vec<_>) =
                    timers.drain(..).partition(|(d, _, _)| *d == deadline);
                *timers = pending;
                due
            };
            due.sort_by_key(|(_, seq, _)| *seq);
            for (_, _, slot) in due {
                slot.fire();
            }
        }
        self.now.set(until);
        self.run_until_stalled();
    }
}

impl UiRuntime for ManualRuntime {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        self.spawner
            .spawn_local_obj(task.into())
            .expect("spawn on a live pool");
    }

    fn delay(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let slot = Rc::new(TimerSlot::default());
        if duration.is_zero() {
            slot.fired.set(true);
        } else {
            let seq = self.next_seq.get();
            self.next_seq.set(seq + 1);
            self.timers
                .borrow_mut()
                .push((self.now.get() + duration, seq, slot.clone()));
        }
        Box::pin(Delay(slot))
    }
}

/// Host call, as recorded by [`RecordingHost`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    VisualState(VisualState),
    Set(AnimatedProperty, PropertyValue),
    Animate(AnimatedProperty, PropertyValue),
    CancelAll,
    CancelAnimation(AnimatedProperty),
    Image(Option<Rc<str>>),
    StartRipple(Point),
    StopRipple,
    ParentIntercept(bool),
}

#[derive(Default)]
struct Store {
    values: RefCell<Vec<(AnimatedProperty, PropertyValue)>>,
    /// Bumped per property whenever its animations are canceled.
    epochs: RefCell<Vec<(AnimatedProperty, u64)>>,
}

impl Store {
    fn get(&self, property: AnimatedProperty) -> Option<PropertyValue> {
        self.values
            .borrow()
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| *v)
    }

    fn set(&self, property: AnimatedProperty, value: PropertyValue) {
        let mut values = self.values.borrow_mut();
        match values.iter_mut().find(|(p, _)| *p == property) {
            Some(entry) => entry.1 = value,
            None => values.push((property, value)),
        }
    }

    fn epoch(&self, property: AnimatedProperty) -> u64 {
        self.epochs
            .borrow()
            .iter()
            .find(|(p, _)| *p == property)
            .map_or(0, |(_, e)| *e)
    }

    fn bump(&self, property: AnimatedProperty) {
        let mut epochs = self.epochs.borrow_mut();
        match epochs.iter_mut().find(|(p, _)| *p == property) {
            Some(entry) => entry.1 += 1,
            None => epochs.push((property, 1)),
        }
    }
}

const ALL_PROPERTIES: [AnimatedProperty; 7] = [
    AnimatedProperty::BackgroundColor,
    AnimatedProperty::Opacity,
    AnimatedProperty::Scale,
    AnimatedProperty::Translation,
    AnimatedProperty::Rotation,
    AnimatedProperty::RotationX,
    AnimatedProperty::RotationY,
];

fn neutral(property: AnimatedProperty) -> PropertyValue {
    match property {
        AnimatedProperty::BackgroundColor => PropertyValue::Color(Color::TRANSPARENT),
        AnimatedProperty::Opacity | AnimatedProperty::Scale => PropertyValue::Scalar(1.0),
        AnimatedProperty::Translation => PropertyValue::Offset(Vec2::ZERO),
        AnimatedProperty::Rotation | AnimatedProperty::RotationX | AnimatedProperty::RotationY => {
            PropertyValue::Scalar(0.0)
        }
    }
}

/// Visual host that records calls and completes animations on the manual clock.
pub(crate) struct RecordingHost {
    runtime: Rc<ManualRuntime>,
    store: Rc<Store>,
    calls: RefCell<Vec<Call>>,
    animations: RefCell<Vec<PropertyAnimation>>,
    min_duration: Cell<Duration>,
}

impl RecordingHost {
    pub(crate) fn new(runtime: Rc<ManualRuntime>) -> Rc<Self> {
        Rc::new(Self {
            runtime,
            store: Rc::default(),
            calls: RefCell::default(),
            animations: RefCell::default(),
            min_duration: Cell::new(Duration::ZERO),
        })
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn animations(&self) -> Vec<PropertyAnimation> {
        self.animations.borrow().clone()
    }

    /// Forget recorded calls and animations.
    pub(crate) fn clear(&self) {
        self.calls.borrow_mut().clear();
        self.animations.borrow_mut().clear();
    }

    /// Seed a property value without recording a call.
    pub(crate) fn store(&self, property: AnimatedProperty, value: PropertyValue) {
        self.store.set(property, value);
    }

    pub(crate) fn value(&self, property: AnimatedProperty) -> Option<PropertyValue> {
        self.store.get(property)
    }

    pub(crate) fn set_min_duration(&self, duration: Duration) {
        self.min_duration.set(duration);
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl VisualHost for RecordingHost {
    fn apply_visual_state(&self, state: VisualState) -> Result<(), HostError> {
        self.record(Call::VisualState(state));
        Ok(())
    }

    fn current_value(&self, property: AnimatedProperty) -> Result<PropertyValue, HostError> {
        Ok(self.store.get(property).unwrap_or(neutral(property)))
    }

    fn set_value(&self, property: AnimatedProperty, value: PropertyValue) -> Result<(), HostError> {
        self.record(Call::Set(property, value));
        self.store.set(property, value);
        Ok(())
    }

    fn animate_property(
        &self,
        animation: PropertyAnimation,
    ) -> Result<LocalBoxFuture<'static, AnimationOutcome>, HostError> {
        self.record(Call::Animate(animation.property, animation.to));
        self.animations.borrow_mut().push(animation);

        let store = self.store.clone();
        let epoch = store.epoch(animation.property);
        let delay = self.runtime.delay(animation.duration);
        Ok(Box::pin(async move {
            delay.await;
            if store.epoch(animation.property) != epoch {
                return AnimationOutcome::Interrupted;
            }
            store.set(animation.property, animation.value_at(1.0));
            AnimationOutcome::Finished
        }))
    }

    fn set_background_image(&self, image: Option<&BackgroundImage>) -> Result<(), HostError> {
        self.record(Call::Image(image.map(|image| image.source.clone())));
        Ok(())
    }

    fn cancel_animations(&self) {
        self.record(Call::CancelAll);
        for property in ALL_PROPERTIES {
            self.store.bump(property);
        }
    }

    fn cancel_animation(&self, property: AnimatedProperty) {
        self.record(Call::CancelAnimation(property));
        self.store.bump(property);
    }

    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, 100.0, 100.0)
    }

    fn min_animation_duration(&self) -> Duration {
        self.min_duration.get()
    }

    fn start_ripple(&self, ripple: &Ripple) -> Result<(), HostError> {
        self.record(Call::StartRipple(ripple.origin));
        Ok(())
    }

    fn stop_ripple(&self) {
        self.record(Call::StopRipple);
    }

    fn set_parent_intercept_disallowed(&self, disallow: bool) {
        self.record(Call::ParentIntercept(disallow));
    }
}

/// Pointer source that only tracks whether it is attached.
pub(crate) struct FlagSource {
    attached: Rc<Cell<bool>>,
}

impl FlagSource {
    pub(crate) fn new() -> (Self, Rc<Cell<bool>>) {
        let attached = Rc::new(Cell::new(false));
        (
            Self {
                attached: attached.clone(),
            },
            attached,
        )
    }
}

impl PointerSource for FlagSource {
    fn attach(&mut self, sink: WeakTouchEffect) {
        self.attached.set(sink.upgrade().is_some());
    }

    fn detach(&mut self) {
        self.attached.set(false);
    }
}

/// A command that counts its executions.
pub(crate) fn counter() -> (Rc<dyn Command>, Rc<Cell<u32>>) {
    let count = Rc::new(Cell::new(0));
    let sink = count.clone();
    let command: Rc<dyn Command> = Rc::new(move |_: Option<&CommandParameter>| {
        sink.set(sink.get() + 1);
    });
    (command, count)
}

/// Effect wired to a recording host on a manual runtime.
pub(crate) struct Fixture {
    pub(crate) runtime: Rc<ManualRuntime>,
    pub(crate) host: Rc<RecordingHost>,
    pub(crate) effect: TouchEffect,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        let runtime = ManualRuntime::new();
        let host = RecordingHost::new(runtime.clone());
        let effect = TouchEffect::new(host.clone(), runtime.clone());
        Self {
            runtime,
            host,
            effect,
        }
    }

    /// Collect every event the effect raises from now on.
    pub(crate) fn record_events(&self) -> Rc<RefCell<Vec<TouchEvent>>> {
        let events: Rc<RefCell<Vec<TouchEvent>>> = Rc::default();
        let sink = events.clone();
        self.effect
            .subscribe(move |event| sink.borrow_mut().push(*event));
        events
    }
}
