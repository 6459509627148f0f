// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-threaded cooperative cancellation.
//!
//! A [`CancellationToken`] is a shared flag plus the [`AbortHandle`]s of the futures
//! currently racing it. Work polls [`CancellationToken::is_canceled`] between steps, or
//! wraps a future with [`run_until_canceled`], which registers an abort handle for as long
//! as the future runs. Cancellation is a normal way for work to end; it never surfaces as
//! an error.
//!
//! Tokens are never reused. Owners keep at most one live token in a slot and call
//! [`renew`] to cancel the previous one before handing out its replacement.

use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::future::{Future, pending};

use futures_util::future::{AbortHandle, Abortable};
use smallvec::SmallVec;

#[derive(Debug, Default)]
struct TokenInner {
    canceled: Cell<bool>,
    next_id: Cell<u64>,
    running: RefCell<SmallVec<[(u64, AbortHandle); 2]>>,
}

impl TokenInner {
    fn register(&self, handle: AbortHandle) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.running.borrow_mut().push((id, handle));
        id
    }
}

/// Drops the abort handle of a finished (or dropped) future from its token.
struct Registration<'a> {
    inner: &'a TokenInner,
    id: u64,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.inner
            .running
            .borrow_mut()
            .retain(|(id, _)| *id != self.id);
    }
}

/// Shared cancellation flag for one piece of asynchronous work.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    inner: Rc<TokenInner>,
}

impl CancellationToken {
    /// A fresh, uncanceled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel and abort every future running under the token. Idempotent.
    pub fn cancel(&self) {
        if self.inner.canceled.replace(true) {
            return;
        }
        let running = core::mem::take(&mut *self.inner.running.borrow_mut());
        for (_, handle) in running {
            handle.abort();
        }
    }

    /// Whether [`Self::cancel`] was called.
    pub fn is_canceled(&self) -> bool {
        self.inner.canceled.get()
    }

    /// Future that resolves once the token is canceled.
    pub fn canceled(&self) -> impl Future<Output = ()> + 'static {
        let token = self.clone();
        async move {
            run_until_canceled(&token, pending::<()>()).await;
        }
    }

    /// Whether both handles refer to the same token.
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Drive `future` until it completes or `token` is canceled.
///
/// Returns `None` on cancellation. The future is dropped at that point, which is how
/// host animation handles get released.
pub async fn run_until_canceled<F: Future>(
    token: &CancellationToken,
    future: F,
) -> Option<F::Output> {
    if token.is_canceled() {
        return None;
    }
    let (handle, registration) = AbortHandle::new_pair();
    let _running = Registration {
        inner: &token.inner,
        id: token.inner.register(handle),
    };
    Abortable::new(future, registration).await.ok()
}

/// Cancel the token held in `slot`, if any, and leave the slot empty.
///
/// Returns `true` when a token was present.
pub fn cancel_slot(slot: &mut Option<CancellationToken>) -> bool {
    match slot.take() {
        Some(token) => {
            token.cancel();
            true
        }
        None => false,
    }
}

/// Cancel the token in `slot` and replace it with a fresh one, which is returned.
pub fn renew(slot: &mut Option<CancellationToken>) -> CancellationToken {
    cancel_slot(slot);
    let token = CancellationToken::new();
    *slot = Some(token.clone());
    token
}
