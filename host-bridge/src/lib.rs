//! Bridge between async calls and a host's per-frame update loop.
//!
//! # Overview
//! Hosts built around a cooperative, single-threaded update loop (game
//! engines, immediate-mode UIs) cannot `.await`. A [`Settle`] wraps any
//! future and is ticked once per frame: each tick polls the future once and,
//! when it completes, hands the output to a callback exactly once.
//!
//! # Design
//! - Polling uses a no-op waker; the host's frame loop is the wakeup.
//!   Futures that need a reactor, such as an `ApiClient` call over
//!   `ReqwestTransport`, should be spawned on a runtime and their
//!   `JoinHandle` bridged instead.
//! - A panic while polling is caught and logged. The entry settles without
//!   invoking its callback, so a faulty future never unwinds into the host.

use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::task::noop_waker_ref;

enum State<F: Future> {
    Pending {
        future: Pin<Box<F>>,
        on_settled: Box<dyn FnOnce(F::Output)>,
    },
    Settled,
}

/// A future polled on demand that reports its output through a callback.
pub struct Settle<F: Future> {
    state: State<F>,
}

impl<F: Future> Settle<F> {
    pub fn new(future: F, on_settled: impl FnOnce(F::Output) + 'static) -> Self {
        Self {
            state: State::Pending {
                future: Box::pin(future),
                on_settled: Box::new(on_settled),
            },
        }
    }

    /// Poll once. Returns `true` once the future has settled.
    pub fn tick(&mut self) -> bool {
        let State::Pending { future, .. } = &mut self.state else {
            return true;
        };

        let mut cx = Context::from_waker(noop_waker_ref());
        match catch_unwind(AssertUnwindSafe(|| future.as_mut().poll(&mut cx))) {
            Ok(Poll::Pending) => false,
            Ok(Poll::Ready(output)) => {
                if let State::Pending { on_settled, .. } = std::mem::replace(&mut self.state, State::Settled) {
                    on_settled(output);
                }
                true
            }
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
                    .unwrap_or("non-string panic payload");
                tracing::error!(reason, "bridged future panicked");
                self.state = State::Settled;
                true
            }
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, State::Settled)
    }
}

/// Anything that can be ticked once per frame.
pub trait Tick {
    /// Advance by one frame. Returns `true` once finished.
    fn tick(&mut self) -> bool;
}

impl<F: Future> Tick for Settle<F> {
    fn tick(&mut self) -> bool {
        Settle::tick(self)
    }
}

/// The pending bridged futures of a host, ticked together once per frame.
#[derive(Default)]
pub struct SettleSet {
    pending: Vec<Box<dyn Tick>>,
}

impl SettleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<F>(&mut self, future: F, on_settled: impl FnOnce(F::Output) + 'static)
    where
        F: Future + 'static,
    {
        self.pending.push(Box::new(Settle::new(future, on_settled)));
    }

    /// Tick every pending entry once, dropping the ones that settled.
    /// Returns how many are still pending.
    pub fn tick(&mut self) -> usize {
        self.pending.retain_mut(|entry| !entry.tick());
        self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
