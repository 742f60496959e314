//! Observable single-value slots
//!
//! A [`Slot`] holds the latest value of some piece of view state and lets any
//! number of observers watch it. Work that writes into a slot is tagged with a
//! generation; starting new work supersedes the old one, aborting its task and
//! discarding anything it still tries to write.

use std::sync::{Arc, Weak};

use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::trace;

use crate::result::{AsyncResult, ResultStream};

struct Guard {
    generation: u64,
    task: Option<AbortHandle>,
}

struct Inner<S> {
    tx: watch::Sender<S>,
    guard: Mutex<Guard>,
}

impl<S> Drop for Inner<S> {
    fn drop(&mut self) {
        if let Some(task) = self.guard.get_mut().task.take() {
            task.abort();
        }
    }
}

/// Latest-value cell with supersession of in-flight writers
pub struct Slot<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for Slot<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Write access for one generation of work, held by its task
pub struct SlotWriter<S> {
    inner: Weak<Inner<S>>,
    generation: u64,
}

impl<S: Clone + Send + Sync + 'static> Slot<S> {
    pub fn new(initial: S) -> Self {
        let (tx, _) = watch::channel(initial);
        Self {
            inner: Arc::new(Inner {
                tx,
                guard: Mutex::new(Guard {
                    generation: 0,
                    task: None,
                }),
            }),
        }
    }

    pub fn get(&self) -> S {
        self.inner.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.inner.tx.subscribe()
    }

    /// Overwrite the value, superseding any in-flight work
    pub fn replace(&self, state: S) {
        let mut guard = self.inner.guard.lock();
        supersede(&mut guard);
        self.inner.tx.send_replace(state);
    }

    /// Supersede in-flight work and publish `state` as the start of a new
    /// generation. The returned writer is the only one allowed to publish
    /// until the next `begin` or `replace`.
    pub fn begin(&self, state: S) -> SlotWriter<S> {
        let mut guard = self.inner.guard.lock();
        supersede(&mut guard);
        self.inner.tx.send_replace(state);
        SlotWriter {
            inner: Arc::downgrade(&self.inner),
            generation: guard.generation,
        }
    }

    /// Spawn the task doing a generation's work so it can be aborted later.
    /// Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(&self, writer: SlotWriter<S>, work: F)
    where
        F: FnOnce(SlotWriter<S>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let generation = writer.generation;
        let handle = tokio::spawn(work(writer)).abort_handle();
        let mut guard = self.inner.guard.lock();
        if guard.generation == generation {
            guard.task = Some(handle);
        } else {
            handle.abort();
        }
    }
}

fn supersede(guard: &mut Guard) {
    guard.generation += 1;
    if let Some(task) = guard.task.take() {
        task.abort();
    }
}

impl<S> SlotWriter<S> {
    /// Publish if this generation is still current; returns whether it was
    pub fn publish(&self, state: S) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let guard = inner.guard.lock();
        if guard.generation != self.generation {
            trace!("Dropping stale write from generation {}", self.generation);
            return false;
        }
        inner.tx.send_replace(state);
        true
    }

    /// Run `f` only if this generation is still current. The guard stays
    /// locked while `f` runs, so no `begin` or `replace` on this slot can
    /// interleave; `f` must not touch this same slot.
    pub fn if_current<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let inner = self.inner.upgrade()?;
        let guard = inner.guard.lock();
        (guard.generation == self.generation).then(f)
    }
}

/// Slot holding the [`AsyncResult`] of one operation kind
pub struct StateSlot<T> {
    slot: Slot<AsyncResult<T>>,
}

impl<T> Clone for StateSlot<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for StateSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> StateSlot<T> {
    pub fn new() -> Self {
        Self {
            slot: Slot::new(AsyncResult::Initial),
        }
    }

    pub fn get(&self) -> AsyncResult<T> {
        self.slot.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<AsyncResult<T>> {
        self.slot.subscribe()
    }

    pub fn set(&self, state: AsyncResult<T>) {
        self.slot.replace(state);
    }

    /// Back to `Initial`, cancelling anything in flight
    pub fn reset(&self) {
        self.slot.replace(AsyncResult::Initial);
    }

    /// Mark the slot `Loading` immediately and feed it from `results`.
    /// Spawns onto the current tokio runtime, so it panics outside one.
    pub fn launch(&self, results: ResultStream<T>) {
        self.launch_then(results, |_| {});
    }

    /// Like [`StateSlot::launch`], running `then` on the terminal value if
    /// this invocation is still the latest when it finishes. `then` runs
    /// with the slot's guard held and must not launch or reset this slot.
    pub fn launch_then<F>(&self, mut results: ResultStream<T>, then: F)
    where
        F: FnOnce(&AsyncResult<T>) + Send + 'static,
    {
        let writer = self.slot.begin(AsyncResult::Loading);
        self.slot.spawn(writer, |writer| async move {
            let mut last = None;
            while let Some(state) = results.next().await {
                if !writer.publish(state.clone()) {
                    return;
                }
                last = Some(state);
            }
            if let Some(last) = last.filter(|s| s.is_terminal()) {
                writer.if_current(|| then(&last));
            }
        });
    }

    /// Wait until the slot holds something other than `Loading`
    pub async fn settled(&self) -> AsyncResult<T> {
        let mut rx = self.subscribe();
        match rx.wait_for(|s| !s.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => self.get(),
        }
    }
}
