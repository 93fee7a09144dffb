//! Size/timeout-driven batching stage.
//!
//! Groups individual items into `Vec<T>` batches, flushing when either a
//! size threshold or a time threshold is met. The pipeline engine treats
//! this as just another stage value.

use crate::errors::PipelineError;
use crate::stage::Stage;
use crate::stream::ItemStream;
use futures::stream::{Stream, StreamExt};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{sleep_until, Instant, Sleep};
use tracing::trace;

/// When the batching stage evaluates its `max_delay` trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushPolicy {
    /// Elapsed time is sampled only when a new item arrives. A stalled
    /// upstream never triggers a flush on its own: a buffer older than
    /// `max_delay` waits for the next arrival (or end of stream).
    #[default]
    OnArrival,
    /// Additionally arms a timer while the buffer is non-empty, so a
    /// stalled upstream flushes the partial buffer once `max_delay`
    /// elapses. The timer races the next upstream item cooperatively
    /// inside `poll_next`; no task is spawned.
    WallClock,
}

/// A batching stage.
///
/// Maintains an internal buffer and a last-flush timestamp. Each arriving
/// item is appended, then the buffer is flushed as one batch if it has
/// reached `capacity` items or `max_delay` has elapsed since the last flush.
/// When upstream ends, a non-empty buffer is flushed as one final batch
/// regardless of size or age. An empty upstream emits zero batches.
///
/// Delivered batches are independent of the internal buffer: the buffer is
/// moved out on emit and replaced, so mutating a delivered batch never
/// affects a later one. Upstream errors propagate without flushing the
/// partial buffer.
#[derive(Debug, Clone)]
pub struct Batch {
    capacity: usize,
    max_delay: Duration,
    policy: FlushPolicy,
}

impl Batch {
    /// Creates a batching stage with the default [`FlushPolicy::OnArrival`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize, max_delay: Duration) -> Result<Self, PipelineError> {
        if capacity == 0 {
            return Err(PipelineError::InvalidCapacity { capacity });
        }
        Ok(Self {
            capacity,
            max_delay,
            policy: FlushPolicy::default(),
        })
    }

    /// Sets the flush policy.
    #[must_use]
    pub fn with_policy(mut self, policy: FlushPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the maximum items per batch.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the maximum time a non-empty buffer may go unflushed.
    #[must_use]
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }
}

impl<T> Stage<T, Vec<T>> for Batch
where
    T: Send + 'static,
{
    fn apply(self, input: ItemStream<T>) -> ItemStream<Vec<T>> {
        BatchStream {
            inner: input,
            capacity: self.capacity,
            max_delay: self.max_delay,
            policy: self.policy,
            buffer: Vec::new(),
            last_flush: Instant::now(),
            delay: None,
            done: false,
        }
        .boxed()
    }
}

/// The stream produced by applying a [`Batch`] stage.
///
/// State machine: collecting (buffer empty or partial), emitting on a
/// trigger and returning to collecting with a fresh buffer, then a final
/// flush of any remainder when upstream ends.
struct BatchStream<T> {
    inner: ItemStream<T>,
    capacity: usize,
    max_delay: Duration,
    policy: FlushPolicy,
    buffer: Vec<T>,
    last_flush: Instant,
    delay: Option<Pin<Box<Sleep>>>,
    done: bool,
}

// Nothing in `BatchStream` is structurally pinned: `poll_next` only takes
// `&mut` to the fields, and the two pinned members (`ItemStream<T>`,
// `Pin<Box<Sleep>>`) are `Unpin` themselves. Without this impl, `Vec<T>`
// would make `Unpin` conditional on `T: Unpin`.
impl<T> Unpin for BatchStream<T> {}

impl<T> BatchStream<T> {
    fn flush(&mut self, now: Instant) -> Vec<T> {
        self.last_flush = now;
        self.delay = None;
        std::mem::take(&mut self.buffer)
    }
}

impl<T> Stream for BatchStream<T>
where
    T: Send + 'static,
{
    type Item = Result<Vec<T>, PipelineError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.done {
            return Poll::Ready(None);
        }

        loop {
            match this.inner.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(item))) => {
                    this.buffer.push(item);

                    let now = Instant::now();
                    let full = this.buffer.len() >= this.capacity;
                    let aged = now.duration_since(this.last_flush) >= this.max_delay;

                    if full || aged {
                        trace!(len = this.buffer.len(), full, aged, "flushing batch");
                        return Poll::Ready(Some(Ok(this.flush(now))));
                    }
                }
                Poll::Ready(Some(Err(err))) => {
                    // No partial flush on error: the buffer is discarded and
                    // the failure propagates unchanged.
                    this.done = true;
                    this.buffer.clear();
                    return Poll::Ready(Some(Err(err)));
                }
                Poll::Ready(None) => {
                    this.done = true;
                    if this.buffer.is_empty() {
                        return Poll::Ready(None);
                    }
                    trace!(len = this.buffer.len(), "flushing final batch");
                    return Poll::Ready(Some(Ok(this.flush(Instant::now()))));
                }
                Poll::Pending => {
                    if this.policy == FlushPolicy::WallClock && !this.buffer.is_empty() {
                        let deadline = this.last_flush + this.max_delay;
                        let delay = this
                            .delay
                            .get_or_insert_with(|| Box::pin(sleep_until(deadline)));
                        if delay.as_mut().poll(cx).is_ready() {
                            trace!(len = this.buffer.len(), "flushing aged batch on timer");
                            return Poll::Ready(Some(Ok(this.flush(Instant::now()))));
                        }
                    }
                    return Poll::Pending;
                }
            }
        }
    }
}
