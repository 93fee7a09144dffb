//! Stage trait and stream adapters.
//!
//! Stages are the unit of pipeline composition: a transformation from one
//! stream into another, of arbitrary cardinality (one-to-one, one-to-many,
//! many-to-one, filtering).

use crate::errors::PipelineError;
use crate::stream::ItemStream;
use futures::future;
use futures::stream::{self, StreamExt};

/// A transformation from one stream into another.
///
/// A pipeline executes exactly once, so stages are consumed by value and may
/// move captured state into the stream they return. Any closure from an
/// input stream to an output stream is a stage, which keeps caller-written
/// stages as lightweight as the adapters in this module.
pub trait Stage<T, U> {
    /// Applies the stage to an input stream, producing the output stream.
    ///
    /// Applying a stage must not poll the input: all work happens when the
    /// returned stream is drained.
    fn apply(self, input: ItemStream<T>) -> ItemStream<U>;
}

impl<T, U, F> Stage<T, U> for F
where
    F: FnOnce(ItemStream<T>) -> ItemStream<U>,
{
    fn apply(self, input: ItemStream<T>) -> ItemStream<U> {
        self(input)
    }
}

/// One-to-one stage applying `f` to every item. Errors pass through.
pub fn map<T, U, F>(mut f: F) -> impl Stage<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnMut(T) -> U + Send + 'static,
{
    move |input: ItemStream<T>| input.map(move |item| item.map(&mut f)).boxed()
}

/// One-to-one fallible stage: an `Err` from `f` fails the pipeline at that
/// point. Upstream errors pass through.
pub fn try_map<T, U, F>(mut f: F) -> impl Stage<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnMut(T) -> Result<U, PipelineError> + Send + 'static,
{
    move |input: ItemStream<T>| input.map(move |item| item.and_then(&mut f)).boxed()
}

/// Filtering stage keeping only items for which `pred` returns `true`.
/// Errors pass through.
pub fn filter<T, F>(mut pred: F) -> impl Stage<T, T>
where
    T: Send + 'static,
    F: FnMut(&T) -> bool + Send + 'static,
{
    move |input: ItemStream<T>| {
        input
            .filter_map(move |item| {
                let keep = match &item {
                    Ok(value) => pred(value),
                    Err(_) => true,
                };
                future::ready(keep.then_some(item))
            })
            .boxed()
    }
}

/// Fan-out stage emitting every value produced by `f` for each input item,
/// in order. Errors pass through.
pub fn flat_map<T, U, I, F>(mut f: F) -> impl Stage<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
    I: IntoIterator<Item = U>,
    I::IntoIter: Send + 'static,
    F: FnMut(T) -> I + Send + 'static,
{
    move |input: ItemStream<T>| {
        input
            .flat_map(move |item| match item {
                Ok(value) => stream::iter(f(value).into_iter().map(Ok)).boxed(),
                Err(err) => stream::once(future::ready(Err(err))).boxed(),
            })
            .boxed()
    }
}

/// Pass-through stage observing each item without consuming it.
pub fn inspect<T, F>(mut f: F) -> impl Stage<T, T>
where
    T: Send + 'static,
    F: FnMut(&T) + Send + 'static,
{
    move |input: ItemStream<T>| {
        input
            .map(move |item| {
                if let Ok(value) = &item {
                    f(value);
                }
                item
            })
            .boxed()
    }
}
