//! The stream type flowing between stages, and source constructors.

use crate::errors::PipelineError;
use futures::stream::{self, BoxStream, StreamExt};
use futures::Stream;

/// The stream type flowing between pipeline stages.
///
/// Items are `Result` so a source or stage can signal failure distinctly
/// from yielding a value; the stream ending signals end-of-sequence. An
/// `Err` item is terminal by contract: well-behaved stages emit nothing
/// after propagating one.
///
/// Streams are owned values. Ownership is what enforces the single-consumer,
/// non-restartable contract: exactly one reader drains a stream, and a
/// drained stream cannot be handed out again.
pub type ItemStream<T> = BoxStream<'static, Result<T, PipelineError>>;

/// Wraps an iterator of plain values as an infallible source stream.
pub fn from_iter<I>(values: I) -> ItemStream<I::Item>
where
    I: IntoIterator,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
{
    stream::iter(values.into_iter().map(Ok)).boxed()
}

/// Boxes an existing fallible stream as a source.
pub fn from_stream<S, T>(source: S) -> ItemStream<T>
where
    S: Stream<Item = Result<T, PipelineError>> + Send + 'static,
{
    source.boxed()
}
