//! Pipeline construction and execution.

use crate::errors::PipelineError;
use crate::stage::Stage;
use crate::stream::{self, ItemStream};
use futures::{Stream, TryStreamExt};
use tracing::debug;

/// An ordered chain of stages over a single source stream.
///
/// A pipeline is constructed with a source, extended with
/// [`add_stage`](Self::add_stage), and executed exactly once by
/// [`into_stream`](Self::into_stream) or [`collect`](Self::collect). Every
/// operation consumes the pipeline, so re-executing a drained pipeline is a
/// compile error rather than a runtime surprise. The engine holds no state
/// beyond the composed stream itself.
pub struct Pipeline<T> {
    stream: ItemStream<T>,
}

impl<T> Pipeline<T>
where
    T: Send + 'static,
{
    /// Creates a pipeline from a fallible source stream.
    #[must_use]
    pub fn new<S>(source: S) -> Self
    where
        S: Stream<Item = Result<T, PipelineError>> + Send + 'static,
    {
        Self {
            stream: stream::from_stream(source),
        }
    }

    /// Creates a pipeline from an iterator of plain values.
    #[must_use]
    pub fn from_iter<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self {
            stream: stream::from_iter(values),
        }
    }

    /// Appends a stage, returning the extended pipeline for chaining.
    ///
    /// Composition is lazy: the stage's output stream is constructed here,
    /// but no stage does any work until the composed stream is drained. The
    /// whole pipeline is pull-driven, one item at a time.
    #[must_use]
    pub fn add_stage<U, S>(self, stage: S) -> Pipeline<U>
    where
        U: Send + 'static,
        S: Stage<T, U>,
    {
        Pipeline {
            stream: stage.apply(self.stream),
        }
    }

    /// Returns the composed output stream for incremental consumption.
    ///
    /// Dropping the stream before exhaustion is the only way to stop a run
    /// early; it simply leaves the upstream streams undrained.
    #[must_use]
    pub fn into_stream(self) -> ItemStream<T> {
        self.stream
    }

    /// Drains the pipeline, collecting every output value in order.
    ///
    /// Returns the first error produced by the source or any stage. Values
    /// accumulated before a failure are discarded, never returned as
    /// success.
    pub async fn collect(self) -> Result<Vec<T>, PipelineError> {
        let values: Vec<T> = self.stream.try_collect().await?;
        debug!(count = values.len(), "pipeline drained");
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Batch;
    use crate::stage::{filter, flat_map, map, try_map};
    use futures::StreamExt;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[tokio::test]
    async fn test_zero_stages_is_identity() {
        let out = Pipeline::from_iter(vec!["test"]).collect().await.unwrap();
        assert_eq!(out, vec!["test"]);
    }

    #[tokio::test]
    async fn test_basic_transformations() {
        let out = Pipeline::from_iter(0..3)
            .add_stage(map(|v| v * 2))
            .add_stage(map(|v: i32| v.to_string()))
            .collect()
            .await
            .unwrap();

        assert_eq!(out, vec!["0", "2", "4"]);
    }

    #[tokio::test]
    async fn test_expanding_stage_before_and_after() {
        let out1 = Pipeline::from_iter(vec![1, 2])
            .add_stage(flat_map(|v| [v, v]))
            .add_stage(map(|v: i32| v * 10))
            .collect()
            .await
            .unwrap();
        assert_eq!(out1, vec![10, 10, 20, 20]);

        let out2 = Pipeline::from_iter(vec![1, 2])
            .add_stage(map(|v: i32| v * 10))
            .add_stage(flat_map(|v| [v, v]))
            .collect()
            .await
            .unwrap();
        assert_eq!(out2, vec![10, 10, 20, 20]);
    }

    #[tokio::test]
    async fn test_filtering_stage() {
        let out = Pipeline::from_iter(0..5)
            .add_stage(filter(|v: &i32| v % 2 == 0))
            .collect()
            .await
            .unwrap();

        assert_eq!(out, vec![0, 2, 4]);
    }

    #[tokio::test]
    async fn test_failing_stage_surfaces_error() {
        let result = Pipeline::from_iter(0..4)
            .add_stage(try_map(|v: i32| {
                if v == 2 {
                    Err(PipelineError::stage("value 2 is unacceptable"))
                } else {
                    Ok(v)
                }
            }))
            .collect()
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "stage failed: value 2 is unacceptable");
    }

    #[tokio::test]
    async fn test_incremental_consumption() {
        let mut out = Pipeline::from_iter(0..3)
            .add_stage(map(|v: i32| v + 100))
            .into_stream();

        assert_eq!(out.next().await.unwrap().unwrap(), 100);
        assert_eq!(out.next().await.unwrap().unwrap(), 101);
        assert_eq!(out.next().await.unwrap().unwrap(), 102);
        assert!(out.next().await.is_none());
    }

    #[tokio::test]
    async fn test_source_failure_propagates() {
        let source = futures::stream::iter(vec![
            Ok(1),
            Err(PipelineError::stage("source gave out")),
        ]);
        let result = Pipeline::new(source)
            .add_stage(map(|v: i32| v * 2))
            .collect()
            .await;

        assert!(result.is_err());
    }

    // The original driver scenario: double, batch by five, sum each batch.
    #[tokio::test]
    async fn test_batching_inside_a_pipeline() {
        let batch = Batch::new(5, Duration::from_secs(3600)).unwrap();
        let sums = Pipeline::from_iter(0..22)
            .add_stage(map(|v: i64| v * 2))
            .add_stage(batch)
            .add_stage(map(|batch: Vec<i64>| batch.iter().sum::<i64>()))
            .collect()
            .await
            .unwrap();

        assert_eq!(sums, vec![20, 70, 120, 170, 82]);
    }
}
