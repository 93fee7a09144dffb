//! # Rivulet
//!
//! A minimal async streaming-pipeline library.
//!
//! Rivulet chains composable transformation stages over an unbounded stream
//! of values:
//!
//! - **Pipeline engine**: holds a source stream and an ordered chain of
//!   stages, composes them lazily into one output stream, and offers both
//!   live iteration and eager collection
//! - **Batching stage**: groups individual items into bounded-size,
//!   bounded-latency batches with a dual size/timeout trigger
//! - **Stage adapters**: `map`, `filter`, `flat_map`, `try_map`, and
//!   `inspect` conveniences built on `futures` combinators
//!
//! Stages are ordinary values: any closure from an input stream to an output
//! stream is a stage, and the engine has no special knowledge of any of them.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rivulet::prelude::*;
//! use std::time::Duration;
//!
//! let batch = Batch::new(5, Duration::from_millis(100))?;
//!
//! let sums = Pipeline::from_iter(0..22)
//!     .add_stage(map(|v| v * 2))
//!     .add_stage(batch)
//!     .add_stage(map(|batch: Vec<i32>| batch.iter().sum::<i32>()))
//!     .collect()
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod batch;
pub mod errors;
pub mod observability;
pub mod pipeline;
pub mod stage;
pub mod stream;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::batch::{Batch, FlushPolicy};
    pub use crate::errors::PipelineError;
    pub use crate::observability::init_tracing;
    pub use crate::pipeline::Pipeline;
    pub use crate::stage::{filter, flat_map, inspect, map, try_map, Stage};
    pub use crate::stream::{from_iter, from_stream, ItemStream};
}
