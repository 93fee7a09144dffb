//! Error types for rivulet pipelines.
//!
//! The taxonomy is deliberately small: configuration errors surface at
//! construction, before any draining begins; everything that happens while a
//! pipeline is being drained travels through the stream as an `Err` item and
//! terminates the run at the point of failure.

use thiserror::Error;

/// The error type carried by pipeline streams.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The batching stage was configured with a capacity of zero.
    #[error("invalid batch capacity: {capacity} (must be at least 1)")]
    InvalidCapacity {
        /// The rejected capacity value.
        capacity: usize,
    },

    /// A stage reported a failure while processing an item.
    #[error("stage failed: {message}")]
    Stage {
        /// Description of the failure.
        message: String,
    },

    /// A source or caller error propagated through the pipeline unchanged.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    /// Creates a stage failure error.
    #[must_use]
    pub fn stage(message: impl Into<String>) -> Self {
        Self::Stage {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_capacity_display() {
        let err = PipelineError::InvalidCapacity { capacity: 0 };
        assert_eq!(
            err.to_string(),
            "invalid batch capacity: 0 (must be at least 1)"
        );
    }

    #[test]
    fn test_stage_error_display() {
        let err = PipelineError::stage("value 2 is unacceptable");
        assert_eq!(err.to_string(), "stage failed: value 2 is unacceptable");
    }

    #[test]
    fn test_other_preserves_source_message() {
        let err = PipelineError::from(anyhow::anyhow!("upstream socket closed"));
        assert_eq!(err.to_string(), "upstream socket closed");
    }
}
