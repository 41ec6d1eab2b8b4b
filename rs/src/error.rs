//! Errors produced by the analysis pipeline and reports

use crate::storage::StoreError;
use thiserror::Error;

/// Analysis errors
///
/// An empty population is not an error: it yields an empty result list.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid input: {message}")]
    InputValidation { message: String },

    #[error("Insufficient population: {size} entities, at least {required} required")]
    InsufficientPopulation { size: usize, required: usize },

    #[error("Engagement store unavailable: {0}")]
    UpstreamUnavailable(#[from] StoreError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Analysis cancelled")]
    Cancelled,
}
