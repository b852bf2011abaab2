//! Error types with diagnostics using miette
//!
//! Only classifier failures and host shape-creation failures cross a
//! component boundary; both are recoverable by the caller.

use miette::Diagnostic;
use thiserror::Error;

use crate::synth::ShapeId;

// ============================================================================
// Classifier Errors
// ============================================================================

/// Errors from the classifier recognizer
#[derive(Error, Diagnostic, Debug)]
pub enum ClassifierError {
    #[error("model unavailable from {origin}: {reason}")]
    #[diagnostic(
        code(sketchsnap::classifier::model_unavailable),
        help("fall back to the geometric recognizer or the remote recognition service")
    )]
    ModelUnavailable { origin: String, reason: String },

    #[error("model produced {got} probabilities for {expected} labels")]
    #[diagnostic(code(sketchsnap::classifier::output_mismatch))]
    OutputMismatch { expected: usize, got: usize },

    #[error("inference failed: {message}")]
    #[diagnostic(code(sketchsnap::classifier::inference))]
    Inference { message: String },

    #[error("inconsistent prediction ranking: {reason}")]
    #[diagnostic(
        code(sketchsnap::classifier::invalid_ranking),
        help("allPredictions must be sorted by descending confidence and start with name/confidence")
    )]
    InvalidRanking { reason: String },
}

impl ClassifierError {
    pub fn unavailable(origin: impl Into<String>, reason: impl ToString) -> Self {
        ClassifierError::ModelUnavailable {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether a fallback recognizer should take over
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, ClassifierError::ModelUnavailable { .. })
    }
}

// ============================================================================
// Host Errors
// ============================================================================

/// Errors reported by the host editor when it refuses a command
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("editor rejected the command: {reason}")]
    #[diagnostic(code(sketchsnap::host::rejected))]
    Rejected { reason: String },

    #[error("unknown shape: {id}")]
    #[diagnostic(code(sketchsnap::host::unknown_shape))]
    UnknownShape { id: ShapeId },
}

impl HostError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        HostError::Rejected { reason: reason.into() }
    }
}
