// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while driving an entity tree through validate, act and save.

use std::error::Error;
use std::fmt;

/// Broad classification of a [`ProcessError`].
///
/// Callers that only care about the class of failure (configuration gap,
/// business-rule violation, ...) match on this instead of on the variant
/// payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unprocessable,
    InvalidState,
    InvalidEntityType,
    ProcessorNotFound,
    AmbiguousCandidates,
    Cancelled,
    DeadlineExceeded,
    External,
}

/// Errors produced by the engine and by its collaborators.
///
/// None of these are retried by the engine. The first error raised anywhere in
/// the tree aborts the current phase and is handed back to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// No configured state machine governs the entity in its current state.
    #[error("unprocessable entity: no state machine accepts '{entity_type}'")]
    Unprocessable { entity_type: String },

    /// A sub-entity key does not exist, or a state machine rejected the action.
    #[error("entity state is not valid: {0}")]
    InvalidState(String),

    /// A type-erased processor was handed an entity of the wrong concrete type.
    #[error("invalid entity type: expected '{expected}', got '{actual}'")]
    InvalidEntityType {
        expected: &'static str,
        actual: &'static str,
    },

    /// The resolver had no processor for an encountered sub-entity.
    #[error("processor not found for entity type '{entity_type}'")]
    ProcessorNotFound { entity_type: String },

    /// More than one candidate matched under the strict selection policy.
    #[error("{matches} {role} candidates match entity type '{entity_type}'")]
    AmbiguousCandidates {
        role: &'static str,
        entity_type: String,
        matches: usize,
    },

    #[error("processing was cancelled")]
    Cancelled,

    #[error("processing deadline exceeded")]
    DeadlineExceeded,

    /// Failure reported by an external system behind a syncer or repository.
    #[error("external collaborator failed: {0}")]
    External(#[source] Box<dyn Error + Send + Sync>),
}

impl ProcessError {
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        ProcessError::InvalidState(reason.into())
    }

    /// `InvalidState` for a `(type_key, entity_key)` pair the parent does not hold.
    pub fn missing_sub_entity(type_key: &str, entity_key: &str) -> Self {
        ProcessError::InvalidState(format!(
            "sub-entity '{}' not found under type key '{}'",
            entity_key, type_key
        ))
    }

    pub fn external<E>(error: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        ProcessError::External(error.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcessError::Unprocessable { .. } => ErrorKind::Unprocessable,
            ProcessError::InvalidState(_) => ErrorKind::InvalidState,
            ProcessError::InvalidEntityType { .. } => ErrorKind::InvalidEntityType,
            ProcessError::ProcessorNotFound { .. } => ErrorKind::ProcessorNotFound,
            ProcessError::AmbiguousCandidates { .. } => ErrorKind::AmbiguousCandidates,
            ProcessError::Cancelled => ErrorKind::Cancelled,
            ProcessError::DeadlineExceeded => ErrorKind::DeadlineExceeded,
            ProcessError::External(_) => ErrorKind::External,
        }
    }
}

/// A failed phase: the error plus the best approximation of the entity
/// computed before it happened.
///
/// The entity is never committed state. Callers must treat any
/// `ProcessFailure` as "operation not completed".
pub struct ProcessFailure<E> {
    pub entity: E,
    pub error: ProcessError,
}

impl<E> ProcessFailure<E> {
    pub fn new(entity: E, error: ProcessError) -> Self {
        Self { entity, error }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    pub fn into_error(self) -> ProcessError {
        self.error
    }

    pub fn map_entity<F, T>(self, f: F) -> ProcessFailure<T>
    where
        F: FnOnce(E) -> T,
    {
        ProcessFailure {
            entity: f(self.entity),
            error: self.error,
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for ProcessFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessFailure")
            .field("entity", &self.entity)
            .field("error", &self.error)
            .finish()
    }
}

impl<E> fmt::Display for ProcessFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "processing failed: {}", self.error)
    }
}

impl<E: fmt::Debug> Error for ProcessFailure<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let cases = vec![
            (
                ProcessError::Unprocessable {
                    entity_type: "Order".into(),
                },
                ErrorKind::Unprocessable,
            ),
            (ProcessError::invalid_state("nope"), ErrorKind::InvalidState),
            (
                ProcessError::InvalidEntityType {
                    expected: "Order",
                    actual: "LineItem",
                },
                ErrorKind::InvalidEntityType,
            ),
            (
                ProcessError::ProcessorNotFound {
                    entity_type: "LineItem".into(),
                },
                ErrorKind::ProcessorNotFound,
            ),
            (ProcessError::Cancelled, ErrorKind::Cancelled),
            (ProcessError::DeadlineExceeded, ErrorKind::DeadlineExceeded),
            (ProcessError::external("boom"), ErrorKind::External),
        ];

        for (error, expected) in cases {
            assert_eq!(error.kind(), expected, "wrong kind for {}", error);
        }
    }

    #[test]
    fn test_missing_sub_entity_is_invalid_state() {
        let error = ProcessError::missing_sub_entity("items", "7");
        assert_eq!(error.kind(), ErrorKind::InvalidState);
        let message = error.to_string();
        assert!(message.contains("items"));
        assert!(message.contains("'7'"));
    }

    #[test]
    fn test_external_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "remote down");
        let error = ProcessError::external(io);
        assert!(error.source().is_some());
        assert!(error.to_string().contains("remote down"));
    }

    #[test]
    fn test_failure_map_entity_keeps_error() {
        let failure = ProcessFailure::new(3_u32, ProcessError::Cancelled);
        let mapped = failure.map_entity(|n| n.to_string());
        assert_eq!(mapped.entity, "3");
        assert_eq!(mapped.kind(), ErrorKind::Cancelled);
        assert!(mapped.to_string().contains("cancelled"));
    }
}
