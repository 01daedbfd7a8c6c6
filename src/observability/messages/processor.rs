// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for processor execution events.
//!
//! This module contains message types for logging events related to:
//! * `process` lifecycle on the root entity (start, completion, failure)
//! * Per-level phase failures while recursing through the tree
//! * Collaborator selection (state machines, syncers)
//! * Sync and action-sync outcomes
//! * Type-erasure narrowing failures

use std::fmt::{Display, Formatter};
use std::time::Duration;

use tracing::Span;

use super::StructuredLog;
use crate::traits::Phase;

/// `process` started on a root entity.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_canopy::observability::messages::processor::ProcessStarted;
///
/// let msg = ProcessStarted {
///     entity_type: "Order",
///     action: "approve",
/// };
///
/// assert_eq!(msg.to_string(), "Processing 'Order' with action 'approve'");
/// ```
pub struct ProcessStarted<'a> {
    pub entity_type: &'a str,
    pub action: &'a str,
}

impl Display for ProcessStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processing '{}' with action '{}'",
            self.entity_type, self.action
        )
    }
}

impl StructuredLog for ProcessStarted<'_> {
    fn log(&self) {
        tracing::info!(
            entity_type = self.entity_type,
            action = self.action,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "process",
            span_name = name,
            entity_type = self.entity_type,
            action = self.action,
        )
    }
}

/// `process` completed on a root entity.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_canopy::observability::messages::processor::ProcessCompleted;
/// use std::time::Duration;
///
/// let msg = ProcessCompleted {
///     entity_type: "Order",
///     action: "approve",
///     persisted: true,
///     duration: Duration::from_millis(3),
/// };
///
/// assert!(msg.to_string().contains("persisted=true"));
/// ```
pub struct ProcessCompleted<'a> {
    pub entity_type: &'a str,
    pub action: &'a str,
    pub persisted: bool,
    pub duration: Duration,
}

impl Display for ProcessCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processed '{}' with action '{}': persisted={}, duration={:?}",
            self.entity_type, self.action, self.persisted, self.duration
        )
    }
}

impl StructuredLog for ProcessCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            entity_type = self.entity_type,
            action = self.action,
            persisted = self.persisted,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// `process` failed on a root entity; nothing past `phase` ran.
///
/// # Log Level
/// `warn!` - The request was rejected or could not complete
pub struct ProcessFailed<'a> {
    pub entity_type: &'a str,
    pub action: &'a str,
    pub phase: Phase,
    pub error: &'a dyn std::error::Error,
}

impl Display for ProcessFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processing '{}' with action '{}' failed during {}: {}",
            self.entity_type, self.action, self.phase, self.error
        )
    }
}

impl StructuredLog for ProcessFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            entity_type = self.entity_type,
            action = self.action,
            phase = self.phase.as_str(),
            error = %self.error,
            "{}", self
        );
    }
}

/// A phase failed at one level of the tree and is unwinding to the parent.
///
/// # Log Level
/// `debug!` - Emitted at every level the error passes through
pub struct PhaseFailed<'a> {
    pub phase: Phase,
    pub entity_type: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for PhaseFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Phase {} failed for '{}': {}",
            self.phase, self.entity_type, self.error
        )
    }
}

impl StructuredLog for PhaseFailed<'_> {
    fn log(&self) {
        tracing::debug!(
            phase = self.phase.as_str(),
            entity_type = self.entity_type,
            error = %self.error,
            "{}", self
        );
    }
}

/// The resolver returned no processor for a sub-entity.
///
/// # Log Level
/// `error!` - Configuration gap in the embedding application
///
/// # Example
/// ```
/// use the_canopy::observability::messages::processor::SubProcessorNotFound;
///
/// let msg = SubProcessorNotFound {
///     parent_type: "Order",
///     child_type: "Coupon",
///     type_key: "coupons",
///     entity_key: "SPRING",
/// };
///
/// assert!(msg.to_string().contains("coupons/SPRING"));
/// ```
pub struct SubProcessorNotFound<'a> {
    pub parent_type: &'a str,
    pub child_type: &'a str,
    pub type_key: &'a str,
    pub entity_key: &'a str,
}

impl Display for SubProcessorNotFound<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No processor resolves '{}' at {}/{} below '{}'",
            self.child_type, self.type_key, self.entity_key, self.parent_type
        )
    }
}

impl StructuredLog for SubProcessorNotFound<'_> {
    fn log(&self) {
        tracing::error!(
            parent_type = self.parent_type,
            child_type = self.child_type,
            type_key = self.type_key,
            entity_key = self.entity_key,
            "{}", self
        );
    }
}

/// A collaborator candidate was selected for an entity.
///
/// # Log Level
/// `trace!` - Fine-grained dispatch detail
pub struct CandidateSelected<'a> {
    pub role: &'a str,
    pub entity_type: &'a str,
    pub index: usize,
}

impl Display for CandidateSelected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Selected {} #{} for '{}'",
            self.role, self.index, self.entity_type
        )
    }
}

impl StructuredLog for CandidateSelected<'_> {
    fn log(&self) {
        tracing::trace!(
            role = self.role,
            entity_type = self.entity_type,
            index = self.index,
            "{}", self
        );
    }
}

/// Several candidates matched one entity.
///
/// Only logged under the strict selection policy, right before the
/// `AmbiguousCandidates` error is returned.
///
/// # Log Level
/// `warn!` - Likely configuration overlap
pub struct CandidatesAmbiguous<'a> {
    pub role: &'a str,
    pub entity_type: &'a str,
    pub matches: usize,
}

impl Display for CandidatesAmbiguous<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} {} candidates match '{}'",
            self.matches, self.role, self.entity_type
        )
    }
}

impl StructuredLog for CandidatesAmbiguous<'_> {
    fn log(&self) {
        tracing::warn!(
            role = self.role,
            entity_type = self.entity_type,
            matches = self.matches,
            "{}", self
        );
    }
}

/// Pre-validation sync finished for an entity.
///
/// # Log Level
/// `debug!`
pub struct EntitySynced<'a> {
    pub entity_type: &'a str,
    pub duration: Duration,
}

impl Display for EntitySynced<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Synced '{}' in {:?}", self.entity_type, self.duration)
    }
}

impl StructuredLog for EntitySynced<'_> {
    fn log(&self) {
        tracing::debug!(
            entity_type = self.entity_type,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// An action-specific sync failed; the error goes to the state machine.
///
/// # Log Level
/// `warn!` - External system disagreed, outcome decided by the transition
///
/// # Example
/// ```
/// use the_canopy::observability::messages::processor::ActionSyncFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "gateway timeout");
/// let msg = ActionSyncFailed {
///     entity_type: "Payment",
///     action: "capture",
///     error: &error,
/// };
///
/// assert!(msg.to_string().contains("gateway timeout"));
/// ```
pub struct ActionSyncFailed<'a> {
    pub entity_type: &'a str,
    pub action: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ActionSyncFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Action sync '{}' failed for '{}', forwarding to state machine: {}",
            self.action, self.entity_type, self.error
        )
    }
}

impl StructuredLog for ActionSyncFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            entity_type = self.entity_type,
            action = self.action,
            error = %self.error,
            "{}", self
        );
    }
}

/// A type-erased processor received an entity it cannot narrow.
///
/// # Log Level
/// `error!` - Resolver returned the wrong processor for an entity
pub struct EntityTypeMismatch<'a> {
    pub operation: &'a str,
    pub expected: &'a str,
    pub actual: &'a str,
}

impl Display for EntityTypeMismatch<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processor for '{}' cannot {} an entity of type '{}'",
            self.expected, self.operation, self.actual
        )
    }
}

impl StructuredLog for EntityTypeMismatch<'_> {
    fn log(&self) {
        tracing::error!(
            operation = self.operation,
            expected = self.expected,
            actual = self.actual,
            "{}", self
        );
    }
}
