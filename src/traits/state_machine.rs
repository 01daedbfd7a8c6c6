// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::context::ProcessContext;
use crate::errors::ProcessError;
use crate::traits::{Action, ActionParams};

/// Validates and performs the state transitions of one concrete entity type.
///
/// A processor holds an ordered list of candidates and uses the first one whose
/// [`can_process`](StateMachine::can_process) returns true.
#[async_trait]
pub trait StateMachine<E>: Send + Sync {
    /// Whether this state machine governs `entity` in its current shape/state.
    fn can_process(&self, entity: &E) -> bool;

    /// `Ok(())` when `action` is legal for `entity` as it stands.
    ///
    /// Runs after every sub-entity has been synced and validated.
    async fn validate(
        &self,
        ctx: &ProcessContext,
        entity: &E,
        action: &Action,
        params: &ActionParams,
    ) -> Result<(), ProcessError>;

    /// Performs the transition and returns the new entity.
    ///
    /// `syncer_error` is the error of the action-specific syncer, if one ran and
    /// failed. The state machine decides whether that failure is fatal, ignored,
    /// or drives a different transition. Whatever this returns is what the
    /// caller sees.
    async fn apply(
        &self,
        ctx: &ProcessContext,
        entity: &E,
        action: &Action,
        params: &ActionParams,
        syncer_error: Option<ProcessError>,
    ) -> Result<E, ProcessError>;
}
