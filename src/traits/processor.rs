// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::Instrument;

use crate::context::ProcessContext;
use crate::errors::{ProcessError, ProcessFailure};
use crate::observability::messages::processor::{ProcessCompleted, ProcessFailed, ProcessStarted};
use crate::observability::messages::StructuredLog;
use crate::traits::{Action, ActionParams, EntityRef};

/// Type-erased processor, as returned by a resolver.
pub type DynProcessor = Arc<dyn Processor<EntityRef>>;

/// The three phases every `process` call runs, in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    SyncAndValidate,
    Act,
    Save,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::SyncAndValidate => "sync_and_validate",
            Phase::Act => "act",
            Phase::Save => "save",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drives an entity and its whole subtree through validate, act and save.
///
/// Only [`process`](Processor::process) is meant for application code. The
/// phase methods are the hooks a parent processor calls on its children; they
/// are part of the trait so that a parent can drive a child processor through
/// a [`DynProcessor`] without knowing its entity type.
#[async_trait]
pub trait Processor<E>: Send + Sync
where
    E: Clone + Send + Sync + 'static,
{
    /// Runs `sync_and_validate`, `act` and `save` in order.
    ///
    /// On failure the returned [`ProcessFailure`] carries the entity as it was
    /// before the failing phase: the input for a validation failure, the
    /// validated entity for an act failure, the acted entity for a save
    /// failure. That entity is never committed state.
    async fn process(
        &self,
        ctx: &ProcessContext,
        entity: E,
        action: &Action,
        params: &ActionParams,
    ) -> Result<E, ProcessFailure<E>> {
        let start_msg = ProcessStarted {
            entity_type: std::any::type_name::<E>(),
            action: action.as_str(),
        };
        let span = start_msg.span("process");

        async {
            start_msg.log();
            let started = Instant::now();

            let fail = |phase: Phase, partial: E, error: ProcessError| {
                ProcessFailed {
                    entity_type: start_msg.entity_type,
                    action: start_msg.action,
                    phase,
                    error: &error,
                }
                .log();
                ProcessFailure::new(partial, error)
            };

            let validated = match self.sync_and_validate(ctx, &entity, action, params).await {
                Ok(validated) => validated,
                Err(failure) => return Err(fail(Phase::SyncAndValidate, entity, failure.error)),
            };

            let acted = match self.act(ctx, &validated, action, params).await {
                Ok(acted) => acted,
                Err(failure) => return Err(fail(Phase::Act, validated, failure.error)),
            };

            let saved = match self.save(ctx, Some(&entity), Some(&acted)).await {
                Ok(saved) => saved,
                Err(error) => return Err(fail(Phase::Save, acted, error)),
            };

            ProcessCompleted {
                entity_type: start_msg.entity_type,
                action: start_msg.action,
                persisted: saved.is_some(),
                duration: started.elapsed(),
            }
            .log();

            // a root save yielding nothing still reports the acted entity
            Ok(saved.unwrap_or(acted))
        }
        .instrument(span)
        .await
    }

    /// Syncs and validates the subtree bottom-up, then the entity itself.
    async fn sync_and_validate(
        &self,
        ctx: &ProcessContext,
        entity: &E,
        action: &Action,
        params: &ActionParams,
    ) -> Result<E, ProcessFailure<E>>;

    /// Applies the action to the subtree bottom-up, then to the entity itself.
    async fn act(
        &self,
        ctx: &ProcessContext,
        entity: &E,
        action: &Action,
        params: &ActionParams,
    ) -> Result<E, ProcessFailure<E>>;

    /// Reconciles the `old` and `new` trees and persists the result.
    async fn save(
        &self,
        ctx: &ProcessContext,
        old: Option<&E>,
        new: Option<&E>,
    ) -> Result<Option<E>, ProcessError>;
}
