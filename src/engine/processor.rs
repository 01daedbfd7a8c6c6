// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The recursive three-phase processor.
//!
//! # Execution Flow
//!
//! ```text
//! process(entity)
//!   sync_and_validate   children first (resolve -> recurse -> fold back),
//!                       then pre-sync, then StateMachine::validate
//!   act                 children first, then action sync (error forwarded),
//!                       then StateMachine::apply
//!   save(entity, acted) per type key, per entity key:
//!                         old only  -> save(old, None), result discarded
//!                         new only  -> save(None, new), folded back
//!                         both      -> save(old, new), folded back
//!                       then Repository::save on the reconciled entity
//! ```
//!
//! Children are visited in key order (type key, then entity key), one at a
//! time, on the calling task. The first error anywhere aborts the phase.

use std::any::type_name;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::config::consts::{ACTION_SYNCER_ROLE, STATE_MACHINE_ROLE, SYNCER_ROLE};
use crate::config::ProcessorConfig;
use crate::context::ProcessContext;
use crate::engine::selection::select;
use crate::errors::{ProcessError, ProcessFailure};
use crate::observability::messages::processor::{
    ActionSyncFailed, EntitySynced, PhaseFailed, SubProcessorNotFound,
};
use crate::observability::messages::save::{EntityPersisted, SaveCascade};
use crate::observability::messages::StructuredLog;
use crate::traits::{
    Action, ActionParams, Change, DynProcessor, Entity, EntityRef, Phase, Processor, StateMachine,
    Syncer,
};

/// Which recursive pass `descend` drives the children through.
#[derive(Clone, Copy)]
enum Pass {
    SyncAndValidate,
    Act,
}

impl Pass {
    fn phase(self) -> Phase {
        match self {
            Pass::SyncAndValidate => Phase::SyncAndValidate,
            Pass::Act => Phase::Act,
        }
    }
}

/// Processor for one concrete entity type `E`.
///
/// Children of any type are reached through the config's resolver. Wrap the
/// processor with [`erase`](crate::engine::erase) (or register it in a
/// [`ProcessorRegistry`](crate::config::ProcessorRegistry)) to make it
/// resolvable from a parent.
pub struct EntityProcessor<E> {
    config: ProcessorConfig<E>,
}

impl<E> EntityProcessor<E> {
    pub fn new(config: ProcessorConfig<E>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessorConfig<E> {
        &self.config
    }
}

impl<E: Entity + Clone> EntityProcessor<E> {
    fn entity_type() -> &'static str {
        type_name::<E>()
    }

    fn failure(phase: Phase, entity: E, error: ProcessError) -> ProcessFailure<E> {
        PhaseFailed {
            phase,
            entity_type: Self::entity_type(),
            error: &error,
        }
        .log();
        ProcessFailure::new(entity, error)
    }

    fn resolve_child(
        &self,
        type_key: &str,
        entity_key: &str,
        child: &EntityRef,
    ) -> Result<DynProcessor, ProcessError> {
        self.config.resolver.resolve(&**child).ok_or_else(|| {
            SubProcessorNotFound {
                parent_type: Self::entity_type(),
                child_type: child.entity_type(),
                type_key,
                entity_key,
            }
            .log();
            ProcessError::ProcessorNotFound {
                entity_type: child.entity_type().to_string(),
            }
        })
    }

    fn state_machine_for(&self, entity: &E) -> Result<&Arc<dyn StateMachine<E>>, ProcessError> {
        select(
            &self.config.state_machines,
            self.config.options.selection,
            STATE_MACHINE_ROLE,
            Self::entity_type(),
            |state_machine| state_machine.can_process(entity),
        )?
        .ok_or_else(|| ProcessError::Unprocessable {
            entity_type: Self::entity_type().to_string(),
        })
    }

    fn syncer_for(&self, entity: &E) -> Result<Option<&Arc<dyn Syncer<E>>>, ProcessError> {
        select(
            &self.config.syncers,
            self.config.options.selection,
            SYNCER_ROLE,
            Self::entity_type(),
            |syncer| syncer.can_process(entity),
        )
    }

    fn action_syncer_for(
        &self,
        entity: &E,
        action: &Action,
    ) -> Result<Option<&Arc<dyn Syncer<E>>>, ProcessError> {
        select(
            &self.config.syncers,
            self.config.options.selection,
            ACTION_SYNCER_ROLE,
            Self::entity_type(),
            |syncer| syncer.can_process(entity) && syncer.has_action(action),
        )
    }

    /// Drive every child through `pass` and fold the results into a copy of
    /// `entity`. On failure the copy carries the children folded so far.
    async fn descend(
        &self,
        ctx: &ProcessContext,
        entity: &E,
        pass: Pass,
        action: &Action,
        params: &ActionParams,
    ) -> Result<E, ProcessFailure<E>> {
        let mut changed = entity.clone();

        for (type_key, children) in entity.sub_entities() {
            for (entity_key, child) in children {
                let sub_processor = match self.resolve_child(&type_key, &entity_key, &child) {
                    Ok(sub_processor) => sub_processor,
                    Err(error) => return Err(Self::failure(pass.phase(), changed, error)),
                };

                let result = match pass {
                    Pass::SyncAndValidate => {
                        sub_processor
                            .sync_and_validate(ctx, &child, action, params)
                            .await
                    }
                    Pass::Act => sub_processor.act(ctx, &child, action, params).await,
                };
                let changed_child = match result {
                    Ok(changed_child) => changed_child,
                    Err(failure) => {
                        return Err(Self::failure(pass.phase(), changed, failure.error))
                    }
                };

                changed = match changed.update_sub_entity(&type_key, &entity_key, changed_child) {
                    Ok(updated) => updated,
                    Err(error) => return Err(Self::failure(pass.phase(), changed, error)),
                };
            }
        }

        Ok(changed)
    }

    async fn reconcile_and_persist(
        &self,
        ctx: &ProcessContext,
        old: Option<&E>,
        new: Option<&E>,
    ) -> Result<Option<E>, ProcessError> {
        let mut reconciled = new.cloned();

        let old_children = old.map(|old| old.sub_entities()).unwrap_or_default();
        let new_children = new.map(|new| new.sub_entities()).unwrap_or_default();
        let none = BTreeMap::new();

        let type_keys: BTreeSet<&String> =
            old_children.keys().chain(new_children.keys()).collect();

        for type_key in type_keys {
            let old_typed = old_children.get(type_key).unwrap_or(&none);
            let new_typed = new_children.get(type_key).unwrap_or(&none);
            let entity_keys: BTreeSet<&String> =
                old_typed.keys().chain(new_typed.keys()).collect();

            for entity_key in entity_keys {
                let old_child = old_typed.get(entity_key);
                let new_child = new_typed.get(entity_key);
                let (Some(change), Some(child)) =
                    (Change::classify(old_child, new_child), old_child.or(new_child))
                else {
                    continue;
                };

                let sub_processor = self.resolve_child(type_key, entity_key, child)?;

                SaveCascade {
                    change: change.label(),
                    entity_type: child.entity_type(),
                    type_key,
                    entity_key,
                }
                .log();

                let saved_child = sub_processor.save(ctx, old_child, new_child).await?;

                // deletions never fold back: the parent no longer lists the key
                if new_child.is_none() {
                    continue;
                }
                if let (Some(saved_child), Some(parent)) = (saved_child, reconciled.as_ref()) {
                    reconciled = Some(parent.update_sub_entity(type_key, entity_key, saved_child)?);
                }
            }
        }

        let Some(repository) = &self.config.repository else {
            return Ok(reconciled);
        };

        let to_save = reconciled.as_ref();
        let change = Change::classify(old, to_save).map(|change| change.label());
        let saved = repository.save(ctx, old, to_save).await?;

        EntityPersisted {
            change: change.unwrap_or("none"),
            entity_type: Self::entity_type(),
            returned: saved.is_some(),
        }
        .log();

        Ok(saved)
    }
}

#[async_trait]
impl<E: Entity + Clone> Processor<E> for EntityProcessor<E> {
    async fn sync_and_validate(
        &self,
        ctx: &ProcessContext,
        entity: &E,
        action: &Action,
        params: &ActionParams,
    ) -> Result<E, ProcessFailure<E>> {
        let phase = Phase::SyncAndValidate;
        let mut changed = self
            .descend(ctx, entity, Pass::SyncAndValidate, action, params)
            .await?;

        let syncer = match self.syncer_for(&changed) {
            Ok(syncer) => syncer,
            Err(error) => return Err(Self::failure(phase, changed, error)),
        };
        if let Some(syncer) = syncer {
            // the gate sees the entity as the caller handed it in
            if syncer.need_sync(entity, action) {
                let started = Instant::now();
                changed = match syncer.sync(ctx, &changed).await {
                    Ok(synced) => synced,
                    Err(error) => return Err(Self::failure(phase, changed, error)),
                };
                EntitySynced {
                    entity_type: Self::entity_type(),
                    duration: started.elapsed(),
                }
                .log();
            }
        }

        let state_machine = match self.state_machine_for(entity) {
            Ok(state_machine) => state_machine,
            Err(error) => return Err(Self::failure(phase, changed, error)),
        };
        if let Err(error) = state_machine.validate(ctx, &changed, action, params).await {
            return Err(Self::failure(phase, changed, error));
        }

        Ok(changed)
    }

    async fn act(
        &self,
        ctx: &ProcessContext,
        entity: &E,
        action: &Action,
        params: &ActionParams,
    ) -> Result<E, ProcessFailure<E>> {
        let phase = Phase::Act;
        let mut changed = self.descend(ctx, entity, Pass::Act, action, params).await?;

        let state_machine = match self.state_machine_for(&changed) {
            Ok(state_machine) => state_machine,
            Err(error) => return Err(Self::failure(phase, changed, error)),
        };

        let action_syncer = match self.action_syncer_for(&changed, action) {
            Ok(action_syncer) => action_syncer,
            Err(error) => return Err(Self::failure(phase, changed, error)),
        };
        let mut syncer_error = None;
        if let Some(action_syncer) = action_syncer {
            match action_syncer.apply(ctx, &changed, action, params).await {
                Ok(synced) => changed = synced,
                Err(error) => {
                    ActionSyncFailed {
                        entity_type: Self::entity_type(),
                        action: action.as_str(),
                        error: &error,
                    }
                    .log();
                    syncer_error = Some(error);
                }
            }
        }

        match state_machine
            .apply(ctx, &changed, action, params, syncer_error)
            .await
        {
            Ok(applied) => Ok(applied),
            Err(error) => Err(Self::failure(phase, changed, error)),
        }
    }

    async fn save(
        &self,
        ctx: &ProcessContext,
        old: Option<&E>,
        new: Option<&E>,
    ) -> Result<Option<E>, ProcessError> {
        if old.is_none() && new.is_none() {
            return Ok(None);
        }

        self.reconcile_and_persist(ctx, old, new)
            .await
            .map_err(|error| {
                PhaseFailed {
                    phase: Phase::Save,
                    entity_type: Self::entity_type(),
                    error: &error,
                }
                .log();
                error
            })
    }
}
