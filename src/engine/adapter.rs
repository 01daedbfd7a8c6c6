// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Type-erasure adapter between typed processors and [`DynProcessor`].
//!
//! A parent processor only ever sees its children as [`EntityRef`]s, and a
//! resolver has to return one type no matter which child processor it picks.
//! [`TypeErasedProcessor`] narrows each incoming `EntityRef` to the concrete
//! type its inner processor handles, delegates, and widens the result back.
//! A narrowing failure is reported as `InvalidEntityType` and the inner
//! processor is not called; this is the one place where a resolver that
//! returned the wrong processor for an entity is caught.

use std::any::type_name;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::ProcessContext;
use crate::errors::{ProcessError, ProcessFailure};
use crate::observability::messages::processor::EntityTypeMismatch;
use crate::observability::messages::StructuredLog;
use crate::traits::{
    narrow_entity, Action, ActionParams, DynProcessor, Entity, EntityRef, Processor,
};

pub struct TypeErasedProcessor<E, P> {
    inner: P,
    _entity: PhantomData<fn() -> E>,
}

impl<E, P> TypeErasedProcessor<E, P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            _entity: PhantomData,
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

/// Wrap a typed processor so it can be returned from a resolver.
pub fn erase<E, P>(processor: P) -> DynProcessor
where
    E: Entity + Clone,
    P: Processor<E> + 'static,
{
    Arc::new(TypeErasedProcessor::<E, P>::new(processor))
}

fn narrow<E: Entity + Clone>(operation: &str, entity: &EntityRef) -> Result<E, ProcessError> {
    narrow_entity::<E>(&**entity).map_err(|error| {
        EntityTypeMismatch {
            operation,
            expected: type_name::<E>(),
            actual: entity.entity_type(),
        }
        .log();
        error
    })
}

fn widen<E: Entity>(entity: E) -> EntityRef {
    Arc::new(entity)
}

#[async_trait]
impl<E, P> Processor<EntityRef> for TypeErasedProcessor<E, P>
where
    E: Entity + Clone,
    P: Processor<E>,
{
    async fn process(
        &self,
        ctx: &ProcessContext,
        entity: EntityRef,
        action: &Action,
        params: &ActionParams,
    ) -> Result<EntityRef, ProcessFailure<EntityRef>> {
        let typed = match narrow::<E>("process", &entity) {
            Ok(typed) => typed,
            Err(error) => return Err(ProcessFailure::new(entity, error)),
        };
        self.inner
            .process(ctx, typed, action, params)
            .await
            .map(widen)
            .map_err(|failure| failure.map_entity(widen))
    }

    async fn sync_and_validate(
        &self,
        ctx: &ProcessContext,
        entity: &EntityRef,
        action: &Action,
        params: &ActionParams,
    ) -> Result<EntityRef, ProcessFailure<EntityRef>> {
        let typed = narrow::<E>("sync_and_validate", entity)
            .map_err(|error| ProcessFailure::new(entity.clone(), error))?;
        self.inner
            .sync_and_validate(ctx, &typed, action, params)
            .await
            .map(widen)
            .map_err(|failure| failure.map_entity(widen))
    }

    async fn act(
        &self,
        ctx: &ProcessContext,
        entity: &EntityRef,
        action: &Action,
        params: &ActionParams,
    ) -> Result<EntityRef, ProcessFailure<EntityRef>> {
        let typed = narrow::<E>("act", entity)
            .map_err(|error| ProcessFailure::new(entity.clone(), error))?;
        self.inner
            .act(ctx, &typed, action, params)
            .await
            .map(widen)
            .map_err(|failure| failure.map_entity(widen))
    }

    async fn save(
        &self,
        ctx: &ProcessContext,
        old: Option<&EntityRef>,
        new: Option<&EntityRef>,
    ) -> Result<Option<EntityRef>, ProcessError> {
        let old = old.map(|entity| narrow::<E>("save", entity)).transpose()?;
        let new = new.map(|entity| narrow::<E>("save", entity)).transpose()?;
        let saved = self.inner.save(ctx, old.as_ref(), new.as_ref()).await?;
        Ok(saved.map(widen))
    }
}
