// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;

use crate::config::EngineOptions;
use crate::traits::{DynProcessor, Entity, Repository, StateMachine, Syncer};

type ResolveFn = dyn Fn(&dyn Entity) -> Option<DynProcessor> + Send + Sync;

/// Maps a concrete sub-entity to the processor responsible for its type.
///
/// Must cover every sub-entity type that can appear below the entity the
/// owning processor handles; a `None` from [`resolve`](Resolver::resolve)
/// aborts processing with `ProcessorNotFound`.
#[derive(Clone)]
pub struct Resolver(Arc<ResolveFn>);

impl Resolver {
    pub fn new<F>(resolve: F) -> Self
    where
        F: Fn(&dyn Entity) -> Option<DynProcessor> + Send + Sync + 'static,
    {
        Self(Arc::new(resolve))
    }

    /// Resolver for leaf entity types, which have no sub-entities to resolve.
    pub fn none() -> Self {
        Self::new(|_| None)
    }

    /// Resolver that hands every sub-entity to the same processor.
    pub fn always(processor: DynProcessor) -> Self {
        Self::new(move |_| Some(processor.clone()))
    }

    pub fn resolve(&self, entity: &dyn Entity) -> Option<DynProcessor> {
        (self.0)(entity)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver")
    }
}

/// Everything a processor for entity type `E` needs, supplied once at
/// construction and never mutated afterwards.
///
/// State machines and syncers are candidate lists: order matters, because
/// with [`SelectionPolicy::FirstMatch`](crate::config::SelectionPolicy) the
/// first accepting candidate wins.
///
/// # Example
/// ```ignore
/// let config = ProcessorConfig::builder()
///     .resolver(registry.resolver())
///     .state_machine(OrderStateMachine)
///     .syncer(PaymentSyncer::new(client))
///     .repository(OrderRepository::new(pool))
///     .build();
/// let processor = EntityProcessor::new(config);
/// ```
pub struct ProcessorConfig<E> {
    pub resolver: Resolver,
    pub state_machines: Vec<Arc<dyn StateMachine<E>>>,
    pub syncers: Vec<Arc<dyn Syncer<E>>>,
    pub repository: Option<Arc<dyn Repository<E>>>,
    pub options: EngineOptions,
}

impl<E> ProcessorConfig<E> {
    pub fn builder() -> ProcessorConfigBuilder<E> {
        ProcessorConfigBuilder {
            config: ProcessorConfig::default(),
        }
    }
}

impl<E> Default for ProcessorConfig<E> {
    fn default() -> Self {
        Self {
            resolver: Resolver::none(),
            state_machines: Vec::new(),
            syncers: Vec::new(),
            repository: None,
            options: EngineOptions::default(),
        }
    }
}

impl<E> Clone for ProcessorConfig<E> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            state_machines: self.state_machines.clone(),
            syncers: self.syncers.clone(),
            repository: self.repository.clone(),
            options: self.options,
        }
    }
}

impl<E> fmt::Debug for ProcessorConfig<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorConfig")
            .field("state_machine_count", &self.state_machines.len())
            .field("syncer_count", &self.syncers.len())
            .field("has_repository", &self.repository.is_some())
            .field("options", &self.options)
            .finish()
    }
}

pub struct ProcessorConfigBuilder<E> {
    config: ProcessorConfig<E>,
}

impl<E: 'static> ProcessorConfigBuilder<E> {
    pub fn resolver(mut self, resolver: Resolver) -> Self {
        self.config.resolver = resolver;
        self
    }

    /// Append a state machine candidate.
    pub fn state_machine<S>(self, state_machine: S) -> Self
    where
        S: StateMachine<E> + 'static,
    {
        self.shared_state_machine(Arc::new(state_machine))
    }

    pub fn shared_state_machine(mut self, state_machine: Arc<dyn StateMachine<E>>) -> Self {
        self.config.state_machines.push(state_machine);
        self
    }

    /// Append a syncer candidate.
    pub fn syncer<S>(self, syncer: S) -> Self
    where
        S: Syncer<E> + 'static,
    {
        self.shared_syncer(Arc::new(syncer))
    }

    pub fn shared_syncer(mut self, syncer: Arc<dyn Syncer<E>>) -> Self {
        self.config.syncers.push(syncer);
        self
    }

    pub fn repository<R>(self, repository: R) -> Self
    where
        R: Repository<E> + 'static,
    {
        self.shared_repository(Arc::new(repository))
    }

    pub fn shared_repository(mut self, repository: Arc<dyn Repository<E>>) -> Self {
        self.config.repository = Some(repository);
        self
    }

    pub fn options(mut self, options: EngineOptions) -> Self {
        self.config.options = options;
        self
    }

    pub fn build(self) -> ProcessorConfig<E> {
        self.config
    }
}
