// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, Weak};

use crate::config::Resolver;
use crate::engine::erase;
use crate::observability::messages::registry::ProcessorRegistered;
use crate::observability::messages::StructuredLog;
use crate::traits::{DynProcessor, Entity, Processor};

struct Registration {
    entity_type: &'static str,
    processor: DynProcessor,
}

type Registrations = RwLock<HashMap<TypeId, Registration>>;

/// Registry mapping each concrete entity type to its type-erased processor.
///
/// The registry is the usual way to build a [`Resolver`]: processors are
/// registered per entity type and [`resolver`](ProcessorRegistry::resolver)
/// looks them up by the concrete type of each sub-entity.
///
/// Registration goes through `&self`, so a resolver can be handed to a
/// processor's config before the processors it will resolve exist. This is
/// what recursive trees (a category containing categories) need.
///
/// The resolver only holds a weak reference. Keep the registry alive for as
/// long as its processors are in use; once it is dropped every lookup misses.
///
/// # Example
/// ```ignore
/// let registry = ProcessorRegistry::new();
/// let order_config = ProcessorConfig::builder()
///     .resolver(registry.resolver())
///     .state_machine(OrderStateMachine)
///     .build();
/// registry.register::<LineItem, _>(EntityProcessor::new(line_item_config));
/// registry.register::<Order, _>(EntityProcessor::new(order_config));
/// ```
#[derive(Clone, Default)]
pub struct ProcessorRegistry {
    registrations: Arc<Registrations>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `processor` for entity type `E`, wrapping it for type erasure.
    ///
    /// Returns the erased processor, which is also what the resolver hands out.
    pub fn register<E, P>(&self, processor: P) -> DynProcessor
    where
        E: Entity + Clone,
        P: Processor<E> + 'static,
    {
        let erased = erase::<E, P>(processor);
        self.register_erased::<E>(erased.clone());
        erased
    }

    /// Register an already type-erased processor for entity type `E`.
    pub fn register_erased<E: Entity>(&self, processor: DynProcessor) {
        let entity_type = std::any::type_name::<E>();
        let previous = self
            .registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                TypeId::of::<E>(),
                Registration {
                    entity_type,
                    processor,
                },
            );

        ProcessorRegistered {
            entity_type,
            replaced: previous.is_some(),
        }
        .log();
    }

    pub fn get(&self, entity: &dyn Entity) -> Option<DynProcessor> {
        lookup(&self.registrations, entity)
    }

    pub fn contains<E: Entity>(&self) -> bool {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&TypeId::of::<E>())
    }

    pub fn len(&self) -> usize {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered entity type names, sorted.
    pub fn entity_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|registration| registration.entity_type)
            .collect();
        names.sort_unstable();
        names
    }

    /// Resolver backed by this registry.
    pub fn resolver(&self) -> Resolver {
        let registrations: Weak<Registrations> = Arc::downgrade(&self.registrations);
        Resolver::new(move |entity| {
            let registrations = registrations.upgrade()?;
            lookup(&registrations, entity)
        })
    }
}

fn lookup(registrations: &Registrations, entity: &dyn Entity) -> Option<DynProcessor> {
    let type_id = Any::type_id(entity.as_any());
    registrations
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&type_id)
        .map(|registration| registration.processor.clone())
}

impl fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("processor_count", &self.len())
            .field("entity_types", &self.entity_types())
            .finish()
    }
}
