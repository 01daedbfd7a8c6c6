// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::errors::ProcessError;

/// Shared handle to a type-erased entity.
pub type EntityRef = Arc<dyn Entity>;

/// Structural view of an entity: type key -> entity key -> child.
///
/// `BTreeMap` keeps traversal order deterministic (type key first, then
/// entity key), which is the order every phase visits children in.
pub type SubEntities = BTreeMap<String, BTreeMap<String, EntityRef>>;

/// Access to the concrete value behind a trait object.
///
/// Implemented for every `'static` type, so entity authors never write it.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Structural contract every node of a processed tree satisfies.
///
/// The engine never looks at business fields. It only walks
/// [`sub_entities`](Entity::sub_entities) and folds changed children back with
/// [`update_sub_entity`](Entity::update_sub_entity).
///
/// Concrete entity types also implement `Clone`; the clone is the entity's
/// copy and must be independent of the original. Holding children as
/// immutable `Arc` values, or as owned values, both satisfy this.
///
/// ```
/// use std::collections::BTreeMap;
/// use std::sync::Arc;
/// use the_canopy::errors::ProcessError;
/// use the_canopy::traits::{Entity, EntityRef, SubEntities};
///
/// #[derive(Debug, Clone)]
/// struct Leaf { value: u32 }
///
/// impl Entity for Leaf {
///     fn sub_entities(&self) -> SubEntities {
///         BTreeMap::new()
///     }
///
///     fn update_sub_entity(
///         &self,
///         type_key: &str,
///         entity_key: &str,
///         _child: EntityRef,
///     ) -> Result<Self, ProcessError> {
///         Err(ProcessError::missing_sub_entity(type_key, entity_key))
///     }
/// }
///
/// let leaf: EntityRef = Arc::new(Leaf { value: 1 });
/// assert!(leaf.sub_entities().is_empty());
/// ```
pub trait Entity: AsAny + Debug + Send + Sync + 'static {
    fn sub_entities(&self) -> SubEntities;

    /// Returns a new parent with the child at `(type_key, entity_key)` replaced.
    ///
    /// # Errors
    /// `InvalidState` when the pair does not exist. Implementations that hold
    /// children by concrete type return `InvalidEntityType` when `child` cannot
    /// be narrowed (see [`downcast_entity`]).
    fn update_sub_entity(
        &self,
        type_key: &str,
        entity_key: &str,
        child: EntityRef,
    ) -> Result<Self, ProcessError>
    where
        Self: Sized;

    fn entity_type(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Borrow the concrete entity behind a type-erased handle.
pub fn downcast_entity<E: Entity>(entity: &dyn Entity) -> Option<&E> {
    entity.as_any().downcast_ref::<E>()
}

/// Narrow a type-erased entity into an owned concrete value.
///
/// # Errors
/// `InvalidEntityType` when `entity` is not an `E`.
pub fn narrow_entity<E: Entity + Clone>(entity: &dyn Entity) -> Result<E, ProcessError> {
    downcast_entity::<E>(entity)
        .cloned()
        .ok_or_else(|| ProcessError::InvalidEntityType {
            expected: std::any::type_name::<E>(),
            actual: entity.entity_type(),
        })
}
