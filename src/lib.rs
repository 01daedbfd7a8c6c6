// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Hierarchical entity processing.
//!
//! An [`EntityProcessor`] takes an entity tree through three phases: sync and
//! validate, act, then save. Every phase recurses into sub-entities before the
//! parent, and the per-type behavior comes from pluggable state machines,
//! syncers and repositories.

pub mod config;     // processor config, registry, file config
pub mod context;    // cancellation + deadline carrier
pub mod engine;     // recursive processor + type erasure
pub mod errors;     // error handling
pub mod observability;
pub mod traits;     // entity + collaborator contracts

#[cfg(test)]
mod testing;        // fixture entities and recording collaborators

pub use config::{ProcessorConfig, ProcessorRegistry, Resolver, SelectionPolicy};
pub use context::ProcessContext;
pub use engine::{erase, EntityProcessor};
pub use errors::{ErrorKind, ProcessError, ProcessFailure};
pub use traits::{
    Action, ActionParams, DynProcessor, Entity, EntityRef, Processor, Repository, StateMachine,
    SubEntities, Syncer,
};
