// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Contracts between the engine and the application.
//!
//! * [`Entity`] - structural view every tree node exposes
//! * [`StateMachine`], [`Syncer`], [`Repository`] - per-entity-type collaborators
//! * [`Processor`] - orchestrator contract, typed or type-erased ([`DynProcessor`])

pub mod action;
pub mod entity;
pub mod processor;
pub mod repository;
pub mod state_machine;
pub mod syncer;

pub use action::{Action, ActionParams};
pub use entity::{downcast_entity, narrow_entity, AsAny, Entity, EntityRef, SubEntities};
pub use processor::{DynProcessor, Phase, Processor};
pub use repository::{Change, Repository};
pub use state_machine::StateMachine;
pub use syncer::Syncer;
