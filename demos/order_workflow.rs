// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;

use the_canopy::config::{load_config, Config};
use the_canopy::errors::ProcessError;
use the_canopy::observability::init_tracing;
use the_canopy::traits::narrow_entity;
use the_canopy::{
    Action, ActionParams, Entity, EntityProcessor, EntityRef, ProcessContext, Processor,
    ProcessorConfig, ProcessorRegistry, Repository, StateMachine, SubEntities,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Status {
    Open,
    Approved,
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
struct LineItem {
    sku: String,
    quantity: u32,
    status: Status,
    id: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
struct Order {
    number: String,
    status: Status,
    id: Option<u64>,
    items: BTreeMap<String, LineItem>,
}

impl Entity for LineItem {
    fn sub_entities(&self) -> SubEntities {
        SubEntities::new()
    }

    fn update_sub_entity(
        &self,
        type_key: &str,
        entity_key: &str,
        _child: EntityRef,
    ) -> Result<Self, ProcessError> {
        Err(ProcessError::missing_sub_entity(type_key, entity_key))
    }
}

impl Entity for Order {
    fn sub_entities(&self) -> SubEntities {
        let items: BTreeMap<String, EntityRef> = self
            .items
            .iter()
            .map(|(sku, item)| (sku.clone(), Arc::new(item.clone()) as EntityRef))
            .collect();
        SubEntities::from([("items".to_string(), items)])
    }

    fn update_sub_entity(
        &self,
        type_key: &str,
        entity_key: &str,
        child: EntityRef,
    ) -> Result<Self, ProcessError> {
        if type_key != "items" || !self.items.contains_key(entity_key) {
            return Err(ProcessError::missing_sub_entity(type_key, entity_key));
        }
        let mut next = self.clone();
        next.items.insert(entity_key.to_string(), narrow_entity(&*child)?);
        Ok(next)
    }
}

/// Status field shared by both demo entities.
trait HasStatus: Clone + Send + Sync + 'static {
    fn status(&self) -> Status;
    fn with_status(&self, status: Status) -> Self;
    fn with_id(&self, id: u64) -> Self;
    fn key(&self) -> String;
}

impl HasStatus for LineItem {
    fn status(&self) -> Status {
        self.status
    }

    fn with_status(&self, status: Status) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    fn with_id(&self, id: u64) -> Self {
        Self {
            id: Some(id),
            ..self.clone()
        }
    }

    fn key(&self) -> String {
        format!("item/{}", self.sku)
    }
}

impl HasStatus for Order {
    fn status(&self) -> Status {
        self.status
    }

    fn with_status(&self, status: Status) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    fn with_id(&self, id: u64) -> Self {
        Self {
            id: Some(id),
            ..self.clone()
        }
    }

    fn key(&self) -> String {
        format!("order/{}", self.number)
    }
}

/// open -> approved | cancelled, approved -> cancelled.
struct Lifecycle;

impl Lifecycle {
    fn target(action: &Action, from: Status) -> Option<Status> {
        match (action.as_str(), from) {
            ("approve", Status::Open) => Some(Status::Approved),
            ("cancel", Status::Open | Status::Approved) => Some(Status::Cancelled),
            _ => None,
        }
    }
}

#[async_trait]
impl<E: HasStatus> StateMachine<E> for Lifecycle {
    fn can_process(&self, _entity: &E) -> bool {
        true
    }

    async fn validate(
        &self,
        _ctx: &ProcessContext,
        entity: &E,
        action: &Action,
        _params: &ActionParams,
    ) -> Result<(), ProcessError> {
        Self::target(action, entity.status())
            .map(|_| ())
            .ok_or_else(|| {
                ProcessError::invalid_state(format!("cannot {} {}", action, entity.key()))
            })
    }

    async fn apply(
        &self,
        _ctx: &ProcessContext,
        entity: &E,
        action: &Action,
        _params: &ActionParams,
        syncer_error: Option<ProcessError>,
    ) -> Result<E, ProcessError> {
        if let Some(error) = syncer_error {
            return Err(error);
        }
        let to = Self::target(action, entity.status())
            .ok_or_else(|| ProcessError::invalid_state("no transition"))?;
        Ok(entity.with_status(to))
    }
}

/// Shared in-memory store, keyed by entity key.
#[derive(Clone, Default)]
struct MemoryStore {
    rows: Arc<Mutex<HashMap<String, serde_json::Value>>>,
    next_id: Arc<AtomicU64>,
}

impl MemoryStore {
    fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }
}

#[async_trait]
impl<E: HasStatus + Serialize> Repository<E> for MemoryStore {
    async fn save(
        &self,
        _ctx: &ProcessContext,
        old: Option<&E>,
        new: Option<&E>,
    ) -> Result<Option<E>, ProcessError> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| ProcessError::invalid_state("store lock poisoned"))?;
        match (old, new) {
            (Some(old), None) => {
                rows.remove(&old.key());
                Ok(None)
            }
            (old, Some(new)) => {
                let saved = match old {
                    None => new.with_id(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
                    Some(_) => new.clone(),
                };
                let row = serde_json::to_value(&saved).map_err(ProcessError::external)?;
                rows.insert(saved.key(), row);
                Ok(Some(saved))
            }
            (None, None) => Ok(None),
        }
    }
}

fn build_processor(
    registry: &ProcessorRegistry,
    store: &MemoryStore,
    config: &Config,
) -> EntityProcessor<Order> {
    registry.register::<LineItem, _>(EntityProcessor::new(
        ProcessorConfig::builder()
            .state_machine(Lifecycle)
            .repository(store.clone())
            .options(config.engine)
            .build(),
    ));

    EntityProcessor::new(
        ProcessorConfig::builder()
            .resolver(registry.resolver())
            .state_machine(Lifecycle)
            .repository(store.clone())
            .options(config.engine)
            .build(),
    )
}

fn new_order(number: &str, skus: &[(&str, u32)]) -> Order {
    let items = skus
        .iter()
        .map(|(sku, quantity)| {
            let item = LineItem {
                sku: sku.to_string(),
                quantity: *quantity,
                status: Status::Open,
                id: None,
            };
            (sku.to_string(), item)
        })
        .collect();
    Order {
        number: number.to_string(),
        status: Status::Open,
        id: None,
        items,
    }
}

/// Usage: cargo run --example order_workflow [config_file]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match env::args().nth(1) {
        Some(path) => load_config(&path).with_context(|| format!("loading {}", path))?,
        None => Config::default(),
    };
    init_tracing(&config.logging).map_err(|e| anyhow::anyhow!(e))?;

    println!("=== Order Workflow Demo ===\n");

    let registry = ProcessorRegistry::new();
    let store = MemoryStore::default();
    let processor = build_processor(&registry, &store, &config);
    let ctx = ProcessContext::new();

    // a fresh order has no stored counterpart, so save it as a create first
    let draft = new_order("A-1001", &[("widget", 3), ("gadget", 1)]);
    let created = processor
        .save(&ctx, None, Some(&draft))
        .await?
        .context("repository returned nothing for a create")?;
    println!("Created ({} rows stored):", store.len());
    println!("{}\n", serde_json::to_string_pretty(&created)?);

    let approved = processor
        .process(&ctx, created, &Action::from("approve"), &ActionParams::none())
        .await
        .map_err(|failure| failure.into_error())?;
    println!("Approved:");
    println!("{}\n", serde_json::to_string_pretty(&approved)?);

    // approving twice is rejected and the approved order comes back untouched
    match processor
        .process(&ctx, approved.clone(), &Action::from("approve"), &ActionParams::none())
        .await
    {
        Ok(_) => println!("Second approve unexpectedly succeeded"),
        Err(failure) => println!(
            "Second approve rejected ({:?}): {}\n  order still {:?}\n",
            failure.kind(),
            failure.error,
            failure.entity.status
        ),
    }

    let cancelled = processor
        .process(&ctx, approved, &Action::from("cancel"), &ActionParams::none())
        .await
        .map_err(|failure| failure.into_error())?;
    println!("Cancelled:");
    println!("{}", serde_json::to_string_pretty(&cancelled)?);

    Ok(())
}
