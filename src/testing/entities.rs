// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::ProcessError;
use crate::traits::{narrow_entity, Action, ActionParams, Entity, EntityRef, SubEntities};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pending,
    Approved,
    Shipped,
    Cancelled,
    PaymentFailed,
}

/// Params understood by `Order::transition`: add these items.
#[derive(Debug, Clone)]
pub struct AddItems(pub Vec<LineItem>);

/// Params understood by `Order::transition` and `Node::transition`: drop the
/// children with these keys.
#[derive(Debug, Clone)]
pub struct DropItems(pub Vec<String>);

/// Common surface the scripted collaborators work against.
pub trait Stateful: Entity + Clone {
    fn label(&self) -> String;
    fn status(&self) -> Status;
    fn with_status(&self, status: Status) -> Self;
    fn with_synced(&self) -> Self;
    fn with_db_id(&self, db_id: u64) -> Self;

    fn transition(&self, _action: &Action, _params: &ActionParams, to: Status) -> Self {
        self.with_status(to)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub key: String,
    pub quantity: u32,
    pub status: Status,
    pub synced: bool,
    pub db_id: Option<u64>,
}

impl LineItem {
    pub fn new(key: &str, quantity: u32) -> Self {
        Self {
            key: key.to_string(),
            quantity,
            status: Status::Pending,
            synced: false,
            db_id: None,
        }
    }
}

impl Entity for LineItem {
    fn sub_entities(&self) -> SubEntities {
        BTreeMap::new()
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

impl Stateful for LineItem {
    fn label(&self) -> String {
        format!("LineItem:{}", self.key)
    }

    fn status(&self) -> Status {
        self.status
    }

    fn with_status(&self, status: Status) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    fn with_synced(&self) -> Self {
        Self {
            synced: true,
            ..self.clone()
        }
    }

    fn with_db_id(&self, db_id: u64) -> Self {
        Self {
            db_id: Some(db_id),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub id: String,
    pub amount_cents: u64,
    pub status: Status,
    pub synced: bool,
    pub db_id: Option<u64>,
}

impl Payment {
    pub fn new(id: &str, amount_cents: u64) -> Self {
        Self {
            id: id.to_string(),
            amount_cents,
            status: Status::Pending,
            synced: false,
            db_id: None,
        }
    }
}

impl Entity for Payment {
    fn sub_entities(&self) -> SubEntities {
        BTreeMap::new()
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

impl Stateful for Payment {
    fn label(&self) -> String {
        format!("Payment:{}", self.id)
    }

    fn status(&self) -> Status {
        self.status
    }

    fn with_status(&self, status: Status) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    fn with_synced(&self) -> Self {
        Self {
            synced: true,
            ..self.clone()
        }
    }

    fn with_db_id(&self, db_id: u64) -> Self {
        Self {
            db_id: Some(db_id),
            ..self.clone()
        }
    }
}

/// Root entity: `items` -> `LineItem`, `payments` -> `Payment`.
///
/// A type key is only listed while its collection is non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub status: Status,
    pub synced: bool,
    pub db_id: Option<u64>,
    pub items: BTreeMap<String, LineItem>,
    pub payments: BTreeMap<String, Payment>,
}

impl Order {
    pub fn pending(id: &str) -> Self {
        Self {
            id: id.to_string(),
            status: Status::Pending,
            synced: false,
            db_id: None,
            items: BTreeMap::new(),
            payments: BTreeMap::new(),
        }
    }

    pub fn with_item(mut self, item: LineItem) -> Self {
        self.items.insert(item.key.clone(), item);
        self
    }

    pub fn with_payment(mut self, payment: Payment) -> Self {
        self.payments.insert(payment.id.clone(), payment);
        self
    }
}

fn erase_all<T: Entity + Clone>(children: &BTreeMap<String, T>) -> BTreeMap<String, EntityRef> {
    children
        .iter()
        .map(|(key, child)| (key.clone(), Arc::new(child.clone()) as EntityRef))
        .collect()
}

impl Entity for Order {
    fn sub_entities(&self) -> SubEntities {
        let mut sub_entities = SubEntities::new();
        if !self.items.is_empty() {
            sub_entities.insert("items".to_string(), erase_all(&self.items));
        }
        if !self.payments.is_empty() {
            sub_entities.insert("payments".to_string(), erase_all(&self.payments));
        }
        sub_entities
    }

    fn update_sub_entity(
        &self,
        type_key: &str,
        entity_key: &str,
        child: EntityRef,
    ) -> Result<Self, ProcessError> {
        let mut next = self.clone();
        match type_key {
            "items" if self.items.contains_key(entity_key) => {
                next.items
                    .insert(entity_key.to_string(), narrow_entity(&*child)?);
            }
            "payments" if self.payments.contains_key(entity_key) => {
                next.payments
                    .insert(entity_key.to_string(), narrow_entity(&*child)?);
            }
            _ => return Err(ProcessError::missing_sub_entity(type_key, entity_key)),
        }
        Ok(next)
    }
}

impl Stateful for Order {
    fn label(&self) -> String {
        format!("Order:{}", self.id)
    }

    fn status(&self) -> Status {
        self.status
    }

    fn with_status(&self, status: Status) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    fn with_synced(&self) -> Self {
        Self {
            synced: true,
            ..self.clone()
        }
    }

    fn with_db_id(&self, db_id: u64) -> Self {
        Self {
            db_id: Some(db_id),
            ..self.clone()
        }
    }

    fn transition(&self, _action: &Action, params: &ActionParams, to: Status) -> Self {
        let mut next = self.with_status(to);
        if let Some(AddItems(items)) = params.get::<AddItems>() {
            for item in items {
                next.items.insert(item.key.clone(), item.clone());
            }
        }
        if let Some(DropItems(keys)) = params.get::<DropItems>() {
            for key in keys {
                next.items.remove(key);
            }
        }
        next
    }
}

/// Recursive entity: `children` -> `Node`, to any depth.
///
/// Like `Order`, the type key is only listed while there are children.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub status: Status,
    pub db_id: Option<u64>,
    pub children: BTreeMap<String, Node>,
}

impl Node {
    pub fn leaf(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: Status::Pending,
            db_id: None,
            children: BTreeMap::new(),
        }
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.insert(child.name.clone(), child);
        self
    }
}

impl Entity for Node {
    fn sub_entities(&self) -> SubEntities {
        let mut sub_entities = SubEntities::new();
        if !self.children.is_empty() {
            sub_entities.insert("children".to_string(), erase_all(&self.children));
        }
        sub_entities
    }

    fn update_sub_entity(
        &self,
        type_key: &str,
        entity_key: &str,
        child: EntityRef,
    ) -> Result<Self, ProcessError> {
        if type_key != "children" || !self.children.contains_key(entity_key) {
            return Err(ProcessError::missing_sub_entity(type_key, entity_key));
        }
        let mut next = self.clone();
        next.children
            .insert(entity_key.to_string(), narrow_entity(&*child)?);
        Ok(next)
    }
}

impl Stateful for Node {
    fn label(&self) -> String {
        format!("Node:{}", self.name)
    }

    fn status(&self) -> Status {
        self.status
    }

    fn with_status(&self, status: Status) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    fn with_synced(&self) -> Self {
        self.clone()
    }

    fn with_db_id(&self, db_id: u64) -> Self {
        Self {
            db_id: Some(db_id),
            ..self.clone()
        }
    }

    fn transition(&self, _action: &Action, params: &ActionParams, to: Status) -> Self {
        let mut next = self.with_status(to);
        if let Some(DropItems(keys)) = params.get::<DropItems>() {
            for key in keys {
                next.children.remove(key);
            }
        }
        next
    }
}
