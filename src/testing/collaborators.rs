// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::entities::{Stateful, Status};
use crate::context::ProcessContext;
use crate::errors::ProcessError;
use crate::traits::{Action, ActionParams, Change, Repository, StateMachine, Syncer};

/// Ordered record of every collaborator call, shared across a test tree.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries().iter().any(|e| e == entry)
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.entries().iter().filter(|e| e.starts_with(prefix)).count()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }
}

/// What a state machine does with a forwarded syncer error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnSyncerError {
    MarkFailed,
    Ignore,
    Reject,
}

/// Table-driven state machine shared by every fixture entity.
///
/// Default rules: approve Pending->Approved, ship Approved->Shipped,
/// cancel Pending|Approved->Cancelled, add_item / remove_item Pending->Pending.
pub struct ScriptedStateMachine<E> {
    name: &'static str,
    log: CallLog,
    only_status: Option<Status>,
    rules: Vec<(&'static str, Status, Status)>,
    reject_all: bool,
    apply_fails: bool,
    checks_context: bool,
    on_syncer_error: OnSyncerError,
    _entity: PhantomData<fn() -> E>,
}

impl<E> ScriptedStateMachine<E> {
    pub fn new(name: &'static str, log: CallLog) -> Self {
        Self {
            name,
            log,
            only_status: None,
            rules: vec![
                ("approve", Status::Pending, Status::Approved),
                ("ship", Status::Approved, Status::Shipped),
                ("cancel", Status::Pending, Status::Cancelled),
                ("cancel", Status::Approved, Status::Cancelled),
                ("add_item", Status::Pending, Status::Pending),
                ("remove_item", Status::Pending, Status::Pending),
            ],
            reject_all: false,
            apply_fails: false,
            checks_context: false,
            on_syncer_error: OnSyncerError::MarkFailed,
            _entity: PhantomData,
        }
    }

    /// Only govern entities currently in `status`.
    pub fn only_when(mut self, status: Status) -> Self {
        self.only_status = Some(status);
        self
    }

    pub fn rejecting_everything(mut self) -> Self {
        self.reject_all = true;
        self
    }

    pub fn failing_apply(mut self) -> Self {
        self.apply_fails = true;
        self
    }

    /// Fail `validate` with the context's error once it is cancelled or expired.
    pub fn checking_context(mut self) -> Self {
        self.checks_context = true;
        self
    }

    pub fn on_syncer_error(mut self, policy: OnSyncerError) -> Self {
        self.on_syncer_error = policy;
        self
    }

    fn target(&self, action: &Action, from: Status) -> Option<Status> {
        self.rules
            .iter()
            .find(|(name, rule_from, _)| action == name && *rule_from == from)
            .map(|(_, _, to)| *to)
    }
}

#[async_trait]
impl<E: Stateful> StateMachine<E> for ScriptedStateMachine<E> {
    fn can_process(&self, entity: &E) -> bool {
        self.only_status
            .map(|status| entity.status() == status)
            .unwrap_or(true)
    }

    async fn validate(
        &self,
        ctx: &ProcessContext,
        entity: &E,
        action: &Action,
        _params: &ActionParams,
    ) -> Result<(), ProcessError> {
        self.log
            .record(format!("{}.validate:{}", self.name, entity.label()));
        if self.checks_context {
            ctx.ensure_active()?;
        }
        if self.reject_all || self.target(action, entity.status()).is_none() {
            return Err(ProcessError::invalid_state(format!(
                "'{}' not allowed for {} in {:?}",
                action,
                entity.label(),
                entity.status()
            )));
        }
        Ok(())
    }

    async fn apply(
        &self,
        _ctx: &ProcessContext,
        entity: &E,
        action: &Action,
        params: &ActionParams,
        syncer_error: Option<ProcessError>,
    ) -> Result<E, ProcessError> {
        self.log
            .record(format!("{}.apply:{}", self.name, entity.label()));
        if self.apply_fails {
            return Err(ProcessError::invalid_state("transition failed"));
        }
        if let Some(error) = syncer_error {
            match self.on_syncer_error {
                OnSyncerError::MarkFailed => return Ok(entity.with_status(Status::PaymentFailed)),
                OnSyncerError::Reject => {
                    return Err(ProcessError::invalid_state(format!(
                        "rejected after sync failure: {}",
                        error
                    )))
                }
                OnSyncerError::Ignore => {}
            }
        }
        let to = self
            .target(action, entity.status())
            .ok_or_else(|| ProcessError::invalid_state("no transition"))?;
        Ok(entity.transition(action, params, to))
    }
}

/// Syncer recording `sync` and `apply` calls.
pub struct RecordingSyncer<E> {
    name: &'static str,
    log: CallLog,
    need_sync: bool,
    sync_fails: bool,
    actions: Vec<&'static str>,
    action_fails: bool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> RecordingSyncer<E> {
    /// Needs sync for every action, handles no action.
    pub fn new(name: &'static str, log: CallLog) -> Self {
        Self {
            name,
            log,
            need_sync: true,
            sync_fails: false,
            actions: Vec::new(),
            action_fails: false,
            _entity: PhantomData,
        }
    }

    pub fn without_pre_sync(mut self) -> Self {
        self.need_sync = false;
        self
    }

    pub fn failing_sync(mut self) -> Self {
        self.sync_fails = true;
        self
    }

    pub fn handling(mut self, action: &'static str) -> Self {
        self.actions.push(action);
        self
    }

    pub fn failing_action(mut self) -> Self {
        self.action_fails = true;
        self
    }
}

#[async_trait]
impl<E: Stateful> Syncer<E> for RecordingSyncer<E> {
    fn can_process(&self, _entity: &E) -> bool {
        true
    }

    fn need_sync(&self, _entity: &E, _action: &Action) -> bool {
        self.need_sync
    }

    async fn sync(&self, _ctx: &ProcessContext, entity: &E) -> Result<E, ProcessError> {
        self.log.record(format!("{}.sync:{}", self.name, entity.label()));
        if self.sync_fails {
            return Err(ProcessError::external("remote unavailable"));
        }
        Ok(entity.with_synced())
    }

    fn has_action(&self, action: &Action) -> bool {
        self.actions.iter().any(|name| action == name)
    }

    async fn apply(
        &self,
        _ctx: &ProcessContext,
        entity: &E,
        action: &Action,
        _params: &ActionParams,
    ) -> Result<E, ProcessError> {
        self.log
            .record(format!("{}.{}:{}", self.name, action, entity.label()));
        if self.action_fails {
            return Err(ProcessError::external("gateway timeout"));
        }
        Ok(entity.with_synced())
    }
}

/// Repository assigning sequential ids on create.
pub struct RecordingRepository<E> {
    name: &'static str,
    log: CallLog,
    next_id: AtomicU64,
    fails: bool,
    discards: bool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> RecordingRepository<E> {
    pub fn new(name: &'static str, log: CallLog) -> Self {
        Self {
            name,
            log,
            next_id: AtomicU64::new(100),
            fails: false,
            discards: false,
            _entity: PhantomData,
        }
    }

    pub fn failing(mut self) -> Self {
        self.fails = true;
        self
    }

    /// Persist but return `None`.
    pub fn discarding(mut self) -> Self {
        self.discards = true;
        self
    }
}

#[async_trait]
impl<E: Stateful> Repository<E> for RecordingRepository<E> {
    async fn save(
        &self,
        _ctx: &ProcessContext,
        old: Option<&E>,
        new: Option<&E>,
    ) -> Result<Option<E>, ProcessError> {
        let change = Change::classify(old, new).expect("engine never saves (None, None)");
        let label = match change {
            Change::Create(entity) | Change::Delete(entity) => entity.label(),
            Change::Update { new, .. } => new.label(),
        };
        self.log
            .record(format!("{}.save:{}:{}", self.name, change.label(), label));

        if self.fails {
            return Err(ProcessError::external("disk full"));
        }
        if self.discards {
            return Ok(None);
        }

        Ok(match change {
            Change::Create(entity) => {
                Some(entity.with_db_id(self.next_id.fetch_add(1, Ordering::SeqCst)))
            }
            Change::Update { new, .. } => Some(new.clone()),
            Change::Delete(_) => None,
        })
    }
}
