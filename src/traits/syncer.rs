// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::context::ProcessContext;
use crate::errors::ProcessError;
use crate::traits::{Action, ActionParams};

/// Keeps one concrete entity type consistent with an external system.
///
/// Syncers run at two points:
/// * before validation, when [`need_sync`](Syncer::need_sync) is true; a
///   failure there aborts the whole call.
/// * while acting, when [`has_action`](Syncer::has_action) is true; a failure
///   there is handed to the state machine instead of being returned.
#[async_trait]
pub trait Syncer<E>: Send + Sync {
    fn can_process(&self, entity: &E) -> bool;

    fn need_sync(&self, entity: &E, action: &Action) -> bool;

    async fn sync(&self, ctx: &ProcessContext, entity: &E) -> Result<E, ProcessError>;

    fn has_action(&self, action: &Action) -> bool;

    async fn apply(
        &self,
        ctx: &ProcessContext,
        entity: &E,
        action: &Action,
        params: &ActionParams,
    ) -> Result<E, ProcessError>;
}
