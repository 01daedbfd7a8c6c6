// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Cancellation and deadline context forwarded to every collaborator call.
//!
//! The engine never checks the context itself. It hands the same
//! `ProcessContext` to every state machine, syncer and repository it calls,
//! and those collaborators decide how to honour it (typically by racing their
//! I/O against [`ProcessContext::cancelled`] or by calling
//! [`ProcessContext::ensure_active`] before doing work).

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::errors::ProcessError;

#[derive(Debug, Clone, Default)]
pub struct ProcessContext {
    cancellation_token: CancellationToken,
    deadline: Option<Instant>,
}

impl ProcessContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context driven by an externally owned cancellation token.
    pub fn with_cancellation_token(cancellation_token: CancellationToken) -> Self {
        Self {
            cancellation_token,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Child context: cancelling the parent cancels the child, not the reverse.
    pub fn child(&self) -> Self {
        Self {
            cancellation_token: self.cancellation_token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation_token
    }

    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when no deadline is set.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.deadline
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false)
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn cancelled(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.cancellation_token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.cancellation_token.cancelled().await,
        }
    }

    /// `Cancelled` or `DeadlineExceeded` once the context is no longer live.
    pub fn ensure_active(&self) -> Result<(), ProcessError> {
        if self.is_cancelled() {
            return Err(ProcessError::Cancelled);
        }
        if self.is_expired() {
            return Err(ProcessError::DeadlineExceeded);
        }
        Ok(())
    }
}
