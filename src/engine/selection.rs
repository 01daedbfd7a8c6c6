// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::SelectionPolicy;
use crate::errors::ProcessError;
use crate::observability::messages::processor::{CandidateSelected, CandidatesAmbiguous};
use crate::observability::messages::StructuredLog;

/// Pick the candidate that governs an entity.
///
/// Candidates are tried in configuration order. Under `FirstMatch` the first
/// accepting candidate wins and the rest are not asked. Under `Strict` every
/// candidate is asked and more than one acceptance is an error.
pub(crate) fn select<'a, C, F>(
    candidates: &'a [Arc<C>],
    policy: SelectionPolicy,
    role: &'static str,
    entity_type: &str,
    accepts: F,
) -> Result<Option<&'a Arc<C>>, ProcessError>
where
    C: ?Sized,
    F: Fn(&C) -> bool,
{
    let mut matching = candidates
        .iter()
        .enumerate()
        .filter(|(_, candidate)| accepts(candidate));

    let Some((index, selected)) = matching.next() else {
        return Ok(None);
    };

    if policy == SelectionPolicy::Strict {
        let matches = 1 + matching.count();
        if matches > 1 {
            CandidatesAmbiguous {
                role,
                entity_type,
                matches,
            }
            .log();
            return Err(ProcessError::AmbiguousCandidates {
                role,
                entity_type: entity_type.to_string(),
                matches,
            });
        }
    }

    CandidateSelected {
        role,
        entity_type,
        index,
    }
    .log();

    Ok(Some(selected))
}
