// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test fixtures (only available in test builds):
//! * Entities: `Order` holding `LineItem`s and `Payment`s
//! * Collaborators that record every call into a shared [`CallLog`]

mod collaborators;
mod entities;

pub use collaborators::*;
pub use entities::*;
