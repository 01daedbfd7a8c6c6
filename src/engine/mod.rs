// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod adapter;
mod processor;
pub(crate) mod selection;

pub use adapter::{erase, TypeErasedProcessor};
pub use processor::EntityProcessor;
