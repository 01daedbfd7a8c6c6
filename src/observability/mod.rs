// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every diagnostic event the engine emits is a message struct with a
//! `Display` implementation and a [`StructuredLog`](messages::StructuredLog)
//! implementation that picks the level and the structured fields. This keeps
//! log wording out of the engine code and makes every event greppable by type.
//!
//! # Usage
//!
//! ```rust
//! use the_canopy::observability::messages::StructuredLog;
//! use the_canopy::observability::messages::processor::ProcessStarted;
//!
//! let msg = ProcessStarted {
//!     entity_type: "Order",
//!     action: "approve",
//! };
//!
//! msg.log();
//! ```
//!
//! Installing a subscriber is left to the application;
//! [`init_tracing`] wires one up from a [`LoggingConfig`](crate::config::LoggingConfig).

pub mod messages;
mod subscriber;

pub use subscriber::init_tracing;
