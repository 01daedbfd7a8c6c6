// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod processor_config;
mod registry;

pub mod consts;

pub use loader::{
    load_config, Config, ConfigFormat, EngineOptions, LogFormat, LoggingConfig, SelectionPolicy,
};
pub use processor_config::{ProcessorConfig, ProcessorConfigBuilder, Resolver};
pub use registry::ProcessorRegistry;
