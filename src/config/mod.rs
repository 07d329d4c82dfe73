// ABOUTME: Configuration management module for server settings
// ABOUTME: Environment-driven configuration with typed log levels and defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Configuration management for the Ladle server

/// Environment-based runtime configuration
pub mod environment;

pub use environment::{LogLevel, ServerConfig};
