//! Configuration management for the terminal client.
//!
//! This module provides centralized configuration handling for the execution
//! and sync endpoints, the language tag, and logging.

mod config;

pub use config::*;
