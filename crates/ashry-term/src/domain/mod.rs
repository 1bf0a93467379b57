//! Core domain logic for the terminal client.
//!
//! This module contains the session controller and the data models that drive
//! the terminal UI, independent of the terminal and network plumbing.

pub mod models;
pub mod services;
