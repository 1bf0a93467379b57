//! Application layer orchestrating the terminal client.
//!
//! This module handles command-line parsing and the main UI loop, wiring the
//! session controller to the terminal and to the background services.

pub mod cli;
pub mod ui;
