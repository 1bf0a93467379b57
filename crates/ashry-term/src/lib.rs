//! Terminal client for collaborative coding sessions.
//!
//! This crate provides a terminal editor whose contents are mirrored to a sync
//! endpoint over a WebSocket, and which submits the current source to a remote
//! execution server to run it or to check it against the problem's test suite.

pub mod application;
pub mod configuration;
pub mod domain;
pub use application::ui::{destruct_terminal_for_panic, start_loop};
pub use configuration::{Config, ConfigKey};
pub use domain::models::{Action, ConnectionState, Event, ExecutionOutcome, Problem};
pub use domain::services::{Session, SessionProps};
