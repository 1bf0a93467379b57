mod action;
mod connection;
mod event;
mod outcome;
mod problem;

pub use action::*;
pub use connection::*;
pub use event::*;
pub use outcome::*;
pub use problem::*;
