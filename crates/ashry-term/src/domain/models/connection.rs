use strum_macros::Display;

/// Where the sync channel is in its lifecycle. `Closed` is terminal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Connecting,
    Open,
    Closed,
}
