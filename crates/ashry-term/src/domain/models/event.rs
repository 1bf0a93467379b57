use ashry_client::SyncEvent;
use tui_textarea::Input;

use super::ExecutionOutcome;

#[derive(Debug)]
pub enum Event {
    ExecutionOutcome(ExecutionOutcome),
    Sync(SyncEvent),
    KeyboardCharInput(Input),
    KeyboardCTRLC,
    KeyboardCTRLR,
    KeyboardCTRLT,
    KeyboardPaste(String),
    UIResize,
    UITick,
}
