use std::io;

use anyhow::Result;
use ashry_client::SyncEvent;
use crossterm::event::Event as CrosstermEvent;
use crossterm::event::EventStream;
use futures::Stream;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time;
use tui_textarea::Input;
use tui_textarea::Key;

use crate::domain::models::Event;

/// Merges terminal input, internal events and sync events into one stream of
/// [`Event`]s. A source that has ended is no longer polled.
pub struct EventsService<S = EventStream> {
    crossterm_events: S,
    events: mpsc::UnboundedReceiver<Event>,
    sync_events: mpsc::UnboundedReceiver<SyncEvent>,
    events_finished: bool,
    sync_finished: bool,
    crossterm_finished: bool,
}

impl EventsService {
    pub fn new(
        events: mpsc::UnboundedReceiver<Event>,
        sync_events: mpsc::UnboundedReceiver<SyncEvent>,
    ) -> EventsService {
        return EventsService::with_input(EventStream::new(), events, sync_events);
    }
}

impl<S> EventsService<S>
where
    S: Stream<Item = io::Result<CrosstermEvent>> + Unpin,
{
    pub fn with_input(
        crossterm_events: S,
        events: mpsc::UnboundedReceiver<Event>,
        sync_events: mpsc::UnboundedReceiver<SyncEvent>,
    ) -> EventsService<S> {
        return EventsService {
            crossterm_events,
            events,
            sync_events,
            events_finished: false,
            sync_finished: false,
            crossterm_finished: false,
        };
    }

    fn handle_crossterm(&self, event: CrosstermEvent) -> Option<Event> {
        match event {
            CrosstermEvent::Paste(text) => {
                return Some(Event::KeyboardPaste(text));
            }
            CrosstermEvent::Resize(_, _) => {
                return Some(Event::UIResize);
            }
            CrosstermEvent::Key(keyevent) => {
                if keyevent.kind == crossterm::event::KeyEventKind::Release {
                    return None;
                }

                let key = match keyevent.code {
                    crossterm::event::KeyCode::Char(c) => Key::Char(c),
                    crossterm::event::KeyCode::Enter => Key::Enter,
                    crossterm::event::KeyCode::Left => Key::Left,
                    crossterm::event::KeyCode::Right => Key::Right,
                    crossterm::event::KeyCode::Up => Key::Up,
                    crossterm::event::KeyCode::Down => Key::Down,
                    crossterm::event::KeyCode::Home => Key::Home,
                    crossterm::event::KeyCode::End => Key::End,
                    crossterm::event::KeyCode::PageUp => Key::PageUp,
                    crossterm::event::KeyCode::PageDown => Key::PageDown,
                    crossterm::event::KeyCode::Tab => Key::Tab,
                    crossterm::event::KeyCode::Delete => Key::Delete,
                    crossterm::event::KeyCode::F(n) => Key::F(n),
                    crossterm::event::KeyCode::Backspace => Key::Backspace,
                    crossterm::event::KeyCode::Esc => Key::Esc,
                    _ => return None,
                };

                let input = Input {
                    key,
                    ctrl: keyevent
                        .modifiers
                        .contains(crossterm::event::KeyModifiers::CONTROL),
                    alt: keyevent
                        .modifiers
                        .contains(crossterm::event::KeyModifiers::ALT),
                    shift: keyevent
                        .modifiers
                        .contains(crossterm::event::KeyModifiers::SHIFT),
                };

                return Some(map_input(input));
            }
            _ => return None,
        }
    }

    pub async fn next(&mut self) -> Result<Event> {
        loop {
            let evt = tokio::select! {
                event = self.events.recv(), if !self.events_finished => match event {
                    Some(event) => Some(event),
                    None => {
                        self.events_finished = true;
                        None
                    }
                },
                event = self.sync_events.recv(), if !self.sync_finished => match event {
                    Some(event) => Some(Event::Sync(event)),
                    None => {
                        self.sync_finished = true;
                        None
                    }
                },
                event = self.crossterm_events.next(), if !self.crossterm_finished => match event {
                    Some(Ok(input)) => self.handle_crossterm(input),
                    Some(Err(_)) => None,
                    None => {
                        self.crossterm_finished = true;
                        None
                    }
                },
                _ = time::sleep(time::Duration::from_millis(500)) => Some(Event::UITick)
            };

            if let Some(event) = evt {
                return Ok(event);
            }
        }
    }
}

/// Splits the session hotkeys from editor keystrokes.
fn map_input(input: Input) -> Event {
    match input {
        Input {
            key: Key::Char('c'),
            ctrl: true,
            ..
        } => {
            return Event::KeyboardCTRLC;
        }
        Input {
            key: Key::Char('r'),
            ctrl: true,
            ..
        } => {
            return Event::KeyboardCTRLR;
        }
        Input {
            key: Key::Char('t'),
            ctrl: true,
            ..
        } => {
            return Event::KeyboardCTRLT;
        }
        input => {
            return Event::KeyboardCharInput(input);
        }
    }
}
