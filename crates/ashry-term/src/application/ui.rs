use std::io;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::EnableBracketedPaste;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::Backend;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;
use ratatui::Frame;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tui_textarea::CursorMove;
use tui_textarea::TextArea;

use ashry_client::SyncEvent;

use crate::domain::models::Action;
use crate::domain::models::ConnectionState;
use crate::domain::models::Event;
use crate::domain::services::events::EventsService;
use crate::domain::services::Session;
use crate::domain::services::SessionProps;

fn new_editor<'a>(text: &str) -> TextArea<'a> {
    let lines = text.split('\n').map(|line| line.to_string()).collect();
    let mut editor = TextArea::new(lines);
    editor.set_block(Block::default().borders(Borders::ALL).title("Editor"));
    editor.set_line_number_style(Style::default().fg(Color::DarkGray));
    editor.set_cursor_line_style(Style::default());

    return editor;
}

/// Rebuilds the editor after an inbound update, keeping the cursor where it
/// was as far as the new text allows.
fn replace_editor<'a>(previous: &TextArea<'a>, text: &str) -> TextArea<'a> {
    let (row, col) = previous.cursor();
    let mut editor = new_editor(text);
    editor.move_cursor(CursorMove::Jump(
        u16::try_from(row).unwrap_or(u16::MAX),
        u16::try_from(col).unwrap_or(u16::MAX),
    ));

    return editor;
}

fn connection_style(state: ConnectionState) -> Style {
    match state {
        ConnectionState::Connecting => Style::default().fg(Color::Yellow),
        ConnectionState::Open => Style::default().fg(Color::Green),
        ConnectionState::Closed => Style::default().fg(Color::Red),
    }
}

fn render(frame: &mut Frame, session: &Session, editor: &TextArea) {
    let problem_height = u16::try_from(session.problem.statement.lines().count())
        .unwrap_or(u16::MAX)
        .saturating_add(2)
        .min(12);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(problem_height),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let header = Paragraph::new(Line::from(vec![
        Span::styled("Ashry", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("   [Ctrl+R] Run Code   [Ctrl+T] Run Tests   [Ctrl+C] Quit   sync: "),
        Span::styled(
            session.connection_state.to_string(),
            connection_style(session.connection_state),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, rows[0]);

    let problem = Paragraph::new(session.problem.statement.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Problem Statement"),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(problem, rows[1]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[2]);

    frame.render_widget(editor, columns[0]);

    let output = Paragraph::new(session.last_output.as_str())
        .block(Block::default().borders(Borders::ALL).title("Output"))
        .wrap(Wrap { trim: false });
    frame.render_widget(output, columns[1]);

    let status = if session.waiting_for_backend {
        "Waiting for the execution server...".to_string()
    } else {
        session.notice.clone().unwrap_or_default()
    };
    frame.render_widget(
        Paragraph::new(status).style(Style::default().fg(Color::DarkGray)),
        rows[3],
    );
}

/// Applies one event to the session and the editor. Returns `false` once the
/// session has ended and the loop should stop.
fn handle_event(
    session: &mut Session,
    editor: &mut TextArea,
    event: Event,
    tx: &mpsc::UnboundedSender<Action>,
) -> Result<bool> {
    match event {
        Event::KeyboardCTRLC => {
            session.end();
            return Ok(false);
        }
        Event::KeyboardCTRLR => {
            tx.send(session.run_code())?;
        }
        Event::KeyboardCTRLT => {
            tx.send(session.run_tests())?;
        }
        Event::KeyboardCharInput(input) => {
            if editor.input(input) {
                session.handle_local_edit(editor.lines().join("\n"));
            }
        }
        Event::KeyboardPaste(text) => {
            if editor.insert_str(text.replace('\r', "")) {
                session.handle_local_edit(editor.lines().join("\n"));
            }
        }
        Event::Sync(sync_event) => {
            if session.handle_sync_event(sync_event) {
                *editor = replace_editor(editor, &session.source_text);
            }
        }
        Event::ExecutionOutcome(outcome) => {
            session.handle_outcome(outcome);
        }
        Event::UIResize | Event::UITick => {}
    }

    return Ok(true);
}

pub async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    session_props: SessionProps,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
    sync_rx: mpsc::UnboundedReceiver<SyncEvent>,
) -> Result<()> {
    let mut session = Session::start(session_props);
    let mut editor = new_editor(&session.source_text);
    let mut events = EventsService::new(rx, sync_rx);

    loop {
        terminal.draw(|frame| render(frame, &session, &editor))?;

        let event = events.next().await?;
        if !handle_event(&mut session, &mut editor, event, &tx)? {
            break;
        }
    }

    return Ok(());
}

/// Sets up the terminal, runs the UI loop, and restores the terminal.
pub async fn start(
    session_props: SessionProps,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
    sync_rx: mpsc::UnboundedReceiver<SyncEvent>,
) -> Result<()> {
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let result = start_loop(&mut terminal, session_props, tx, rx, sync_rx).await;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    return result;
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Problem;
    use ashry_client::SyncTransport;
    use ashry_types::CodeUpdate;
    use ashry_types::Language;
    use ratatui::backend::TestBackend;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::sync::Mutex;
    use tui_textarea::Input;
    use tui_textarea::Key;

    struct NoopTransport;

    impl SyncTransport for NoopTransport {
        fn send(&self, _update: &CodeUpdate) -> Result<()> {
            Ok(())
        }

        fn close(&self) {}
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_render_panels() {
        let mut session = Session::start(SessionProps {
            problem: Problem::default(),
            language: Language::JavaScript,
            connection: Box::new(NoopTransport),
            notice: Some("Execution server is not reachable".to_string()),
        });
        session.handle_sync_event(SyncEvent::Opened);
        session.handle_local_edit("function sumArray(arr) {}".to_string());
        let editor = new_editor(&session.source_text);

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal
            .draw(|frame| render(frame, &session, &editor))
            .unwrap();

        let screen = screen(&terminal);
        assert!(screen.contains("Run Code"));
        assert!(screen.contains("Run Tests"));
        assert!(screen.contains("sync: open"));
        assert!(screen.contains("Problem Statement"));
        assert!(screen.contains("function sumArray(arr) {}"));
        assert!(screen.contains("Execution server is not reachable"));
    }

    #[test]
    fn test_editor_round_trips_trailing_newline() {
        let editor = new_editor("a\nb\n");
        assert_eq!(editor.lines().join("\n"), "a\nb\n");
    }

    #[test]
    fn test_replace_editor_clamps_cursor() {
        let mut editor = new_editor("line one\nline two\nline three");
        editor.move_cursor(CursorMove::Bottom);
        editor.move_cursor(CursorMove::End);

        let replaced = replace_editor(&editor, "short");
        assert_eq!(replaced.lines(), ["short"]);
        assert_eq!(replaced.cursor(), (0, 5));
    }

    #[derive(Clone, Default)]
    struct RecordingTransport {
        sent: Arc<Mutex<Vec<String>>>,
        closes: Arc<AtomicUsize>,
    }

    impl SyncTransport for RecordingTransport {
        fn send(&self, update: &CodeUpdate) -> Result<()> {
            self.sent.lock().unwrap().push(update.code.clone());
            Ok(())
        }

        fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Harness {
        session: Session,
        editor: TextArea<'static>,
        transport: RecordingTransport,
        tx: mpsc::UnboundedSender<Action>,
        rx: mpsc::UnboundedReceiver<Action>,
    }

    impl Harness {
        fn open() -> Harness {
            let transport = RecordingTransport::default();
            let mut session = Session::start(SessionProps {
                problem: Problem::default(),
                language: Language::JavaScript,
                connection: Box::new(transport.clone()),
                notice: None,
            });
            session.handle_sync_event(SyncEvent::Opened);
            let editor = new_editor(&session.source_text);
            let (tx, rx) = mpsc::unbounded_channel();

            Harness {
                session,
                editor,
                transport,
                tx,
                rx,
            }
        }

        fn dispatch(&mut self, event: Event) -> bool {
            handle_event(&mut self.session, &mut self.editor, event, &self.tx).unwrap()
        }
    }

    fn key(c: char) -> Event {
        Event::KeyboardCharInput(Input {
            key: Key::Char(c),
            ctrl: false,
            alt: false,
            shift: false,
        })
    }

    #[test]
    fn test_typing_is_forwarded_as_local_edit() {
        let mut harness = Harness::open();

        assert!(harness.dispatch(key('a')));
        assert!(harness.dispatch(key('b')));

        assert_eq!(harness.session.source_text, "ab");
        assert_eq!(*harness.transport.sent.lock().unwrap(), ["a", "ab"]);
    }

    #[test]
    fn test_paste_is_forwarded_without_carriage_returns() {
        let mut harness = Harness::open();

        assert!(harness.dispatch(Event::KeyboardPaste("let a;\r\nlet b;".to_string())));

        assert_eq!(harness.session.source_text, "let a;\nlet b;");
        assert_eq!(harness.editor.lines(), ["let a;", "let b;"]);
        assert_eq!(*harness.transport.sent.lock().unwrap(), ["let a;\nlet b;"]);
    }

    #[test]
    fn test_inbound_update_replaces_editor() {
        let mut harness = Harness::open();
        harness.dispatch(key('x'));

        assert!(harness.dispatch(Event::Sync(SyncEvent::Message(
            r#"{"code":"remote\ncode"}"#.to_string()
        ))));

        assert_eq!(harness.editor.lines(), ["remote", "code"]);
        assert_eq!(harness.session.source_text, "remote\ncode");
        assert_eq!(harness.transport.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_hotkeys_send_run_and_test_actions() {
        let mut harness = Harness::open();
        harness.dispatch(key('1'));

        assert!(harness.dispatch(Event::KeyboardCTRLR));
        assert!(harness.dispatch(Event::KeyboardCTRLT));

        match harness.rx.try_recv().unwrap() {
            Action::RunCode(ticket) => {
                assert_eq!(ticket.id, 1);
                assert_eq!(ticket.request.code, "1");
            }
            other => panic!("expected run action, got {other:?}"),
        }
        match harness.rx.try_recv().unwrap() {
            Action::RunTests(ticket, suite) => {
                assert_eq!(ticket.id, 2);
                assert_eq!(suite.function_name, "sumArray");
            }
            other => panic!("expected test action, got {other:?}"),
        }
        assert!(harness.session.waiting_for_backend);
    }

    #[test]
    fn test_ctrl_c_ends_session() {
        let mut harness = Harness::open();

        assert!(!harness.dispatch(Event::KeyboardCTRLC));

        assert_eq!(harness.transport.closes.load(Ordering::SeqCst), 1);
        assert_eq!(harness.session.connection_state, ConnectionState::Closed);
    }

    #[test]
    fn test_outcome_updates_output() {
        let mut harness = Harness::open();
        harness.dispatch(Event::KeyboardCTRLR);

        assert!(harness.dispatch(Event::ExecutionOutcome(
            crate::domain::models::ExecutionOutcome {
                id: 1,
                kind: crate::domain::models::RequestKind::Run,
                output: "6".to_string(),
            }
        )));

        assert_eq!(harness.session.last_output, "6");
        assert!(!harness.session.waiting_for_backend);
    }
}
