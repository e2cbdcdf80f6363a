use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chat_core::{update, AppState, Focus, Msg, Overlay};
use chat_engine::{EngineConfig, EngineHandle, ExportOptions, FileKeyValueStore, MarkdownRenderer};
use chat_logging::{chat_info, chat_warn};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;

use super::effects::EffectRunner;
use super::ui::constants::PAGE_SCROLL;
use super::ui::layout::contains;
use super::ui::transcript::TranscriptView;
use super::{config, logging, ui};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// How long to wait for terminal input before checking the engine again.
const POLL_INTERVAL: Duration = Duration::from_millis(75);

pub fn run_app() -> anyhow::Result<()> {
    let (config, warnings) = config::load();
    logging::initialize(
        config.log_destination,
        config.level_filter(),
        &config.log_file,
    );
    for warning in warnings {
        chat_warn!("{}", warning);
    }
    chat_info!("Starting qa_chat base_url={}", config.base_url);

    let engine = EngineHandle::new(EngineConfig {
        client: config.client_settings(),
        health_interval: config.health_interval(),
        store: Box::new(FileKeyValueStore::new(config.storage_dir())),
    })
    .context("starting engine")?;

    let renderer = Arc::new(MarkdownRenderer::new(config.html_policy));
    let export = ExportOptions {
        output_dir: config.export_dir(),
        ..ExportOptions::default()
    };
    let runner = EffectRunner::new(engine, renderer.clone(), export);

    install_panic_hook();
    let mut terminal = setup_terminal().context("initializing terminal")?;
    let mut app = App::new(TranscriptView::new(renderer));
    let result = app.run(&mut terminal, &runner);
    restore_terminal().context("restoring terminal")?;

    runner.shutdown();
    chat_info!("qa_chat exiting");
    result
}

fn setup_terminal() -> anyhow::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal() -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    Ok(())
}

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        default_hook(info);
    }));
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Dispatch(Msg),
    ScrollUp(usize),
    ScrollDown(usize),
    ScrollToBottom,
    Quit,
    Ignore,
}

struct App {
    state: AppState,
    transcript: TranscriptView,
    overlay_rect: Option<Rect>,
    quit: bool,
}

impl App {
    fn new(transcript: TranscriptView) -> Self {
        Self {
            state: AppState::new(),
            transcript,
            overlay_rect: None,
            quit: false,
        }
    }

    fn run(&mut self, terminal: &mut Tui, runner: &EffectRunner) -> anyhow::Result<()> {
        let mut force_redraw = true;
        while !self.quit {
            while let Some(msg) = runner.poll() {
                self.dispatch(msg, runner);
            }

            if self.state.consume_dirty() || force_redraw {
                let view = self.state.view();
                terminal.draw(|frame| {
                    self.overlay_rect = ui::render::draw(frame, &view, &mut self.transcript);
                })?;
                force_redraw = false;
            }

            if !event::poll(POLL_INTERVAL)? {
                continue;
            }
            let action = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => map_key(key, &self.state),
                Event::Mouse(mouse) => map_mouse(mouse, &self.state, self.overlay_rect),
                Event::Paste(text) => map_paste(&text, &self.state),
                Event::Resize(..) => {
                    force_redraw = true;
                    Action::Ignore
                }
                _ => Action::Ignore,
            };
            force_redraw |= self.apply(action, runner);
        }
        Ok(())
    }

    /// Returns true when the action changed something only the UI tracks.
    fn apply(&mut self, action: Action, runner: &EffectRunner) -> bool {
        match action {
            Action::Dispatch(msg) => {
                self.dispatch(msg, runner);
                false
            }
            Action::ScrollUp(rows) => {
                self.transcript.scroll_up(rows);
                true
            }
            Action::ScrollDown(rows) => {
                self.transcript.scroll_down(rows);
                true
            }
            Action::ScrollToBottom => {
                self.transcript.scroll_to_bottom();
                true
            }
            Action::Quit => {
                self.quit = true;
                false
            }
            Action::Ignore => false,
        }
    }

    fn dispatch(&mut self, msg: Msg, runner: &EffectRunner) {
        let mut inbox = VecDeque::from([msg]);
        while let Some(msg) = inbox.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            inbox.extend(runner.enqueue(effects));
        }
    }
}

fn map_key(key: KeyEvent, state: &AppState) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c')) {
        return Action::Quit;
    }

    match state.overlay() {
        Some(Overlay::Error { .. }) => {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter => Action::Dispatch(Msg::ErrorDismissed),
                _ => Action::Ignore,
            };
        }
        Some(Overlay::ConfirmClear) => {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    Action::Dispatch(Msg::ClearConfirmed)
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    Action::Dispatch(Msg::ClearCancelled)
                }
                _ => Action::Ignore,
            };
        }
        None => {}
    }

    if ctrl {
        // Most terminals deliver Ctrl+/ as Ctrl+7.
        return match key.code {
            KeyCode::Char('k') => Action::Dispatch(Msg::ClearRequested),
            KeyCode::Char('/') | KeyCode::Char('7') => Action::Dispatch(Msg::FocusInputRequested),
            KeyCode::Char('s') => Action::Dispatch(Msg::ExportRequested),
            _ => Action::Ignore,
        };
    }

    if key.code == KeyCode::Tab {
        return Action::Dispatch(Msg::FocusToggled);
    }

    match state.focus() {
        Focus::Transcript => match key.code {
            KeyCode::Up => Action::ScrollUp(1),
            KeyCode::Down => Action::ScrollDown(1),
            KeyCode::PageUp => Action::ScrollUp(PAGE_SCROLL),
            KeyCode::PageDown => Action::ScrollDown(PAGE_SCROLL),
            KeyCode::Home => Action::ScrollUp(usize::MAX),
            KeyCode::End => Action::ScrollToBottom,
            KeyCode::Esc => Action::Dispatch(Msg::FocusInputRequested),
            _ => Action::Ignore,
        },
        Focus::Input => map_input_key(key, state.input()),
    }
}

fn map_input_key(key: KeyEvent, input: &str) -> Action {
    let newline = key
        .modifiers
        .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);
    match key.code {
        KeyCode::Enter if newline => Action::Dispatch(Msg::InputChanged(format!("{input}\n"))),
        KeyCode::Enter => Action::Dispatch(Msg::SubmitPressed),
        KeyCode::Char(ch) => Action::Dispatch(Msg::InputChanged(format!("{input}{ch}"))),
        KeyCode::Backspace => {
            let mut text = input.to_string();
            if text.pop().is_some() {
                Action::Dispatch(Msg::InputChanged(text))
            } else {
                Action::Ignore
            }
        }
        KeyCode::PageUp => Action::ScrollUp(PAGE_SCROLL),
        KeyCode::PageDown => Action::ScrollDown(PAGE_SCROLL),
        _ => Action::Ignore,
    }
}

fn map_mouse(mouse: MouseEvent, state: &AppState, overlay_rect: Option<Rect>) -> Action {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => match (state.overlay(), overlay_rect) {
            (Some(Overlay::Error { .. }), Some(rect))
                if !contains(rect, mouse.column, mouse.row) =>
            {
                Action::Dispatch(Msg::ErrorDismissed)
            }
            _ => Action::Ignore,
        },
        MouseEventKind::ScrollUp if state.overlay().is_none() => Action::ScrollUp(3),
        MouseEventKind::ScrollDown if state.overlay().is_none() => Action::ScrollDown(3),
        _ => Action::Ignore,
    }
}

fn map_paste(text: &str, state: &AppState) -> Action {
    if state.overlay().is_some() || state.focus() != Focus::Input {
        return Action::Ignore;
    }
    // Pasted CRLF would otherwise leave stray carriage returns in the query.
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    Action::Dispatch(Msg::InputChanged(format!("{}{text}", state.input())))
}
