//! Main TUI application state and logic

use crate::model::Interval;
use crate::session::{LoadState, Resolution, Session, Ticket};
use crate::simulator::SimulatorError;
use crate::source::{SourceError, TraceSource};
use crate::trace::Trace;
use crate::ui::panes::{self, ScrollState, StackRenderData, StatusRenderData, TimelineRenderData};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Longest the loop blocks waiting for input
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Key repeat guard for the play toggle
const SPACE_DEBOUNCE: Duration = Duration::from_millis(200);

type FetchResult = (Ticket, Result<Trace, SourceError>);

/// Reasons the event loop stops early
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Simulator invariant violated: {0}")]
    Simulator(#[from] SimulatorError),
}

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Timeline,
    Stack,
    Step,
}

impl FocusedPane {
    /// Move focus to the next pane (timeline -> stack -> step)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Timeline => FocusedPane::Stack,
            FocusedPane::Stack => FocusedPane::Step,
            FocusedPane::Step => FocusedPane::Timeline,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Timeline => FocusedPane::Step,
            FocusedPane::Stack => FocusedPane::Timeline,
            FocusedPane::Step => FocusedPane::Stack,
        }
    }
}

/// The main application state
pub struct App {
    session: Session,

    /// Where traces come from; shared with in-flight fetch tasks
    source: Arc<dyn TraceSource>,

    /// Input sent with every fetch
    intervals: Arc<[Interval]>,

    runtime: Handle,
    results_tx: UnboundedSender<FetchResult>,
    results_rx: UnboundedReceiver<FetchResult>,

    pub focused_pane: FocusedPane,
    pub timeline_scroll: ScrollState,
    pub stack_scroll: ScrollState,

    pub should_quit: bool,
    pub status_message: String,

    /// Last time space was pressed (for debouncing)
    last_space_press: Option<Instant>,
}

impl App {
    /// `runtime` runs fetches; the event loop itself stays synchronous
    pub fn new(
        session: Session,
        source: Arc<dyn TraceSource>,
        intervals: Vec<Interval>,
        runtime: Handle,
    ) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        App {
            session,
            source,
            intervals: intervals.into(),
            runtime,
            results_tx,
            results_rx,
            focused_pane: FocusedPane::Timeline,
            timeline_scroll: ScrollState::default(),
            stack_scroll: ScrollState::default(),
            should_quit: false,
            status_message: String::from("Ready!"),
            last_space_press: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Fetch a fresh trace, superseding any fetch still in flight
    pub fn request_trace(&mut self) {
        let ticket = self.session.begin_fetch();
        let source = Arc::clone(&self.source);
        let intervals = Arc::clone(&self.intervals);
        let tx = self.results_tx.clone();

        tracing::info!(source = source.name(), count = intervals.len(), "fetching trace");
        self.status_message = format!("Fetching trace from {}...", source.name());

        self.runtime.spawn(async move {
            let result = source.fetch(&intervals).await;
            // Receiver is gone only after the app quit
            let _ = tx.send((ticket, result));
        });
    }

    /// Apply every fetch result that has arrived. Returns whether anything changed.
    ///
    /// A simulator error stops the app: `should_quit` is set and the error is
    /// returned for the caller to report.
    pub fn drain_results(&mut self) -> Result<bool, SimulatorError> {
        let mut changed = false;
        while let Ok((ticket, result)) = self.results_rx.try_recv() {
            let resolution = match self.session.resolve(ticket, result) {
                Ok(resolution) => resolution,
                Err(err) => {
                    self.should_quit = true;
                    self.status_message = format!("Fatal: {err}");
                    return Err(err);
                }
            };
            match resolution {
                Resolution::Applied => {
                    self.status_message = format!(
                        "Loaded {} steps",
                        self.session.engine().total_steps()
                    );
                    self.timeline_scroll = ScrollState::default();
                    self.stack_scroll = ScrollState::default();
                    changed = true;
                }
                Resolution::Failed => {
                    let retryable = matches!(
                        self.session.state(),
                        LoadState::Failed {
                            retryable: true,
                            ..
                        }
                    );
                    self.status_message = if retryable {
                        "Fetch failed, press r to retry".to_string()
                    } else {
                        "Fetch failed; retrying will not help".to_string()
                    };
                    changed = true;
                }
                Resolution::Stale => {}
            }
        }
        Ok(changed)
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        loop {
            self.drain_results()?;

            if self.session.engine_mut().tick(Instant::now()) {
                self.status_message = "Playing...".to_string();
            } else if self.session.engine().is_at_end() && self.status_message == "Playing..." {
                self.status_message = "Playback complete".to_string();
            }

            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            let timeout = self
                .session
                .engine()
                .time_until_tick(Instant::now())
                .map_or(POLL_INTERVAL, |remaining| remaining.min(POLL_INTERVAL));

            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key, Instant::now());
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let pane_area = main_chunks[0];
        let status_area = main_chunks[1];

        match self.session.engine().current_step() {
            Some(step) => {
                let columns = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .split(pane_area);

                // Left column: Timeline (top) | Step detail (bottom)
                let left_rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
                    .split(columns[0]);

                panes::render_timeline_pane(
                    frame,
                    left_rows[0],
                    TimelineRenderData {
                        intervals: &step.data.all_intervals,
                        max_end: step.data.max_end,
                    },
                    self.focused_pane == FocusedPane::Timeline,
                    &mut self.timeline_scroll,
                );

                panes::render_step_pane(
                    frame,
                    left_rows[1],
                    step,
                    self.focused_pane == FocusedPane::Step,
                );

                let caller_chain = step
                    .data
                    .active_call
                    .map(|id| step.data.caller_chain(id))
                    .unwrap_or_default();
                panes::render_stack_pane(
                    frame,
                    columns[1],
                    StackRenderData {
                        frames: &step.data.call_stack,
                        active_call: step.data.active_call,
                        caller_chain: &caller_chain,
                    },
                    self.focused_pane == FocusedPane::Stack,
                    &mut self.stack_scroll,
                );
            }
            None => {
                panes::render_notice_pane(
                    frame,
                    pane_area,
                    self.session.state(),
                    self.source.name(),
                );
            }
        }

        let engine = self.session.engine();
        panes::render_status_bar(
            frame,
            status_area,
            StatusRenderData {
                message: &self.status_message,
                source_name: self.source.name(),
                position: engine.position(),
                total_steps: engine.total_steps(),
                load_state: self.session.state(),
                is_playing: engine.is_playing(),
            },
        );
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.request_trace();
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            _ if !self.session.engine().is_ready() => {
                if matches!(self.session.state(), LoadState::Pending) {
                    self.status_message = "Still loading...".to_string();
                }
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                let n = c.to_digit(10).unwrap_or(1);
                let engine = self.session.engine_mut();
                engine.set_autoplay(false, now);
                let stepped = (0..n).take_while(|_| engine.advance()).count();
                self.status_message = format!("Stepped forward {} step(s)", stepped);
            }
            KeyCode::Left => {
                let engine = self.session.engine_mut();
                engine.set_autoplay(false, now);
                self.status_message = if engine.retreat() {
                    "Stepped backward".to_string()
                } else {
                    "Already at the first step".to_string()
                };
            }
            KeyCode::Right => {
                let engine = self.session.engine_mut();
                engine.set_autoplay(false, now);
                self.status_message = if engine.advance() {
                    "Stepped forward".to_string()
                } else {
                    "Already at the last step".to_string()
                };
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Timeline => self.timeline_scroll.scroll_up(),
                FocusedPane::Stack => self.stack_scroll.scroll_up(),
                FocusedPane::Step => {}
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Timeline => self.timeline_scroll.scroll_down(),
                FocusedPane::Stack => self.stack_scroll.scroll_down(),
                FocusedPane::Step => {}
            },
            KeyCode::Char(' ') => {
                let debounced = self
                    .last_space_press
                    .is_some_and(|last| now.saturating_duration_since(last) < SPACE_DEBOUNCE);
                if !debounced {
                    self.last_space_press = Some(now);
                    self.status_message = if self.session.engine_mut().toggle_autoplay(now) {
                        "Playing...".to_string()
                    } else {
                        "Paused".to_string()
                    };
                }
            }
            KeyCode::Enter => {
                let engine = self.session.engine_mut();
                engine.set_autoplay(false, now);
                engine.jump_to_end();
                self.status_message = "Jumped to end".to_string();
            }
            KeyCode::Backspace => {
                self.session.engine_mut().reset();
                self.status_message = "Jumped to start".to_string();
            }
            _ => {}
        }
    }
}
