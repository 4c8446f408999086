//! Dashboard application: terminal lifecycle and the refresh loop.

use crate::dashboard::{Action, Dashboard};
use crate::error::{Result, TuiError};
use crate::events::{Event, EventHandler};
use crate::TuiConfig;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use reframe_api::Analyzer;
use reframe_core::StateStore;
use std::io;
use std::sync::Arc;
use tracing::info;

/// Dashboard application.
pub struct App {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    event_handler: EventHandler,
    dashboard: Dashboard,
    analyzer: Analyzer,
    /// Drives the analyzer's async calls from the synchronous loop.
    runtime: tokio::runtime::Runtime,
    running: bool,
}

impl App {
    /// Set up the terminal and start polling.
    pub fn new(config: TuiConfig, store: Arc<dyn StateStore>, analyzer: Analyzer) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TuiError::Internal(e.to_string()))?;

        enable_raw_mode().map_err(|e| TuiError::TerminalInit(e.to_string()))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| TuiError::TerminalInit(e.to_string()))?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).map_err(|e| TuiError::TerminalInit(e.to_string()))?;

        let event_handler = EventHandler::spawn(config.poll_interval);

        Ok(Self {
            terminal,
            event_handler,
            dashboard: Dashboard::new(store),
            analyzer,
            runtime,
            running: true,
        })
    }

    /// Run until the user quits.
    pub fn run(&mut self) -> Result<()> {
        info!("dashboard started");
        while self.running {
            self.draw()?;

            match self.event_handler.next()? {
                Event::Tick => self.dashboard.refresh(),
                Event::Key(key) => match self.dashboard.handle_key(key) {
                    Action::Quit => self.running = false,
                    Action::GenerateIdea => self.generate_idea()?,
                    Action::None => {}
                },
                Event::Resize(_, _) => {}
            }
        }
        info!("dashboard stopped");
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let dashboard = &self.dashboard;
        self.terminal
            .draw(|frame| crate::ui::render(frame, dashboard))
            .map_err(|e| TuiError::Render(e.to_string()))?;
        Ok(())
    }

    /// Blocks the loop until the analyzer answers.
    fn generate_idea(&mut self) -> Result<()> {
        let Some((love_language, need)) = self.dashboard.micro_date_context() else {
            return Ok(());
        };
        self.dashboard.begin_idea();
        self.draw()?;

        let idea = self
            .runtime
            .block_on(self.analyzer.micro_date(love_language, &need));
        self.dashboard.set_idea(idea);
        Ok(())
    }

    /// Restore the terminal.
    pub fn shutdown(&mut self) -> Result<()> {
        disable_raw_mode().map_err(|e| TuiError::TerminalInit(e.to_string()))?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| TuiError::TerminalInit(e.to_string()))?;
        self.terminal
            .show_cursor()
            .map_err(|e| TuiError::TerminalInit(e.to_string()))?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
