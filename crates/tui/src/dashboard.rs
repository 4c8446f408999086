//! Dashboard state: the latest snapshot of the shared document plus view state.
//!
//! Kept free of terminal handling so it can be driven directly in tests.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use reframe_core::{LoveLanguage, MessageRecord, Settings, StateDocument, StateStore};
use std::sync::Arc;
use tracing::{error, info};

/// Hidden need assumed when the latest record has none.
pub const DEFAULT_HIDDEN_NEED: &str = "connection";

/// Dashboard screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// Original and reframed text of the latest message.
    #[default]
    Translator,
    /// Conflict gauge and pulse chart.
    Biometrics,
    /// Hidden need, peace offering and micro-date ideas.
    PeaceOffering,
}

impl Tab {
    /// Every tab in display order.
    pub const ALL: [Tab; 3] = [Tab::Translator, Tab::Biometrics, Tab::PeaceOffering];

    /// Tab bar label.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Translator => "The Translator",
            Tab::Biometrics => "Biometrics",
            Tab::PeaceOffering => "Peace Offering",
        }
    }

    /// Position inside [`Tab::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Tab::Translator => 0,
            Tab::Biometrics => 1,
            Tab::PeaceOffering => 2,
        }
    }

    fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn previous(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing beyond redrawing.
    None,
    /// Leave the dashboard.
    Quit,
    /// Ask the analyzer for a micro-date idea.
    GenerateIdea,
}

/// Micro-date suggestion state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Idea {
    /// Request in flight.
    Generating,
    /// Suggestion text returned by the analyzer.
    Ready(String),
}

/// View state of the dashboard over a [`StateStore`].
pub struct Dashboard {
    store: Arc<dyn StateStore>,
    snapshot: StateDocument,
    active_tab: Tab,
    /// Highlighted row while the settings selector is open.
    selector: Option<LoveLanguage>,
    idea: Option<Idea>,
    status: Option<String>,
}

impl Dashboard {
    /// Build from the store's current document.
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        let snapshot = store.read();
        Self {
            store,
            snapshot,
            active_tab: Tab::default(),
            selector: None,
            idea: None,
            status: None,
        }
    }

    /// Re-read the shared document. A new latest message clears the idea.
    pub fn refresh(&mut self) {
        let previous_len = self.snapshot.messages.len();
        self.snapshot = self.store.read();
        if self.snapshot.messages.len() != previous_len {
            self.idea = None;
        }
    }

    /// Last document read from the store.
    pub fn snapshot(&self) -> &StateDocument {
        &self.snapshot
    }

    /// Most recent message, if any.
    pub fn latest(&self) -> Option<&MessageRecord> {
        self.snapshot.latest()
    }

    /// Stored preference.
    pub fn love_language(&self) -> LoveLanguage {
        self.snapshot.love_language()
    }

    /// Currently displayed tab.
    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    /// Highlighted value while the selector is open.
    pub fn selector(&self) -> Option<LoveLanguage> {
        self.selector
    }

    /// Current micro-date suggestion state.
    pub fn idea(&self) -> Option<&Idea> {
        self.idea.as_ref()
    }

    /// Error line shown in the footer.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Arguments for a micro-date request, if there is a message to react to.
    pub fn micro_date_context(&self) -> Option<(LoveLanguage, String)> {
        let latest = self.latest()?;
        let need = if latest.hidden_need.trim().is_empty() {
            DEFAULT_HIDDEN_NEED.to_string()
        } else {
            latest.hidden_need.clone()
        };
        Some((self.love_language(), need))
    }

    /// Mark a suggestion request as in flight.
    pub fn begin_idea(&mut self) {
        self.idea = Some(Idea::Generating);
    }

    /// Show a finished suggestion.
    pub fn set_idea(&mut self, idea: String) {
        self.idea = Some(Idea::Ready(idea));
    }

    /// Persist a new preference if it differs, then refresh immediately.
    pub fn apply_love_language(&mut self, love_language: LoveLanguage) {
        if love_language != self.love_language() {
            match self.store.update_settings(Settings { love_language }) {
                Ok(()) => {
                    info!("love language set to {}", love_language);
                    self.status = None;
                }
                Err(e) => {
                    error!(%e, "failed to save settings");
                    self.status = Some(format!("Could not save settings: {}", e));
                }
            }
        }
        self.refresh();
    }

    /// Apply a key press and report what the event loop should do.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        if let Some(highlighted) = self.selector {
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => self.selector = Some(highlighted.previous()),
                KeyCode::Down | KeyCode::Char('j') => self.selector = Some(highlighted.next()),
                KeyCode::Enter => {
                    self.selector = None;
                    self.apply_love_language(highlighted);
                }
                KeyCode::Esc | KeyCode::Char('s') => self.selector = None,
                KeyCode::Char('q') => return Action::Quit,
                _ => {}
            }
            return Action::None;
        }

        match key.code {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Tab | KeyCode::Right => self.active_tab = self.active_tab.next(),
            KeyCode::BackTab | KeyCode::Left => self.active_tab = self.active_tab.previous(),
            KeyCode::Char('1') => self.active_tab = Tab::Translator,
            KeyCode::Char('2') => self.active_tab = Tab::Biometrics,
            KeyCode::Char('3') => self.active_tab = Tab::PeaceOffering,
            KeyCode::Char('s') => self.selector = Some(self.love_language()),
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('g') if self.latest().is_some() => {
                self.active_tab = Tab::PeaceOffering;
                return Action::GenerateIdea;
            }
            _ => {}
        }
        Action::None
    }
}
