//! Session controller
//!
//! Owns the read-eval-print loop for one page view. A submitted line is
//! echoed, parsed and dispatched; afterwards a fresh live input is armed no
//! matter how the command ended. The live input does not exist while a
//! command runs, which is what keeps commands from overlapping.

use super::commands::{self, Context};
use super::parser;
use crate::config::SiteConfig;
use crate::content::ContentService;
use crate::render::{History, HistoryView};
use std::cell::{Cell, Ref, RefCell, RefMut};

/// Where the loop is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    Executing,
}

/// Session errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// A line was submitted while a command is still running
    Busy,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy => write!(f, "a command is already running"),
        }
    }
}

impl std::error::Error for SessionError {}

/// One terminal session.
///
/// Methods take `&self` so an `Rc<Session>` can be shared with event
/// handlers; the history is only borrowed between suspension points.
pub struct Session<C> {
    config: SiteConfig,
    content: C,
    history: RefCell<History>,
    state: Cell<SessionState>,
}

impl<C: ContentService> Session<C> {
    pub fn new(config: SiteConfig, content: C) -> Self {
        Self::from_history(config, content, History::new())
    }

    /// Session whose history is mirrored onto `view`
    pub fn with_view(config: SiteConfig, content: C, view: Box<dyn HistoryView>) -> Self {
        Self::from_history(config, content, History::with_view(view))
    }

    fn from_history(config: SiteConfig, content: C, history: History) -> Self {
        Self {
            config,
            content,
            history: RefCell::new(history),
            state: Cell::new(SessionState::AwaitingInput),
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    pub fn history(&self) -> Ref<'_, History> {
        self.history.borrow()
    }

    /// Append access for output produced outside a command (the banner)
    pub(crate) fn history_mut(&self) -> RefMut<'_, History> {
        self.history.borrow_mut()
    }

    /// Arm the live input without running a command
    pub fn arm_input(&self) {
        self.history.borrow_mut().arm_input();
    }

    /// Submit a line typed at the live input
    pub async fn submit(&self, line: &str) -> Result<(), SessionError> {
        if self.state.get() == SessionState::Executing {
            return Err(SessionError::Busy);
        }
        self.run(line).await;
        Ok(())
    }

    /// Run one command line to completion. Failures become a single error
    /// entry; the live input is re-armed on every exit path.
    pub async fn run(&self, line: &str) {
        let _executing = Executing::enter(self);

        #[cfg(all(target_arch = "wasm32", not(test)))]
        crate::console_log!("[session] running: {}", line);

        {
            let mut history = self.history.borrow_mut();
            history.remove_input();
            history.echo(line);
        }

        let command = parser::parse(line);
        let cx = Context::new(&self.config, &self.content, &self.history);
        if let Err(err) = commands::dispatch(&cx, &command).await {
            #[cfg(all(target_arch = "wasm32", not(test)))]
            crate::console_log!("[session] {} failed: {}", command.name, err);

            self.history.borrow_mut().print_error(err.to_string());
        }
    }
}

/// Marks the session busy; re-arms the input when dropped
struct Executing<'a, C: ContentService> {
    session: &'a Session<C>,
}

impl<'a, C: ContentService> Executing<'a, C> {
    fn enter(session: &'a Session<C>) -> Self {
        session.state.set(SessionState::Executing);
        Self { session }
    }
}

impl<C: ContentService> Drop for Executing<'_, C> {
    fn drop(&mut self) {
        if let Ok(mut history) = self.session.history.try_borrow_mut() {
            history.arm_input();
        }
        self.session.state.set(SessionState::AwaitingInput);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{MemoryContent, RemoteItem};
    use crate::render::Entry;
    use futures::executor::block_on;

    fn session() -> Session<MemoryContent> {
        let items = (1..=3)
            .map(|id| RemoteItem {
                id,
                title_html: format!("Item {}", id),
                date_iso: "2024-02-01T00:00:00".into(),
                slug: format!("item-{}", id),
                body_html: String::new(),
                featured_image_url: None,
                category_ids: Vec::new(),
            })
            .collect();
        Session::new(
            SiteConfig::new("https://example.com"),
            MemoryContent::new(items, Vec::new()),
        )
    }

    #[test]
    fn test_run_echoes_then_outputs_then_arms() {
        let s = session();
        block_on(s.run("ls"));
        let history = s.history();
        let entries = history.entries();
        assert_eq!(entries[0], Entry::CommandEcho { text: "ls".into() });
        assert!(entries.len() > 2);
        assert!(entries.last().is_some_and(Entry::is_live_input));
        assert_eq!(s.state(), SessionState::AwaitingInput);
    }

    #[test]
    fn test_failure_is_one_error_entry() {
        let s = session();
        block_on(s.run("cat 9999"));
        let history = s.history();
        let entries = history.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[1],
            Entry::ErrorOutput {
                message: "article not found: 9999".into()
            }
        );
        assert!(entries[2].is_live_input());
    }

    #[test]
    fn test_single_live_input_across_runs() {
        let s = session();
        s.arm_input();
        block_on(s.run("help"));
        block_on(s.run("nope"));
        let history = s.history();
        let live = history.entries().iter().filter(|e| e.is_live_input()).count();
        assert_eq!(live, 1);
        assert!(history.input_active());
    }

    #[test]
    fn test_submit_while_executing_is_busy() {
        let s = session();
        s.state.set(SessionState::Executing);
        assert_eq!(block_on(s.submit("ls")), Err(SessionError::Busy));
        assert!(s.history().is_empty());

        s.state.set(SessionState::AwaitingInput);
        assert_eq!(block_on(s.submit("help")), Ok(()));
        assert_eq!(s.state(), SessionState::AwaitingInput);
    }
}
