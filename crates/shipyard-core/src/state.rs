//! Release run states.

use std::fmt;

use serde::Serialize;
use tracing::debug;

/// Milestones of a release run, in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunState {
    /// Plugin initialized, nothing resolved yet.
    Init,
    /// Release name known.
    NameResolved,
    /// Latest version and changelog known.
    VersionResolved,
    /// Increment directive resolved.
    IncrementResolved,
    /// Next version resolved and decomposed into the context.
    FinalVersionResolved,
    /// Version applied to every artifact.
    Bumped,
    /// Tag name settled.
    TagResolved,
    /// Release published.
    Released,
    /// Every hook ran.
    Done,
    /// A hook failed; the run stopped.
    Failed,
}

impl RunState {
    /// Returns the state reached after this one, if any.
    #[must_use]
    pub fn successor(self) -> Option<Self> {
        match self {
            Self::Init => Some(Self::NameResolved),
            Self::NameResolved => Some(Self::VersionResolved),
            Self::VersionResolved => Some(Self::IncrementResolved),
            Self::IncrementResolved => Some(Self::FinalVersionResolved),
            Self::FinalVersionResolved => Some(Self::Bumped),
            Self::Bumped => Some(Self::TagResolved),
            Self::TagResolved => Some(Self::Released),
            Self::Released => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    /// Returns true for `Done` and `Failed`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns the kebab-case name of the state.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::NameResolved => "name-resolved",
            Self::VersionResolved => "version-resolved",
            Self::IncrementResolved => "increment-resolved",
            Self::FinalVersionResolved => "final-version-resolved",
            Self::Bumped => "bumped",
            Self::TagResolved => "tag-resolved",
            Self::Released => "released",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the states one run passes through.
#[derive(Debug, Clone)]
pub struct StateTracker {
    current: RunState,
    last_good: RunState,
    history: Vec<RunState>,
}

impl StateTracker {
    /// Starts tracking at `Init`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: RunState::Init,
            last_good: RunState::Init,
            history: vec![RunState::Init],
        }
    }

    /// Moves to the successor of the current state.
    ///
    /// Terminal states stay where they are.
    pub fn advance(&mut self) -> RunState {
        if let Some(next) = self.current.successor() {
            debug!(from = %self.current, to = %next, "run state");
            self.current = next;
            self.last_good = next;
            self.history.push(next);
        }
        self.current
    }

    /// Moves to `Failed` and returns the last state reached before it.
    ///
    /// A run that already ended keeps its terminal state.
    pub fn fail(&mut self) -> RunState {
        if !self.current.is_terminal() {
            debug!(from = %self.current, "run failed");
            self.current = RunState::Failed;
            self.history.push(RunState::Failed);
        }
        self.last_good
    }

    /// Returns the current state.
    #[must_use]
    pub fn current(&self) -> RunState {
        self.current
    }

    /// Returns every state reached, in order.
    #[must_use]
    pub fn history(&self) -> &[RunState] {
        &self.history
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}
