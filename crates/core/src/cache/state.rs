use std::fmt;

/// Lifecycle of the cache manager.
///
/// `Uninitialized → Starting → Running → ShuttingDown → Stopped`. A failed
/// start returns to the state it began from; a stopped manager may start again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManagerState {
    #[default]
    Uninitialized,
    Starting,
    Running,
    ShuttingDown,
    Stopped,
}

impl ManagerState {
    /// Returns true if `start()` is accepted from this state.
    pub fn can_start(&self) -> bool {
        matches!(self, ManagerState::Uninitialized | ManagerState::Stopped)
    }

    /// Returns true while a listener may be registered.
    pub fn is_running(&self) -> bool {
        matches!(self, ManagerState::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ManagerState::Uninitialized => "uninitialized",
            ManagerState::Starting => "starting",
            ManagerState::Running => "running",
            ManagerState::ShuttingDown => "shutting down",
            ManagerState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
