//! Pane records parsed from multiplexer layout dumps

/// One pane as reported by the multiplexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneRecord {
    /// Command line the pane was started with (may be empty)
    pub command: String,
    /// Whether this pane currently has focus
    pub focused: bool,
}

impl PaneRecord {
    pub fn new(command: impl Into<String>, focused: bool) -> Self {
        Self {
            command: command.into(),
            focused,
        }
    }

    /// Whether this pane runs `agent`.
    ///
    /// Only the first whitespace-delimited token of the command is considered;
    /// it must be `agent` itself or a path ending in `/agent`.
    pub fn runs(&self, agent: &str) -> bool {
        let program = self.command.split_whitespace().next().unwrap_or("");
        if program.is_empty() || agent.is_empty() {
            return false;
        }
        program == agent
            || program
                .strip_suffix(agent)
                .is_some_and(|prefix| prefix.ends_with('/'))
    }
}

/// Focus of the agent's pane(s) within a layout.
///
/// `None` when no pane runs the agent. Multiple agent panes count as focused
/// if any of them is.
pub fn agent_pane_focus(panes: &[PaneRecord], agent: &str) -> Option<bool> {
    let mut found = false;
    let mut focused = false;

    for pane in panes.iter().filter(|p| p.runs(agent)) {
        found = true;
        focused |= pane.focused;
    }

    found.then_some(focused)
}
