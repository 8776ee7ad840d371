//! Explicit snapshot of the facts the focus heuristic depends on
//!
//! The process environment is read once, in [`SessionContext::capture`];
//! everything downstream works on this value.

use serde::Serialize;
use std::collections::HashMap;

use crate::multiplexer::MultiplexerBackend;

/// Operating system the process runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MacOs,
    Linux,
    Windows,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            "windows" => Platform::Windows,
            _ => Platform::Other,
        }
    }

    /// Whether the OS can tell us which application is frontmost
    pub fn has_foreground_query(self) -> bool {
        matches!(self, Platform::MacOs)
    }
}

/// The multiplexer session the process runs inside
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiplexerSession {
    pub backend: MultiplexerBackend,
    pub session_name: Option<String>,
    pub pane_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    pub platform: Platform,
    pub multiplexer: Option<MultiplexerSession>,
}

impl SessionContext {
    /// Capture the current platform and process environment
    pub fn capture() -> Self {
        Self::from_vars(Platform::current(), std::env::vars())
    }

    /// Build a context from explicit environment variables
    pub fn from_vars<I, K, V>(platform: Platform, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !v.is_empty())
            .collect();

        Self {
            platform,
            multiplexer: detect_multiplexer(&vars),
        }
    }

    pub fn in_multiplexer(&self) -> bool {
        self.multiplexer.is_some()
    }
}

fn detect_multiplexer(vars: &HashMap<String, String>) -> Option<MultiplexerSession> {
    let backend = MultiplexerBackend::ALL
        .into_iter()
        .find(|b| b.env_markers().iter().any(|m| vars.contains_key(*m)))?;

    let (session_name, pane_id) = match backend {
        MultiplexerBackend::Zellij => (
            vars.get("ZELLIJ_SESSION_NAME").cloned(),
            vars.get("ZELLIJ_PANE_ID").cloned(),
        ),
        MultiplexerBackend::Tmux => (None, vars.get("TMUX_PANE").cloned()),
    };

    Some(MultiplexerSession {
        backend,
        session_name,
        pane_id,
    })
}
