//! Focus detection: is the user looking at the agent's pane right now?
//!
//! The answer decides whether a "task finished" notification is worth
//! sending. Every query that fails or is inconclusive resolves towards
//! notifying; a missed notification is worse than a redundant one.

use std::time::Duration;
use tracing::{debug, info};

use crate::app::Config;
use crate::context::{MultiplexerSession, SessionContext};
use crate::multiplexer::{agent_pane_focus, create_multiplexer};
use crate::runner::CommandRunner;

/// AppleScript returning `"<name>, <bundle id>"` of the frontmost application
pub const FRONTMOST_SCRIPT: &str = "tell application \"System Events\" to return \
{name of first application process whose frontmost is true, \
bundle identifier of first application process whose frontmost is true}";

/// The application currently receiving keyboard focus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmostApp {
    pub name: String,
    pub bundle_id: String,
}

impl FrontmostApp {
    /// Parse osascript output such as `iTerm2, com.googlecode.iterm2`
    pub fn parse(output: &str) -> Option<Self> {
        let mut parts = output.split(',').map(str::trim);
        let name = parts.next().unwrap_or_default().to_string();
        let bundle_id = parts.next().unwrap_or_default().to_string();

        if name.is_empty() && bundle_id.is_empty() {
            return None;
        }
        Some(Self { name, bundle_id })
    }

    /// Case-insensitive substring match of name and bundle id against `signatures`
    pub fn is_terminal(&self, signatures: &[String]) -> bool {
        let haystack = format!("{} {}", self.name, self.bundle_id).to_lowercase();
        signatures
            .iter()
            .filter(|s| !s.is_empty())
            .any(|s| haystack.contains(&s.to_lowercase()))
    }
}

/// Outcome of focus detection, with the reason behind it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The OS offers no reliable foreground query
    NoForegroundQuery,
    /// The frontmost app could not be determined
    ForegroundUnknown,
    /// Some other application is frontmost
    TerminalInBackground { app: String },
    /// Terminal frontmost, no multiplexer involved
    TerminalFocused,
    /// Multiplexer layout unavailable or without an agent pane
    PaneUnknown,
    /// Terminal frontmost, but another pane has focus
    PaneInBackground,
    /// Terminal frontmost and the agent pane has focus
    PaneFocused,
}

impl Verdict {
    pub fn should_notify(&self) -> bool {
        !matches!(self, Verdict::TerminalFocused | Verdict::PaneFocused)
    }
}

/// Decides whether the user is away from the agent's terminal
pub struct FocusResolver<'a> {
    runner: &'a dyn CommandRunner,
    agent_command: String,
    terminal_signatures: Vec<String>,
    timeout: Duration,
}

impl<'a> FocusResolver<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &Config) -> Self {
        Self {
            runner,
            agent_command: config.agent_command.clone(),
            terminal_signatures: config.terminal_signatures.clone(),
            timeout: config.query_timeout(),
        }
    }

    pub async fn should_notify(&self, ctx: &SessionContext) -> bool {
        self.resolve(ctx).await.should_notify()
    }

    pub async fn resolve(&self, ctx: &SessionContext) -> Verdict {
        let verdict = self.evaluate(ctx).await;
        info!(
            "Focus verdict: {:?} (notify: {})",
            verdict,
            verdict.should_notify()
        );
        verdict
    }

    async fn evaluate(&self, ctx: &SessionContext) -> Verdict {
        if !ctx.platform.has_foreground_query() {
            return Verdict::NoForegroundQuery;
        }

        let Some(app) = self.frontmost_app().await else {
            return Verdict::ForegroundUnknown;
        };

        if !app.is_terminal(&self.terminal_signatures) {
            return Verdict::TerminalInBackground { app: app.name };
        }

        match &ctx.multiplexer {
            None => Verdict::TerminalFocused,
            Some(session) => match self.agent_pane_focused(session).await {
                None => Verdict::PaneUnknown,
                Some(true) => Verdict::PaneFocused,
                Some(false) => Verdict::PaneInBackground,
            },
        }
    }

    async fn frontmost_app(&self) -> Option<FrontmostApp> {
        let args = ["-e".to_string(), FRONTMOST_SCRIPT.to_string()];
        let output = self
            .runner
            .run("osascript", &args, self.timeout)
            .await
            .map_err(|e| e.log())
            .ok()?;

        let app = FrontmostApp::parse(&output);
        debug!("Frontmost application: {:?}", app);
        app
    }

    async fn agent_pane_focused(&self, session: &MultiplexerSession) -> Option<bool> {
        let multiplexer = create_multiplexer(session);
        let panes = multiplexer
            .query_panes(self.runner, self.timeout)
            .await
            .map_err(|e| e.log())
            .ok()?;

        debug!(
            "{:?} reported {} panes: {:?}",
            multiplexer.backend(),
            panes.len(),
            panes
        );
        agent_pane_focus(&panes, &self.agent_command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Platform;
    use crate::runner::testing::ScriptedRunner;

    const ZELLIJ_ENV: [(&str, &str); 1] = [("ZELLIJ", "0")];
    const NO_ENV: [(&str, &str); 0] = [];

    fn macos(vars: &[(&str, &str)]) -> SessionContext {
        SessionContext::from_vars(Platform::MacOs, vars.iter().copied())
    }

    async fn should_notify(runner: &ScriptedRunner, ctx: &SessionContext) -> bool {
        FocusResolver::new(runner, &Config::default())
            .should_notify(ctx)
            .await
    }

    #[test]
    fn test_parse_frontmost() {
        let app = FrontmostApp::parse("iTerm2, com.googlecode.iterm2\n").unwrap();
        assert_eq!(app.name, "iTerm2");
        assert_eq!(app.bundle_id, "com.googlecode.iterm2");
        assert!(FrontmostApp::parse(" \n").is_none());
    }

    #[test]
    fn test_is_terminal() {
        let signatures = crate::app::config::default_terminal_signatures();
        let ghostty = FrontmostApp::parse("Ghostty, com.mitchellh.ghostty").unwrap();
        let safari = FrontmostApp::parse("Safari, com.apple.Safari").unwrap();
        let vscode = FrontmostApp::parse("Electron, com.microsoft.VSCode").unwrap();
        assert!(ghostty.is_terminal(&signatures));
        assert!(vscode.is_terminal(&signatures));
        assert!(!safari.is_terminal(&signatures));
        assert!(!ghostty.is_terminal(&[]));
    }

    #[tokio::test]
    async fn test_non_macos_always_notifies_without_queries() {
        let runner = ScriptedRunner::new().ok("osascript", "iTerm2, com.googlecode.iterm2");
        for platform in [Platform::Linux, Platform::Windows, Platform::Other] {
            let ctx = SessionContext::from_vars(platform, ZELLIJ_ENV);
            assert!(should_notify(&runner, &ctx).await);
        }
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_other_app_frontmost_notifies() {
        let runner = ScriptedRunner::new().ok("osascript", "Safari, com.apple.Safari");
        assert!(should_notify(&runner, &macos(&NO_ENV)).await);
        assert!(should_notify(&runner, &macos(&ZELLIJ_ENV)).await);
        assert_eq!(runner.programs(), vec!["osascript", "osascript"]);
    }

    #[tokio::test]
    async fn test_iterm_without_multiplexer_suppresses() {
        let runner = ScriptedRunner::new().ok("osascript", "iTerm2, com.googlecode.iterm2\n");
        assert!(!should_notify(&runner, &macos(&NO_ENV)).await);
    }

    #[tokio::test]
    async fn test_foreground_query_failure_notifies() {
        let missing = ScriptedRunner::new().not_found("osascript");
        assert!(should_notify(&missing, &macos(&NO_ENV)).await);

        let failing = ScriptedRunner::new().failing("osascript");
        assert!(should_notify(&failing, &macos(&NO_ENV)).await);

        let empty = ScriptedRunner::new().ok("osascript", "");
        assert!(should_notify(&empty, &macos(&NO_ENV)).await);
    }

    #[tokio::test]
    async fn test_focused_agent_pane_suppresses() {
        let runner = ScriptedRunner::new()
            .ok("osascript", "Ghostty, com.mitchellh.ghostty")
            .ok(
                "zellij",
                "tab name=\"main\" focus=true {\n    pane command=\"pi\" focus=true\n    pane command=\"zsh\"\n}\n",
            );
        assert!(!should_notify(&runner, &macos(&ZELLIJ_ENV)).await);
        assert_eq!(runner.programs(), vec!["osascript", "zellij"]);
    }

    #[tokio::test]
    async fn test_unfocused_agent_pane_notifies() {
        let runner = ScriptedRunner::new()
            .ok("osascript", "Ghostty, com.mitchellh.ghostty")
            .ok("zellij", "pane command=\"pi\"\npane command=\"zsh\" focus=true\n");
        assert!(should_notify(&runner, &macos(&ZELLIJ_ENV)).await);
    }

    #[tokio::test]
    async fn test_agent_pane_without_any_focus_marker_notifies() {
        let runner = ScriptedRunner::new()
            .ok("osascript", "Ghostty, com.mitchellh.ghostty")
            .ok("zellij", "layout {\n    pane command=\"pi\" {\n    }\n}\n");
        let verdict = FocusResolver::new(&runner, &Config::default())
            .resolve(&macos(&ZELLIJ_ENV))
            .await;
        assert_eq!(verdict, Verdict::PaneInBackground);
        assert!(verdict.should_notify());
    }

    #[tokio::test]
    async fn test_queries_use_configured_timeout() {
        let runner = ScriptedRunner::new()
            .ok("osascript", "Ghostty, com.mitchellh.ghostty")
            .ok("zellij", "pane command=\"pi\" focus=true\n");
        let config = Config {
            query_timeout_ms: 750,
            ..Config::default()
        };
        FocusResolver::new(&runner, &config)
            .should_notify(&macos(&ZELLIJ_ENV))
            .await;

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls
            .iter()
            .all(|c| c.timeout == Duration::from_millis(750)));
    }

    #[tokio::test]
    async fn test_no_agent_pane_notifies() {
        let runner = ScriptedRunner::new()
            .ok("osascript", "Ghostty, com.mitchellh.ghostty")
            .ok("zellij", "pane command=\"nvim\" focus=true\npane command=\"zsh\"\n");
        assert!(should_notify(&runner, &macos(&ZELLIJ_ENV)).await);
    }

    #[tokio::test]
    async fn test_layout_query_failure_notifies() {
        let runner = ScriptedRunner::new()
            .ok("osascript", "Ghostty, com.mitchellh.ghostty")
            .not_found("zellij");
        assert!(should_notify(&runner, &macos(&ZELLIJ_ENV)).await);
    }

    #[tokio::test]
    async fn test_any_focused_agent_pane_suppresses() {
        let runner = ScriptedRunner::new()
            .ok("osascript", "kitty, net.kovidgoyal.kitty")
            .ok(
                "zellij",
                "pane command=\"pi\"\npane command=\"/usr/local/bin/pi --resume\" focus=true\n",
            );
        assert!(!should_notify(&runner, &macos(&ZELLIJ_ENV)).await);
    }

    #[tokio::test]
    async fn test_tmux_session() {
        let env = [("TMUX", "/tmp/tmux-501/default,42,0"), ("TMUX_PANE", "%1")];
        let focused = ScriptedRunner::new()
            .ok("osascript", "Terminal, com.apple.Terminal")
            .ok("tmux", "zsh\t0\t1\npi\t1\t1\n");
        assert!(!should_notify(&focused, &macos(&env)).await);

        let background = ScriptedRunner::new()
            .ok("osascript", "Terminal, com.apple.Terminal")
            .ok("tmux", "zsh\t1\t1\npi\t1\t0\n");
        assert!(should_notify(&background, &macos(&env)).await);
    }

    #[tokio::test]
    async fn test_custom_agent_command() {
        let runner = ScriptedRunner::new()
            .ok("osascript", "WezTerm, com.github.wez.wezterm")
            .ok("zellij", "pane command=\"claude\" focus=true\n");
        let config = Config {
            agent_command: "claude".to_string(),
            ..Config::default()
        };
        let verdict = FocusResolver::new(&runner, &config)
            .resolve(&macos(&ZELLIJ_ENV))
            .await;
        assert_eq!(verdict, Verdict::PaneFocused);
    }
}
