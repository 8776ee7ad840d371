pub mod layout;
pub mod tmux;
pub mod zellij;

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::context::MultiplexerSession;
use crate::runner::{CommandRunner, QueryError};

pub use layout::{agent_pane_focus, PaneRecord};
pub use tmux::TmuxMultiplexer;
pub use zellij::ZellijMultiplexer;

/// マルチプレクサバックエンドの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiplexerBackend {
    Zellij,
    Tmux,
}

impl MultiplexerBackend {
    /// 複数のマーカーがある場合の検出順
    pub const ALL: [MultiplexerBackend; 2] = [MultiplexerBackend::Zellij, MultiplexerBackend::Tmux];

    /// マルチプレクサがペイン内に設定する環境変数
    pub fn env_markers(self) -> &'static [&'static str] {
        match self {
            MultiplexerBackend::Zellij => &["ZELLIJ", "ZELLIJ_SESSION_NAME", "ZELLIJ_PANE_ID"],
            MultiplexerBackend::Tmux => &["TMUX", "TMUX_PANE"],
        }
    }

    pub fn program(self) -> &'static str {
        match self {
            MultiplexerBackend::Zellij => "zellij",
            MultiplexerBackend::Tmux => "tmux",
        }
    }
}

/// マルチプレクサの共通インターフェース
///
/// ペインのレイアウトを取得し、フォーカス判定用の `PaneRecord` に変換する。
#[async_trait]
pub trait Multiplexer: Send + Sync {
    fn backend(&self) -> MultiplexerBackend;

    /// ペインレイアウトを出力させるための引数
    fn layout_args(&self) -> Vec<String>;

    /// レイアウト出力をペイン一覧にパース
    fn parse_panes(&self, output: &str) -> Vec<PaneRecord>;

    /// 現在のセッションのペインレイアウトを取得してパース
    async fn query_panes(
        &self,
        runner: &dyn CommandRunner,
        timeout: Duration,
    ) -> Result<Vec<PaneRecord>, QueryError> {
        let output = runner
            .run(self.backend().program(), &self.layout_args(), timeout)
            .await?;
        Ok(self.parse_panes(&output))
    }
}

/// 検出したセッションから適切な Multiplexer バックエンドを生成
pub fn create_multiplexer(session: &MultiplexerSession) -> Box<dyn Multiplexer> {
    match session.backend {
        MultiplexerBackend::Zellij => {
            Box::new(ZellijMultiplexer::new(session.session_name.clone()))
        }
        MultiplexerBackend::Tmux => Box::new(TmuxMultiplexer::new(session.pane_id.clone())),
    }
}
