use super::{Multiplexer, MultiplexerBackend, PaneRecord};

/// 出力フィールド: 実行中コマンド, ウィンドウ内でアクティブか, セッション内でウィンドウがアクティブか
const PANE_FORMAT: &str = "#{pane_current_command}\t#{pane_active}\t#{window_active}";

/// tmux操作のラッパー（`tmux list-panes -s` でレイアウトを取得）
#[derive(Debug, Clone, Default)]
pub struct TmuxMultiplexer {
    /// `$TMUX_PANE`（自ペインを含むセッションに問い合わせを限定する）
    pane_id: Option<String>,
}

impl TmuxMultiplexer {
    pub fn new(pane_id: Option<String>) -> Self {
        Self { pane_id }
    }
}

impl Multiplexer for TmuxMultiplexer {
    fn backend(&self) -> MultiplexerBackend {
        MultiplexerBackend::Tmux
    }

    fn layout_args(&self) -> Vec<String> {
        let mut args = vec!["list-panes".to_string(), "-s".to_string()];
        if let Some(pane) = &self.pane_id {
            args.push("-t".to_string());
            args.push(pane.clone());
        }
        args.push("-F".to_string());
        args.push(PANE_FORMAT.to_string());
        args
    }

    fn parse_panes(&self, output: &str) -> Vec<PaneRecord> {
        parse_list_panes(output)
    }
}

/// [`PANE_FORMAT`] 形式の `list-panes` 出力をパース
///
/// アクティブウィンドウのアクティブペインだけをフォーカス中とみなす。
/// Zellij 側も同じ条件（フォーカス中タブのフォーカスペイン）で判定する。
pub fn parse_list_panes(output: &str) -> Vec<PaneRecord> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let command = fields.next()?.trim();
            let pane_active = fields.next()? == "1";
            let window_active = fields.next()? == "1";
            if command.is_empty() {
                return None;
            }
            Some(PaneRecord::new(command, pane_active && window_active))
        })
        .collect()
}
