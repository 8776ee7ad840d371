use super::{Multiplexer, MultiplexerBackend, PaneRecord};

const COMMAND_MARKER: &str = "command=\"";
const FOCUS_MARKER: &str = "focus=true";

/// Zellij操作のラッパー（`zellij action dump-layout` でレイアウトを取得）
#[derive(Debug, Clone, Default)]
pub struct ZellijMultiplexer {
    session_name: Option<String>,
}

impl ZellijMultiplexer {
    pub fn new(session_name: Option<String>) -> Self {
        Self { session_name }
    }
}

impl Multiplexer for ZellijMultiplexer {
    fn backend(&self) -> MultiplexerBackend {
        MultiplexerBackend::Zellij
    }

    fn layout_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(session) = &self.session_name {
            args.push("--session".to_string());
            args.push(session.clone());
        }
        args.push("action".to_string());
        args.push("dump-layout".to_string());
        args
    }

    fn parse_panes(&self, output: &str) -> Vec<PaneRecord> {
        parse_layout(output)
    }
}

/// KDL のレイアウトダンプを行単位でパース
///
/// 空でない `command="..."` を持つ行だけがペインになる。ペインがフォーカス中とみなされるのは、
/// 同じ行に `focus=true` があり、かつ所属する `tab` ブロックもフォーカス中のとき。
/// dump-layout は非アクティブなタブにもタブ内のフォーカスペインを記録するため、
/// tmux の「アクティブウィンドウのアクティブペイン」と同じ条件になるようタブで絞り込む。
/// `tab` ブロック外のペインは行の `focus=true` だけで判定する。
pub fn parse_layout(layout: &str) -> Vec<PaneRecord> {
    let mut panes = Vec::new();
    let mut depth = 0usize;
    // (tab ブロック開始時の深さ, タブがフォーカス中か)
    let mut tab: Option<(usize, bool)> = None;

    for line in layout.lines() {
        if is_tab_line(line) {
            tab = Some((depth, line.contains(FOCUS_MARKER)));
        }

        if let Some(command) = extract_command(line) {
            let tab_focused = tab.map_or(true, |(_, focused)| focused);
            panes.push(PaneRecord::new(
                command.trim(),
                tab_focused && line.contains(FOCUS_MARKER),
            ));
        }

        depth = track_braces(depth, line);
        if tab.is_some_and(|(start, _)| depth <= start) {
            tab = None;
        }
    }

    panes
}

fn is_tab_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed == "tab" || trimmed.starts_with("tab ") || trimmed.starts_with("tab{")
}

/// 文字列リテラル外の `{` / `}` で深さを更新
fn track_braces(mut depth: usize, line: &str) -> usize {
    let mut in_string = false;
    let mut escaped = false;

    for c in line.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depth
}

fn extract_command(line: &str) -> Option<&str> {
    let start = line.find(COMMAND_MARKER)? + COMMAND_MARKER.len();
    let rest = &line[start..];
    let end = rest.find('"')?;
    let command = &rest[..end];
    (!command.is_empty()).then_some(command)
}
