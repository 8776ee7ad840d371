use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// アプリケーション設定（`~/.config/agent-notify/config.toml`）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// ペインを探すエージェントのコマンド名（pi, claude, codex など）
    pub agent_command: String,
    /// 通知タイトル
    pub title: String,
    /// 通知サブタイトル
    pub subtitle: String,
    /// 通知メッセージ
    pub message: String,
    /// 外部コマンド問い合わせごとのタイムアウト（ミリ秒）
    pub query_timeout_ms: u64,
    /// 最前面アプリの名前/bundle id に含まれていればターミナルとみなす部分文字列
    /// （大文字小文字は区別しない）
    pub terminal_signatures: Vec<String>,
    /// ネイティブ通知コマンド（macOS）
    pub notifier_command: String,
    /// ネイティブ通知コマンドのタイムアウト（ミリ秒）。
    /// 起動が遅くても二重通知にならないよう、問い合わせ用より長くとる
    pub notifier_timeout_ms: u64,
    /// ログレベル (trace, debug, info, warn, error)
    pub log_level: String,
}

pub fn default_terminal_signatures() -> Vec<String> {
    [
        "terminal",
        "iterm",
        "ghostty",
        "wezterm",
        "kitty",
        "alacritty",
        "vscode",
        "code",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            agent_command: "pi".to_string(),
            title: "Pi".to_string(),
            subtitle: "Agent finished".to_string(),
            message: "LLM is done. Waiting for your next input.".to_string(),
            query_timeout_ms: 1_500,
            terminal_signatures: default_terminal_signatures(),
            notifier_command: "terminal-notifier".to_string(),
            notifier_timeout_ms: 10_000,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// デフォルトの場所から読み込み（存在しない場合はデフォルトを作成して保存）
    pub fn load() -> Result<Self> {
        Self::load_or_create(&Self::config_path()?)
    }

    /// `path` から読み込み。ファイルがなければデフォルトを書き出して返す。
    /// パースエラーはそのまま返す
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load_from(path);
        }

        let config = Self::default();
        if let Err(e) = config.save_to(path) {
            tracing::warn!("Failed to save default config: {}", e);
        }
        Ok(config)
    }

    /// 指定パスから読み込み（ファイルが存在しなければエラー）
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// 設定ファイルパスを取得: `~/.config/agent-notify/config.toml`
    pub fn config_path() -> Result<PathBuf> {
        let base_dirs = directories::BaseDirs::new()
            .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))?;
        Ok(base_dirs.home_dir().join(".config/agent-notify/config.toml"))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn notifier_timeout(&self) -> Duration {
        Duration::from_millis(self.notifier_timeout_ms)
    }
}
