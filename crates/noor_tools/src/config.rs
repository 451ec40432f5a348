#![forbid(unsafe_code)]

use std::env;

use noor_kernel_contracts::ranking::VisibleWindow;

pub const DEFAULT_LEADERBOARD_TOP: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub leaderboard_window: VisibleWindow,
    pub log_filter: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            leaderboard_window: VisibleWindow::Top(DEFAULT_LEADERBOARD_TOP),
            log_filter: "warn".to_string(),
        }
    }
}

impl ToolConfig {
    /// Reads `NOOR_LEADERBOARD_TOP` and `NOOR_LOG`. The store path is resolved by
    /// `FileKvStore::default_local`.
    pub fn from_env() -> Result<Self, String> {
        let mut config = Self::default();
        if let Ok(raw) = env::var("NOOR_LEADERBOARD_TOP") {
            config.leaderboard_window = parse_window(&raw)
                .ok_or_else(|| format!("NOOR_LEADERBOARD_TOP: expected a number or 'all', got '{raw}'"))?;
        }
        if let Ok(filter) = env::var("NOOR_LOG") {
            if !filter.trim().is_empty() {
                config.log_filter = filter;
            }
        }
        Ok(config)
    }
}

/// `all` or `0` shows everything; any other number caps the list.
pub fn parse_window(raw: &str) -> Option<VisibleWindow> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("all") {
        return Some(VisibleWindow::All);
    }
    match raw.parse::<usize>().ok()? {
        0 => Some(VisibleWindow::All),
        k => Some(VisibleWindow::Top(k)),
    }
}
