use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

/// Executable used when none is configured.
pub const DEFAULT_TOOL: &str = "rclone";

/// Wall-clock bound applied to every transfer command.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3600);

/// How to invoke the transfer tool: which executable, which rclone config file,
/// extra flags for copies and the per-command time limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferConfig {
    pub tool: String,
    pub config_path: PathBuf,
    /// Whitespace separated flags appended to every copy command.
    pub flags: String,
    pub timeout: Duration,
}

impl TransferConfig {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            tool: DEFAULT_TOOL.to_string(),
            config_path: config_path.into(),
            flags: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }

    pub fn with_flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = flags.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `--config=<path>` as handed to the tool.
    pub fn config_arg(&self) -> String {
        format!("--config={}", self.config_path.display())
    }

    /// The flags string split on whitespace, one token per flag.
    pub fn flag_tokens(&self) -> impl Iterator<Item = &str> {
        self.flags.split_whitespace()
    }

    pub fn trace_loaded(&self) {
        info!(
            tool = %self.tool,
            config_path = %self.config_path.display(),
            flags = %self.flags,
            timeout_secs = self.timeout.as_secs(),
            "Loaded transfer config"
        );
        debug!(?self, "Transfer config loaded (full debug)");
    }
}
