use serde::{Deserialize, Serialize};

/// Engine tuning, constructed by the embedder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum milliseconds between applied pointer samples (one per rendering frame)
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    /// Reserved title marking the archive list
    #[serde(default = "default_archive_title")]
    pub archive_title: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            frame_interval_ms: 16,
            archive_title: "__archived__".to_string(),
        }
    }
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_archive_title() -> String {
    "__archived__".to_string()
}
