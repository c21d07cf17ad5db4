pub mod settings;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// The directory that was open last, reopened on the next start.
    pub last_directory: Option<PathBuf>,
    pub auto_load_last_directory: bool,
    /// Text placed before the aggregated content.
    pub start_prompt: String,
    /// Text placed after the aggregated content.
    pub end_prompt: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        settings::load_config(None)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            last_directory: None,
            auto_load_last_directory: true,
            start_prompt: String::new(),
            end_prompt: String::new(),
        }
    }
}
