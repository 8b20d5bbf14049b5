//! Path management for SoundFlow
//!
//! This module resolves the data directory and the files kept inside it.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Manages all filesystem paths for the application
#[derive(Debug, Clone)]
pub struct Paths {
    /// Data directory path
    data_dir: PathBuf,
}

impl Paths {
    /// Resolve the data directory and make sure it exists
    pub fn new(data_override: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_override {
            Some(path) => path,
            None => directories::ProjectDirs::from("", "", "soundflow")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".soundflow")),
        };

        let paths = Self { data_dir };
        paths.create_directories()?;

        Ok(paths)
    }

    fn create_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir).with_context(|| {
            format!("Failed to create data directory {}", self.data_dir.display())
        })?;
        Ok(())
    }

    /// Get the data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the local storage database path
    pub fn local_db_path(&self) -> PathBuf {
        self.data_dir.join("soundflow.db")
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }
}
