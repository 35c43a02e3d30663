use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::error::{Error, Result};
use crate::session::TestDuration;
use crate::typing_test::SessionConfig;
use crate::word_source::DEFAULT_STREAM_LENGTH;

/// User preferences that survive between runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub duration: TestDuration,
    pub word_count: usize,
    /// Vocabulary file used instead of the built-in word list.
    pub vocabulary: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration: TestDuration::default(),
            word_count: DEFAULT_STREAM_LENGTH,
            vocabulary: None,
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            word_count: cfg.word_count,
            duration: cfg.duration,
        }
    }
}

pub trait ConfigStore {
    /// Stored config, or the defaults when there is none or it cannot be read.
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Config::default(),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "unreadable config, using defaults");
                return Config::default();
            }
        };

        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "invalid config, using defaults");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(|source| Error::Json {
            origin: self.path.display().to_string(),
            source,
        })?;
        fs::write(&self.path, data).map_err(|source| Error::Write {
            path: self.path.clone(),
            source,
        })
    }
}
