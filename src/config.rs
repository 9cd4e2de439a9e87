//! Project directory, `config.yaml`, and backend wiring.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adapter::CollectionAdapter;
use crate::demo::DataSource;
use crate::error::{KarrosError, Result};
use crate::prefs::Prefs;
use crate::store::{Backend, RestConfig, RestStore, SqliteStore};

pub const KARROS_DIR: &str = ".karros";
const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Sqlite,
    Rest,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "local" => Ok(BackendKind::Sqlite),
            "rest" | "remote" => Ok(BackendKind::Rest),
            _ => Err(format!("Invalid backend: {}. Use sqlite or rest.", s)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default)]
    pub demo_mode: bool,
    /// Owner recorded on user-scoped rows by the local backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest: Option<RestConfig>,
}

impl Config {
    /// Apply `KARROS_*` overrides. `lookup` is `std::env::var` outside tests.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("KARROS_URL") {
            self.rest.get_or_insert_with(RestConfig::default).url = url;
            self.backend = BackendKind::Rest;
        }
        if let Some(key) = lookup("KARROS_ANON_KEY") {
            self.rest.get_or_insert_with(RestConfig::default).anon_key = key;
        }
        if let Some(token) = lookup("KARROS_ACCESS_TOKEN") {
            self.rest.get_or_insert_with(RestConfig::default).access_token = Some(token);
        }
        if let Some(demo) = lookup("KARROS_DEMO") {
            self.demo_mode = matches!(demo.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
    }
}

/// An initialized project: the directory holding `.karros/` and its config.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Create `.karros/` under `root` and write `config`.
    pub fn init(root: &Path, config: Config) -> Result<Self> {
        let dir = root.join(KARROS_DIR);
        if dir.exists() {
            return Err(KarrosError::AlreadyInitialized);
        }
        fs::create_dir_all(&dir)?;
        let project = Self {
            root: root.to_path_buf(),
            config,
        };
        project.save()?;
        info!(root = %root.display(), "initialized project");
        Ok(project)
    }

    /// Open the project at `root`, applying environment overrides.
    pub fn open(root: &Path) -> Result<Self> {
        let path = root.join(KARROS_DIR).join(CONFIG_FILE);
        if !path.exists() {
            return Err(KarrosError::NotInitialized);
        }
        let mut config: Config = serde_yaml::from_str(&fs::read_to_string(&path)?)?;
        config.apply_overrides(|key| env::var(key).ok());
        debug!(backend = ?config.backend, demo = config.demo_mode, "loaded config");
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    /// Open the nearest project at or above the working directory.
    pub fn discover() -> Result<Self> {
        Self::open(&find_project_root())
    }

    pub fn save(&self) -> Result<()> {
        let yaml = serde_yaml::to_string(&self.config)?;
        fs::write(self.dir().join(CONFIG_FILE), yaml)?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self) -> PathBuf {
        self.root.join(KARROS_DIR)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn prefs(&self) -> Prefs {
        Prefs::open(&self.dir())
    }

    /// Build the configured backend.
    pub fn backend(&self) -> Result<Backend> {
        match self.config.backend {
            BackendKind::Sqlite => {
                let store = SqliteStore::open(&self.dir(), self.config.user_id.clone())?;
                Ok(Backend::from_store(Arc::new(store)))
            }
            BackendKind::Rest => {
                let rest = self
                    .config
                    .rest
                    .clone()
                    .filter(|r| !r.url.is_empty() && !r.anon_key.is_empty())
                    .ok_or_else(|| {
                        KarrosError::Config("rest backend needs url and anon_key".to_string())
                    })?;
                Ok(Backend::from_store(Arc::new(RestStore::new(rest)?)))
            }
        }
    }

    /// A data source over the configured backend, in demo mode when the
    /// config or `force_demo` asks for it.
    pub fn data_source(&self, force_demo: bool) -> Result<DataSource> {
        let source = DataSource::live(CollectionAdapter::new(self.backend()?));
        source.set_demo(force_demo || self.config.demo_mode)?;
        Ok(source)
    }
}

/// Find the project root by looking for .karros/ or .git/
pub fn find_project_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        if current.join(KARROS_DIR).exists() || current.join(".git").exists() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd,
        }
    }
}
