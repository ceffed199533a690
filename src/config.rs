use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "workbench.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Largest row count that is still loaded in full and handled in memory.
    pub client_mode_threshold: usize,
    pub page_sizes: Vec<usize>,
    pub default_page_size: usize,
    /// When set, an active search or filter always queries the backend page
    /// by page, even for small data sets.
    pub criteria_force_server: bool,
    pub bgc_warning_days: i64,
    pub database_path: Option<PathBuf>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            client_mode_threshold: 500,
            page_sizes: vec![10, 20, 50, 100],
            default_page_size: 20,
            criteria_force_server: false,
            bgc_warning_days: 30,
            database_path: None,
        }
    }
}

impl DirectoryConfig {
    /// Reads the TOML file if it exists, otherwise returns defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config: DirectoryConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        config.validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.page_sizes.retain(|size| *size > 0);
        self.page_sizes.sort_unstable();
        self.page_sizes.dedup();
        if self.page_sizes.is_empty() {
            anyhow::bail!("page_sizes must contain at least one positive size")
        }
        if !self.page_sizes.contains(&self.default_page_size) {
            anyhow::bail!(
                "default_page_size {} is not one of page_sizes {:?}",
                self.default_page_size,
                self.page_sizes
            )
        }
        Ok(self)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "Maestro", "Workbench")
        .ok_or_else(|| anyhow::anyhow!("failed to resolve application directories"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join(CONFIG_FILE_NAME))
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join("workbench.sqlite"))
}

/// Config from the default location plus the database path it resolves to.
pub fn load_app_config() -> Result<(DirectoryConfig, PathBuf)> {
    let config = DirectoryConfig::load(&default_config_path()?)?;
    let db_path = match &config.database_path {
        Some(path) => path.clone(),
        None => default_db_path()?,
    };
    Ok((config, db_path))
}

pub fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_dir = base_data_dir.join("webview2");
    std::fs::create_dir_all(&webview_dir).with_context(|| {
        format!(
            "failed to create webview data dir: {}",
            webview_dir.display()
        )
    })?;
    Ok(webview_dir)
}

pub fn default_webview_data_dir() -> Result<PathBuf> {
    ensure_webview_data_dir(project_dirs()?.data_local_dir())
}
