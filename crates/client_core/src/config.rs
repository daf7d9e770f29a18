use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use url::Url;

use crate::pagination::DEFAULT_PAGE_SIZE;

pub const DEFAULT_API_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
pub const DEFAULT_CONFIG_FILE: &str = "inventrix.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub page_size: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    page_size: Option<usize>,
}

impl ClientSettings {
    /// Defaults, then the TOML file, then the process environment.
    ///
    /// An explicitly named file must exist; the default `inventrix.toml` is
    /// optional.
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let mut settings = Self::default();

        let (path, required) = match config_path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        match fs::read_to_string(&path) {
            Ok(raw) => settings
                .apply_toml(&raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?,
            Err(error) if required => {
                return Err(error)
                    .with_context(|| format!("failed to read config file '{}'", path.display()));
            }
            Err(_) => {}
        }

        settings.apply_env(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    pub fn apply_toml(&mut self, raw: &str) -> anyhow::Result<()> {
        let file_cfg: FileSettings = toml::from_str(raw)?;
        if let Some(v) = file_cfg.api_base_url {
            self.api_base_url = v;
        }
        if let Some(v) = file_cfg.page_size {
            self.set_page_size(v);
        }
        Ok(())
    }

    /// Applies `INVENTRIX_API_URL`, `APP__API_BASE_URL` and `APP__PAGE_SIZE`
    /// from `lookup`. Unparseable numbers are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("INVENTRIX_API_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = lookup("APP__API_BASE_URL") {
            self.api_base_url = v;
        }

        if let Some(v) = lookup("APP__PAGE_SIZE") {
            if let Ok(parsed) = v.trim().parse::<usize>() {
                self.set_page_size(parsed);
            }
        }
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = if page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
    }

    pub fn validate(&mut self) -> anyhow::Result<()> {
        let trimmed = self.api_base_url.trim().trim_end_matches('/').to_string();
        if trimmed.is_empty() {
            return Err(anyhow!("api base url must not be empty"));
        }
        let parsed = Url::parse(&trimmed)
            .with_context(|| format!("invalid api base url '{trimmed}'"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!(
                "api base url '{trimmed}' must use http or https, got '{}'",
                parsed.scheme()
            ));
        }
        self.api_base_url = trimmed;
        Ok(())
    }
}
