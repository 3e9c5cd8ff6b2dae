use crate::fetch::{DirFetcher, Fetch, HttpFetcher};
use anyhow::{anyhow, bail, Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix the site is mounted under on GitHub Pages.
pub const PRODUCTION_BASE_PATH: &str = "/oz_weather_scraper";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deployment {
    Production,
    #[default]
    Development,
}

impl Deployment {
    pub fn base_path(self) -> &'static str {
        match self {
            Deployment::Production => PRODUCTION_BASE_PATH,
            Deployment::Development => "",
        }
    }

    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Deployment::Production
        } else {
            Deployment::Development
        }
    }
}

fn default_timezone() -> String {
    crate::DEFAULT_TIMEZONE.name().to_string()
}

fn default_timeout_secs() -> u64 {
    crate::fetch::DEFAULT_TIMEOUT.as_secs()
}

/// Where the JSON assets live and how the civil clock is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Origin of a deployed site, e.g. `https://user.github.io`.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Local static directory to read instead of a server.
    #[serde(default)]
    pub site_dir: Option<PathBuf>,
    #[serde(default)]
    pub deployment: Deployment,
    /// Overrides the deployment's prefix when set.
    #[serde(default)]
    pub base_path: Option<String>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            site_dir: None,
            deployment: Deployment::default(),
            base_path: None,
            timezone: default_timezone(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SiteConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Defaults overlaid with `OZ_WEATHER_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        if let Ok(value) = env::var("OZ_WEATHER_ENV") {
            self.deployment = Deployment::parse(&value);
        }
        if let Ok(value) = env::var("OZ_WEATHER_BASE_URL") {
            self.base_url = Some(value);
        }
        if let Ok(value) = env::var("OZ_WEATHER_SITE_DIR") {
            self.site_dir = Some(PathBuf::from(value));
        }
        if let Ok(value) = env::var("OZ_WEATHER_BASE_PATH") {
            self.base_path = Some(value);
        }
        if let Ok(value) = env::var("OZ_WEATHER_TIMEZONE") {
            self.timezone = value;
        }
    }

    pub fn effective_base_path(&self) -> &str {
        self.base_path
            .as_deref()
            .unwrap_or_else(|| self.deployment.base_path())
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Unknown timezone '{}': {}", self.timezone, e))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the fetcher for whichever source is configured.
    ///
    /// A site directory is read as-is: the build output has no base path
    /// prefix on disk.
    pub fn fetcher(&self) -> Result<Box<dyn Fetch>> {
        match (&self.base_url, &self.site_dir) {
            (Some(_), Some(_)) => bail!("Configure either base_url or site_dir, not both"),
            (Some(url), None) => Ok(Box::new(HttpFetcher::new(
                url,
                self.effective_base_path(),
                self.timeout(),
            )?)),
            (None, Some(dir)) => {
                if !dir.is_dir() {
                    bail!("Site directory not found: {}", dir.display());
                }
                Ok(Box::new(DirFetcher::new(dir)))
            }
            (None, None) => bail!("No site configured. Set base_url or site_dir."),
        }
    }
}
