//! Site configuration, usually loaded from a `site.toml` file at the root of the website.
//!
//! ## Example
//! ```toml
//! site = "https://example.com"
//!
//! [markdown]
//! theme = "nord"
//! wrap = true
//!
//! [[integrations]]
//! kind = "sitemap"
//! ```
//!
//! Deployment-specific values don't need their own copy of the file, they can be overridden through environment variables:
//! - `VELLUM_SITE_URL`: base URL of the site, an empty value unsets it.
//! - `VELLUM_SITEMAP`: `true` or `false`, adds or removes the sitemap integration.
//! - `VELLUM_THEME`: syntax highlighting theme.
use std::{fs, path::Path};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    content::{MarkdownOptions, Theme},
    errors::ConfigError,
    sitemap::SitemapOptions,
};

pub const SITE_URL_ENV: &str = "VELLUM_SITE_URL";
pub const SITEMAP_ENV: &str = "VELLUM_SITEMAP";
pub const THEME_ENV: &str = "VELLUM_THEME";

/// A build-time plugin, run once every page has been rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Integration {
    /// Emits a sitemap of every page of the site. Requires [`SiteConfig::site`].
    Sitemap(SitemapOptions),
}

/// Settings of the deployed site.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute base URL of the site, e.g. `https://example.com`. Used to generate canonical URLs and the sitemap.
    pub site: Option<String>,
    pub markdown: MarkdownOptions,
    pub integrations: Vec<Integration>,
}

impl SiteConfig {
    /// Parses and validates a configuration.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration at `path`, falling back to the defaults if the file doesn't exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            info!(target: "config", "No config found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(target: "config", "Loaded config from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Applies the `VELLUM_*` environment variable overrides.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Applies overrides looked up through `lookup`, then validates the result.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(site) = lookup(SITE_URL_ENV) {
            let site = site.trim();
            self.site = (!site.is_empty()).then(|| site.to_string());
        }

        if let Some(theme) = lookup(THEME_ENV) {
            self.markdown.theme = theme.trim().parse::<Theme>()?;
        }

        if let Some(sitemap) = lookup(SITEMAP_ENV) {
            let enabled = match sitemap.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: SITEMAP_ENV,
                        value: sitemap,
                    });
                }
            };
            self.set_sitemap(enabled);
        }

        self.validate()?;
        Ok(self)
    }

    /// Checks that `site` is an absolute http(s) URL, and that integrations needing it have it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(site) = &self.site {
            let invalid = |reason: String| ConfigError::InvalidSiteUrl {
                url: site.clone(),
                reason,
            };

            let parsed = url::Url::parse(site).map_err(|err| invalid(err.to_string()))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(invalid(format!(
                    "scheme `{}` is not supported, it must be http or https",
                    parsed.scheme()
                )));
            }
            if parsed.host_str().is_none() {
                return Err(invalid("the URL has no host".to_string()));
            }
        }

        if self.sitemap().is_some() && self.site.is_none() {
            return Err(ConfigError::SitemapRequiresSite);
        }

        Ok(())
    }

    pub fn sitemap(&self) -> Option<&SitemapOptions> {
        self.integrations.iter().find_map(|integration| match integration {
            Integration::Sitemap(options) => Some(options),
        })
    }

    /// Adds the sitemap integration with default options, or removes it. Existing sitemap options are kept when enabling.
    pub fn set_sitemap(&mut self, enabled: bool) {
        let present = self.sitemap().is_some();

        if enabled && !present {
            self.integrations
                .push(Integration::Sitemap(SitemapOptions::default()));
        } else if !enabled {
            self.integrations
                .retain(|integration| !matches!(integration, Integration::Sitemap(_)));
        }
    }
}
