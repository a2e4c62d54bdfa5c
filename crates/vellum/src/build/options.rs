use std::path::PathBuf;

use crate::{
    config::{Integration, SiteConfig},
    content::MarkdownOptions,
    errors::ConfigError,
    sitemap::SitemapOptions,
};

/// Vellum build options. Should be passed to [`publish()`](crate::publish()).
///
/// Usually created from a [`SiteConfig`], which sets [`base_url`](Self::base_url), [`markdown`](Self::markdown) and [`integrations`](Self::integrations).
///
/// ## Examples
/// ```rs
/// use vellum::{collections, publish, routes, BuildOptions, BuildOutput, SiteConfig};
///
/// fn main() -> Result<BuildOutput, Box<dyn std::error::Error>> {
///   let config = SiteConfig::load("site.toml")?.with_env_overrides()?;
///
///   Ok(publish(
///     routes![],
///     collections![],
///     BuildOptions {
///       output_dir: "public".into(),
///       ..config.into()
///     },
///   )?)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Base URL for the site, e.g. `https://example.com` or `https://example.com/subdir`.
    /// This value is used to generate canonical URLs and the sitemap, and is available through [`PageContext::base_url`](crate::route::PageContext::base_url) in pages.
    pub base_url: Option<String>,

    /// Directory containing one folder per content collection. Defaults to `content`.
    pub content_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Files in this directory are copied as-is to the output directory. Defaults to `static`.
    pub static_dir: PathBuf,

    /// Whether to clean the output directory before building.
    pub clean_output_dir: bool,

    pub markdown: MarkdownOptions,

    pub integrations: Vec<Integration>,
}

impl BuildOptions {
    pub fn sitemap(&self) -> Option<&SitemapOptions> {
        self.integrations.iter().find_map(|integration| match integration {
            Integration::Sitemap(options) => Some(options),
        })
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        SiteConfig {
            site: self.base_url.clone(),
            markdown: self.markdown.clone(),
            integrations: self.integrations.clone(),
        }
        .validate()
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            content_dir: "content".into(),
            output_dir: "dist".into(),
            static_dir: "static".into(),
            clean_output_dir: true,
            markdown: MarkdownOptions::default(),
            integrations: vec![],
        }
    }
}

impl From<SiteConfig> for BuildOptions {
    fn from(config: SiteConfig) -> Self {
        Self {
            base_url: config.site,
            markdown: config.markdown,
            integrations: config.integrations,
            ..Default::default()
        }
    }
}
