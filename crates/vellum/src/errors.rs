//! Error types for Vellum.
use std::fmt::{self, Debug, Formatter};
use std::path::PathBuf;
use thiserror::Error;

macro_rules! impl_debug_for_error {
    ($($t:ty),*) => {
        $(
            impl Debug for $t {
                fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                    // Errors returned from main are printed with Debug, thiserror only derives Display.
                    write!(f, "{}", self)
                }
            }
        )*
    };
}

#[derive(Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(
        "Unknown syntax highlighting theme `{name}`, supported themes are: {}",
        crate::content::Theme::NAMES.join(", ")
    )]
    UnknownTheme { name: String },

    #[error("Invalid site URL `{url}`: {reason}. Use a format like https://example.com")]
    InvalidSiteUrl { url: String, reason: String },

    #[error("The sitemap integration requires `site` to be set, as sitemaps only contain absolute URLs")]
    SitemapRequiresSite,

    #[error("Invalid value `{value}` for environment variable {var}")]
    InvalidEnv { var: &'static str, value: String },
}

/// A single content entry failing its collection's schema.
#[derive(Error)]
#[error("[{collection}] {entry}: {message}")]
pub struct EntryError {
    pub collection: String,
    pub entry: String,
    /// Front-matter field responsible for the failure, when it could be determined.
    pub field: Option<String>,
    pub message: String,
}

#[derive(Error)]
pub enum ContentError {
    #[error("Content collection `{0}` not found")]
    CollectionNotFound(String),

    #[error("Content collection `{0}` is declared more than once")]
    DuplicateCollection(String),

    #[error("Entry `{entry}` not found in collection `{collection}`")]
    EntryNotFound { collection: String, entry: String },

    #[error("Invalid glob pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to read content file: {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} content entries failed validation:\n{}", .0.len(), format_entry_errors(.0))]
    Invalid(Vec<EntryError>),

    #[error("Syntax highlighting theme `{0}` could not be loaded")]
    ThemeUnavailable(String),

    #[error("Failed to highlight code block")]
    Highlight(#[from] syntect::Error),
}

fn format_entry_errors(errors: &[EntryError]) -> String {
    errors
        .iter()
        .map(|error| format!("  - {}", error))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Error)]
pub enum BuildError {
    #[error("Route {route:?} is missing parameter {param:?}")]
    MissingParam { route: String, param: String },

    #[error("Failed to render `{route}`: {message}")]
    Render { route: String, message: String },

    #[error("Failed to write {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum VellumError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<EntryError> for ContentError {
    fn from(error: EntryError) -> Self {
        ContentError::Invalid(vec![error])
    }
}

impl From<EntryError> for VellumError {
    fn from(error: EntryError) -> Self {
        VellumError::Content(error.into())
    }
}

impl_debug_for_error!(ConfigError, EntryError, ContentError, BuildError);
