//! Core traits and structs to define the pages of your website.
//!
//! Every route must implement the [`Route`] trait. Then, routes can be passed to [`publish()`](crate::publish), through the [`routes!`](crate::routes) macro, to be built.
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::content::{Collections, MarkdownOptions};
use crate::errors::{BuildError, VellumError};
use crate::routing::{
    RouteType, build_file_path_with_params, build_url_with_params, extract_params_from_raw_route,
    get_route_type_from_route_params, guess_if_route_is_endpoint,
};
use crate::sitemap::RouteSitemapMetadata;

/// The result of a page render, either text (typically HTML) or raw bytes.
///
/// Typically produced through the [`From`] implementations for common types.
#[derive(Debug)]
pub enum RenderResult {
    Text(String),
    Raw(Vec<u8>),
}

impl RenderResult {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            RenderResult::Text(text) => text.into_bytes(),
            RenderResult::Raw(bytes) => bytes,
        }
    }
}

impl From<String> for RenderResult {
    fn from(val: String) -> Self {
        RenderResult::Text(val)
    }
}

impl From<&str> for RenderResult {
    fn from(val: &str) -> Self {
        RenderResult::Text(val.to_string())
    }
}

impl From<Vec<u8>> for RenderResult {
    fn from(val: Vec<u8>) -> Self {
        RenderResult::Raw(val)
    }
}

/// Raw representation of the parameters of a page, e.g. `{ "slug": "hello-world" }` for `/blog/[slug]/`.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct PageParams(pub FxHashMap<String, String>);

impl PageParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.insert(key.into(), value.into());
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for PageParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(params: [(K, V); N]) -> Self {
        params.into_iter().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for PageParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        PageParams(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Context available while rendering a single page.
pub struct PageContext<'a> {
    pub params: &'a PageParams,
    pub content: &'a Collections,
    /// The current path being rendered, e.g. `/blog/hello-world/`.
    pub current_path: &'a str,
    /// The base URL of the site, as defined in [`BuildOptions::base_url`](crate::BuildOptions::base_url).
    pub base_url: Option<&'a str>,
    /// Options to use when rendering Markdown on this page.
    pub markdown: &'a MarkdownOptions,
}

impl PageContext<'_> {
    /// Returns the value of a route parameter, e.g. `slug` for `/blog/[slug]/`.
    pub fn param(&self, key: &str) -> Result<&str, BuildError> {
        self.params.get(key).ok_or_else(|| BuildError::MissingParam {
            route: self.current_path.to_string(),
            param: key.to_string(),
        })
    }

    /// Returns the canonical URL for the current page. If no base URL is configured, this will return `None`.
    pub fn canonical_url(&self) -> Option<String> {
        self.base_url.map(|base| absolute_url(base, self.current_path))
    }
}

/// Allows to access the collections in the [`Route::pages`] method.
pub struct DynamicRouteContext<'a> {
    pub content: &'a Collections,
}

/// A route of the website.
///
/// Static routes only need to implement [`Route::render`]. Dynamic routes, whose path contains parameters such as `/blog/[slug]/`, also return the parameters of every page to generate from [`Route::pages`].
///
/// ## Example
/// ```rs
/// use vellum::route::prelude::*;
///
/// pub struct Index;
///
/// impl Route for Index {
///   fn route_raw(&self) -> &str {
///     "/"
///   }
///
///   fn render(&self, _ctx: &PageContext) -> Result<RenderResult, VellumError> {
///     Ok("<h1>Hello, world!</h1>".into())
///   }
/// }
/// ```
pub trait Route: Send + Sync {
    fn route_raw(&self) -> &str;

    fn pages(&self, _ctx: &DynamicRouteContext) -> Result<Vec<PageParams>, VellumError> {
        Ok(vec![PageParams::default()])
    }

    fn render(&self, ctx: &PageContext) -> Result<RenderResult, VellumError>;

    /// Sitemap settings for a single page of this route.
    fn sitemap_metadata(
        &self,
        _ctx: &DynamicRouteContext,
        _params: &PageParams,
    ) -> RouteSitemapMetadata {
        RouteSitemapMetadata::default()
    }
}

#[doc(hidden)]
/// Path helpers available on every [`Route`].
pub trait InternalRoute {
    fn is_endpoint(&self) -> bool;
    fn route_type(&self) -> RouteType;
    fn url(&self, params: &PageParams) -> Result<String, BuildError>;
    fn file_path(&self, params: &PageParams, output_dir: &Path) -> Result<PathBuf, BuildError>;
}

impl<R: Route + ?Sized> InternalRoute for R {
    fn is_endpoint(&self) -> bool {
        guess_if_route_is_endpoint(self.route_raw())
    }

    fn route_type(&self) -> RouteType {
        get_route_type_from_route_params(&extract_params_from_raw_route(self.route_raw()))
    }

    fn url(&self, params: &PageParams) -> Result<String, BuildError> {
        build_url_with_params(self.route_raw(), params, self.is_endpoint())
    }

    fn file_path(&self, params: &PageParams, output_dir: &Path) -> Result<PathBuf, BuildError> {
        build_file_path_with_params(self.route_raw(), params, output_dir, self.is_endpoint())
    }
}

/// Joins a base URL such as `https://example.com/sub/` with an absolute path such as `/blog/`.
pub fn absolute_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub mod prelude {
    //! Re-exports of the most commonly used types and traits for defining routes.
    pub use super::{
        DynamicRouteContext, InternalRoute, PageContext, PageParams, RenderResult, Route,
    };
    pub use crate::content::{Date, Text, Url};
    pub use crate::errors::VellumError;
    pub use crate::sitemap::RouteSitemapMetadata;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Article;

    impl Route for Article {
        fn route_raw(&self) -> &str {
            "/articles/[slug]/"
        }

        fn render(&self, ctx: &PageContext) -> Result<RenderResult, VellumError> {
            Ok(format!("<h1>{}</h1>", ctx.param("slug")?).into())
        }
    }

    #[test]
    fn test_route_helpers() {
        let params = PageParams::from([("slug", "hello")]);

        assert_eq!(Article.route_type(), RouteType::Dynamic);
        assert!(!Article.is_endpoint());
        assert_eq!(Article.url(&params).unwrap(), "/articles/hello/");
        assert_eq!(
            Article.file_path(&params, Path::new("out")).unwrap(),
            Path::new("out/articles/hello/index.html")
        );
    }

    #[test]
    fn test_page_context() {
        let params = PageParams::from([("slug", "hello")]);
        let content = Collections::new(vec![]);
        let markdown = MarkdownOptions::default();
        let ctx = PageContext {
            params: &params,
            content: &content,
            current_path: "/articles/hello/",
            base_url: Some("https://example.com/"),
            markdown: &markdown,
        };

        assert_eq!(
            ctx.canonical_url().as_deref(),
            Some("https://example.com/articles/hello/")
        );
        assert!(ctx.param("lang").is_err());

        let rendered = Article.render(&ctx).unwrap().into_bytes();
        assert_eq!(rendered, b"<h1>hello</h1>");
    }
}
