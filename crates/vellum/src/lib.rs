#![cfg_attr(docsrs, feature(doc_cfg))]
//! Vellum generates static websites from typed, validated content collections.
//!
//! A website is made of:
//! - [collections](content) of Markdown files, whose front-matter is validated against a schema before anything is rendered,
//! - [routes](route), which render pages from those collections,
//! - a [site configuration](config), which sets the base URL, syntax highlighting and integrations such as the sitemap.
//!
//! ## Example
//! ```rs
//! use vellum::{collections, publish, routes, BuildOutput, SiteConfig};
//!
//! fn main() -> Result<BuildOutput, Box<dyn std::error::Error>> {
//!   let config = SiteConfig::load("site.toml")?.with_env_overrides()?;
//!
//!   Ok(publish(
//!     routes![pages::Index, pages::BlogPost],
//!     collections!["blog" => BlogPost],
//!     config.into(),
//!   )?)
//! }
//! ```

// Modules the end-user will interact directly or indirectly with
pub mod config;
pub mod content;
pub mod errors;
pub mod route;
pub mod sitemap;

mod routing;

// Exports for end-users
pub use build::metadata::{BuildOutput, PageOutput, StaticAssetOutput};
pub use build::options::BuildOptions;
pub use config::{Integration, SiteConfig};

mod build;
mod templating;

#[cfg(feature = "maud")]
#[cfg_attr(docsrs, doc(cfg(feature = "maud")))]
pub mod maud {
    //! Helpers for [Maud](https://maud.lambda.xyz), a macro for writing HTML templates.
    //!
    //! ## Example
    //! ```rs
    //! use vellum::route::prelude::*;
    //! use maud::html;
    //!
    //! pub struct Index;
    //!
    //! impl Route for Index {
    //!   fn route_raw(&self) -> &str {
    //!     "/"
    //!   }
    //!
    //!   fn render(&self, _ctx: &PageContext) -> Result<RenderResult, VellumError> {
    //!     Ok(html! {
    //!       h1 { "Hello, world!" }
    //!     }.into())
    //!   }
    //! }
    //! ```
    pub use crate::templating::maud_ext::*;
}

// Internal modules
mod logging;

use build::execute_build;
use content::Collections;
use errors::VellumError;
use logging::init_logging;
use route::Route;

#[macro_export]
/// Helps to define every route that should be built by [`publish()`].
///
/// ## Example
/// ```rs
/// use vellum::{collections, publish, routes, BuildOptions, BuildOutput};
///
/// fn main() -> Result<BuildOutput, Box<dyn std::error::Error>> {
///     Ok(publish(
///         routes![routes::Index, routes::Article],
///         collections![],
///         BuildOptions::default(),
///     )?)
/// }
/// ```
macro_rules! routes {
    [$($route:expr),* $(,)?] => {
        &[$(&$route as &dyn $crate::route::Route),*]
    };
}

/// Declares the content collections of the website, each with the schema its entries' front-matter must match.
///
/// Every collection is read from `<content_dir>/<name>/*.md`.
///
/// ## Example
/// ```rs
/// use serde::Deserialize;
/// use vellum::{collections, content::{Date, Text}};
///
/// #[derive(Deserialize)]
/// pub struct BlogPost {
///   pub title: Text,
///   pub published: Date,
/// }
///
/// let collections = collections!["blog" => BlogPost];
/// ```
/// expands to
/// ```rs
/// vellum::content::Collections::new(vec![
///   Box::new(vellum::content::Collection::<BlogPost>::markdown("blog")) as Box<dyn vellum::content::CollectionInternal>
/// ]);
/// ```
#[macro_export]
macro_rules! collections {
    ($($name:expr => $schema:ty),* $(,)?) => {
        $crate::content::Collections::new(vec![$(
            Box::new($crate::content::Collection::<$schema>::markdown($name))
                as Box<dyn $crate::content::CollectionInternal>
        ),*])
    };
}

/// The version of Vellum being used.
///
/// Can be used to create a generator tag in the output HTML.
pub const GENERATOR: &str = concat!("Vellum v", env!("CARGO_PKG_VERSION"));

/// Vellum entrypoint. Loads and validates every collection, then renders every route and runs the configured integrations.
///
/// Nothing is rendered if any content entry fails its schema: all the invalid entries are reported at once.
///
/// ## Example
/// Should be called from the main function of the binary crate.
/// ```rs
/// use vellum::{collections, publish, routes, BuildOptions, BuildOutput};
///
/// fn main() -> Result<BuildOutput, Box<dyn std::error::Error>> {
///   Ok(publish(routes![], collections![], BuildOptions::default())?)
/// }
/// ```
pub fn publish(
    routes: &[&dyn Route],
    mut collections: Collections,
    options: BuildOptions,
) -> Result<BuildOutput, VellumError> {
    init_logging();

    execute_build(routes, &mut collections, &options)
}
