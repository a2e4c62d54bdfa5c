//! Core functions and structs to define the content collections of your website.
//!
//! A collection is a folder of Markdown files, e.g. `content/blog/*.md`, whose front-matter is validated against a schema: any type implementing [`serde::Deserialize`].
//! Collections are declared through the [`collections!`](crate::collections) macro and passed to [`publish()`](crate::publish), which loads and validates all of them before rendering any page.
use std::{
    any::Any,
    path::{Path, PathBuf},
};

use log::info;
use rustc_hash::FxHashSet;
use serde::de::DeserializeOwned;

mod highlight;
pub mod markdown;
mod schema;
mod slugger;

use crate::errors::ContentError;
use crate::route::PageParams;
pub use highlight::Theme;
pub use markdown::{
    MarkdownHeading, MarkdownOptions, glob_markdown, parse_entry, render_markdown,
    split_frontmatter,
};
pub use schema::{Date, Text, Url};

/// Bound required from the data type of a collection.
///
/// Implemented automatically for every deserializable type.
pub trait Schema: DeserializeOwned + Send + Sync + 'static {}

impl<T> Schema for T where T: DeserializeOwned + Send + Sync + 'static {}

/// Represents a single entry in a [`Collection`], e.g. one blog post.
#[derive(Debug)]
pub struct Entry<T> {
    /// File name of the entry, without its extension.
    pub id: String,
    /// Validated front-matter.
    pub data: T,
    /// Markdown content following the front-matter.
    pub body: String,
    pub headings: Vec<MarkdownHeading>,
    pub file_path: Option<PathBuf>,
}

impl<T> Entry<T> {
    /// Renders the body of the entry to HTML.
    ///
    /// ## Example
    /// ```rs
    /// impl Route for BlogPost {
    ///   fn render(&self, ctx: &PageContext) -> Result<RenderResult, VellumError> {
    ///     let post = ctx.content.get::<Post>("blog")?.get_entry(ctx.param("slug")?)?;
    ///     Ok(post.render(ctx.markdown)?.into())
    ///   }
    /// }
    /// ```
    pub fn render(&self, options: &MarkdownOptions) -> Result<String, ContentError> {
        markdown::render_body(&self.body, options)
    }
}

type CollectionLoader<T> =
    Box<dyn Fn(&str, &Path) -> Result<Vec<Entry<T>>, ContentError> + Send + Sync>;

/// A named set of entries sharing the same schema.
pub struct Collection<T> {
    pub name: String,
    pub entries: Vec<Entry<T>>,
    loader: CollectionLoader<T>,
}

impl<T: Schema> Collection<T> {
    pub fn new<N>(name: N, loader: CollectionLoader<T>) -> Self
    where
        N: Into<String>,
    {
        Self {
            name: name.into(),
            entries: vec![],
            loader,
        }
    }

    /// A collection made of every Markdown file directly inside `<content_dir>/<name>/`.
    pub fn markdown<N>(name: N) -> Self
    where
        N: Into<String>,
    {
        Self::new(
            name,
            Box::new(|name: &str, content_dir: &Path| {
                let pattern = content_dir.join(name).join("*.md");
                glob_markdown::<T>(name, &pattern.to_string_lossy())
            }),
        )
    }
}

impl<T> Collection<T> {
    pub fn get_entry(&self, id: &str) -> Result<&Entry<T>, ContentError> {
        self.get_entry_safe(id)
            .ok_or_else(|| ContentError::EntryNotFound {
                collection: self.name.clone(),
                entry: id.to_string(),
            })
    }

    pub fn get_entry_safe(&self, id: &str) -> Option<&Entry<T>> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry<T>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maps every entry to the parameters of a page, typically used in [`Route::pages`](crate::route::Route::pages).
    pub fn into_params<P>(&self, cb: impl Fn(&Entry<T>) -> P) -> Vec<PageParams>
    where
        P: Into<PageParams>,
    {
        self.entries.iter().map(|entry| cb(entry).into()).collect()
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a Entry<T>;
    type IntoIter = std::slice::Iter<'a, Entry<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[doc(hidden)]
/// Used internally by Vellum to load collections of different schemas through the same registry.
pub trait CollectionInternal: Send + Sync {
    fn load(&mut self, content_dir: &Path) -> Result<(), ContentError>;
    fn name(&self) -> &str;
    fn entry_count(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Schema> CollectionInternal for Collection<T> {
    fn load(&mut self, content_dir: &Path) -> Result<(), ContentError> {
        self.entries = (self.loader)(&self.name, content_dir)?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The content schema registry: every collection of the website.
///
/// Mostly seen as the return type of [`collections!`](crate::collections).
pub struct Collections(pub Vec<Box<dyn CollectionInternal>>);

impl Collections {
    pub fn new(collections: Vec<Box<dyn CollectionInternal>>) -> Self {
        Self(collections)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|collection| collection.name())
    }

    /// Returns the collection named `name`, which must have been declared with schema `T`.
    pub fn get<T: 'static>(&self, name: &str) -> Result<&Collection<T>, ContentError> {
        self.get_safe(name)
            .ok_or_else(|| ContentError::CollectionNotFound(name.to_string()))
    }

    pub fn get_safe<T: 'static>(&self, name: &str) -> Option<&Collection<T>> {
        self.0.iter().find_map(|collection| {
            match collection.as_any().downcast_ref::<Collection<T>>() {
                Some(collection) if collection.name == name => Some(collection),
                _ => None,
            }
        })
    }

    /// Loads every collection from `content_dir`.
    ///
    /// All collections are loaded even if one fails, so that every invalid entry of the website is reported at once.
    pub fn load(&mut self, content_dir: &Path) -> Result<(), ContentError> {
        let mut seen = FxHashSet::default();
        for name in self.names() {
            if !seen.insert(name) {
                return Err(ContentError::DuplicateCollection(name.to_string()));
            }
        }

        let mut invalid = vec![];

        for collection in self.0.iter_mut() {
            match collection.load(content_dir) {
                Ok(()) => {
                    info!(target: "content", "{} loaded ({} entries)", collection.name(), collection.entry_count());
                }
                Err(ContentError::Invalid(errors)) => invalid.extend(errors),
                Err(err) => return Err(err),
            }
        }

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(ContentError::Invalid(invalid))
        }
    }
}

impl From<Vec<Box<dyn CollectionInternal>>> for Collections {
    fn from(collections: Vec<Box<dyn CollectionInternal>>) -> Self {
        Self(collections)
    }
}
