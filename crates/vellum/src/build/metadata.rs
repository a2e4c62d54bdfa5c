use std::{path::PathBuf, process::Termination, time::Instant};

use rustc_hash::FxHashMap;

/// Metadata returned by [`publish()`](crate::publish) for a single page after a successful build.
#[derive(Debug)]
pub struct PageOutput {
    /// Route the page was generated from, e.g. `/blog/[slug]/`.
    pub route: String,
    pub url: String,
    pub file_path: PathBuf,
    pub params: Option<FxHashMap<String, String>>,
}

/// Metadata returned by [`publish()`](crate::publish) for a single file copied from the static directory.
#[derive(Debug)]
pub struct StaticAssetOutput {
    pub file_path: PathBuf,
    pub original_path: PathBuf,
}

/// Metadata returned by [`publish()`](crate::publish) after a successful build.
#[derive(Debug)]
pub struct BuildOutput {
    pub start_time: Instant,
    pub pages: Vec<PageOutput>,
    pub static_files: Vec<StaticAssetOutput>,
    /// Files written by integrations, e.g. `sitemap.xml`.
    pub integration_files: Vec<PathBuf>,
}

impl BuildOutput {
    pub fn new(start_time: Instant) -> Self {
        Self {
            start_time,
            pages: Vec::new(),
            static_files: Vec::new(),
            integration_files: Vec::new(),
        }
    }

    pub(crate) fn add_page(&mut self, page: PageOutput) {
        self.pages.push(page);
    }

    pub(crate) fn add_static_file(&mut self, file_path: PathBuf, original_path: PathBuf) {
        self.static_files.push(StaticAssetOutput {
            file_path,
            original_path,
        });
    }

    pub fn page(&self, url: &str) -> Option<&PageOutput> {
        self.pages.iter().find(|page| page.url == url)
    }
}

impl Default for BuildOutput {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl Termination for BuildOutput {
    fn report(self) -> std::process::ExitCode {
        0.into()
    }
}
