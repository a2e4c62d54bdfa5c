use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Instant,
};

use colored::{ColoredString, Colorize};
use log::{debug, info, trace, warn};
use rayon::prelude::*;

use crate::{
    BuildOptions, BuildOutput,
    build::metadata::PageOutput,
    content::Collections,
    errors::{BuildError, ConfigError, VellumError},
    logging::{self, ElapsedStyle, format_elapsed_time, print_section},
    route::{DynamicRouteContext, InternalRoute, PageContext, PageParams, Route, absolute_url},
    routing::RouteType,
    sitemap::{RouteSitemapMetadata, SitemapEntry, generate_sitemap},
};

pub mod metadata;
pub mod options;

struct RenderedPage {
    output: PageOutput,
    sitemap: RouteSitemapMetadata,
}

pub fn execute_build(
    routes: &[&dyn Route],
    collections: &mut Collections,
    options: &BuildOptions,
) -> Result<BuildOutput, VellumError> {
    let build_start = Instant::now();
    let mut build_metadata = BuildOutput::new(build_start);

    options.validate()?;

    trace!(target: "build", "Setting up required directories...");
    if options.clean_output_dir && options.output_dir.exists() {
        fs::remove_dir_all(&options.output_dir)?;
    }
    fs::create_dir_all(&options.output_dir)?;

    info!(target: "build", "Output directory: {}", options.output_dir.display());

    let phase_style = ElapsedStyle::phase();

    print_section("loading content");
    let content_start = Instant::now();
    collections.load(&options.content_dir)?;
    info!(target: "content", "{}", format!("Content loaded in {}", format_elapsed_time(content_start.elapsed(), &ElapsedStyle::step())).bold());

    print_section("generating pages");
    let pages_start = Instant::now();

    let collections: &Collections = collections;
    let rendered = routes
        .par_iter()
        .map(|route| render_route(*route, collections, options))
        .collect::<Result<Vec<_>, VellumError>>()?;

    let mut sitemap_pages = Vec::new();
    for page in rendered.into_iter().flatten() {
        sitemap_pages.push((page.output.url.clone(), page.sitemap));
        build_metadata.add_page(page.output);
    }

    info!(target: "pages", "{}", format!("generated {} pages in {}", build_metadata.pages.len(), format_elapsed_time(pages_start.elapsed(), &phase_style)).bold());

    if options.static_dir.exists() {
        let assets_start = Instant::now();
        print_section("copying assets");

        copy_recursively(
            &options.static_dir,
            &options.output_dir,
            &mut build_metadata,
        )?;

        info!(target: "build", "{}", format!("Assets copied in {}", format_elapsed_time(assets_start.elapsed(), &ElapsedStyle::step())).bold());
    }

    if let Some(sitemap_options) = options.sitemap() {
        let sitemap_start = Instant::now();
        print_section("generating sitemap");

        let base_url = options
            .base_url
            .as_deref()
            .ok_or(ConfigError::SitemapRequiresSite)?;

        let entries = sitemap_pages
            .into_iter()
            .filter(|(url, _)| is_sitemap_candidate(url))
            .filter_map(|(url, metadata)| {
                SitemapEntry::for_page(absolute_url(base_url, &url), metadata, sitemap_options)
            })
            .collect::<Vec<_>>();

        let entry_count = entries.len();
        let written = generate_sitemap(entries, base_url, &options.output_dir, sitemap_options)?;
        for file in &written {
            debug!(target: "sitemap", "Wrote {}", file.display());
        }

        info!(target: "sitemap", "{}", format!("Sitemap with {} URLs generated in {}", entry_count, format_elapsed_time(sitemap_start.elapsed(), &ElapsedStyle::step())).bold());
        build_metadata.integration_files.extend(written);
    }

    info!(target: logging::PLAIN, "");
    info!(target: "build", "{}", format!("Build completed in {}", format_elapsed_time(build_start.elapsed(), &phase_style)).bold());

    Ok(build_metadata)
}

fn render_route(
    route: &dyn Route,
    collections: &Collections,
    options: &BuildOptions,
) -> Result<Vec<RenderedPage>, VellumError> {
    // Fast pages are dimmed, slow ones keep their warning colour.
    let page_style = ElapsedStyle {
        decorate: Some(&|elapsed: ColoredString| match elapsed.fgcolor {
            None => format!("(+{})", elapsed).dimmed(),
            Some(_) => format!("(+{})", elapsed).into(),
        }),
        ..ElapsedStyle::step()
    };

    let dynamic_ctx = DynamicRouteContext {
        content: collections,
    };

    let pages = match route.route_type() {
        RouteType::Static => vec![PageParams::default()],
        RouteType::Dynamic => {
            let pages = route.pages(&dynamic_ctx)?;
            if pages.is_empty() {
                warn!(target: "build", "{} is a dynamic route, but its implementation of Route::pages returned an empty Vec. No pages will be generated for this route.", route.route_raw().bold());
                return Ok(vec![]);
            }

            info!(target: "build", "{}", route.route_raw().bold());
            pages
        }
    };

    let is_dynamic = route.route_type() == RouteType::Dynamic;

    pages
        .par_iter()
        .map(|params| -> Result<RenderedPage, VellumError> {
            let route_start = Instant::now();

            let url = route.url(params)?;
            let file_path = route.file_path(params, &options.output_dir)?;

            let result = route
                .render(&PageContext {
                    params,
                    content: collections,
                    current_path: &url,
                    base_url: options.base_url.as_deref(),
                    markdown: &options.markdown,
                })
                .map_err(|err| BuildError::Render {
                    route: url.clone(),
                    message: err.to_string(),
                })?;

            write_route_file(&result.into_bytes(), &file_path)?;

            if is_dynamic {
                info!(target: "pages", "├─ {} {}", file_path.to_string_lossy().dimmed(), format_elapsed_time(route_start.elapsed(), &page_style));
            } else {
                info!(target: "pages", "{} -> {} {}", url, file_path.to_string_lossy().dimmed(), format_elapsed_time(route_start.elapsed(), &page_style));
            }

            Ok(RenderedPage {
                sitemap: route.sitemap_metadata(&dynamic_ctx, params),
                output: PageOutput {
                    route: route.route_raw().to_string(),
                    url,
                    file_path,
                    params: is_dynamic.then(|| params.0.clone()),
                },
            })
        })
        .collect()
}

/// Only HTML pages belong in a sitemap, error pages excluded.
fn is_sitemap_candidate(url: &str) -> bool {
    let is_html = url.ends_with('/') || url.ends_with(".html");
    let is_error_page = url.trim_end_matches('/').rsplit('/').next() == Some("404")
        || url.ends_with("/404.html");

    is_html && !is_error_page
}

fn copy_recursively(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    build_metadata: &mut BuildOutput,
) -> io::Result<()> {
    fs::create_dir_all(&destination)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let filetype = entry.file_type()?;
        let target = destination.as_ref().join(entry.file_name());
        if filetype.is_dir() {
            copy_recursively(entry.path(), target, build_metadata)?;
        } else {
            fs::copy(entry.path(), &target)?;
            build_metadata.add_static_file(target, entry.path());
        }
    }
    Ok(())
}

fn write_route_file(content: &[u8], file_path: &PathBuf) -> Result<(), BuildError> {
    let write = || -> io::Result<()> {
        if let Some(parent_dir) = file_path.parent() {
            fs::create_dir_all(parent_dir)?;
        }
        fs::write(file_path, content)
    };

    write().map_err(|source| BuildError::WriteFailed {
        path: file_path.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Integration,
        content::{Collection, Date},
        route::RenderResult,
        sitemap::SitemapOptions,
    };
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Note {
        title: String,
        date: Date,
        #[serde(default = "listed_by_default")]
        listed: bool,
    }

    fn listed_by_default() -> bool {
        true
    }

    struct Index;

    impl Route for Index {
        fn route_raw(&self) -> &str {
            "/"
        }

        fn render(&self, ctx: &PageContext) -> Result<RenderResult, VellumError> {
            let notes = ctx.content.get::<Note>("notes")?;
            let titles = notes
                .iter()
                .map(|note| note.data.title.as_str())
                .collect::<Vec<_>>();
            Ok(format!("<ul><li>{}</li></ul>", titles.join("</li><li>")).into())
        }
    }

    struct NotePage;

    impl Route for NotePage {
        fn route_raw(&self) -> &str {
            "/notes/[slug]/"
        }

        fn pages(&self, ctx: &DynamicRouteContext) -> Result<Vec<PageParams>, VellumError> {
            Ok(ctx
                .content
                .get::<Note>("notes")?
                .into_params(|entry| [("slug", entry.id.clone())]))
        }

        fn render(&self, ctx: &PageContext) -> Result<RenderResult, VellumError> {
            let note = ctx
                .content
                .get::<Note>("notes")?
                .get_entry(ctx.param("slug")?)?;
            Ok(format!("<h1>{}</h1>{}", note.data.title, note.render(ctx.markdown)?).into())
        }

        fn sitemap_metadata(
            &self,
            ctx: &DynamicRouteContext,
            params: &PageParams,
        ) -> RouteSitemapMetadata {
            let note = params.get("slug").and_then(|slug| {
                ctx.content
                    .get_safe::<Note>("notes")
                    .and_then(|notes| notes.get_entry_safe(slug))
            });

            RouteSitemapMetadata {
                exclude: note.map(|note| !note.data.listed),
                lastmod: note.map(|note| note.data.date.to_string()),
                ..Default::default()
            }
        }
    }

    struct NotFound;

    impl Route for NotFound {
        fn route_raw(&self) -> &str {
            "/404.html"
        }

        fn render(&self, _ctx: &PageContext) -> Result<RenderResult, VellumError> {
            Ok("Not found".into())
        }
    }

    struct Empty;

    impl Route for Empty {
        fn route_raw(&self) -> &str {
            "/empty/[id]/"
        }

        fn pages(&self, _ctx: &DynamicRouteContext) -> Result<Vec<PageParams>, VellumError> {
            Ok(vec![])
        }

        fn render(&self, _ctx: &PageContext) -> Result<RenderResult, VellumError> {
            Ok("".into())
        }
    }

    fn site(dir: &Path) -> BuildOptions {
        let notes = dir.join("content/notes");
        fs::create_dir_all(&notes).unwrap();
        fs::write(
            notes.join("first.md"),
            "---\ntitle: First\ndate: 2024-01-01\n---\n\nHello **world**\n",
        )
        .unwrap();
        fs::write(
            notes.join("draft.md"),
            "---\ntitle: Draft\ndate: 2024-02-01\nlisted: false\n---\n\nSoon\n",
        )
        .unwrap();

        let static_dir = dir.join("static/fonts");
        fs::create_dir_all(&static_dir).unwrap();
        fs::write(static_dir.join("font.woff2"), b"font").unwrap();

        BuildOptions {
            base_url: Some("https://example.com".into()),
            content_dir: dir.join("content"),
            output_dir: dir.join("dist"),
            static_dir: dir.join("static"),
            integrations: vec![Integration::Sitemap(SitemapOptions::default())],
            ..Default::default()
        }
    }

    fn notes() -> Collections {
        Collections::new(vec![Box::new(Collection::<Note>::markdown("notes"))])
    }

    #[test]
    fn test_build_site() {
        let dir = tempfile::tempdir().unwrap();
        let options = site(dir.path());

        let output =
            execute_build(&[&Index, &NotePage, &NotFound, &Empty], &mut notes(), &options)
                .unwrap();

        assert_eq!(output.pages.len(), 4);
        assert!(output.page("/notes/first/").is_some());

        let index = fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
        assert!(index.contains("Draft") && index.contains("First"));

        let first = fs::read_to_string(dir.path().join("dist/notes/first/index.html")).unwrap();
        assert!(first.contains("<h1>First</h1>"));
        assert!(first.contains("<strong>world</strong>"));

        assert!(dir.path().join("dist/404.html").exists());
        assert!(dir.path().join("dist/fonts/font.woff2").exists());
        assert_eq!(output.static_files.len(), 1);

        let sitemap = fs::read_to_string(dir.path().join("dist/sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>https://example.com/</loc>"));
        assert!(sitemap.contains("<loc>https://example.com/notes/first/</loc>"));
        assert!(sitemap.contains("<lastmod>2024-01-01</lastmod>"));
        assert!(!sitemap.contains("draft"));
        assert!(!sitemap.contains("404"));
    }

    #[test]
    fn test_invalid_content_fails_before_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let options = site(dir.path());
        fs::write(
            dir.path().join("content/notes/broken.md"),
            "---\ndate: 2024-03-01\n---\n",
        )
        .unwrap();

        let err = execute_build(&[&Index], &mut notes(), &options).unwrap_err();

        match err {
            VellumError::Content(crate::errors::ContentError::Invalid(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].entry, "broken");
                assert_eq!(errors[0].field.as_deref(), Some("title"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join("dist/index.html").exists());
    }

    #[test]
    fn test_render_errors_name_the_page() {
        let dir = tempfile::tempdir().unwrap();
        let options = BuildOptions {
            integrations: vec![],
            ..site(dir.path())
        };

        // No "notes" collection registered
        let err = execute_build(&[&Index], &mut Collections::new(vec![]), &options).unwrap_err();

        assert!(matches!(
            err,
            VellumError::Build(BuildError::Render { ref route, .. }) if route == "/"
        ));
    }

    #[test]
    fn test_clean_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let options = site(dir.path());
        fs::create_dir_all(&options.output_dir).unwrap();
        fs::write(options.output_dir.join("stale.html"), "old").unwrap();

        execute_build(&[&NotFound], &mut notes(), &options).unwrap();
        assert!(!options.output_dir.join("stale.html").exists());

        fs::write(options.output_dir.join("stale.html"), "old").unwrap();
        let options = BuildOptions {
            clean_output_dir: false,
            ..options
        };
        execute_build(&[&NotFound], &mut notes(), &options).unwrap();
        assert!(options.output_dir.join("stale.html").exists());
    }

    #[test]
    fn test_sitemap_candidates() {
        assert!(is_sitemap_candidate("/"));
        assert!(is_sitemap_candidate("/blog/hello/"));
        assert!(is_sitemap_candidate("/about.html"));
        assert!(!is_sitemap_candidate("/404.html"));
        assert!(!is_sitemap_candidate("/404/"));
        assert!(!is_sitemap_candidate("/feed.xml"));
    }
}
