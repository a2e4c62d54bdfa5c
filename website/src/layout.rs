use maud::{DOCTYPE, Markup, html};
use vellum::content::{Date, Text};
use vellum::maud::{canonical, generator};
use vellum::route::PageContext;

const SITE_NAME: &str = "Notebook";

pub struct SeoMeta {
    pub title: String,
    pub description: Option<String>,
}

impl Default for SeoMeta {
    fn default() -> Self {
        Self {
            title: SITE_NAME.to_string(),
            description: Some("Writing, projects and talks.".to_string()),
        }
    }
}

impl SeoMeta {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: Some(description.into()),
        }
    }

    fn render(&self, ctx: &PageContext) -> Markup {
        let formatted_title = if self.title == SITE_NAME {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, SITE_NAME)
        };

        let canonical_url = ctx.canonical_url();

        html! {
            title { (formatted_title) }
            @if let Some(description) = &self.description {
                meta name="description" content=(description);
                meta property="og:description" content=(description);
            }
            meta property="og:title" content=(formatted_title);
            meta property="og:type" content="website";
            @if let Some(url) = &canonical_url {
                meta property="og:url" content=(url);
            }
            (canonical(canonical_url.as_deref()))
        }
    }
}

fn header(ctx: &PageContext) -> Markup {
    let links = [
        ("/blog/", "Blog"),
        ("/feed/", "Feed"),
        ("/projects/", "Projects"),
        ("/packages/", "Packages"),
        ("/talks/", "Talks"),
    ];

    html! {
        header.site-header {
            a.site-name href="/" { (SITE_NAME) }
            nav {
                @for (href, label) in links {
                    @if ctx.current_path.starts_with(href) {
                        a.active href=(href) aria-current="page" { (label) }
                    } @else {
                        a href=(href) { (label) }
                    }
                }
            }
        }
    }
}

pub fn layout(main: Markup, ctx: &PageContext, seo: Option<SeoMeta>) -> Markup {
    let seo = seo.unwrap_or_default();

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                (generator())
                link rel="stylesheet" href="/style.css";
                (seo.render(ctx))
            }
            body {
                (header(ctx))
                main { (main) }
                footer.site-footer {
                    a href="/feed/" { "What I'm up to" }
                }
            }
        }
    }
}

pub fn date(date: &Date) -> Markup {
    html! {
        time datetime=(date.to_string()) { (date.format("%B %-d, %Y")) }
    }
}

pub fn tags(tags: &[Text]) -> Markup {
    html! {
        @if !tags.is_empty() {
            ul.tags {
                @for tag in tags {
                    li { (tag) }
                }
            }
        }
    }
}
