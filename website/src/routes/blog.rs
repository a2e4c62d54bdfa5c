use std::collections::BTreeMap;

use chrono::Datelike;
use maud::{Markup, html};
use vellum::content::{Collections, Entry};
use vellum::errors::ContentError;
use vellum::maud::markdown;
use vellum::route::prelude::*;

use crate::content::BlogPost;
use crate::layout::{SeoMeta, date, layout, tags};

/// Listed posts, newest first.
pub fn listed_posts(content: &Collections) -> Result<Vec<&Entry<BlogPost>>, ContentError> {
    let mut posts: Vec<_> = content
        .get::<BlogPost>("blog")?
        .iter()
        .filter(|post| post.data.listed)
        .collect();

    posts.sort_by(|a, b| b.data.published.cmp(&a.data.published));
    Ok(posts)
}

pub fn post_summary(post: &Entry<BlogPost>) -> Markup {
    html! {
        article.summary {
            h3 { a href=(format!("/blog/{}/", post.id)) { (post.data.title) } }
            (date(&post.data.published))
            p { (post.data.excerpt) }
        }
    }
}

pub struct BlogIndex;

impl Route for BlogIndex {
    fn route_raw(&self) -> &str {
        "/blog/"
    }

    fn render(&self, ctx: &PageContext) -> Result<RenderResult, VellumError> {
        let mut posts_by_year: BTreeMap<i32, Vec<_>> = BTreeMap::new();
        for post in listed_posts(ctx.content)? {
            posts_by_year
                .entry(post.data.published.naive().year())
                .or_default()
                .push(post);
        }

        Ok(layout(
            html! {
                h1 { "Blog" }
                @for (year, posts) in posts_by_year.iter().rev() {
                    section {
                        h2 id=(year) { (year) }
                        @for post in posts {
                            (post_summary(post))
                        }
                    }
                }
            },
            ctx,
            Some(SeoMeta::new("Blog", "Everything I've written.")),
        )
        .into())
    }
}

pub struct BlogPostPage;

impl Route for BlogPostPage {
    fn route_raw(&self) -> &str {
        "/blog/[slug]/"
    }

    fn pages(&self, ctx: &DynamicRouteContext) -> Result<Vec<PageParams>, VellumError> {
        Ok(ctx
            .content
            .get::<BlogPost>("blog")?
            .into_params(|post| [("slug", post.id.clone())]))
    }

    fn render(&self, ctx: &PageContext) -> Result<RenderResult, VellumError> {
        let post = ctx
            .content
            .get::<BlogPost>("blog")?
            .get_entry(ctx.param("slug")?)?;
        let body = post.render(ctx.markdown)?;

        Ok(layout(
            html! {
                article.post {
                    header {
                        h1 { (post.data.title) }
                        (date(&post.data.published))
                        (tags(&post.data.tags))
                    }
                    (markdown(body))
                }
            },
            ctx,
            Some(SeoMeta::new(post.data.title.as_str(), post.data.excerpt.as_str())),
        )
        .into())
    }

    fn sitemap_metadata(
        &self,
        ctx: &DynamicRouteContext,
        params: &PageParams,
    ) -> RouteSitemapMetadata {
        let post = params.get("slug").and_then(|slug| {
            ctx.content
                .get_safe::<BlogPost>("blog")
                .and_then(|blog| blog.get_entry_safe(slug))
        });

        match post {
            Some(post) => RouteSitemapMetadata {
                exclude: Some(!post.data.listed),
                lastmod: Some(post.data.published.to_string()),
                ..Default::default()
            },
            None => RouteSitemapMetadata::default(),
        }
    }
}
