use maud::{Markup, html};
use vellum::route::prelude::*;

use crate::content::{Package, Project, Talk};
use crate::layout::{SeoMeta, date, layout};

struct ListItem<'a> {
    title: &'a str,
    description: &'a str,
    url: &'a Url,
    date: Option<&'a Date>,
}

fn list(items: &[ListItem]) -> Markup {
    html! {
        ul.listing {
            @for item in items {
                li {
                    a href=(item.url.as_str()) { (item.title) }
                    @if let Some(host) = item.url.host() {
                        span.host { (host) }
                    }
                    @if let Some(when) = item.date {
                        (date(when))
                    }
                    p { (item.description) }
                }
            }
        }
    }
}

pub struct PackagesIndex;

impl Route for PackagesIndex {
    fn route_raw(&self) -> &str {
        "/packages/"
    }

    fn render(&self, ctx: &PageContext) -> Result<RenderResult, VellumError> {
        let mut packages: Vec<_> = ctx.content.get::<Package>("packages")?.iter().collect();
        packages.sort_by(|a, b| a.data.number.total_cmp(&b.data.number));

        let items = packages
            .iter()
            .map(|package| ListItem {
                title: &package.data.title,
                description: &package.data.description,
                url: &package.data.url,
                date: None,
            })
            .collect::<Vec<_>>();

        Ok(layout(
            html! {
                h1 { "Packages" }
                (list(&items))
            },
            ctx,
            Some(SeoMeta::new("Packages", "Libraries I publish and maintain.")),
        )
        .into())
    }
}

pub struct ProjectsIndex;

impl Route for ProjectsIndex {
    fn route_raw(&self) -> &str {
        "/projects/"
    }

    fn render(&self, ctx: &PageContext) -> Result<RenderResult, VellumError> {
        let mut projects: Vec<_> = ctx.content.get::<Project>("projects")?.iter().collect();
        projects.sort_by(|a, b| a.data.number.total_cmp(&b.data.number));

        let items = projects
            .iter()
            .map(|project| ListItem {
                title: &project.data.title,
                description: &project.data.description,
                url: &project.data.url,
                date: None,
            })
            .collect::<Vec<_>>();

        Ok(layout(
            html! {
                h1 { "Projects" }
                (list(&items))
            },
            ctx,
            Some(SeoMeta::new("Projects", "Things I've built.")),
        )
        .into())
    }
}

pub struct TalksIndex;

impl Route for TalksIndex {
    fn route_raw(&self) -> &str {
        "/talks/"
    }

    fn render(&self, ctx: &PageContext) -> Result<RenderResult, VellumError> {
        let mut talks: Vec<_> = ctx.content.get::<Talk>("talks")?.iter().collect();
        talks.sort_by(|a, b| b.data.date.cmp(&a.data.date));

        let items = talks
            .iter()
            .map(|talk| ListItem {
                title: &talk.data.title,
                description: &talk.data.description,
                url: &talk.data.url,
                date: Some(&talk.data.date),
            })
            .collect::<Vec<_>>();

        Ok(layout(
            html! {
                h1 { "Talks" }
                (list(&items))
            },
            ctx,
            Some(SeoMeta::new("Talks", "Conference talks and meetups.")),
        )
        .into())
    }
}
