use maud::html;
use vellum::errors::ContentError;
use vellum::maud::markdown;
use vellum::route::prelude::*;

use crate::content::FeedItem;
use crate::layout::{SeoMeta, date, layout, tags};

pub struct FeedIndex;

impl Route for FeedIndex {
    fn route_raw(&self) -> &str {
        "/feed/"
    }

    fn render(&self, ctx: &PageContext) -> Result<RenderResult, VellumError> {
        let mut items: Vec<_> = ctx.content.get::<FeedItem>("feed")?.iter().collect();
        items.sort_by(|a, b| b.data.date.cmp(&a.data.date));

        let items = items
            .into_iter()
            .map(|item| -> Result<_, ContentError> { Ok((item, item.render(ctx.markdown)?)) })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(layout(
            html! {
                h1 { "Feed" }
                @for (item, body) in items {
                    article.feed-item id=(item.id) {
                        header {
                            h2 { (item.data.title) }
                            (date(&item.data.date))
                            (tags(&item.data.tags))
                        }
                        p.excerpt { (item.data.excerpt) }
                        (markdown(body))
                    }
                }
            },
            ctx,
            Some(SeoMeta::new("Feed", "Short updates on what I'm up to.")),
        )
        .into())
    }
}
