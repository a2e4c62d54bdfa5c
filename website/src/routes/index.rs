use maud::html;
use vellum::route::prelude::*;

use crate::content::FeedItem;
use crate::layout::{date, layout};
use crate::routes::blog::{listed_posts, post_summary};

pub struct Index;

impl Route for Index {
    fn route_raw(&self) -> &str {
        "/"
    }

    fn render(&self, ctx: &PageContext) -> Result<RenderResult, VellumError> {
        let posts = listed_posts(ctx.content)?;

        let mut updates: Vec<_> = ctx.content.get::<FeedItem>("feed")?.iter().collect();
        updates.sort_by(|a, b| b.data.date.cmp(&a.data.date));

        Ok(layout(
            html! {
                section.intro {
                    h1 { "Hi, welcome to my notebook." }
                    p { "I write about software, publish a few packages and sometimes give talks." }
                }

                section {
                    h2 { "Recent writing" }
                    @for post in posts.iter().take(5) {
                        (post_summary(post))
                    }
                    a href="/blog/" { "All posts" }
                }

                @if !updates.is_empty() {
                    section {
                        h2 { "Lately" }
                        ul {
                            @for update in updates.iter().take(3) {
                                li {
                                    a href=(format!("/feed/#{}", update.id)) { (update.data.title) }
                                    " "
                                    (date(&update.data.date))
                                }
                            }
                        }
                    }
                }
            },
            ctx,
            None,
        )
        .into())
    }
}
