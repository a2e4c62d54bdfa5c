use maud::html;
use vellum::route::prelude::*;

use crate::layout::{SeoMeta, layout};

pub struct NotFound;

impl Route for NotFound {
    fn route_raw(&self) -> &str {
        "/404.html"
    }

    fn render(&self, ctx: &PageContext) -> Result<RenderResult, VellumError> {
        Ok(layout(
            html! {
                h1 { "404 - Not Found" }
                p { "There's nothing here." }
                a href="/" { "Go back home" }
            },
            ctx,
            Some(SeoMeta::new("Page Not Found", "There's nothing here.")),
        )
        .into())
    }
}
