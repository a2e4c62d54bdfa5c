use maud::{Markup, PreEscaped, Render, html};

use crate::{GENERATOR, content::Text, route::RenderResult};

/// Can be used to create a generator tag in the output HTML. See [`GENERATOR`](crate::GENERATOR).
pub fn generator() -> Markup {
    html! {
        meta name="generator" content=(GENERATOR);
    }
}

/// Canonical link of the current page, if the site has a base URL.
pub fn canonical(url: Option<&str>) -> Markup {
    html! {
        @if let Some(url) = url {
            link rel="canonical" href=(url);
        }
    }
}

/// Inserts HTML rendered from Markdown, which is already escaped.
pub fn markdown(html: String) -> PreEscaped<String> {
    PreEscaped(html)
}

impl Render for Text {
    fn render_to(&self, buffer: &mut String) {
        self.as_str().render_to(buffer);
    }
}

impl From<maud::Markup> for RenderResult {
    fn from(val: maud::Markup) -> Self {
        RenderResult::Text(val.into_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_tag() {
        let tag = generator().into_string();
        assert!(tag.starts_with("<meta name=\"generator\" content=\"Vellum v"));
    }

    #[test]
    fn test_canonical() {
        assert_eq!(
            canonical(Some("https://example.com/blog/")).into_string(),
            "<link rel=\"canonical\" href=\"https://example.com/blog/\">"
        );
        assert_eq!(canonical(None).into_string(), "");
    }

    #[test]
    fn test_text_is_escaped() {
        let title = Text::from("Fish & <chips>");
        assert_eq!(
            html! { h1 { (title) } }.into_string(),
            "<h1>Fish &amp; &lt;chips&gt;</h1>"
        );
    }

    #[test]
    fn test_markup_into_render_result() {
        let result: RenderResult = html! { h1 { "Hi" } }.into();
        assert_eq!(result.into_bytes(), b"<h1>Hi</h1>");
    }
}
