use std::path::PathBuf;

use glob::glob as glob_fs;
use log::warn;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::{
    Entry,
    highlight::{CodeBlock, Theme},
    slugger::Slugger,
};
use crate::errors::{ContentError, EntryError};

/// Options applied when rendering Markdown to HTML.
///
/// ## Example
/// ```toml
/// [markdown]
/// theme = "nord"
/// wrap = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownOptions {
    /// Syntax highlighting theme used for fenced code blocks.
    pub theme: Theme,
    /// Whether long lines in code blocks wrap instead of scrolling horizontally.
    pub wrap: bool,
}

/// Represents a Markdown heading.
///
/// Can be used to generate a table of contents, the `id` matches the one set on the rendered heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownHeading {
    pub title: String,
    pub id: String,
    pub level: u8,
    pub classes: Vec<String>,
}

/// Parser options for an entry body, whose front-matter was already split off. A leading `---` there is a thematic break.
fn body_parser_options() -> Options {
    Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM
}

fn document_parser_options() -> Options {
    body_parser_options() | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS
}

/// Splits a Markdown document into its YAML front-matter and its body.
///
/// The front-matter must open on the first line with `---` and close with `---` or `...`.
/// Documents without (or with an unterminated) front-matter return an empty front-matter and the whole source as body.
pub fn split_frontmatter(source: &str) -> (String, &str) {
    let mut lines = source.split_inclusive('\n');

    match lines.next() {
        Some(first) if first.trim_end() == "---" => {
            let mut offset = first.len();
            let mut frontmatter = String::new();

            for line in lines {
                offset += line.len();
                if matches!(line.trim_end(), "---" | "...") {
                    let body = source[offset..].trim_start_matches(['\r', '\n']);
                    return (frontmatter, body);
                }
                frontmatter.push_str(line);
            }

            (String::new(), source)
        }
        _ => (String::new(), source),
    }
}

/// Parses a single Markdown document into a typed [`Entry`], validating its front-matter against `T`.
///
/// ## Example
/// ```rs
/// use vellum::content::parse_entry;
///
/// #[derive(serde::Deserialize)]
/// struct Note {
///     title: String,
/// }
///
/// let entry = parse_entry::<Note>("notes", "hello", "---\ntitle: Hello\n---\n# Hi").unwrap();
/// assert_eq!(entry.data.title, "Hello");
/// ```
pub fn parse_entry<T>(collection: &str, id: &str, source: &str) -> Result<Entry<T>, EntryError>
where
    T: DeserializeOwned,
{
    let (frontmatter, body) = split_frontmatter(source);

    // An absent or empty front-matter is an empty mapping, so missing fields are reported by name.
    let frontmatter = if frontmatter.trim().is_empty() {
        "{}"
    } else {
        frontmatter.as_str()
    };

    let data = serde_yaml::from_str::<T>(frontmatter).map_err(|err| {
        let message = err.to_string();
        EntryError {
            collection: collection.to_string(),
            entry: id.to_string(),
            field: field_from_message(&message),
            message,
        }
    })?;

    let mut events: Vec<Event> = Parser::new_ext(body, body_parser_options()).collect();
    let headings = assign_heading_ids(&mut events);

    Ok(Entry {
        id: id.to_string(),
        data,
        body: body.to_string(),
        headings,
        file_path: None,
    })
}

/// Extracts the offending field from a serde_yaml error message.
///
/// serde_yaml reports missing fields as ``missing field `name` `` and nested failures prefixed with their path, e.g. `tags[0]: invalid type`.
fn field_from_message(message: &str) -> Option<String> {
    if let Some(rest) = message.strip_prefix("missing field `") {
        return rest.split('`').next().map(String::from);
    }

    let (path, _) = message.split_once(": ")?;
    let is_path = !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '[' | ']'));

    is_path.then(|| {
        path.split(['.', '['])
            .next()
            .unwrap_or(path)
            .to_string()
    })
}

/// Glob for Markdown files and parse each one as an entry of `collection`.
///
/// Every file is validated, and all failures are reported together.
pub fn glob_markdown<T>(collection: &str, pattern: &str) -> Result<Vec<Entry<T>>, ContentError>
where
    T: DeserializeOwned,
{
    let paths = glob_fs(pattern).map_err(|source| ContentError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut entries = vec![];
    let mut errors = vec![];

    for path in paths {
        let path: PathBuf = match path {
            Ok(path) => path,
            Err(err) => {
                return Err(ContentError::ReadFailed {
                    path: err.path().to_path_buf(),
                    source: err.into_error(),
                });
            }
        };

        if path.extension().is_some_and(|extension| extension != "md") {
            warn!(target: "content", "Skipping {}, only Markdown files are supported", path.display());
            continue;
        }

        let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) else {
            warn!(target: "content", "Skipping {}, its name is not valid UTF-8", path.display());
            continue;
        };

        let source = std::fs::read_to_string(&path).map_err(|source| ContentError::ReadFailed {
            path: path.clone(),
            source,
        })?;

        match parse_entry::<T>(collection, id, &source) {
            Ok(mut entry) => {
                entry.file_path = Some(path);
                entries.push(entry);
            }
            Err(err) => errors.push(err),
        }
    }

    if !errors.is_empty() {
        return Err(ContentError::Invalid(errors));
    }

    entries.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(entries)
}

fn get_text_from_events(events: &[Event]) -> String {
    let mut title = String::new();

    for event in events.iter() {
        match event {
            Event::Text(text) | Event::Code(text) => title += text,
            _ => continue,
        }
    }

    title
}

/// Gives every heading without an explicit `{#id}` a unique slug id, and returns the document's headings.
fn assign_heading_ids(events: &mut [Event]) -> Vec<MarkdownHeading> {
    let mut slugger = Slugger::new();
    let mut headings = vec![];

    for event in events.iter() {
        if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
            slugger.reserve(id);
        }
    }

    let mut i = 0;
    while i < events.len() {
        if !matches!(events[i], Event::Start(Tag::Heading { .. })) {
            i += 1;
            continue;
        }

        let end = events[i + 1..]
            .iter()
            .position(|event| matches!(event, Event::End(TagEnd::Heading(_))))
            .map(|offset| i + 1 + offset)
            .unwrap_or(events.len());
        let title = get_text_from_events(&events[i + 1..end]);

        if let Event::Start(Tag::Heading {
            level, id, classes, ..
        }) = &mut events[i]
        {
            let heading_id = match id.as_ref() {
                Some(explicit) => explicit.to_string(),
                None => {
                    let slug = slugger.slugify(&title);
                    *id = Some(CowStr::from(slug.clone()));
                    slug
                }
            };

            headings.push(MarkdownHeading {
                title,
                id: heading_id,
                level: *level as u8,
                classes: classes.iter().map(|c| c.to_string()).collect(),
            });
        }

        i = end;
    }

    headings
}

/// Render Markdown content to HTML, highlighting code blocks with the configured theme.
///
/// Front-matter, if any, is skipped.
///
/// ## Example
/// ```rs
/// use vellum::content::{render_markdown, MarkdownOptions};
///
/// let html = render_markdown("# Hello, world!", &MarkdownOptions::default()).unwrap();
/// assert!(html.contains("<h1 id=\"hello-world\">"));
/// ```
pub fn render_markdown(content: &str, options: &MarkdownOptions) -> Result<String, ContentError> {
    render_events(Parser::new_ext(content, document_parser_options()), options)
}

/// Render the body of an entry, i.e. Markdown without front-matter.
pub(crate) fn render_body(body: &str, options: &MarkdownOptions) -> Result<String, ContentError> {
    render_events(Parser::new_ext(body, body_parser_options()), options)
}

fn render_events<'a>(
    parser: impl Iterator<Item = Event<'a>>,
    options: &MarkdownOptions,
) -> Result<String, ContentError> {
    let theme = options.theme.load()?;

    let mut code_block: Option<CodeBlock> = None;
    let mut code_block_content = String::new();
    let mut in_frontmatter = false;
    let mut events = Vec::new();

    for event in parser {
        match event {
            Event::Start(Tag::MetadataBlock(_)) => in_frontmatter = true,
            Event::End(TagEnd::MetadataBlock(_)) => in_frontmatter = false,
            _ if in_frontmatter => {}
            Event::Start(Tag::CodeBlock(kind)) => {
                code_block = Some(match kind {
                    CodeBlockKind::Fenced(fence) => CodeBlock::new(&fence),
                    CodeBlockKind::Indented => CodeBlock::indented(),
                });
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(block) = code_block.take() {
                    let mut html = block.opening_html(theme, options.wrap);
                    html.push_str(&block.highlight(&code_block_content, theme)?);
                    html.push_str("</code></pre>\n");
                    events.push(Event::Html(html.into()));
                }
                code_block_content.clear();
            }
            Event::Text(text) if code_block.is_some() => code_block_content.push_str(&text),
            _ => events.push(event),
        }
    }

    assign_heading_ids(&mut events);

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, events.into_iter());
    Ok(html_output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize, Debug)]
    struct Note {
        title: String,
        #[serde(default)]
        tags: Vec<String>,
    }

    #[test]
    fn test_split_frontmatter() {
        let source = "---\ntitle: Hello\n---\n\n# Body\n";
        let (frontmatter, body) = split_frontmatter(source);

        assert_eq!(frontmatter.trim(), "title: Hello");
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_split_without_frontmatter() {
        let source = "# Just a body\n\n---\n\nwith a rule";
        let (frontmatter, body) = split_frontmatter(source);

        assert!(frontmatter.is_empty());
        assert_eq!(body, source);
    }

    #[test]
    fn test_parse_entry_collects_headings() {
        let source = "---\ntitle: Notes\n---\n# Intro\n\n## Details {#custom}\n\n## Intro\n";
        let entry = parse_entry::<Note>("notes", "notes", source).unwrap();

        assert_eq!(entry.data.title, "Notes");
        let ids: Vec<&str> = entry.headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["intro", "custom", "intro-1"]);
        assert_eq!(entry.headings[1].level, 2);
    }

    #[test]
    fn test_parse_entry_missing_frontmatter_names_field() {
        let err = parse_entry::<Note>("notes", "empty", "no front-matter here").unwrap_err();

        assert_eq!(err.collection, "notes");
        assert_eq!(err.entry, "empty");
        assert_eq!(err.field.as_deref(), Some("title"));
    }

    #[test]
    fn test_parse_entry_wrong_type_names_field() {
        let err = parse_entry::<Note>("notes", "bad", "---\ntitle: Hi\ntags: intro\n---\n")
            .unwrap_err();

        assert_eq!(err.field.as_deref(), Some("tags"));
        assert!(err.to_string().starts_with("[notes] bad: "));
    }

    #[test]
    fn test_field_from_message() {
        assert_eq!(
            field_from_message("missing field `excerpt`").as_deref(),
            Some("excerpt")
        );
        assert_eq!(
            field_from_message("tags[0]: invalid type: sequence, expected a string at line 2")
                .as_deref(),
            Some("tags")
        );
        assert_eq!(
            field_from_message("invalid type: unit value, expected struct Note"),
            None
        );
    }

    #[test]
    fn test_render_heading_ids_match_entry_headings() {
        let source = "---\ntitle: Notes\n---\n# Hello, world!\n\n# Hello, world!\n";
        let entry = parse_entry::<Note>("notes", "notes", source).unwrap();
        let html = render_markdown(source, &MarkdownOptions::default()).unwrap();

        for heading in &entry.headings {
            assert!(html.contains(&format!("id=\"{}\"", heading.id)));
        }
        assert!(!html.contains("title: Notes"));
    }

    #[test]
    fn test_entry_body_keeps_leading_rule() {
        let source = "---\ntitle: Notes\n---\n---\nkey: visible text\n---\nAfter\n";
        let entry = parse_entry::<Note>("notes", "notes", source).unwrap();
        let html = entry.render(&MarkdownOptions::default()).unwrap();

        assert!(html.contains("<hr />"));
        assert!(html.contains("visible text"));
        assert!(html.contains("<p>After</p>"));
        assert_eq!(entry.headings.len(), 1);
        assert_eq!(entry.headings[0].title, "key: visible text");
    }

    #[test]
    fn test_generated_ids_avoid_explicit_ones() {
        let source = "---\ntitle: Notes\n---\n## A {#intro}\n\n# Intro\n";
        let entry = parse_entry::<Note>("notes", "notes", source).unwrap();
        let ids: Vec<&str> = entry.headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["intro", "intro-1"]);

        let html = entry.render(&MarkdownOptions::default()).unwrap();
        assert!(html.contains("<h2 id=\"intro\">"));
        assert!(html.contains("<h1 id=\"intro-1\">"));
    }

    #[test]
    fn test_render_highlights_code_blocks() {
        let markdown = "```rust\nfn main() {}\n```\n";
        let options = MarkdownOptions {
            theme: Theme::Nord,
            wrap: true,
        };
        let html = render_markdown(markdown, &options).unwrap();

        assert!(html.contains("<pre class=\"vellum-code\""));
        assert!(html.contains("white-space:pre-wrap"));
        assert!(html.contains("data-language=\"rust\""));
        assert!(html.contains("</code></pre>"));
        assert!(html.contains("<span"));
    }

    #[test]
    fn test_render_indented_code_block() {
        let html = render_markdown("    let x = 1;\n", &MarkdownOptions::default()).unwrap();

        assert!(html.contains("<pre class=\"vellum-code\""));
        assert!(!html.contains("data-language"));
        assert!(html.contains("let x = 1;"));
    }

    #[test]
    fn test_glob_markdown_reports_every_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.md"), "---\ntitle: Good\n---\n").unwrap();
        std::fs::write(dir.path().join("bad-one.md"), "---\ntags: []\n---\n").unwrap();
        std::fs::write(dir.path().join("bad-two.md"), "# no front-matter\n").unwrap();

        let pattern = dir.path().join("*.md");
        let err = glob_markdown::<Note>("notes", &pattern.to_string_lossy())
            .err()
            .unwrap();

        let errors = match err {
            ContentError::Invalid(errors) => errors,
            other => panic!("expected validation errors, got {other}"),
        };
        let mut entries: Vec<&str> = errors.iter().map(|e| e.entry.as_str()).collect();
        entries.sort();
        assert_eq!(entries, vec!["bad-one", "bad-two"]);
    }

    #[test]
    fn test_glob_markdown_sorted_with_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.md"), "---\ntitle: B\n---\n").unwrap();
        std::fs::write(dir.path().join("a.md"), "---\ntitle: A\n---\n").unwrap();

        let pattern = dir.path().join("*.md");
        let entries = glob_markdown::<Note>("notes", &pattern.to_string_lossy()).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "a");
        assert_eq!(entries[1].data.title, "B");
        assert!(entries[0].file_path.as_ref().unwrap().ends_with("a.md"));
    }
}
