use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Sitemap settings for a single page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteSitemapMetadata {
    /// Whether to exclude this page from the sitemap
    pub exclude: Option<bool>,
    /// Change frequency for this page
    pub changefreq: Option<ChangeFreq>,
    /// Priority for this page (0.0 to 1.0)
    pub priority: Option<f32>,
    /// Last modification date, in `YYYY-MM-DD` format
    pub lastmod: Option<String>,
}

/// Options of the sitemap integration.
///
/// ## Example
/// ```toml
/// [[integrations]]
/// kind = "sitemap"
/// filename = "sitemap.xml"
/// default_changefreq = "weekly"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapOptions {
    /// The filename for the sitemap index. Default: `"sitemap.xml"`
    ///
    /// If multiple sitemaps are needed, individual sitemap files will be named `sitemap-1.xml`, `sitemap-2.xml`, etc.
    pub filename: String,
    /// Maximum number of URLs per sitemap file. Default: `10000`
    ///
    /// Search engines often ignore sitemaps with more than 50,000 URLs.
    pub max_urls_per_sitemap: usize,
    /// Default change frequency for pages. Default: `None`
    pub default_changefreq: Option<ChangeFreq>,
    /// Default priority for pages. Default: `None`
    pub default_priority: Option<f32>,
    /// Optional XSL stylesheet URL for styling the sitemap. Default: `None`
    ///
    /// If the value starts with `http(s)://` it is used as-is, otherwise it is appended to the base URL.
    pub stylesheet: Option<String>,
}

impl Default for SitemapOptions {
    fn default() -> Self {
        Self {
            filename: "sitemap.xml".to_string(),
            max_urls_per_sitemap: 10000,
            default_changefreq: None,
            default_priority: None,
            stylesheet: None,
        }
    }
}

/// Change frequency values for sitemap entries.
///
/// See: https://www.sitemaps.org/protocol.html#changefreqdef
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFreq {
    fn as_str(&self) -> &str {
        match self {
            ChangeFreq::Always => "always",
            ChangeFreq::Hourly => "hourly",
            ChangeFreq::Daily => "daily",
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
            ChangeFreq::Yearly => "yearly",
            ChangeFreq::Never => "never",
        }
    }
}

/// Represents a single URL entry in the sitemap.
#[derive(Debug)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: Option<String>,
    pub changefreq: Option<ChangeFreq>,
    pub priority: Option<f32>,
}

impl SitemapEntry {
    /// Builds the entry of a page, falling back to the sitemap defaults. Returns `None` for excluded pages.
    pub fn for_page(
        loc: String,
        metadata: RouteSitemapMetadata,
        options: &SitemapOptions,
    ) -> Option<Self> {
        if metadata.exclude == Some(true) {
            return None;
        }

        Some(Self {
            loc,
            lastmod: metadata.lastmod,
            changefreq: metadata.changefreq.or(options.default_changefreq),
            priority: metadata.priority.or(options.default_priority),
        })
    }

    fn to_xml(&self) -> String {
        let mut xml = String::from("<url>");
        xml.push_str(&format!("<loc>{}</loc>", escape_xml(&self.loc)));

        if let Some(ref lastmod) = self.lastmod {
            xml.push_str(&format!("<lastmod>{}</lastmod>", escape_xml(lastmod)));
        }

        if let Some(changefreq) = self.changefreq {
            xml.push_str(&format!("<changefreq>{}</changefreq>", changefreq.as_str()));
        }

        if let Some(priority) = self.priority {
            xml.push_str(&format!("<priority>{:.1}</priority>", priority.clamp(0.0, 1.0)));
        }

        xml.push_str("</url>");
        xml
    }
}

#[derive(Debug)]
struct SitemapReference {
    loc: String,
}

impl SitemapReference {
    fn to_xml(&self) -> String {
        format!("<sitemap><loc>{}</loc></sitemap>", escape_xml(&self.loc))
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn resolve_stylesheet_url(base_url: &str, stylesheet_path: &str) -> String {
    if stylesheet_path.starts_with("http://") || stylesheet_path.starts_with("https://") {
        stylesheet_path.to_string()
    } else {
        crate::route::absolute_url(base_url, stylesheet_path)
    }
}

fn xml_header(base_url: &str, stylesheet: Option<&str>) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

    if let Some(stylesheet_path) = stylesheet {
        let stylesheet_url = resolve_stylesheet_url(base_url, stylesheet_path);
        xml.push_str(&format!(
            "<?xml-stylesheet type=\"text/xsl\" href=\"{}\"?>\n",
            escape_xml(&stylesheet_url)
        ));
    }

    xml
}

/// Writes the sitemap of `entries` to `output_dir`, splitting it into several files behind a sitemap index when needed.
///
/// Returns the paths of the written files.
pub fn generate_sitemap(
    mut entries: Vec<SitemapEntry>,
    base_url: &str,
    output_dir: &Path,
    options: &SitemapOptions,
) -> io::Result<Vec<PathBuf>> {
    if entries.is_empty() {
        return Ok(vec![]);
    }

    entries.sort_by(|a, b| a.loc.cmp(&b.loc));
    let total_entries = entries.len();
    let stylesheet = options.stylesheet.as_deref();
    let urls_per_sitemap = options.max_urls_per_sitemap.max(1);

    if total_entries <= urls_per_sitemap {
        let path = output_dir.join(&options.filename);
        write_urlset(&entries, &path, base_url, stylesheet)?;

        log::info!(target: "sitemap", "Generated sitemap with {} URLs at {}", total_entries, path.display());
        return Ok(vec![path]);
    }

    let mut written = Vec::new();
    let mut sitemap_refs = Vec::new();

    for (i, chunk) in entries.chunks(urls_per_sitemap).enumerate() {
        let sitemap_filename = format!("sitemap-{}.xml", i + 1);
        let path = output_dir.join(&sitemap_filename);
        write_urlset(chunk, &path, base_url, stylesheet)?;

        sitemap_refs.push(SitemapReference {
            loc: crate::route::absolute_url(base_url, &sitemap_filename),
        });
        written.push(path);
    }

    let index_path = output_dir.join(&options.filename);
    let mut xml = xml_header(base_url, stylesheet);
    xml.push_str("<sitemapindex xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">");
    for sitemap in &sitemap_refs {
        xml.push_str(&sitemap.to_xml());
    }
    xml.push_str("</sitemapindex>");
    fs::write(&index_path, xml)?;

    log::info!(
        target: "sitemap",
        "Generated sitemap index with {} sitemaps ({} total URLs) at {}",
        sitemap_refs.len(),
        total_entries,
        index_path.display()
    );

    written.insert(0, index_path);
    Ok(written)
}

fn write_urlset(
    entries: &[SitemapEntry],
    path: &Path,
    base_url: &str,
    stylesheet: Option<&str>,
) -> io::Result<()> {
    let mut xml = xml_header(base_url, stylesheet);
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">");
    for entry in entries {
        xml.push_str(&entry.to_xml());
    }
    xml.push_str("</urlset>");

    fs::write(path, xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(loc: &str) -> SitemapEntry {
        SitemapEntry {
            loc: loc.to_string(),
            lastmod: None,
            changefreq: None,
            priority: None,
        }
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("hello"), "hello");
        assert_eq!(escape_xml("a&b"), "a&amp;b");
        assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
        assert_eq!(
            escape_xml("it's \"quoted\""),
            "it&apos;s &quot;quoted&quot;"
        );
    }

    #[test]
    fn test_sitemap_entry_to_xml() {
        let entry = SitemapEntry {
            loc: "https://example.com/page".to_string(),
            lastmod: Some("2024-01-01".to_string()),
            changefreq: Some(ChangeFreq::Weekly),
            priority: Some(0.8),
        };

        let xml = entry.to_xml();
        assert!(xml.contains("<loc>https://example.com/page</loc>"));
        assert!(xml.contains("<lastmod>2024-01-01</lastmod>"));
        assert!(xml.contains("<changefreq>weekly</changefreq>"));
        assert!(xml.contains("<priority>0.8</priority>"));
    }

    #[test]
    fn test_for_page_defaults_and_exclusion() {
        let options = SitemapOptions {
            default_changefreq: Some(ChangeFreq::Monthly),
            default_priority: Some(0.5),
            ..Default::default()
        };

        let page = SitemapEntry::for_page(
            "https://example.com/".into(),
            RouteSitemapMetadata {
                priority: Some(1.0),
                ..Default::default()
            },
            &options,
        )
        .unwrap();
        assert_eq!(page.changefreq, Some(ChangeFreq::Monthly));
        assert_eq!(page.priority, Some(1.0));

        let excluded = SitemapEntry::for_page(
            "https://example.com/draft/".into(),
            RouteSitemapMetadata {
                exclude: Some(true),
                ..Default::default()
            },
            &options,
        );
        assert!(excluded.is_none());
    }

    #[test]
    fn test_generate_single_sitemap_with_stylesheet() {
        let dir = tempfile::tempdir().unwrap();
        let options = SitemapOptions {
            stylesheet: Some("/sitemap.xsl?param=value&other=123".to_string()),
            ..Default::default()
        };

        let written = generate_sitemap(
            vec![entry("https://example.com/b"), entry("https://example.com/a")],
            "https://example.com",
            dir.path(),
            &options,
        )
        .unwrap();
        assert_eq!(written, vec![dir.path().join("sitemap.xml")]);

        let content = fs::read_to_string(dir.path().join("sitemap.xml")).unwrap();
        assert!(content.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(content.contains(
            "href=\"https://example.com/sitemap.xsl?param=value&amp;other=123\""
        ));
        let a = content.find("https://example.com/a").unwrap();
        let b = content.find("https://example.com/b").unwrap();
        assert!(a < b, "entries should be sorted by URL");
    }

    #[test]
    fn test_generate_sitemap_index_when_over_limit() {
        let dir = tempfile::tempdir().unwrap();
        let options = SitemapOptions {
            max_urls_per_sitemap: 2,
            ..Default::default()
        };
        let entries = (0..5)
            .map(|i| entry(&format!("https://example.com/{}", i)))
            .collect();

        let written =
            generate_sitemap(entries, "https://example.com/", dir.path(), &options).unwrap();
        assert_eq!(written.len(), 4);

        let index = fs::read_to_string(dir.path().join("sitemap.xml")).unwrap();
        assert!(index.contains("<sitemapindex"));
        assert!(index.contains("<loc>https://example.com/sitemap-1.xml</loc>"));
        assert!(index.contains("<loc>https://example.com/sitemap-3.xml</loc>"));
        assert!(!dir.path().join("sitemap-4.xml").exists());
    }

    #[test]
    fn test_no_entries_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let written = generate_sitemap(
            vec![],
            "https://example.com",
            dir.path(),
            &SitemapOptions::default(),
        )
        .unwrap();

        assert!(written.is_empty());
        assert!(!dir.path().join("sitemap.xml").exists());
    }

    #[test]
    fn test_options_from_toml() {
        let options: SitemapOptions =
            toml::from_str("default_changefreq = \"weekly\"\nstylesheet = \"/sitemap.xsl\"")
                .unwrap();

        assert_eq!(options.default_changefreq, Some(ChangeFreq::Weekly));
        assert_eq!(options.filename, "sitemap.xml");
    }
}
