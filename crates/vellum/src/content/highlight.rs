use std::{fmt, io::Cursor, str::FromStr, sync::OnceLock};

use log::warn;
use serde::{Deserialize, Serialize};
use syntect::{
    easy::HighlightLines,
    highlighting::{Color, Theme as SyntectTheme, ThemeSet},
    html::{IncludeBackground, styled_line_to_highlighted_html},
    parsing::SyntaxSet,
    util::LinesWithEndings,
};

use crate::errors::{ConfigError, ContentError};

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

const NORD_THEME: &str = include_str!("../../themes/nord.tmTheme");

fn get_syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn get_theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(|| {
        let mut theme_set = ThemeSet::load_defaults();

        match ThemeSet::load_from_reader(&mut Cursor::new(NORD_THEME)) {
            Ok(nord) => {
                theme_set
                    .themes
                    .insert(Theme::Nord.syntect_name().to_string(), nord);
            }
            Err(err) => warn!(target: "markdown", "Failed to load bundled Nord theme: {}", err),
        }

        theme_set
    })
}

/// Syntax highlighting themes supported for code blocks.
///
/// Themes are referred to by their kebab-case name in configuration, e.g. `theme = "nord"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Theme {
    #[default]
    Nord,
    InspiredGithub,
    SolarizedDark,
    SolarizedLight,
    Base16OceanDark,
    Base16OceanLight,
    Base16EightiesDark,
    Base16MochaDark,
}

impl Theme {
    pub const ALL: [Theme; 8] = [
        Theme::Nord,
        Theme::InspiredGithub,
        Theme::SolarizedDark,
        Theme::SolarizedLight,
        Theme::Base16OceanDark,
        Theme::Base16OceanLight,
        Theme::Base16EightiesDark,
        Theme::Base16MochaDark,
    ];

    pub const NAMES: [&'static str; 8] = [
        "nord",
        "inspired-github",
        "solarized-dark",
        "solarized-light",
        "base16-ocean-dark",
        "base16-ocean-light",
        "base16-eighties-dark",
        "base16-mocha-dark",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Theme::Nord => "nord",
            Theme::InspiredGithub => "inspired-github",
            Theme::SolarizedDark => "solarized-dark",
            Theme::SolarizedLight => "solarized-light",
            Theme::Base16OceanDark => "base16-ocean-dark",
            Theme::Base16OceanLight => "base16-ocean-light",
            Theme::Base16EightiesDark => "base16-eighties-dark",
            Theme::Base16MochaDark => "base16-mocha-dark",
        }
    }

    /// Key of the theme inside syntect's theme set.
    fn syntect_name(&self) -> &'static str {
        match self {
            Theme::Nord => "Nord",
            Theme::InspiredGithub => "InspiredGitHub",
            Theme::SolarizedDark => "Solarized (dark)",
            Theme::SolarizedLight => "Solarized (light)",
            Theme::Base16OceanDark => "base16-ocean.dark",
            Theme::Base16OceanLight => "base16-ocean.light",
            Theme::Base16EightiesDark => "base16-eighties.dark",
            Theme::Base16MochaDark => "base16-mocha.dark",
        }
    }

    pub(crate) fn load(&self) -> Result<&'static SyntectTheme, ContentError> {
        get_theme_set()
            .themes
            .get(self.syntect_name())
            .ok_or_else(|| ContentError::ThemeUnavailable(self.name().to_string()))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|theme| theme.name() == name)
            .ok_or_else(|| ConfigError::UnknownTheme {
                name: name.to_string(),
            })
    }
}

impl TryFrom<String> for Theme {
    type Error = ConfigError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<Theme> for String {
    fn from(theme: Theme) -> Self {
        theme.name().to_string()
    }
}

pub(crate) fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn css_color(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

/// A fenced or indented code block being collected from the Markdown event stream.
pub struct CodeBlock {
    pub language: Option<String>,
}

impl CodeBlock {
    /// Parses the info string following the opening fence, e.g. `rs` in ```` ```rs ````.
    ///
    /// Only the first word is used as the language, the rest of the info string is ignored.
    pub fn new(fence: &str) -> Self {
        let language = fence
            .split_whitespace()
            .next()
            .map(|lang| lang.trim_matches(|c| c == '{' || c == '}'))
            .filter(|lang| !lang.is_empty())
            .map(String::from);

        Self { language }
    }

    pub fn indented() -> Self {
        Self { language: None }
    }

    pub fn opening_html(&self, theme: &SyntectTheme, wrap: bool) -> String {
        let mut styles = Vec::new();
        if let Some(background) = theme.settings.background {
            styles.push(format!("background-color:{}", css_color(background)));
        }
        if let Some(foreground) = theme.settings.foreground {
            styles.push(format!("color:{}", css_color(foreground)));
        }
        styles.push("overflow-x:auto".to_string());
        if wrap {
            styles.push("white-space:pre-wrap".to_string());
            styles.push("word-wrap:break-word".to_string());
        }

        let language_attr = self
            .language
            .as_deref()
            .map(|lang| format!(" data-language=\"{}\"", escape_attr(lang)))
            .unwrap_or_default();

        format!(
            "<pre class=\"vellum-code\" style=\"{}\" tabindex=\"0\"{language_attr}><code{language_attr}>",
            styles.join(";")
        )
    }

    pub fn highlight(&self, content: &str, theme: &SyntectTheme) -> Result<String, syntect::Error> {
        let ss = get_syntax_set();

        let syntax = self
            .language
            .as_deref()
            .and_then(|lang| {
                ss.find_syntax_by_token(lang)
                    .or_else(|| ss.find_syntax_by_name(lang))
                    .or_else(|| ss.find_syntax_by_extension(lang))
            })
            .or_else(|| ss.find_syntax_by_first_line(content))
            .unwrap_or_else(|| ss.find_syntax_plain_text());

        let mut h = HighlightLines::new(syntax, theme);

        let mut highlighted = String::new();
        for line in LinesWithEndings::from(content) {
            let regions = h.highlight_line(line, ss)?;
            let html = styled_line_to_highlighted_html(&regions, IncludeBackground::No)?;
            highlighted.push_str(&html);
        }

        Ok(highlighted)
    }
}
