//! Field types for collection schemas that need more validation than their plain Rust counterpart.
//!
//! Every type here only accepts a YAML string. serde_yaml hands the text of a plain scalar to a
//! `String` field, so `title: 123` would otherwise pass as `"123"`.
use std::{fmt, marker::PhantomData, ops::Deref, str::FromStr};

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// A field type read from a YAML string and nothing else.
trait FromYamlString: Sized {
    const EXPECTING: &'static str;

    fn from_yaml_str(value: &str) -> Result<Self, String>;
}

struct StringVisitor<T>(PhantomData<T>);

impl<T: FromYamlString> de::Visitor<'_> for StringVisitor<T> {
    type Value = T;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(T::EXPECTING)
    }

    // Numbers, booleans, null and collections fall through to the default `invalid_type` errors.
    fn visit_str<E: de::Error>(self, value: &str) -> Result<T, E> {
        T::from_yaml_str(value).map_err(E::custom)
    }
}

// `deserialize_any` lets the format report a scalar's resolved type, and keeps errors raised
// here attached to the field's path.
fn deserialize_yaml_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromYamlString,
{
    deserializer.deserialize_any(StringVisitor(PhantomData))
}

/// A front-matter text field. Unlike `String`, a number or boolean is a type error.
///
/// ## Example
/// ```rs
/// #[derive(Deserialize)]
/// pub struct Note {
///   pub title: vellum::content::Text,
///   #[serde(default)]
///   pub tags: Vec<vellum::content::Text>,
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Text(String);

impl Text {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for Text {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Text {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Text {
    fn from(value: String) -> Self {
        Text(value)
    }
}

impl From<&str> for Text {
    fn from(value: &str) -> Self {
        Text(value.to_string())
    }
}

impl From<Text> for String {
    fn from(value: Text) -> Self {
        value.0
    }
}

impl PartialEq<str> for Text {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromYamlString for Text {
    const EXPECTING: &'static str = "a string";

    fn from_yaml_str(value: &str) -> Result<Self, String> {
        Ok(Text(value.to_string()))
    }
}

impl<'de> Deserialize<'de> for Text {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_yaml_string(deserializer)
    }
}

impl Serialize for Text {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// A front-matter field that must contain a well-formed, absolute URL.
///
/// ## Example
/// ```rs
/// #[derive(Deserialize)]
/// pub struct Package {
///   pub title: vellum::content::Text,
///   pub url: vellum::content::Url,
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Url(url::Url);

impl Url {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }
}

impl FromStr for Url {
    type Err = url::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        url::Url::parse(s).map(Url)
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Url {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_yaml_string(deserializer)
    }
}

impl FromYamlString for Url {
    const EXPECTING: &'static str = "a URL string";

    fn from_yaml_str(value: &str) -> Result<Self, String> {
        value
            .parse()
            .map_err(|err| format!("invalid URL `{}`: {}", value, err))
    }
}

impl Serialize for Url {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A front-matter date, written either as `2024-01-01` or as an RFC 3339 timestamp.
///
/// Timestamps are reduced to their calendar date in the timezone they were written in.
/// YAML resolves `2024-01-01` and `"2024-01-01"` to the same string, so both are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(NaiveDate);

impl Date {
    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    /// Formats the date with a [`chrono` format string](chrono::format::strftime).
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

impl FromStr for Date {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(date) => Ok(Date(date)),
            Err(err) => DateTime::parse_from_rfc3339(s)
                .map(|datetime| Date(datetime.date_naive()))
                .map_err(|_| err),
        }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_yaml_string(deserializer)
    }
}

impl FromYamlString for Date {
    const EXPECTING: &'static str = "a date such as 2024-01-01";

    fn from_yaml_str(value: &str) -> Result<Self, String> {
        value
            .parse()
            .map_err(|err| format!("invalid date `{}`: {}", value, err))
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
