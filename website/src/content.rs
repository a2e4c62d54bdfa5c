use serde::Deserialize;
use vellum::collections;
use vellum::content::{Collections, Date, Text, Url};

#[derive(Debug, Deserialize)]
pub struct BlogPost {
    pub title: Text,
    pub published: Date,
    pub excerpt: Text,
    pub tags: Vec<Text>,
    /// Unlisted posts are still published at their URL, but hidden from listings and the sitemap.
    pub listed: bool,
}

#[derive(Debug, Deserialize)]
pub struct Package {
    pub title: Text,
    pub description: Text,
    pub url: Url,
    /// Position in the list of packages.
    pub number: f64,
}

#[derive(Debug, Deserialize)]
pub struct Project {
    pub title: Text,
    pub description: Text,
    pub url: Url,
    pub number: f64,
}

#[derive(Debug, Deserialize)]
pub struct FeedItem {
    pub title: Text,
    pub date: Date,
    pub tags: Vec<Text>,
    pub excerpt: Text,
}

#[derive(Debug, Deserialize)]
pub struct Talk {
    pub title: Text,
    pub description: Text,
    pub date: Date,
    pub url: Url,
}

pub fn collections() -> Collections {
    collections![
        "blog" => BlogPost,
        "packages" => Package,
        "projects" => Project,
        "feed" => FeedItem,
        "talks" => Talk,
    ]
}
