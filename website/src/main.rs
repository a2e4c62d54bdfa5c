use vellum::{BuildOutput, SiteConfig, publish, routes};

mod content;
mod layout;
mod routes;

use routes::*;

fn main() -> Result<BuildOutput, Box<dyn std::error::Error>> {
    let config = SiteConfig::load("site.toml")?.with_env_overrides()?;

    Ok(publish(
        routes![
            Index,
            BlogIndex,
            BlogPostPage,
            FeedIndex,
            PackagesIndex,
            ProjectsIndex,
            TalksIndex,
            NotFound
        ],
        content::collections(),
        config.into(),
    )?)
}
