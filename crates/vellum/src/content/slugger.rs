use rustc_hash::FxHashSet;
use slug::slugify;

/// Generates unique slugs for the headings of a single document.
#[derive(Default)]
pub struct Slugger {
    generated_slugs: FxHashSet<String>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slugify(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut slug = base.clone();
        let mut counter = 1;
        while self.generated_slugs.contains(&slug) {
            slug = format!("{}-{}", base, counter);
            counter += 1;
        }
        self.generated_slugs.insert(slug.clone());
        slug
    }

    /// Marks an id as taken, e.g. one set explicitly with `{#id}`, so generated slugs never collide with it.
    pub fn reserve(&mut self, id: &str) {
        self.generated_slugs.insert(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_headings_get_suffixes() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slugify("Getting Started"), "getting-started");
        assert_eq!(slugger.slugify("Getting Started"), "getting-started-1");
        assert_eq!(slugger.slugify("Getting Started"), "getting-started-2");
    }

    #[test]
    fn test_reserved_ids_are_skipped() {
        let mut slugger = Slugger::new();
        slugger.reserve("intro");
        assert_eq!(slugger.slugify("Intro"), "intro-1");
    }
}
