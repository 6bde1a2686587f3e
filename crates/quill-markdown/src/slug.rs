use std::collections::{HashMap, HashSet};

/// Convert text to URL-safe slug.
///
/// Converts to lowercase, replaces whitespace/dashes/underscores with single dashes,
/// and removes other non-alphanumeric characters.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true; // Prevents leading dash

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Hands out unique slugs within one document.
///
/// The first occurrence of a slug is returned unchanged, later ones get a
/// `-N` suffix counting previous occurrences. A suffixed slug that was
/// already issued is bumped until it is free.
#[derive(Debug, Default)]
pub(crate) struct Slugger {
    counts: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl Slugger {
    /// Return `(slug, seen)` where `seen` is how often the base slug occurred before.
    pub(crate) fn unique(&mut self, text: &str) -> (String, usize) {
        let base = slugify(text);
        let count = self.counts.entry(base.clone()).or_default();
        let seen = *count;
        *count += 1;
        let mut n = seen;
        let mut slug = match n {
            0 => base.clone(),
            n => format!("{base}-{n}"),
        };
        while self.issued.contains(&slug) {
            n += 1;
            slug = format!("{base}-{n}");
        }
        self.issued.insert(slug.clone());
        (slug, seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("What's New?"), "whats-new");
        assert_eq!(slugify("  Spaces  "), "spaces");
        assert_eq!(slugify("Multiple   Spaces"), "multiple-spaces");
        assert_eq!(slugify("kebab-case"), "kebab-case");
        assert_eq!(slugify("snake_case"), "snake-case");
    }

    #[test]
    fn test_slugify_unicode() {
        assert_eq!(slugify("Über Café"), "über-café");
    }

    #[test]
    fn test_slugger_deduplicates() {
        let mut slugger = Slugger::default();

        assert_eq!(slugger.unique("FAQ"), ("faq".to_owned(), 0));
        assert_eq!(slugger.unique("FAQ"), ("faq-1".to_owned(), 1));
        assert_eq!(slugger.unique("faq"), ("faq-2".to_owned(), 2));
        assert_eq!(slugger.unique("Other"), ("other".to_owned(), 0));
    }

    #[test]
    fn test_slugger_skips_issued_suffixes() {
        let mut slugger = Slugger::default();

        assert_eq!(slugger.unique("FAQ").0, "faq");
        assert_eq!(slugger.unique("FAQ").0, "faq-1");
        assert_eq!(slugger.unique("FAQ 1"), ("faq-1-1".to_owned(), 0));
        assert_eq!(slugger.unique("FAQ 2").0, "faq-2");
        assert_eq!(slugger.unique("FAQ"), ("faq-3".to_owned(), 2));
    }
}
