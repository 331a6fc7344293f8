//! The bibliography service.
//!
//! The resolver only needs one thing from a bibliography: turn a citation key
//! into display text in a given style. [`Bibliography`] is that seam.
//! [`BibtexLibrary`] is the implementation backed by a `.bib` file.

pub mod bibtex;
mod latex;
mod names;
pub mod style;

use crate::error::{Error, Result};
use bibtex::Entry;
use slog::{debug, warn};
use std::collections::HashMap;
use style::Style;

/// Formats citation keys as bibliography text.
pub trait Bibliography {
    /// Format the entry for `key` using the style called `template`.
    ///
    /// Fails with [`Error::Format`] if there is no entry for `key`.
    fn format(&self, key: &str, template: &str) -> Result<String>;
}

/// Entries that are already formatted. The template is ignored.
impl Bibliography for HashMap<String, String> {
    fn format(&self, key: &str, _template: &str) -> Result<String> {
        self.get(key).cloned().ok_or_else(|| Error::Format {
            key: key.to_string(),
        })
    }
}

/// A bibliography parsed from BibTeX source.
#[derive(Debug, Default)]
pub struct BibtexLibrary {
    entries: HashMap<String, Entry>,
}

impl BibtexLibrary {
    /// Parse a BibTeX source string.
    pub fn parse(source: &str) -> Result<BibtexLibrary> {
        debug!(slog_scope::logger(), "Building the BibTeX library...");
        let entries = bibtex::parse_bibtex(source)?;

        let mut library = BibtexLibrary::default();
        for entry in entries {
            if library.entries.contains_key(&entry.key) {
                warn!(
                    slog_scope::logger(),
                    "Repeated entry {}; keeping the first",
                    entry.key
                );
                continue;
            }
            library.entries.insert(entry.key.clone(), entry);
        }

        debug!(
            slog_scope::logger(),
            "BibTeX library built with {} entries",
            library.entries.len()
        );
        Ok(library)
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Bibliography for BibtexLibrary {
    fn format(&self, key: &str, template: &str) -> Result<String> {
        let style = Style::from_template(template)?;
        let entry = self.get(key).ok_or_else(|| Error::Format {
            key: key.to_string(),
        })?;
        Ok(style.format(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BIB: &str = r#"
@book{smith2020,
  author = {Smith, John},
  title = {A Book},
  publisher = {Press},
  year = 2020,
}

@book{smith2020,
  author = {Someone Else},
  title = {Shadowed},
  year = 1999,
}
"#;

    #[test]
    fn repeated_keys_keep_first() {
        let library = BibtexLibrary::parse(BIB).unwrap();
        assert_eq!(library.len(), 1);
        assert_eq!(library.get("smith2020").unwrap().field("title"), Some("A Book"));
    }

    #[test]
    fn format_known_key() {
        let library = BibtexLibrary::parse(BIB).unwrap();
        assert_eq!(
            library.format("smith2020", "apa").unwrap(),
            "Smith, J. (2020). A Book. Press."
        );
    }

    #[test]
    fn format_unknown_key() {
        let library = BibtexLibrary::parse(BIB).unwrap();
        let err = library.format("nobody", "apa").unwrap_err();
        assert!(matches!(err, Error::Format { key } if key == "nobody"));
    }

    #[test]
    fn format_unknown_template() {
        let library = BibtexLibrary::parse(BIB).unwrap();
        let err = library.format("smith2020", "chicago").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
