//! The structures and functions for configuration. Must be accessible to main.

use crate::bibliography::style::{Style, DEFAULT_TEMPLATE};
use crate::error::{Error, Result};
use crate::fs::load_file;
use serde::Deserialize;
use slog::debug;
use std::path::{Path, PathBuf};

/// The overall options for a command-line run.
pub struct BibnoteConfig<'a> {
    pub command: BibnoteCommand<'a>,
    pub output: Output<'a>,
    pub options: Options,
}

impl BibnoteConfig<'_> {
    pub fn new<'a>(
        command: BibnoteCommand<'a>,
        output: Output<'a>,
        options: Options,
    ) -> BibnoteConfig<'a> {
        BibnoteConfig {
            command,
            output,
            options,
        }
    }
}

/// The types of subcommands.
pub enum BibnoteCommand<'a> {
    /// Resolve the citations in the document tree at this path.
    Resolve(&'a Path),
    /// Write a blank options file.
    NewOptionsFile,
}

/// Output options
#[derive(PartialEq, Eq, Debug)]
pub enum Output<'a> {
    StandardOut,
    File(&'a Path),
}

/// Options for resolving citations.
///
/// These can be read from a RON file. `bibtex_file` is required by the time
/// citations are resolved; `template` falls back to `"apa"`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct Options {
    #[serde(default, alias = "bibtexFile")]
    pub bibtex_file: Option<PathBuf>,
    #[serde(default)]
    pub template: Option<String>,
}

impl Options {
    pub fn new(bibtex_file: Option<PathBuf>, template: Option<String>) -> Options {
        Options {
            bibtex_file,
            template,
        }
    }

    /// Deserialize options from a RON string.
    pub fn from_ron(input: &str) -> Result<Options> {
        match ron::de::from_str(input) {
            Ok(o) => {
                debug!(slog_scope::logger(), "Options file parsed");
                Ok(o)
            }
            Err(e) => Err(Error::Config(format!(
                "error deserializing the options file: {}",
                e
            ))),
        }
    }

    /// Read options from a RON file.
    pub fn from_ron_file(path: &Path) -> Result<Options> {
        Options::from_ron(&load_file(path)?)
    }

    /// Fill any option missing here from `other`.
    pub fn or(self, other: Options) -> Options {
        Options {
            bibtex_file: self.bibtex_file.or(other.bibtex_file),
            template: self.template.or(other.template),
        }
    }

    /// The template name, or the default.
    pub fn template(&self) -> &str {
        self.template.as_deref().unwrap_or(DEFAULT_TEMPLATE)
    }

    /// Check the options, returning the bibliography path.
    ///
    /// Fails if no bibliography path was given or the template is unknown.
    pub fn validate(&self) -> Result<&Path> {
        let bibtex_file = self.bibtex_file.as_deref().ok_or_else(|| {
            Error::Config(
                "the options require a bibtex_file with a path to the .bib file".to_string(),
            )
        })?;
        Style::from_template(self.template())?;
        Ok(bibtex_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_ron() {
        let options = Options::from_ron(
            r#"(
    bibtex_file: Some("refs/library.bib"),
    template: Some("vancouver"),
)"#,
        )
        .unwrap();

        assert_eq!(options.bibtex_file, Some(PathBuf::from("refs/library.bib")));
        assert_eq!(options.template(), "vancouver");
    }

    #[test]
    fn from_ron_alias_and_defaults() {
        let options = Options::from_ron(r#"(bibtexFile: Some("a.bib"))"#).unwrap();
        assert_eq!(options.bibtex_file, Some(PathBuf::from("a.bib")));
        assert_eq!(options.template(), "apa");
    }

    #[test]
    fn from_ron_error() {
        assert!(matches!(
            Options::from_ron("(bibtex_file: 12)"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn or_prefers_self() {
        let cli = Options::new(None, Some("harvard1".to_string()));
        let file = Options::new(Some(PathBuf::from("f.bib")), Some("apa".to_string()));
        let merged = cli.or(file);

        assert_eq!(merged.bibtex_file, Some(PathBuf::from("f.bib")));
        assert_eq!(merged.template(), "harvard1");
    }

    #[test]
    fn validate_missing_file() {
        let err = Options::default().validate().unwrap_err();
        assert!(matches!(err, Error::Config(m) if m.contains("bibtex_file")));
    }

    #[test]
    fn validate_bad_template() {
        let options = Options::new(Some(PathBuf::from("a.bib")), Some("nope".to_string()));
        assert!(matches!(options.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn validate_ok() {
        let options = Options::new(Some(PathBuf::from("a.bib")), None);
        assert_eq!(options.validate().unwrap(), Path::new("a.bib"));
    }
}
