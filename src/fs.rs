//! Functions for interacting with the file system.

mod file_contents;

use crate::error::{Error, Result};
use ansi_term::Color;
use slog::debug;
use std::{fs, path::Path};

/// The name of the blank options file written by `bibnote new`.
pub const BLANK_OPTIONS_FILE: &str = "bibnote-options.ron";

/// Load a file into a string.
///
/// This function is used to load the document tree, the BibTeX library, and
/// the options file.
pub fn load_file(path: &Path) -> Result<String> {
    debug!(
        slog_scope::logger(),
        "Loading file {}...",
        path.to_string_lossy()
    );

    let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

    debug!(
        slog_scope::logger(),
        "File {} loaded.",
        path.to_string_lossy()
    );
    Ok(contents)
}

/// Save a string in a file.
pub fn save_file(path: &Path, output: &str) -> Result<()> {
    debug!(slog_scope::logger(), "Saving {}...", path.to_string_lossy());
    eprintln!(
        "{} Saving {}...",
        Color::Green.paint("INFO"),
        Color::Blue.paint(path.to_string_lossy())
    );

    fs::write(path, output).map_err(|e| Error::io(path, e))?;

    debug!(
        slog_scope::logger(),
        "File {} saved.",
        path.to_string_lossy()
    );
    Ok(())
}

/// Create a blank options file.
///
/// Creates a blank options file in `dir` that users can then fill in with
/// their own bibliography path and template. Refuses to overwrite an existing
/// file.
pub fn new_options_ron(dir: &Path) -> Result<()> {
    let path = dir.join(BLANK_OPTIONS_FILE);
    eprintln!(
        "{} Creating blank options file ({})",
        Color::Green.paint("INFO"),
        Color::Blue.paint(path.to_string_lossy())
    );

    if path.exists() {
        return Err(Error::Config(format!(
            "{} already exists",
            path.to_string_lossy()
        )));
    }

    save_file(&path, file_contents::BLANK_OPTIONS_CONTENTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;

    mod test_load_file {
        use super::*;

        #[test]
        fn test_load() {
            let load_result = load_file(Path::new("./tests/test.bib"));
            assert!(load_result.unwrap().contains("smith2020"));
        }

        #[test]
        fn fail_load() {
            let load_result = load_file(Path::new("./tests/does-not-exist.bib"));
            match load_result {
                Err(Error::Io { path, source }) => {
                    assert_eq!(path, Path::new("./tests/does-not-exist.bib"));
                    assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
                }
                other => panic!("expected an IO error, got {:?}", other),
            }
        }
    }

    mod test_blank_options {
        use super::*;

        #[test]
        fn blank_options_parse() {
            let options = Options::from_ron(file_contents::BLANK_OPTIONS_CONTENTS).unwrap();
            assert_eq!(options.template(), "apa");
            assert!(options.bibtex_file.is_some());
        }

        #[test]
        fn new_options_file() {
            let dir = std::env::temp_dir().join(format!("bibnote-new-{}", std::process::id()));
            fs::create_dir_all(&dir).unwrap();

            new_options_ron(&dir).unwrap();
            assert!(dir.join(BLANK_OPTIONS_FILE).exists());
            assert!(matches!(new_options_ron(&dir), Err(Error::Config(_))));

            fs::remove_dir_all(&dir).unwrap();
        }
    }
}
