//! Turns inline citation markers into numbered footnotes.
//!
//! A marker such as `(@smith2020)` in a text node of an mdast-style document
//! tree becomes a footnote reference, and a footnote definition holding the
//! formatted bibliography entry for `smith2020` is appended to the document.
//! Footnotes the author already wrote keep their identifiers; new ones are
//! numbered around them.

pub mod bibliography;
pub mod config;
pub mod error;
mod fs;
pub mod resolve;
pub mod tree;

use ansi_term::Color;
use bibliography::BibtexLibrary;
use config::{BibnoteCommand, BibnoteConfig, Options, Output};
use error::Result;
use fs::load_file;
use slog::{debug, o};
use std::path::Path;
use tree::Node;

pub use error::Error;

/// Resolve the citation markers in `tree` against the options' BibTeX file.
///
/// The options are checked before anything is read. The tree is changed in
/// place and returned; on error it is left as it was.
pub fn cite_footnotes<'t>(options: &Options, tree: &'t mut Node) -> Result<&'t mut Node> {
    let bibtex_file = options.validate()?;
    let template = options.template();

    let source = slog_scope::scope(
        &slog_scope::logger().new(o!("fn" => "load_file()")),
        || load_file(bibtex_file),
    )?;

    let library = slog_scope::scope(
        &slog_scope::logger().new(o!("fn" => "BibtexLibrary::parse()")),
        || BibtexLibrary::parse(&source),
    )?;

    slog_scope::scope(&slog_scope::logger().new(o!("fn" => "resolve()")), move || {
        resolve::resolve(tree, &library, template)
    })
}

/// Read a JSON document tree, resolve its citations, and write it back out.
pub fn resolve_file(input: &Path, options: &Options, output: &Output) -> Result<()> {
    let json = slog_scope::scope(
        &slog_scope::logger().new(o!("fn" => "load_file()")),
        || load_file(input),
    )?;
    let mut tree: Node = serde_json::from_str(&json)?;

    cite_footnotes(options, &mut tree)?;

    let json = serde_json::to_string_pretty(&tree)?;
    match output {
        Output::StandardOut => println!("{}", json),
        Output::File(path) => fs::save_file(path, &json)?,
    }
    Ok(())
}

/// The main bibnote function.
pub fn bibnote(config: BibnoteConfig) -> Result<()> {
    match config.command {
        BibnoteCommand::NewOptionsFile => {
            debug!(slog_scope::logger(), "Creating blank options file");
            fs::new_options_ron(Path::new("."))
        }
        BibnoteCommand::Resolve(input) => {
            eprintln!("{} Resolving citations...", Color::Green.paint("INFO"));
            resolve_file(input, &config.options, &config.output)?;
            eprintln!("{} Done", Color::Green.paint("INFO"));
            Ok(())
        }
    }
}
