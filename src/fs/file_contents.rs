//! Contains the constants for file contents.

/// Contents of the blank options file.
pub static BLANK_OPTIONS_CONTENTS: &str = r#"// Options for bibnote.
//
// bibtex_file is the path to your BibTeX library. It is required, either here
// or on the command line.
//
// template is the bibliography style used for the footnotes. One of "apa",
// "vancouver", or "harvard1". Leave it out to use "apa".
(
    bibtex_file: Some("library.bib"),
    template: Some("apa"),
)
"#;
