//! Bibliography styles.
//!
//! Each style renders an [`Entry`] as a single line of plain text. The
//! templates are named as citation-js names them: `apa`, `vancouver`, and
//! `harvard1`.

use super::{
    bibtex::Entry,
    latex,
    names::{parse_names, Name},
};
use crate::error::{Error, Result};
use phf::phf_map;
use slog::trace;

/// The default template.
pub const DEFAULT_TEMPLATE: &str = "apa";

/// The supported styles.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Style {
    Apa,
    Vancouver,
    Harvard,
}

static TEMPLATES: phf::Map<&'static str, Style> = phf_map! {
    "apa" => Style::Apa,
    "vancouver" => Style::Vancouver,
    "harvard1" => Style::Harvard,
};

impl Style {
    /// Look up a style by template name. Names are case-insensitive.
    pub fn from_template(template: &str) -> Result<Style> {
        TEMPLATES
            .get(template.to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| {
                let mut known: Vec<_> = TEMPLATES.keys().copied().collect();
                known.sort_unstable();
                Error::Config(format!(
                    "unknown bibliography template \"{}\" (expected one of: {})",
                    template,
                    known.join(", ")
                ))
            })
    }

    /// Render an entry.
    pub fn format(self, entry: &Entry) -> String {
        trace!(
            slog_scope::logger(),
            "Formatting {} as {:?}",
            entry.key,
            self
        );
        let fields = Fields::from_entry(entry);
        match self {
            Style::Apa => apa(&fields),
            Style::Vancouver => vancouver(&fields),
            Style::Harvard => harvard(&fields),
        }
    }
}

/// How an entry type is laid out.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Kind {
    Article,
    Book,
    Chapter,
    Other,
}

/// The cleaned fields of an entry.
struct Fields {
    kind: Kind,
    authors: Vec<Name>,
    year: Option<String>,
    title: Option<String>,
    container: Option<String>,
    volume: Option<String>,
    number: Option<String>,
    pages: Option<String>,
    publisher: Option<String>,
    address: Option<String>,
    doi: Option<String>,
    url: Option<String>,
}

impl Fields {
    fn from_entry(entry: &Entry) -> Fields {
        let get = |name: &str| {
            entry
                .field(name)
                .map(latex::clean)
                .filter(|v| !v.is_empty())
        };
        let raw = |name: &str| entry.field(name).map(str::trim).filter(|v| !v.is_empty());

        let kind = match entry.entry_type.as_str() {
            "article" => Kind::Article,
            "book" | "booklet" | "proceedings" | "phdthesis" | "mastersthesis" => Kind::Book,
            "inproceedings" | "incollection" | "inbook" | "conference" => Kind::Chapter,
            _ => Kind::Other,
        };

        let authors = entry
            .field("author")
            .or_else(|| entry.field("editor"))
            .map(parse_names)
            .unwrap_or_default();

        Fields {
            kind,
            authors,
            year: get("year").or_else(|| get("date").map(|d| d.chars().take(4).collect())),
            title: get("title"),
            container: get("journal")
                .or_else(|| get("journaltitle"))
                .or_else(|| get("booktitle")),
            volume: get("volume"),
            number: get("number").or_else(|| get("issue")),
            pages: get("pages"),
            publisher: get("publisher")
                .or_else(|| get("school"))
                .or_else(|| get("institution"))
                .or_else(|| get("organization"))
                .or_else(|| get("howpublished")),
            address: get("address").or_else(|| get("location")),
            // Links are kept as written; `~` and `_` are common in them.
            doi: raw("doi").map(|d| {
                d.trim_start_matches("https://doi.org/")
                    .trim_start_matches("http://dx.doi.org/")
                    .to_string()
            }),
            url: raw("url").map(str::to_string),
        }
    }

    /// `volume(number)`, or whichever of the two exists.
    fn volume_issue(&self) -> Option<String> {
        match (&self.volume, &self.number) {
            (Some(v), Some(n)) => Some(format!("{}({})", v, n)),
            (Some(v), None) => Some(v.clone()),
            (None, Some(n)) => Some(format!("({})", n)),
            (None, None) => None,
        }
    }
}

/// End a piece of text with a period unless it already ends in punctuation.
fn sentence(text: &str) -> String {
    if text.ends_with(['.', '?', '!']) {
        text.to_string()
    } else {
        format!("{}.", text)
    }
}

/// Join names as "A, B, & C" (or "A, B and C", per `last`).
fn join_names(names: &[String], separator: &str, last: &str) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., final_name] => format!("{}{}{}", init.join(separator), last, final_name),
    }
}

/// "Smith, J. R." or a corporate name as is.
fn family_initials(name: &Name, with_periods: bool) -> String {
    let initials = name.initials();
    let mut out = name.family.clone();
    if !initials.is_empty() {
        let initials: Vec<String> = if with_periods {
            initials
                .iter()
                .map(|i| format!("{}.", i.replace('-', ".-")))
                .collect()
        } else {
            initials.iter().map(|i| i.replace('-', "")).collect()
        };
        if with_periods {
            out.push_str(", ");
            out.push_str(&initials.join(" "));
        } else {
            out.push(' ');
            out.push_str(&initials.concat());
        }
    }
    if let Some(suffix) = &name.suffix {
        out.push_str(", ");
        out.push_str(suffix);
    }
    out
}

fn apa(f: &Fields) -> String {
    let year = f.year.clone().unwrap_or_else(|| "n.d.".to_string());
    let mut parts = Vec::new();

    let names: Vec<String> = f.authors.iter().map(|n| family_initials(n, true)).collect();
    let authors = if names.len() > 20 {
        format!("{}, . . . {}", names[..19].join(", "), names[names.len() - 1])
    } else {
        join_names(&names, ", ", ", & ")
    };

    match (&f.title, authors.is_empty()) {
        (title, false) => {
            parts.push(format!("{} ({}).", authors, year));
            if let Some(title) = title {
                parts.push(sentence(title));
            }
        }
        (Some(title), true) => {
            parts.push(sentence(title));
            parts.push(format!("({}).", year));
        }
        (None, true) => parts.push(format!("({}).", year)),
    }

    match f.kind {
        Kind::Article => {
            let mut source = f.container.clone().unwrap_or_default();
            for piece in [f.volume_issue(), f.pages.clone()].into_iter().flatten() {
                if !source.is_empty() {
                    source.push_str(", ");
                }
                source.push_str(&piece);
            }
            if !source.is_empty() {
                parts.push(sentence(&source));
            }
        }
        Kind::Chapter => {
            if let Some(container) = &f.container {
                let pages = f
                    .pages
                    .as_ref()
                    .map(|p| format!(" (pp. {})", p))
                    .unwrap_or_default();
                parts.push(format!("In {}{}.", container, pages));
            }
            if let Some(publisher) = &f.publisher {
                parts.push(sentence(publisher));
            }
        }
        Kind::Book | Kind::Other => {
            if let Some(publisher) = &f.publisher {
                parts.push(sentence(publisher));
            }
        }
    }

    if let Some(doi) = &f.doi {
        parts.push(format!("https://doi.org/{}", doi));
    } else if let Some(url) = &f.url {
        parts.push(url.clone());
    }

    parts.join(" ")
}

fn vancouver(f: &Fields) -> String {
    let mut parts = Vec::new();

    let mut names: Vec<String> = f
        .authors
        .iter()
        .map(|n| family_initials(n, false))
        .collect();
    if names.len() > 6 {
        names.truncate(6);
        names.push("et al".to_string());
    }
    if !names.is_empty() {
        parts.push(sentence(&names.join(", ")));
    }
    if let Some(title) = &f.title {
        parts.push(sentence(title));
    }

    let pages = f.pages.as_ref().map(|p| p.replace('\u{2013}', "-"));
    let imprint = || {
        let place = match (&f.address, &f.publisher) {
            (Some(a), Some(p)) => Some(format!("{}: {}", a, p)),
            (None, Some(p)) => Some(p.clone()),
            (Some(a), None) => Some(a.clone()),
            (None, None) => None,
        };
        match (place, &f.year) {
            (Some(place), Some(year)) => Some(format!("{}; {}.", place, year)),
            (Some(place), None) => Some(sentence(&place)),
            (None, Some(year)) => Some(format!("{}.", year)),
            (None, None) => None,
        }
    };

    match f.kind {
        Kind::Article => {
            if let Some(journal) = &f.container {
                parts.push(sentence(journal));
            }
            let mut issue = f.year.clone().unwrap_or_default();
            if let Some(volume_issue) = f.volume_issue() {
                issue.push(';');
                issue.push_str(&volume_issue);
            }
            if let Some(pages) = &pages {
                issue.push(':');
                issue.push_str(pages);
            }
            if !issue.is_empty() {
                parts.push(format!("{}.", issue));
            }
        }
        Kind::Chapter => {
            if let Some(container) = &f.container {
                parts.push(format!("In: {}.", container));
            }
            parts.extend(imprint());
            if let Some(pages) = &pages {
                parts.push(format!("p. {}.", pages));
            }
        }
        Kind::Book | Kind::Other => parts.extend(imprint()),
    }

    if let Some(doi) = &f.doi {
        parts.push(format!("doi:{}", doi));
    } else if let Some(url) = &f.url {
        parts.push(format!("Available from: {}", url));
    }

    parts.join(" ")
}

fn harvard(f: &Fields) -> String {
    let year = f.year.clone().unwrap_or_else(|| "n.d.".to_string());
    let mut parts = Vec::new();

    let names: Vec<String> = f.authors.iter().map(|n| family_initials(n, true)).collect();
    let quoted_title = matches!(f.kind, Kind::Article | Kind::Chapter);

    if names.is_empty() {
        if let Some(title) = &f.title {
            parts.push(title.clone());
        }
        parts.push(format!("({})", year));
    } else {
        parts.push(format!("{} ({})", join_names(&names, ", ", " and "), year));
        if let Some(title) = &f.title {
            if quoted_title {
                parts.push(format!("\u{2018}{}\u{2019},", title));
            } else {
                parts.push(sentence(title));
            }
        }
    }

    let pages = f.pages.as_ref().map(|p| format!("pp. {}", p));
    let imprint = match (&f.address, &f.publisher) {
        (Some(a), Some(p)) => Some(format!("{}: {}", a, p)),
        (None, Some(p)) => Some(p.clone()),
        (Some(a), None) => Some(a.clone()),
        (None, None) => None,
    };

    match f.kind {
        Kind::Article => {
            let source: Vec<String> = [f.container.clone(), f.volume_issue(), pages]
                .into_iter()
                .flatten()
                .collect();
            if !source.is_empty() {
                parts.push(sentence(&source.join(", ")));
            }
        }
        Kind::Chapter => {
            if let Some(container) = &f.container {
                parts.push(format!("in {}.", container));
            }
            let rest: Vec<String> = [imprint, pages].into_iter().flatten().collect();
            if !rest.is_empty() {
                parts.push(sentence(&rest.join(", ")));
            }
        }
        Kind::Book | Kind::Other => {
            if let Some(imprint) = imprint {
                parts.push(sentence(&imprint));
            }
        }
    }

    if let Some(doi) = &f.doi {
        parts.push(format!("doi: {}.", doi));
    } else if let Some(url) = &f.url {
        parts.push(format!("Available at: {}.", url));
    }

    parts.join(" ")
}
