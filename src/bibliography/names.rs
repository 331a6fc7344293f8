//! Parsing BibTeX name lists (`author`, `editor`).

use super::latex;

/// A single parsed name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    /// Given names, cleaned. Empty for corporate names.
    pub given: String,
    /// Family name including any "von" particle, cleaned.
    pub family: String,
    /// Suffix such as "Jr.", cleaned.
    pub suffix: Option<String>,
}

impl Name {
    /// Initials of the given names: "John Ronald" gives `["J", "R"]` and
    /// "Jean-Paul" gives `["J-P"]`.
    pub fn initials(&self) -> Vec<String> {
        self.given
            .split_whitespace()
            .map(|part| {
                part.split('-')
                    .filter_map(|p| p.chars().find(|c| c.is_alphabetic()))
                    .map(|c| c.to_uppercase().to_string())
                    .collect::<Vec<_>>()
                    .join("-")
            })
            .filter(|i| !i.is_empty())
            .collect()
    }
}

/// Split a raw name list into names.
///
/// Names are separated by `and` outside braces. A trailing `and others` is
/// dropped.
pub fn parse_names(raw: &str) -> Vec<Name> {
    split_top_level(raw)
        .split(|word| word.eq_ignore_ascii_case("and"))
        .filter(|words| !words.is_empty())
        .filter(|words| !(words.len() == 1 && words[0] == "others"))
        .map(|words| parse_name(&words.join(" ")))
        .collect()
}

/// Split on whitespace that is not inside braces.
fn split_top_level(raw: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut depth = 0usize;

    for c in raw.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if !word.is_empty() {
                    words.push(std::mem::take(&mut word));
                }
                continue;
            }
            _ => {}
        }
        word.push(c);
    }
    if !word.is_empty() {
        words.push(word);
    }
    words
}

/// Split on commas that are not inside braces.
fn split_commas(name: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in name.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(name[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(name[start..].trim());
    parts
}

fn is_corporate(name: &str) -> bool {
    let Some(inner) = name.strip_prefix('{').and_then(|n| n.strip_suffix('}')) else {
        return false;
    };
    // `{A} and {B}` style braces open and close more than once.
    let mut depth = 0usize;
    for c in inner.chars() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => return false,
            '}' => depth -= 1,
            _ => {}
        }
    }
    depth == 0
}

fn parse_name(raw: &str) -> Name {
    if is_corporate(raw) {
        return Name {
            given: String::new(),
            family: latex::clean(raw),
            suffix: None,
        };
    }

    let parts = split_commas(raw);
    match parts.as_slice() {
        [family, given] => Name {
            given: latex::clean(given),
            family: latex::clean(family),
            suffix: None,
        },
        [family, suffix, given, ..] => Name {
            given: latex::clean(given),
            family: latex::clean(family),
            suffix: Some(latex::clean(suffix)).filter(|s| !s.is_empty()),
        },
        _ => {
            let words = split_top_level(raw);
            let last = words.len().saturating_sub(1);
            // The family name starts at the first lower-case word ("van",
            // "de") before the last word, or at the last word.
            let split = words[..last]
                .iter()
                .position(|w| w.chars().next().is_some_and(char::is_lowercase))
                .unwrap_or(last);
            Name {
                given: latex::clean(&words[..split].join(" ")),
                family: latex::clean(&words[split..].join(" ")),
                suffix: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(given: &str, family: &str) -> Name {
        Name {
            given: given.to_string(),
            family: family.to_string(),
            suffix: None,
        }
    }

    #[test]
    fn comma_form() {
        assert_eq!(parse_names("Smith, John"), vec![name("John", "Smith")]);
    }

    #[test]
    fn first_last_form() {
        assert_eq!(
            parse_names("John Ronald Reuel Tolkien"),
            vec![name("John Ronald Reuel", "Tolkien")]
        );
    }

    #[test]
    fn von_particle() {
        assert_eq!(
            parse_names("Ludwig van Beethoven"),
            vec![name("Ludwig", "van Beethoven")]
        );
    }

    #[test]
    fn suffix() {
        assert_eq!(
            parse_names("King, Jr., Martin Luther"),
            vec![Name {
                given: "Martin Luther".to_string(),
                family: "King".to_string(),
                suffix: Some("Jr.".to_string()),
            }]
        );
    }

    #[test]
    fn several_names() {
        let names = parse_names("Doe, Jane and John Smith AND {Acme and Sons}");
        assert_eq!(
            names,
            vec![
                name("Jane", "Doe"),
                name("John", "Smith"),
                name("", "Acme and Sons"),
            ]
        );
    }

    #[test]
    fn others_dropped() {
        assert_eq!(parse_names("Doe, Jane and others").len(), 1);
    }

    #[test]
    fn single_word() {
        assert_eq!(parse_names("Plato"), vec![name("", "Plato")]);
    }

    #[test]
    fn protected_braces_inside_name() {
        assert_eq!(
            parse_names(r#"G{\"o}del, Kurt"#),
            vec![name("Kurt", "Gödel")]
        );
    }

    #[test]
    fn initials() {
        assert_eq!(name("John Ronald", "x").initials(), vec!["J", "R"]);
        assert_eq!(name("Jean-Paul", "x").initials(), vec!["J-P"]);
        assert_eq!(name("C. E.", "x").initials(), vec!["C", "E"]);
        assert!(name("", "x").initials().is_empty());
    }
}
