//! This module finds citation markers in text and replaces them with footnote
//! references.
//!
//! A marker looks like `(@smith2020)`. Each one is cut out of its text node,
//! which is split into the text before the marker, a footnote reference, and
//! the text after it. The text after it goes back on the worklist so a node
//! holding several markers has all of them resolved.

use super::allocate::IdAllocator;
use crate::tree::Node;
use lazy_static::lazy_static;
use regex::Regex;
use indexmap::IndexSet;
use slog::{debug, trace};

lazy_static! {
    /// Regex for a citation marker. The key is everything between `(@` and the
    /// first `)` on the same line.
    pub static ref MARKER: Regex =
        Regex::new(r"\(@(?P<key>[^)\n\r\x{2028}\x{2029}]+)\)").unwrap();
}

/// The cited keys, in order of first appearance.
///
/// A key's rank is its 1-based position in this list.
#[derive(Debug, Default)]
pub struct ReferenceList {
    keys: IndexSet<String>,
}

impl ReferenceList {
    /// Return the rank of `key`, adding it to the end of the list if it has
    /// not been seen, along with whether it was new.
    pub fn rank(&mut self, key: &str) -> (usize, bool) {
        match self.keys.get_index_of(key) {
            Some(idx) => (idx + 1, false),
            None => {
                let (idx, _) = self.keys.insert_full(key.to_string());
                (idx + 1, true)
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn get(&self, key: &str) -> Option<usize> {
        self.keys.get_index_of(key).map(|idx| idx + 1)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The keys in rank order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

/// A text node split around its first marker.
#[derive(Debug, PartialEq, Eq)]
struct Split<'t> {
    leading: Option<&'t str>,
    key: &'t str,
    trailing: Option<&'t str>,
}

/// Split `text` around the first marker in it, if there is one.
///
/// The leading text loses its trailing whitespace and is dropped if nothing is
/// left. The trailing text is kept exactly as written.
fn split_marker(text: &str) -> Option<Split<'_>> {
    let caps = MARKER.captures(text)?;
    let whole = caps.get(0)?;
    let key = caps.name("key")?.as_str();

    let leading = text[..whole.start()].trim_end();
    let trailing = &text[whole.end()..];

    Some(Split {
        leading: (!leading.is_empty()).then_some(leading),
        key,
        trailing: (!trailing.is_empty()).then_some(trailing),
    })
}

/// State for the reference pass over one document.
#[derive(Debug)]
pub struct MarkerResolver<'a> {
    references: ReferenceList,
    identifiers: Vec<usize>,
    allocator: IdAllocator<'a>,
}

impl<'a> MarkerResolver<'a> {
    pub fn new(allocator: IdAllocator<'a>) -> MarkerResolver<'a> {
        MarkerResolver {
            references: ReferenceList::default(),
            identifiers: Vec::new(),
            allocator,
        }
    }

    /// Resolve every marker in the tree, in document order.
    pub fn resolve(&mut self, tree: &mut Node) {
        debug!(slog_scope::logger(), "Resolving citation markers...");
        self.resolve_children(tree);
        debug!(
            slog_scope::logger(),
            "Resolved markers for {} unique citation keys",
            self.references.len()
        );
    }

    /// The footnote identifier for a citation key.
    ///
    /// The identifier is allocated at the key's first occurrence and reused
    /// for every later one.
    fn identifier_for(&mut self, key: &str) -> usize {
        let (rank, new) = self.references.rank(key);
        if new {
            let id = self.allocator.allocate(rank);
            self.identifiers.push(id);
            trace!(
                slog_scope::logger(),
                "New citation {} (rank {}) -> footnote {}",
                key,
                rank,
                id
            );
        }
        self.identifiers[rank - 1]
    }

    fn resolve_children(&mut self, parent: &mut Node) {
        let Some(children) = parent.children.as_mut() else {
            return;
        };

        let mut idx = 0;
        while idx < children.len() {
            if !children[idx].is_text() {
                self.resolve_children(&mut children[idx]);
                idx += 1;
                continue;
            }

            let value = children[idx].value.clone().unwrap_or_default();
            let Some(split) = split_marker(&value) else {
                idx += 1;
                continue;
            };

            let id = self.identifier_for(split.key).to_string();

            let mut replacement = Vec::with_capacity(3);
            if let Some(leading) = split.leading {
                replacement.push(Node::text(leading));
            }
            replacement.push(Node::footnote_reference(&id));
            if let Some(trailing) = split.trailing {
                replacement.push(Node::text(trailing));
            }

            // Step past the leading text and the reference. Any trailing text
            // now sits at `idx` and is scanned again on the next iteration.
            let consumed = replacement.len() - usize::from(split.trailing.is_some());
            children.splice(idx..=idx, replacement);
            idx += consumed;
        }
    }

    /// Finish the pass, handing back the reference list.
    pub fn into_references(self) -> ReferenceList {
        self.references
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn run(tree: &mut Node, existing: &HashSet<String>) -> ReferenceList {
        let mut resolver = MarkerResolver::new(IdAllocator::new(existing));
        resolver.resolve(tree);
        resolver.into_references()
    }

    fn ids(nodes: &[Node]) -> Vec<String> {
        nodes
            .iter()
            .filter(|n| n.is_footnote_reference())
            .map(|n| n.identifier().unwrap().to_string())
            .collect()
    }

    mod test_split_marker {
        use super::*;

        #[test]
        fn middle() {
            let split = split_marker("See (@smith2020) for details.").unwrap();
            assert_eq!(
                split,
                Split {
                    leading: Some("See"),
                    key: "smith2020",
                    trailing: Some(" for details."),
                }
            );
        }

        #[test]
        fn whole_value() {
            let split = split_marker("(@smith2020)").unwrap();
            assert_eq!(split.leading, None);
            assert_eq!(split.trailing, None);
        }

        #[test]
        fn whitespace_only_leading() {
            let split = split_marker("   (@a) b").unwrap();
            assert_eq!(split.leading, None);
            assert_eq!(split.trailing, Some(" b"));
        }

        #[test]
        fn first_marker_only() {
            let split = split_marker("x (@a) y (@b)").unwrap();
            assert_eq!(split.key, "a");
            assert_eq!(split.trailing, Some(" y (@b)"));
        }

        #[test]
        fn key_not_trimmed() {
            assert_eq!(split_marker("(@ a b )").unwrap().key, " a b ");
        }

        #[test]
        fn marker_stops_at_line_break() {
            let split = split_marker("Ping me (@handle\nis fine) but see (@smith2020).").unwrap();
            assert_eq!(split.key, "smith2020");
            assert_eq!(split.leading, Some("Ping me (@handle\nis fine) but see"));
            assert_eq!(split.trailing, Some("."));
            assert!(split_marker("(@a\r\nb)").is_none());
        }

        #[test]
        fn no_marker() {
            assert!(split_marker("Nothing (here) @all").is_none());
            assert!(split_marker("(@)").is_none());
        }
    }

    mod test_reference_list {
        use super::*;

        #[test]
        fn first_seen_order() {
            let mut list = ReferenceList::default();
            assert_eq!(list.rank("b"), (1, true));
            assert_eq!(list.rank("a"), (2, true));
            assert_eq!(list.rank("b"), (1, false));
            assert_eq!(list.get("a"), Some(2));
            assert_eq!(list.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        }
    }

    mod test_resolve {
        use super::*;

        #[test]
        fn splits_text() {
            let mut para = Node::paragraph(vec![Node::text("See (@smith2020) for details.")]);
            let refs = run(&mut para, &HashSet::new());

            let children = para.children.unwrap();
            assert_eq!(children.len(), 3);
            assert_eq!(children[0], Node::text("See"));
            assert_eq!(children[1], Node::footnote_reference("1"));
            assert_eq!(children[2], Node::text(" for details."));
            assert_eq!(refs.keys().collect::<Vec<_>>(), vec!["smith2020"]);
        }

        #[test]
        fn keeps_siblings_in_place() {
            let mut strong = Node::paragraph(vec![Node::text("bold")]);
            strong.node_type = "strong".to_string();
            let mut para = Node::paragraph(vec![
                Node::text("Start "),
                Node::text("cite (@a)"),
                strong.clone(),
            ]);
            run(&mut para, &HashSet::new());

            let children = para.children.unwrap();
            assert_eq!(children.len(), 4);
            assert_eq!(children[0], Node::text("Start "));
            assert_eq!(children[1], Node::text("cite"));
            assert_eq!(children[2], Node::footnote_reference("1"));
            assert_eq!(children[3], strong);
        }

        #[test]
        fn several_markers_in_one_node() {
            let mut para = Node::paragraph(vec![Node::text("A (@a), B (@b), and A (@a).")]);
            let refs = run(&mut para, &HashSet::new());

            let children = para.children.unwrap();
            assert_eq!(ids(&children), vec!["1", "2", "1"]);
            assert_eq!(children.last().unwrap(), &Node::text("."));
            assert_eq!(refs.len(), 2);
        }

        #[test]
        fn repeated_key_across_nodes() {
            let mut tree = Node::root(vec![
                Node::paragraph(vec![Node::text("One (@jones2019).")]),
                Node::paragraph(vec![Node::text("Two (@jones2019).")]),
            ]);
            let refs = run(&mut tree, &HashSet::new());

            let paras = tree.children.unwrap();
            assert_eq!(ids(paras[0].children.as_ref().unwrap()), vec!["1"]);
            assert_eq!(ids(paras[1].children.as_ref().unwrap()), vec!["1"]);
            assert_eq!(refs.len(), 1);
        }

        #[test]
        fn avoids_existing_identifiers() {
            let mut para = Node::paragraph(vec![
                Node::text("Hand"),
                Node::footnote_reference("1"),
                Node::text(" then (@a) and (@b)"),
            ]);
            let existing: HashSet<String> = ["1".to_string()].into();
            run(&mut para, &existing);

            let children = para.children.unwrap();
            assert_eq!(ids(&children), vec!["1", "2", "3"]);
        }

        #[test]
        fn descends_into_nested_nodes() {
            let mut emphasis = Node::paragraph(vec![Node::text("(@deep)")]);
            emphasis.node_type = "emphasis".to_string();
            let mut tree = Node::root(vec![Node::paragraph(vec![emphasis])]);
            let refs = run(&mut tree, &HashSet::new());

            let para = &tree.children.unwrap()[0];
            let emphasis = &para.children.as_ref().unwrap()[0];
            assert_eq!(
                emphasis.children.as_ref().unwrap()[0],
                Node::footnote_reference("1")
            );
            assert_eq!(refs.get("deep"), Some(1));
        }

        #[test]
        fn unclosed_marker_before_line_break() {
            let mut para = Node::paragraph(vec![Node::text(
                "Ping me (@handle\nis fine) but see (@smith2020).",
            )]);
            let refs = run(&mut para, &HashSet::new());

            assert_eq!(refs.keys().collect::<Vec<_>>(), vec!["smith2020"]);
            assert_eq!(ids(&para.children.unwrap()), vec!["1"]);
        }

        #[test]
        fn no_markers_unchanged() {
            let mut tree = Node::root(vec![Node::paragraph(vec![Node::text("Plain (text).")])]);
            let before = tree.clone();
            let refs = run(&mut tree, &HashSet::new());

            assert_eq!(tree, before);
            assert!(refs.is_empty());
        }
    }
}
