//! This module collects the footnote identifiers already in a document.

use crate::tree::Node;
use slog::debug;
use std::collections::HashSet;

/// Collect the identifiers of every hand-written footnote in the tree.
///
/// Walks every node, not just the siblings of text nodes, and takes the
/// identifiers of both footnote references and footnote definitions.
pub fn collect_existing_identifiers(tree: &Node) -> HashSet<String> {
    debug!(slog_scope::logger(), "Collecting existing footnotes...");

    let mut existing = HashSet::new();
    collect(tree, &mut existing);

    debug!(
        slog_scope::logger(),
        "Found {} existing footnote identifiers",
        existing.len()
    );
    existing
}

fn collect(node: &Node, existing: &mut HashSet<String>) {
    if node.is_footnote_reference() || node.is_footnote_definition() {
        if let Some(id) = node.identifier() {
            existing.insert(id.to_string());
        }
    }

    if let Some(children) = &node.children {
        for child in children {
            collect(child, existing);
        }
    }
}
