//! This module builds the footnote definitions for the cited keys.

use super::{allocate::IdAllocator, markers::ReferenceList};
use crate::{bibliography::Bibliography, error::Result, tree::Node};
use slog::{debug, trace};

/// Build one footnote definition per cited key, in rank order.
///
/// Each key is formatted with the bibliography and given an identifier from
/// `allocator`, starting again from its rank. Fails on the first key the
/// bibliography cannot format.
pub fn build_definitions<B: Bibliography + ?Sized>(
    references: &ReferenceList,
    bibliography: &B,
    template: &str,
    mut allocator: IdAllocator<'_>,
) -> Result<Vec<Node>> {
    debug!(
        slog_scope::logger(),
        "Building {} footnote definitions...",
        references.len()
    );

    let mut definitions = Vec::with_capacity(references.len());
    for (idx, key) in references.keys().enumerate() {
        let cited = bibliography.format(key, template)?;
        let id = allocator.allocate(idx + 1).to_string();
        trace!(slog_scope::logger(), "Footnote {}: {}", id, cited);

        definitions.push(Node::footnote_definition(
            &id,
            vec![Node::paragraph(vec![Node::text(&cited)])],
        ));
    }

    debug!(slog_scope::logger(), "Footnote definitions built");
    Ok(definitions)
}
