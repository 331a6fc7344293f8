//! The citation resolver.
//!
//! Resolution runs in three steps over one document:
//!
//! 1. Collect the identifiers of the footnotes the author wrote by hand.
//! 2. Replace every citation marker with a footnote reference, ranking keys
//!    by first appearance.
//! 3. Append one footnote definition per cited key to the root.
//!
//! Steps 2 and 3 each allocate identifiers with their own [`IdAllocator`], so
//! neither ever reuses a hand-written identifier. A reference and its
//! definition are joined by rank.

pub mod allocate;
pub mod definitions;
pub mod existing;
pub mod markers;

use crate::{bibliography::Bibliography, error::Result, tree::Node};
use allocate::IdAllocator;
use markers::MarkerResolver;
use slog::{debug, o};

/// Replace the citation markers in `tree` with footnotes.
///
/// The work is done on a copy of the tree, which only replaces `tree` once
/// every definition has been formatted. On error `tree` is left untouched.
pub fn resolve<'t, B: Bibliography + ?Sized>(
    tree: &'t mut Node,
    bibliography: &B,
    template: &str,
) -> Result<&'t mut Node> {
    debug!(slog_scope::logger(), "Starting resolver...");

    let existing = slog_scope::scope(
        &slog_scope::logger().new(o!("fn" => "collect_existing_identifiers()")),
        || existing::collect_existing_identifiers(tree),
    );

    let mut working = tree.clone();

    let references = slog_scope::scope(
        &slog_scope::logger().new(o!("fn" => "resolve_markers()")),
        || {
            let mut resolver = MarkerResolver::new(IdAllocator::new(&existing));
            resolver.resolve(&mut working);
            resolver.into_references()
        },
    );

    if references.is_empty() {
        debug!(slog_scope::logger(), "No citations found");
        return Ok(tree);
    }

    let footnotes = slog_scope::scope(
        &slog_scope::logger().new(o!("fn" => "build_definitions()")),
        || {
            definitions::build_definitions(
                &references,
                bibliography,
                template,
                IdAllocator::new(&existing),
            )
        },
    )?;

    for footnote in footnotes {
        working.push_child(footnote);
    }
    *tree = working;

    debug!(slog_scope::logger(), "Resolver complete");
    Ok(tree)
}
